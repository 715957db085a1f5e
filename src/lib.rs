pub mod analyzers;
pub mod chart;
pub mod output;
pub mod parser;
pub mod record;
pub mod schema;
pub mod stats;
pub mod survey;
