//! Text histogram of hourly traffic at the two survey junctions.

use anyhow::Result;
use std::io::Write;

use crate::analyzers::utility::rounded_div;
use crate::record::{ELM_AVENUE_RABBIT_ROAD, HANLEY_HIGHWAY_WESTWAY};
use crate::stats::SurveyStats;

/// Widest bar, in characters. Taller hours are scaled down to fit.
pub const MAX_BAR_WIDTH: usize = 50;

const ELM_MARK: char = '#';
const HANLEY_MARK: char = '=';

/// Draws one pair of bars per hour: Elm Avenue/Rabbit Road then Hanley
/// Highway/Westway, each followed by its count.
pub fn render_hourly_chart<W: Write>(out: &mut W, stats: &SurveyStats, title: &str) -> Result<()> {
    let max = stats
        .hourly_elm_counts
        .iter()
        .chain(stats.hourly_hanley_counts.iter())
        .copied()
        .max()
        .unwrap_or(0);

    writeln!(out, "Histogram of vehicle frequency per hour ({title})")?;
    writeln!(
        out,
        "{ELM_MARK} {ELM_AVENUE_RABBIT_ROAD}   {HANLEY_MARK} {HANLEY_HIGHWAY_WESTWAY}"
    )?;

    for (hour, (elm, hanley)) in stats
        .hourly_elm_counts
        .iter()
        .zip(stats.hourly_hanley_counts.iter())
        .enumerate()
    {
        writeln!(out, "{hour:02} |{} {elm}", bar(ELM_MARK, *elm, max))?;
        writeln!(out, "   |{} {hanley}", bar(HANLEY_MARK, *hanley, max))?;
    }

    Ok(())
}

fn bar(mark: char, count: usize, max: usize) -> String {
    let width = if max <= MAX_BAR_WIDTH {
        count
    } else {
        // keep non-zero hours visible after scaling
        rounded_div(count * MAX_BAR_WIDTH, max).max(usize::from(count > 0))
    };
    mark.to_string().repeat(width)
}
