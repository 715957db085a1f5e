/// Divides and rounds half up. Returns 0 when `denominator` is 0.
pub fn rounded_div(numerator: usize, denominator: usize) -> usize {
    if denominator == 0 {
        return 0;
    }
    (2 * numerator + denominator) / (2 * denominator)
}

/// Share of `part` in `total` as a whole percentage, rounded half up.
/// Returns 0 for an empty total.
pub fn rounded_pct(part: usize, total: usize) -> usize {
    rounded_div(100 * part, total)
}

/// Highest bucket value and the ascending indices that reach it.
///
/// An all-zero series has no peak: the index list is empty.
pub fn peak_indices(values: &[usize]) -> (usize, Vec<usize>) {
    let peak = values.iter().copied().max().unwrap_or(0);
    if peak == 0 {
        return (0, Vec::new());
    }

    let indices = values
        .iter()
        .enumerate()
        .filter(|(_, v)| **v == peak)
        .map(|(i, _)| i)
        .collect();

    (peak, indices)
}
