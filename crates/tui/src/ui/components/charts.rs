/// Horizontal bar of `width` cells filled in proportion to `value / max`,
/// e.g. `████████░░░░░░░░`.
#[must_use]
pub fn ascii_bar(value: u64, max: u64, width: usize) -> String {
    if max == 0 {
        return "░".repeat(width);
    }

    let ratio = (value as f64 / max as f64).clamp(0.0, 1.0);
    let filled = ((ratio * width as f64).round() as usize).min(width);
    let empty = width - filled;

    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_tracks_the_ratio() {
        assert_eq!(ascii_bar(0, 0, 4), "░░░░");
        assert_eq!(ascii_bar(1, 2, 4), "██░░");
        assert_eq!(ascii_bar(5, 2, 4), "████");
    }
}
