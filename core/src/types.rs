//! Shared primitive types used across the pipeline.

/// Positional respondent identifier, e.g. `INV001`.
pub type InvestorId = String;

/// Name of an asset class, e.g. `Equity`. Unique key into the market table.
pub type AssetClass = String;

/// Tag for one batch invocation, used to correlate log lines.
pub type RunId = String;

/// Build the investor ID for the respondent at zero-based input `position`.
///
/// Zero-padded to three digits; wider sequences keep every digit
/// (`INV999`, `INV1000`, ...).
pub fn investor_id(position: usize) -> InvestorId {
    format!("INV{:03}", position + 1)
}

/// Round to 0 decimal places, ties to even (2.5 -> 2, 3.5 -> 4).
pub fn round_whole(value: f64) -> f64 {
    value.round_ties_even()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn investor_ids_are_padded_and_widen() {
        assert_eq!(investor_id(0), "INV001");
        assert_eq!(investor_id(41), "INV042");
        assert_eq!(investor_id(998), "INV999");
        assert_eq!(investor_id(999), "INV1000");
        assert_eq!(investor_id(12_344), "INV12345");
    }

    #[test]
    fn rounding_ties_go_to_even() {
        assert_eq!(round_whole(2.5), 2.0);
        assert_eq!(round_whole(3.5), 4.0);
        assert_eq!(round_whole(-2.5), -2.0);
        assert_eq!(round_whole(2.4999), 2.0);
        assert_eq!(round_whole(2.5001), 3.0);
    }
}
