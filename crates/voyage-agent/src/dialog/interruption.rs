//! Interruption layer: scans inbound text for control keywords before the
//! active step runs, once per turn, ahead of any slot-specific parsing.

/// Notice sent when the user cancels the whole dialog stack.
pub const CANCEL_NOTICE: &str = "Cancelling...";

/// Static help message; the pending prompt is re-sent verbatim after it.
pub const HELP_TEXT: &str =
    "I can book a flight for you. Answer the question I asked, or say \"cancel\" to start over.";

/// A recognized control keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interruption {
    /// Unwind the entire stack.
    Cancel,
    /// Emit help and re-send the pending prompt without advancing.
    Help,
}

/// Case-insensitive exact keyword match on the trimmed text.
pub fn detect(text: &str) -> Option<Interruption> {
    let text = text.trim();
    if text.eq_ignore_ascii_case("cancel") {
        Some(Interruption::Cancel)
    } else if text.eq_ignore_ascii_case("help") {
        Some(Interruption::Help)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_match_exactly_and_case_insensitively() {
        assert_eq!(detect("cancel"), Some(Interruption::Cancel));
        assert_eq!(detect("  CANCEL "), Some(Interruption::Cancel));
        assert_eq!(detect("Help"), Some(Interruption::Help));
        assert_eq!(detect("please cancel"), None);
        assert_eq!(detect("helpful"), None);
        assert_eq!(detect("Berlin"), None);
    }
}
