//! Caret repositioning across reformatting.
//!
//! The caret "sticks" to its logical digit: the number of significant
//! characters before the recomputed offset in the formatted string equals
//! the number before the old offset in the raw input, clamped to the
//! pattern's capacity. Offsets are character offsets.

use super::pattern::MaskPattern;

/// Recompute a caret offset after reformatting `raw` through `pattern`.
///
/// Counts how many significant characters sit at or before `cursor` in the
/// raw input, then returns the display-string offset immediately after
/// that many significant characters in the newly formatted string.
pub fn caret_after(pattern: &MaskPattern, raw: &str, cursor: usize) -> usize {
    let wanted = raw
        .chars()
        .take(cursor)
        .filter(|c| c.is_ascii_digit())
        .count();
    let formatted = pattern.format(raw);
    let available = formatted.chars().filter(|c| c.is_ascii_digit()).count();
    let wanted = wanted.min(available);
    if wanted == 0 {
        return 0;
    }
    let mut seen = 0;
    for (offset, c) in formatted.chars().enumerate() {
        if c.is_ascii_digit() {
            seen += 1;
            if seen == wanted {
                return offset + 1;
            }
        }
    }
    formatted.chars().count()
}

/// Reformat raw input and reposition the caret in one step. This is the
/// pair live masking feeds back into the tree on every keystroke.
pub fn reformat_with_caret(pattern: &MaskPattern, raw: &str, cursor: usize) -> (String, usize) {
    let caret = caret_after(pattern, raw, cursor);
    (pattern.format(raw), caret)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card() -> MaskPattern {
        MaskPattern::compile("{d}{d}{d}{d} {d}{d}{d}{d} {d}{d}{d}{d} {d}{d}{d}{d}").unwrap()
    }

    #[test]
    fn caret_sticks_to_its_digit_when_a_separator_appears() {
        // Typing the 5th digit: raw "45321", caret after it.
        let (formatted, caret) = reformat_with_caret(&card(), "45321", 5);
        assert_eq!(formatted, "4532 1");
        assert_eq!(caret, 6);
    }

    #[test]
    fn caret_at_start_stays_at_start() {
        assert_eq!(caret_after(&card(), "4532 1234", 0), 0);
    }

    #[test]
    fn caret_mid_string_survives_separator_removal() {
        // Caret sits after "4532 1" (offset 6); deleting nothing, just
        // reformatting a raw paste with odd spacing.
        let (formatted, caret) = reformat_with_caret(&card(), "45 321", 4);
        assert_eq!(formatted, "4532 1");
        // Three digits sit before the raw caret, so it lands after digit 3.
        assert_eq!(caret, 3);
    }

    #[test]
    fn caret_clamps_to_capacity() {
        let long = "12345678901234567890";
        let (formatted, caret) = reformat_with_caret(&card(), long, long.len());
        assert_eq!(formatted, "1234 5678 9012 3456");
        assert_eq!(caret, formatted.chars().count());
    }
}
