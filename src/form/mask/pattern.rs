//! Mask pattern compilation and reformatting.

use logos::Logos;
use std::fmt;

/// Raw pattern-spec tokens.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum SpecToken {
    #[token("{d}")]
    Placeholder,

    #[regex(r"[^{}]", |lex| lex.slice().chars().next())]
    Literal(char),
}

/// One element of a compiled pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MaskToken {
    /// A slot for one significant character.
    Placeholder,
    /// A fixed separator, re-inserted during formatting.
    Literal(char),
}

/// Errors from compiling a pattern spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    Empty,
    /// A pattern with no `{d}` placeholders can never accept input.
    NoPlaceholders,
    /// Digit separators would make significant-character extraction
    /// ambiguous and break format idempotence.
    DigitLiteral(char),
    /// A stray `{` or `}` outside a `{d}` placeholder.
    Unrecognized(String),
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternError::Empty => write!(f, "mask pattern is empty"),
            PatternError::NoPlaceholders => write!(f, "mask pattern has no {{d}} placeholders"),
            PatternError::DigitLiteral(c) => {
                write!(f, "mask pattern uses digit '{}' as a literal", c)
            }
            PatternError::Unrecognized(s) => {
                write!(f, "unrecognized token '{}' in mask pattern", s)
            }
        }
    }
}

impl std::error::Error for PatternError {}

/// A compiled mask pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskPattern {
    source: String,
    tokens: Vec<MaskToken>,
}

impl MaskPattern {
    /// Compile a pattern spec such as
    /// `"{d}{d}{d}{d} {d}{d}{d}{d} {d}{d}{d}{d} {d}{d}{d}{d}"`.
    pub fn compile(source: &str) -> Result<MaskPattern, PatternError> {
        if source.is_empty() {
            return Err(PatternError::Empty);
        }
        let mut tokens = Vec::new();
        let mut lexer = SpecToken::lexer(source);
        while let Some(token) = lexer.next() {
            match token {
                Ok(SpecToken::Placeholder) => tokens.push(MaskToken::Placeholder),
                Ok(SpecToken::Literal(c)) if c.is_ascii_digit() => {
                    return Err(PatternError::DigitLiteral(c));
                }
                Ok(SpecToken::Literal(c)) => tokens.push(MaskToken::Literal(c)),
                Err(()) => return Err(PatternError::Unrecognized(lexer.slice().to_string())),
            }
        }
        if !tokens.contains(&MaskToken::Placeholder) {
            return Err(PatternError::NoPlaceholders);
        }
        Ok(MaskPattern {
            source: source.to_string(),
            tokens,
        })
    }

    /// The original pattern spec.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Maximum number of significant characters the pattern accepts.
    pub fn capacity(&self) -> usize {
        self.tokens
            .iter()
            .filter(|t| **t == MaskToken::Placeholder)
            .count()
    }

    /// Extract the significant characters from raw input, discarding
    /// separators and disallowed characters, truncated to capacity.
    pub fn significant(&self, raw: &str) -> String {
        raw.chars()
            .filter(char::is_ascii_digit)
            .take(self.capacity())
            .collect()
    }

    /// Re-synthesize the display string: each significant character is
    /// preceded by any literal run at its fixed position. Literals after
    /// the last significant character are withheld, so a partially filled
    /// input never ends in a dangling separator.
    pub fn format(&self, raw: &str) -> String {
        let significant = self.significant(raw);
        let mut chars = significant.chars();
        let mut out = String::new();
        let mut pending = String::new();
        for token in &self.tokens {
            match token {
                MaskToken::Literal(c) => pending.push(*c),
                MaskToken::Placeholder => match chars.next() {
                    Some(digit) => {
                        out.push_str(&pending);
                        pending.clear();
                        out.push(digit);
                    }
                    None => break,
                },
            }
        }
        out
    }

    /// Terminal validation: does the significant-character count fill the
    /// pattern exactly? Partial input during editing is not an error; this
    /// is only consulted at submit time.
    pub fn matches(&self, raw: &str) -> bool {
        // Count without truncation so overlong input also fails.
        let count = raw.chars().filter(|c| c.is_ascii_digit()).count();
        count == self.capacity()
    }
}

impl fmt::Display for MaskPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card() -> MaskPattern {
        MaskPattern::compile("{d}{d}{d}{d} {d}{d}{d}{d} {d}{d}{d}{d} {d}{d}{d}{d}").unwrap()
    }

    fn expiry() -> MaskPattern {
        MaskPattern::compile("{d}{d}/{d}{d}").unwrap()
    }

    #[test]
    fn compile_rejects_degenerate_patterns() {
        assert_eq!(MaskPattern::compile(""), Err(PatternError::Empty));
        assert_eq!(MaskPattern::compile("- -"), Err(PatternError::NoPlaceholders));
        assert_eq!(
            MaskPattern::compile("{d}0{d}"),
            Err(PatternError::DigitLiteral('0'))
        );
        assert!(matches!(
            MaskPattern::compile("{d}{x}"),
            Err(PatternError::Unrecognized(_))
        ));
    }

    #[test]
    fn capacity_counts_placeholders() {
        assert_eq!(card().capacity(), 16);
        assert_eq!(expiry().capacity(), 4);
    }

    #[test]
    fn significant_strips_and_truncates() {
        assert_eq!(expiry().significant("12/34"), "1234");
        assert_eq!(expiry().significant("1a2b3c4d5e"), "1234");
        assert_eq!(expiry().significant(""), "");
    }

    #[test]
    fn format_inserts_separators_at_fixed_positions() {
        assert_eq!(card().format("453212345678"), "4532 1234 5678");
        assert_eq!(card().format("4532123456789"), "4532 1234 5678 9");
        assert_eq!(expiry().format("1226"), "12/26");
        assert_eq!(expiry().format("12"), "12");
        assert_eq!(expiry().format(""), "");
    }

    #[test]
    fn format_is_idempotent() {
        for input in ["453212345678", "4532 1234 5678 9012", "1", ""] {
            let once = card().format(input);
            assert_eq!(card().format(&once), once);
        }
    }

    #[test]
    fn matches_requires_exact_fill() {
        assert!(expiry().matches("12/26"));
        assert!(expiry().matches("1226"));
        assert!(!expiry().matches("122"));
        assert!(!expiry().matches("12261"));
        assert!(!expiry().matches(""));
    }
}
