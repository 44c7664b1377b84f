//! Utility functions and types.

use std::fmt::Debug;

/// Redacts a string by replacing all but the first and last three characters
/// with asterisks.
///
/// - If the input string has fewer than 12 characters, it is entirely redacted.
/// - If the input string has 12 or more characters, only the first three and
///   the last three are kept.
///
/// This lets users distinguish between different redacted values in logs
/// without leaking API keys or secrets.
pub struct Redact<'a>(&'a str);

impl<'a> From<&'a str> for Redact<'a> {
    fn from(value: &'a str) -> Self {
        Redact(value)
    }
}

impl<'a> From<&'a String> for Redact<'a> {
    fn from(value: &'a String) -> Self {
        Redact(value.as_str())
    }
}

impl<'a> From<&'a Option<String>> for Redact<'a> {
    fn from(value: &'a Option<String>) -> Self {
        match value {
            None => Redact(""),
            Some(v) => Redact(v),
        }
    }
}

impl<'a> Debug for Redact<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() {
            return f.write_str("EMPTY");
        }
        if self.0.chars().count() < 12 {
            return f.write_str("***");
        }

        // Split on character boundaries; byte offsets could land inside a
        // multibyte character and panic.
        let head_end = self
            .0
            .char_indices()
            .nth(3)
            .map(|(i, _)| i)
            .unwrap_or(self.0.len());
        let tail_start = self
            .0
            .char_indices()
            .nth_back(2)
            .map(|(i, _)| i)
            .unwrap_or(0);

        f.write_str(&self.0[..head_end])?;
        f.write_str("***")?;
        f.write_str(&self.0[tail_start..])
    }
}
