//! Rule-based payload redaction.
//!
//! A rule string is a `;`-separated list of `pattern=replacement`
//! entries. Patterns are regular expressions matched against raw bytes, so
//! non UTF-8 payloads pass through untouched apart from the matched spans.
//! Replacements are literal: `$1` is not expanded.

pub mod redact_rule;

pub use redact_rule::{apply, parse, parse_rule, RedactRule};
