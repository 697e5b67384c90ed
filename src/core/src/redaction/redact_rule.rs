use log::warn;
use regex::bytes::{NoExpand, Regex};

use crate::error_handling::types::RedactError;

/// A compiled pattern and the literal text that replaces each of its matches.
#[derive(Debug, Clone)]
pub struct RedactRule {
    pattern: Regex,
    replacement: Vec<u8>,
}

impl RedactRule {
    pub fn new(pattern: &str, replacement: &str) -> Result<Self, RedactError> {
        let pattern = Regex::new(pattern).map_err(|source| RedactError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self {
            pattern,
            replacement: replacement.as_bytes().to_vec(),
        })
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn replacement(&self) -> &[u8] {
        &self.replacement
    }

    fn replace_all(&self, content: &[u8]) -> Vec<u8> {
        self.pattern
            .replace_all(content, NoExpand(&self.replacement))
            .into_owned()
    }
}

/// Parses one entry, splitting on the first `=`.
pub fn parse_rule(entry: &str) -> Result<RedactRule, RedactError> {
    let (pattern, replacement) = entry
        .split_once('=')
        .ok_or_else(|| RedactError::MissingSeparator(entry.to_string()))?;
    RedactRule::new(pattern, replacement)
}

/// Parses a full rule list, keeping the order of its entries.
///
/// Malformed entries are logged and skipped; they never fail the parse.
pub fn parse(spec: &str) -> Vec<RedactRule> {
    if spec.trim().is_empty() {
        return Vec::new();
    }
    spec.split(';')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| match parse_rule(entry) {
            Ok(rule) => Some(rule),
            Err(e) => {
                warn!("{}", e);
                None
            }
        })
        .collect()
}

/// Applies `rules` in order, each one to the output of the previous.
///
/// Returns the rewritten payload and whether any rule changed it.
pub fn apply(payload: &[u8], rules: &[RedactRule]) -> (Vec<u8>, bool) {
    if rules.is_empty() || payload.is_empty() {
        return (payload.to_vec(), false);
    }
    let mut redacted = false;
    let mut content = payload.to_vec();
    for rule in rules {
        let next = rule.replace_all(&content);
        if next != content {
            redacted = true;
        }
        content = next;
    }
    (content, redacted)
}
