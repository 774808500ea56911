//! Deterministic, collision-free Uid synthesis.
//!
//! The ordering is a hard contract: a unique framework `Name` wins, then the
//! element's local name combined with a camel-case token derived from its
//! first localizable string, then numeric probing.

use crate::{error::Error, settings::UidGenerationMode};

/// Input characters examined when deriving the content token.
const CONTENT_TOKEN_CAP: usize = 20;

/// Synthesizes an identifier for one element.
///
/// `is_available` must answer whether a candidate is free in the file's
/// identifier table. Fails only on an exhausted 64-bit probe counter, which is
/// an internal invariant violation rather than a recoverable condition.
pub fn generate(
    mode: UidGenerationMode,
    framework_name: Option<&str>,
    element_name: &str,
    content: Option<&str>,
    is_available: &dyn Fn(&str) -> bool,
) -> Result<String, Error> {
    if let Some(name) = framework_name {
        if !name.is_empty() && is_available(name) {
            return Ok(name.to_string());
        }
    }

    let mut base = element_name
        .rsplit(':')
        .next()
        .unwrap_or(element_name)
        .to_string();
    let mut index_mandatory = true;

    if mode == UidGenerationMode::Smart {
        if let Some(content) = content {
            let token = content_token(content);
            if !token.is_empty() {
                base.push('_');
                base.push_str(&token);
                index_mandatory = false;
            }
        }
    }

    if !index_mandatory && is_available(&base) {
        return Ok(base);
    }

    for index in 0..=i64::MAX {
        let candidate = format!("{base}_{index}");
        if is_available(&candidate) {
            return Ok(candidate);
        }
    }
    Err(Error::internal("uid counter exhausted"))
}

/// Derives a camel-case token from localizable content: the first letter and
/// the first letter after each whitespace run are capitalized, everything
/// non-alphanumeric is dropped, and a leading digit gets an `S` prefix. Only
/// the first [`CONTENT_TOKEN_CAP`] input characters are examined.
fn content_token(content: &str) -> String {
    let mut token = String::new();
    let mut capitalize_next = true;
    for ch in content.chars().take(CONTENT_TOKEN_CAP) {
        if ch.is_whitespace() {
            capitalize_next = true;
            continue;
        }
        if !ch.is_alphanumeric() {
            continue;
        }
        if token.is_empty() && ch.is_numeric() {
            token.push('S');
        }
        if capitalize_next {
            token.extend(ch.to_uppercase());
            capitalize_next = false;
        } else {
            token.push(ch);
        }
    }
    token
}
