//! Flat resource-key codecs.
//!
//! Two key shapes are in circulation: the `bamlName:uid:property` form used
//! by the string-resource XML file, and the legacy `uid:Class.Property` form
//! used by the 7-column delimited layout. The legacy decoder splits at the
//! last `:` and then the last `.`, which is ambiguous when identifiers
//! contain extra dots; this is a known fragility of the format and is kept
//! as-is rather than fixed.

use crate::{error::Error, formats::ResourceKey};

/// Encodes `bamlName:uid:property`.
pub fn encode_flat_key(baml_name: &str, uid: &str, property: &str) -> String {
    format!("{baml_name}:{uid}:{property}")
}

/// Decodes `bamlName:uid:property` by splitting at the first and last `:`.
pub fn decode_flat_key(key: &str) -> Result<(String, String, String), Error> {
    let first = key.find(':').ok_or_else(|| Error::KeyFormat(key.to_string()))?;
    let last = key.rfind(':').unwrap_or(first);
    if first == last {
        return Err(Error::KeyFormat(key.to_string()));
    }
    Ok((
        key[..first].to_string(),
        key[first + 1..last].to_string(),
        key[last + 1..].to_string(),
    ))
}

/// Encodes the legacy `uid:Class.Property` key.
pub fn encode_legacy_key(key: &ResourceKey) -> String {
    format!("{}:{}.{}", key.uid, key.class_name, key.property)
}

/// Decodes the legacy `uid:Class.Property` key: the text after the last `:`
/// is the class-qualified property, split at its last `.`.
pub fn decode_legacy_key(key: &str) -> Result<ResourceKey, Error> {
    let colon = key.rfind(':').ok_or_else(|| Error::KeyFormat(key.to_string()))?;
    let uid = &key[..colon];
    let qualified = &key[colon + 1..];
    let dot = qualified
        .rfind('.')
        .ok_or_else(|| Error::KeyFormat(key.to_string()))?;
    Ok(ResourceKey::new(
        uid,
        &qualified[..dot],
        &qualified[dot + 1..],
    ))
}
