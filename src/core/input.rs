//! Lenient scalar parsing for request fields.
//!
//! Clients send flags as `true`, `1` or `"yes"` and IDs as `3` or `"3"`; these
//! helpers accept the same spellings the form-style API always has. Use them
//! with `#[serde(default, deserialize_with = "...")]` so a missing field stays
//! `None`.

use serde::{Deserialize, Deserializer, de::Error as _};

const TRUE_WORDS: [&str; 6] = ["true", "t", "yes", "y", "on", "1"];
const FALSE_WORDS: [&str; 6] = ["false", "f", "no", "n", "off", "0"];

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Bool(bool),
    Int(i64),
    Text(String),
}

fn to_flag(value: Scalar) -> Option<bool> {
    match value {
        Scalar::Bool(flag) => Some(flag),
        Scalar::Int(1) => Some(true),
        Scalar::Int(0) => Some(false),
        Scalar::Int(_) => None,
        Scalar::Text(text) => {
            let text = text.trim().to_ascii_lowercase();
            if TRUE_WORDS.contains(&text.as_str()) {
                Some(true)
            } else if FALSE_WORDS.contains(&text.as_str()) {
                Some(false)
            } else {
                None
            }
        }
    }
}

fn to_id(value: Scalar) -> Option<i64> {
    match value {
        Scalar::Int(id) => Some(id),
        Scalar::Text(text) => text.trim().parse().ok(),
        Scalar::Bool(_) => None,
    }
}

/// A boolean given as a JSON bool, `0`/`1`, or a true/false word.
/// `null` reads as `None`.
pub fn optional_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(value) = Option::<Scalar>::deserialize(deserializer)? else {
        return Ok(None);
    };
    to_flag(value)
        .map(Some)
        .ok_or_else(|| D::Error::custom("Must be a valid boolean."))
}

/// An integer ID given as a JSON number or a numeric string.
/// `null` reads as `None`.
pub fn optional_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(value) = Option::<Scalar>::deserialize(deserializer)? else {
        return Ok(None);
    };
    to_id(value)
        .map(Some)
        .ok_or_else(|| D::Error::custom("A valid integer is required."))
}

/// Like [`optional_id`], but keeps an explicit `null` apart from a missing
/// field: `null` becomes `Some(None)`.
pub fn nullable_id<'de, D>(deserializer: D) -> Result<Option<Option<i64>>, D::Error>
where
    D: Deserializer<'de>,
{
    optional_id(deserializer).map(Some)
}
