//! Serde helpers for query-string parameters.
//!
//! Browsers and form libraries send empty strings for unset filters
//! (`?school_id=&class_id=4`); these helpers treat them as absent.

use serde::{Deserialize, Deserializer};

pub fn deserialize_optional_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    match opt {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Like [`deserialize_optional_i64`] but wraps the value into an id newtype.
pub fn deserialize_optional_id<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: From<i64>,
{
    deserialize_optional_i64(deserializer).map(|v| v.map(T::from))
}
