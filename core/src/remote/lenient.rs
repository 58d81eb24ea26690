//! Tolerant serde deserializers for wire fields that are display-only
//!
//! Used for profile fields and record ids, whose shape has varied between
//! service versions. Reward totals never go through these.

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};

/// `Some(value)` when the field has the expected shape, `None` otherwise
pub fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Lenient<T> {
        Value(T),
        Other(IgnoredAny),
    }

    Ok(match Option::<Lenient<T>>::deserialize(deserializer)? {
        Some(Lenient::Value(value)) => Some(value),
        Some(Lenient::Other(_)) | None => None,
    })
}

/// Record id served either as a string or as a number
pub fn lenient_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum WireId {
        Text(String),
        Signed(i64),
        Unsigned(u64),
        Other(IgnoredAny),
    }

    Ok(match Option::<WireId>::deserialize(deserializer)? {
        Some(WireId::Text(id)) => Some(id),
        Some(WireId::Signed(id)) => Some(id.to_string()),
        Some(WireId::Unsigned(id)) => Some(id.to_string()),
        Some(WireId::Other(_)) | None => None,
    })
}
