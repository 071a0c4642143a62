//! Utility functions and helpers.

use serde::{Deserialize, Deserializer};
use std::time::Duration;

/// Deserialize a field that the remote may send as `null`, falling back to
/// the type's default.
///
/// Use together with `#[serde(default)]` so a missing field also decodes:
/// ```ignore
/// #[serde(default, deserialize_with = "crate::util::null_as_default")]
/// pub url: String,
/// ```
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Exponential backoff: `initial * 2^(attempt - 1)`, capped at `max`.
///
/// `attempt` is 1-based; attempt 0 is treated as 1.
pub fn exponential_backoff(initial: Duration, max: Duration, attempt: u32) -> Duration {
    let exponent = attempt.saturating_sub(1).min(31);
    initial
        .checked_mul(1u32 << exponent)
        .unwrap_or(max)
        .min(max)
}
