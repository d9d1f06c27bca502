//! Query-string helpers.
//!
//! Browsers and curl send `?service_name=` for a cleared form field; the
//! API reads a blank value the same as a missing one.

use serde::{Deserialize, Deserializer};

/// `Option<String>` that maps blank (empty or all-whitespace) to `None`.
pub fn deserialize_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|value| !value.trim().is_empty()))
}
