//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches

pub mod financial_template;
pub mod financial_template_line;
pub mod offer_value;
pub mod offer_version;
pub mod rfp;
pub mod supplier;

use serde::{Deserialize, Deserializer};

/// Deserialize a present field, including an explicit `null`, as `Some(..)`.
///
/// Paired with `#[serde(default)]`, an absent field stays `None`, so an
/// `Option<Option<T>>` tells "omitted" apart from "set to null".
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
