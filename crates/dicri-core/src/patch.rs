//! Serde support for partial updates of nullable columns.
//!
//! A patch field of type `Option<Option<T>>` reads as: `None` when the key is
//! absent (leave unchanged), `Some(None)` for an explicit `null` (clear),
//! `Some(Some(v))` to set. Fields must also carry `#[serde(default)]`.

use serde::{Deserialize, Deserializer};

pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
  D: Deserializer<'de>,
  T: Deserialize<'de>,
{
  Option::<T>::deserialize(deserializer).map(Some)
}
