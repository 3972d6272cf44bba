//! JSON encode/decode contract shared by every glTF entity.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::Result;

/// An entity with a glTF JSON representation.
///
/// `decode` fills every missing optional key with its glTF default; `encode`
/// omits keys that are absent or equal to their default.
pub trait JsonEntity: Serialize + DeserializeOwned {
    fn decode(value: &Value) -> Result<Self> {
        Ok(Self::deserialize(value)?)
    }

    fn encode(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

pub(crate) fn is_false(value: &bool) -> bool {
    !*value
}

pub(crate) fn is_zero(value: &usize) -> bool {
    *value == 0
}

pub(crate) fn is_default<T: Default + PartialEq>(value: &T) -> bool {
    *value == T::default()
}

pub(crate) fn one() -> f32 {
    1.0
}

pub(crate) fn is_one(value: &f32) -> bool {
    *value == 1.0
}

/// Reads an optional `u32`, mapping `0` to `None` (used for `byteStride`).
pub(crate) fn nonzero_u32<'de, D>(deserializer: D) -> std::result::Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u32>::deserialize(deserializer)?.filter(|v| *v != 0))
}
