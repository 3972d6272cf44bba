use serde::{Deserialize, Serialize};

use crate::json::JsonEntity;

pub const GLTF_VERSION: &str = "2.0";

/// Metadata about the glTF asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copyright: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generator: Option<String>,
    /// Required; the only version this crate writes is [`GLTF_VERSION`].
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_version: Option<String>,
}

impl Default for Asset {
    fn default() -> Self {
        Self {
            copyright: None,
            generator: None,
            version: GLTF_VERSION.to_string(),
            min_version: None,
        }
    }
}

impl JsonEntity for Asset {}
