use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::gltf_types::PrimitiveMode;
use crate::json::{is_default, JsonEntity};
use crate::model::Model;

/// Attribute semantic (`POSITION`, `TEXCOORD_0`, ...) to accessor index.
pub type AttributeMap = BTreeMap<String, u32>;

/// Geometry to be rendered with a single material.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Primitive {
    #[serde(default)]
    pub attributes: AttributeMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indices: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<u32>,
    #[serde(default, skip_serializing_if = "is_default")]
    pub mode: PrimitiveMode,
    /// Morph targets: each maps a semantic to a displacement accessor.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub targets: Vec<AttributeMap>,
}

impl Primitive {
    pub fn new(attributes: AttributeMap) -> Self {
        Self {
            attributes,
            ..Default::default()
        }
    }

    pub fn attribute(&self, semantic: &str) -> Option<u32> {
        self.attributes.get(semantic).copied()
    }

    /// Hash of the vertex layout: every attribute's semantic, element type
    /// and component type, plus the draw mode.
    ///
    /// Primitives with equal ids can share a vertex input configuration.
    pub fn layout_id(&self, model: &Model) -> Result<u64> {
        let mut hasher = DefaultHasher::new();
        // BTreeMap iterates in semantic order, so the hash is order independent.
        for (semantic, &index) in &self.attributes {
            let accessor = model.accessor(index)?;
            semantic.hash(&mut hasher);
            accessor.accessor_type.hash(&mut hasher);
            accessor.component_type.hash(&mut hasher);
            accessor.normalized.hash(&mut hasher);
        }
        self.mode.hash(&mut hasher);
        Ok(hasher.finish())
    }
}

impl JsonEntity for Primitive {}

/// A set of primitives drawn together.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mesh {
    #[serde(default)]
    pub primitives: Vec<Primitive>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub weights: Vec<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl JsonEntity for Mesh {}
