use serde::{Deserialize, Serialize};

use crate::gltf_types::{AccessorType, ComponentType};
use crate::json::{is_false, is_zero, JsonEntity};

/// Typed interpretation of a buffer view's bytes.
///
/// An accessor without a `bufferView` describes zero-filled data; such
/// accessors cannot be viewed through spans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Accessor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buffer_view: Option<u32>,
    /// Offset relative to the start of the buffer view.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub byte_offset: usize,
    pub component_type: ComponentType,
    #[serde(default, skip_serializing_if = "is_false")]
    pub normalized: bool,
    pub count: usize,
    #[serde(rename = "type")]
    pub accessor_type: AccessorType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub max: Vec<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub min: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Accessor {
    pub fn new(
        buffer_view: Option<u32>,
        byte_offset: usize,
        count: usize,
        accessor_type: AccessorType,
        component_type: ComponentType,
    ) -> Self {
        Self {
            buffer_view,
            byte_offset,
            component_type,
            normalized: false,
            count,
            accessor_type,
            max: Vec::new(),
            min: Vec::new(),
            name: None,
        }
    }

    /// Size in bytes of one component.
    pub fn component_size(&self) -> usize {
        self.component_type.byte_length()
    }

    /// Components per element.
    pub fn num_components(&self) -> usize {
        self.accessor_type.num_components()
    }

    /// Size in bytes of one element (`component_size * num_components`).
    pub fn element_size(&self) -> usize {
        self.component_size() * self.num_components()
    }

    /// Same element layout (component type and accessor type).
    pub fn is_layout_compatible(&self, other: &Accessor) -> bool {
        self.component_type == other.component_type && self.accessor_type == other.accessor_type
    }
}

impl JsonEntity for Accessor {}
