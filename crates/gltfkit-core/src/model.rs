//! The glTF document root and index resolution.
//!
//! Entities refer to each other by `u32` index. [`Model`] owns every entity
//! vector and is the only place those indices are resolved, so each lookup is
//! bounds-checked once, at the point of use.

use std::mem::size_of;

use bytemuck::Pod;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::accessor::Accessor;
use crate::aliased_span::{required_bytes, AliasedSpan, AliasedSpanMut};
use crate::animation::{Animation, AnimationSampler};
use crate::asset::Asset;
use crate::buffer::{Buffer, BufferView};
use crate::camera::Camera;
use crate::error::{ModelError, Result};
use crate::json::JsonEntity;
use crate::material::Material;
use crate::mesh::{Mesh, Primitive};
use crate::node::{Node, Scene, Skin};
use crate::texture::{Image, Sampler, Texture};

/// A complete glTF document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extensions_used: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extensions_required: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub accessors: Vec<Accessor>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub animations: Vec<Animation>,
    pub asset: Asset,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub buffers: Vec<Buffer>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub buffer_views: Vec<BufferView>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cameras: Vec<Camera>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<Image>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub materials: Vec<Material>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub meshes: Vec<Mesh>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<Node>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub samplers: Vec<Sampler>,
    /// Default scene.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scene: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scenes: Vec<Scene>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skins: Vec<Skin>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub textures: Vec<Texture>,
    /// Root-level extension objects, kept verbatim.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extensions: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extras: Option<Value>,
}

impl JsonEntity for Model {}

/// Where an accessor's elements live inside their buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct AccessorLayout {
    pub buffer: u32,
    /// Absolute offset of element 0 in the buffer.
    pub offset: usize,
    pub count: usize,
    pub stride: usize,
    pub element_size: usize,
}

impl AccessorLayout {
    /// Bytes from `offset` to the end of the last element.
    pub fn span_len(&self) -> usize {
        required_bytes(self.count, self.stride, self.element_size)
    }
}

macro_rules! lookup {
    ($($get:ident, $get_mut:ident => $field:ident: $ty:ty, $kind:literal;)+) => {
        $(
            #[doc = concat!("Resolves a ", $kind, " index.")]
            pub fn $get(&self, index: u32) -> Result<&$ty> {
                let len = self.$field.len();
                self.$field
                    .get(index as usize)
                    .ok_or(ModelError::IndexOutOfRange { kind: $kind, index, len })
            }

            pub fn $get_mut(&mut self, index: u32) -> Result<&mut $ty> {
                let len = self.$field.len();
                self.$field
                    .get_mut(index as usize)
                    .ok_or(ModelError::IndexOutOfRange { kind: $kind, index, len })
            }
        )+
    };
}

fn missing(what: String) -> ModelError {
    ModelError::MissingReference(what)
}

/// Elements of one accessor must not overlap.
pub(crate) fn check_stride(
    accessor: u32,
    view: u32,
    stride: usize,
    element_size: usize,
) -> Result<()> {
    if stride < element_size {
        return Err(ModelError::TypeMismatch(format!(
            "accessor {} has {}-byte elements but bufferView {} has stride {}",
            accessor, element_size, view, stride
        )));
    }
    Ok(())
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    lookup! {
        buffer, buffer_mut => buffers: Buffer, "buffer";
        buffer_view, buffer_view_mut => buffer_views: BufferView, "bufferView";
        accessor, accessor_mut => accessors: Accessor, "accessor";
        node, node_mut => nodes: Node, "node";
        mesh, mesh_mut => meshes: Mesh, "mesh";
        scene_at, scene_at_mut => scenes: Scene, "scene";
        skin, skin_mut => skins: Skin, "skin";
        animation, animation_mut => animations: Animation, "animation";
        image, image_mut => images: Image, "image";
        texture, texture_mut => textures: Texture, "texture";
        sampler, sampler_mut => samplers: Sampler, "sampler";
        camera, camera_mut => cameras: Camera, "camera";
        material, material_mut => materials: Material, "material";
    }

    // ---- JSON ----

    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serializes the document. Buffer bytes are not included; only each
    /// buffer's `uri` and `byteLength`.
    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }

    // ---- buffers and accessors ----

    pub fn accessor_buffer_view(&self, accessor: u32) -> Result<&BufferView> {
        let acc = self.accessor(accessor)?;
        let view = acc
            .buffer_view
            .ok_or_else(|| missing(format!("accessor {} has no bufferView", accessor)))?;
        self.buffer_view(view)
    }

    /// Bytes covered by a buffer view.
    pub fn buffer_view_data(&self, view: u32) -> Result<&[u8]> {
        let (buffer, range) = self.view_range(view)?;
        Ok(&self.buffer(buffer)?.data()[range])
    }

    pub fn buffer_view_data_mut(&mut self, view: u32) -> Result<&mut [u8]> {
        let (buffer, range) = self.view_range(view)?;
        Ok(&mut self.buffer_mut(buffer)?.data_mut()[range])
    }

    fn view_range(&self, view: u32) -> Result<(u32, std::ops::Range<usize>)> {
        let bv = self.buffer_view(view)?;
        let buffer = self.buffer(bv.buffer)?;
        let end = bv.byte_offset.checked_add(bv.byte_length);
        match end {
            Some(end) if end <= buffer.len() => Ok((bv.buffer, bv.byte_offset..end)),
            _ => Err(ModelError::OutOfBounds(format!(
                "bufferView {} covers {}..{} but buffer {} holds {} bytes",
                view,
                bv.byte_offset,
                bv.byte_offset.saturating_add(bv.byte_length),
                bv.buffer,
                buffer.len()
            ))),
        }
    }

    /// Locates an accessor's elements, checking they fit inside the view
    /// and the view fits inside its buffer.
    pub(crate) fn accessor_layout(&self, accessor: u32) -> Result<AccessorLayout> {
        let acc = self.accessor(accessor)?;
        let view_index = acc
            .buffer_view
            .ok_or_else(|| missing(format!("accessor {} has no bufferView", accessor)))?;
        let (buffer, range) = self.view_range(view_index)?;
        let view = self.buffer_view(view_index)?;

        let element_size = acc.element_size();
        let stride = view.effective_stride(element_size);
        check_stride(accessor, view_index, stride, element_size)?;
        let layout = AccessorLayout {
            buffer,
            offset: range.start + acc.byte_offset,
            count: acc.count,
            stride,
            element_size,
        };

        let needed = acc.byte_offset.checked_add(layout.span_len());
        match needed {
            Some(needed) if needed <= view.byte_length => Ok(layout),
            _ => Err(ModelError::OutOfBounds(format!(
                "accessor {} needs {} bytes from offset {} but bufferView {} is {} bytes long",
                accessor,
                layout.span_len(),
                acc.byte_offset,
                view_index,
                view.byte_length
            ))),
        }
    }

    fn check_span_type<T>(&self, accessor: u32, layout: &AccessorLayout) -> Result<()> {
        if size_of::<T>() > layout.element_size {
            let acc = self.accessor(accessor)?;
            return Err(ModelError::TypeMismatch(format!(
                "{}-byte type cannot view accessor {} ({} {:?}, {} bytes per element)",
                size_of::<T>(),
                accessor,
                acc.accessor_type,
                acc.component_type,
                layout.element_size
            )));
        }
        Ok(())
    }

    /// Typed view over an accessor's elements.
    ///
    /// `T` may be smaller than the element (e.g. reading only the first
    /// component) but never larger.
    pub fn accessor_span<T: Pod>(&self, accessor: u32) -> Result<AliasedSpan<'_, T>> {
        let layout = self.accessor_layout(accessor)?;
        self.check_span_type::<T>(accessor, &layout)?;
        let data = self.buffer(layout.buffer)?.data();
        let bytes = &data[layout.offset..layout.offset + layout.span_len()];
        Ok(AliasedSpan::new(bytes, layout.count, layout.stride)?)
    }

    pub fn accessor_span_mut<T: Pod>(&mut self, accessor: u32) -> Result<AliasedSpanMut<'_, T>> {
        let layout = self.accessor_layout(accessor)?;
        self.check_span_type::<T>(accessor, &layout)?;
        let data = self.buffer_mut(layout.buffer)?.data_mut();
        let bytes = &mut data[layout.offset..layout.offset + layout.span_len()];
        Ok(AliasedSpanMut::new(bytes, layout.count, layout.stride)?)
    }

    // ---- scene graph ----

    /// The scene named by `scene`, or scene 0 when unset.
    pub fn default_scene(&self) -> Result<&Scene> {
        match self.scene {
            Some(index) => self.scene_at(index),
            None if !self.scenes.is_empty() => self.scene_at(0),
            None => Err(missing("model has no scenes".to_string())),
        }
    }

    pub fn scene_nodes(&self, scene: u32) -> Result<Vec<&Node>> {
        self.scene_at(scene)?
            .nodes
            .iter()
            .map(|&n| self.node(n))
            .collect()
    }

    pub fn node_children(&self, node: u32) -> Result<Vec<&Node>> {
        self.node(node)?
            .children
            .iter()
            .map(|&c| self.node(c))
            .collect()
    }

    pub fn node_mesh(&self, node: u32) -> Result<&Mesh> {
        let mesh = self
            .node(node)?
            .mesh
            .ok_or_else(|| missing(format!("node {} has no mesh", node)))?;
        self.mesh(mesh)
    }

    pub fn node_camera(&self, node: u32) -> Result<&Camera> {
        let camera = self
            .node(node)?
            .camera
            .ok_or_else(|| missing(format!("node {} has no camera", node)))?;
        self.camera(camera)
    }

    pub fn node_skin(&self, node: u32) -> Result<&Skin> {
        let skin = self
            .node(node)?
            .skin
            .ok_or_else(|| missing(format!("node {} has no skin", node)))?;
        self.skin(skin)
    }

    pub fn skin_joints(&self, skin: u32) -> Result<Vec<&Node>> {
        self.skin(skin)?.joints.iter().map(|&j| self.node(j)).collect()
    }

    pub fn skin_inverse_bind_matrices(&self, skin: u32) -> Result<&Accessor> {
        let accessor = self
            .skin(skin)?
            .inverse_bind_matrices
            .ok_or_else(|| missing(format!("skin {} has no inverseBindMatrices", skin)))?;
        self.accessor(accessor)
    }

    // ---- meshes and materials ----

    pub fn primitive_material(&self, primitive: &Primitive) -> Result<&Material> {
        let material = primitive
            .material
            .ok_or_else(|| missing("primitive has no material".to_string()))?;
        self.material(material)
    }

    pub fn primitive_indices(&self, primitive: &Primitive) -> Result<&Accessor> {
        let indices = primitive
            .indices
            .ok_or_else(|| missing("primitive is not indexed".to_string()))?;
        self.accessor(indices)
    }

    pub fn primitive_attribute(&self, primitive: &Primitive, semantic: &str) -> Result<&Accessor> {
        let accessor = primitive
            .attribute(semantic)
            .ok_or_else(|| missing(format!("primitive has no {} attribute", semantic)))?;
        self.accessor(accessor)
    }

    /// See [`Primitive::layout_id`].
    pub fn primitive_layout_id(&self, primitive: &Primitive) -> Result<u64> {
        primitive.layout_id(self)
    }

    // ---- textures ----

    pub fn texture_image(&self, texture: u32) -> Result<&Image> {
        let source = self
            .texture(texture)?
            .source
            .ok_or_else(|| missing(format!("texture {} has no source", texture)))?;
        self.image(source)
    }

    pub fn texture_sampler(&self, texture: u32) -> Result<&Sampler> {
        let sampler = self
            .texture(texture)?
            .sampler
            .ok_or_else(|| missing(format!("texture {} has no sampler", texture)))?;
        self.sampler(sampler)
    }

    /// Encoded image bytes for an image stored in a buffer view.
    pub fn image_data(&self, image: u32) -> Result<&[u8]> {
        let view = self
            .image(image)?
            .buffer_view
            .ok_or_else(|| missing(format!("image {} is not stored in a bufferView", image)))?;
        self.buffer_view_data(view)
    }

    // ---- animations ----

    /// Input (keyframe times) and output (values) accessors of a sampler.
    pub fn animation_sampler_accessors(
        &self,
        animation: u32,
        sampler: u32,
    ) -> Result<(&Accessor, &Accessor)> {
        let anim = self.animation(animation)?;
        let s: &AnimationSampler = anim.samplers.get(sampler as usize).ok_or(
            ModelError::IndexOutOfRange {
                kind: "animation sampler",
                index: sampler,
                len: anim.samplers.len(),
            },
        )?;
        Ok((self.accessor(s.input)?, self.accessor(s.output)?))
    }
}
