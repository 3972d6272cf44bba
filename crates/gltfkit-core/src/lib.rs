//! glTF 2.0 core library
//!
//! In-memory document model for glTF 2.0 assets with typed access to binary
//! attribute data.
//!
//! # Overview
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`model`] | [`Model`], the document root, and index resolution |
//! | [`builder`] | buffer/bufferView/accessor allocation, data copy, min/max, buffer merge |
//! | [`aliased_span`] | strided typed views over raw bytes |
//! | [`base64`] | base64 and `data:` URI codec |
//! | entity modules | [`Buffer`], [`Accessor`], [`Node`], [`Mesh`], [`Material`], ... |
//!
//! Entities refer to each other by `u32` index and hold no back-references.
//! Every cross-entity lookup goes through the [`Model`], which bounds-checks
//! the index:
//!
//! ```
//! use gltfkit_core::{AccessorType, ComponentType, Model};
//!
//! let mut model = Model::new();
//! let buffer = model.create_buffer().unwrap();
//! let positions: [[f32; 3]; 3] = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
//! let view = model
//!     .create_buffer_view_with_data(buffer, bytemuck::cast_slice(&positions), None, 0, 4)
//!     .unwrap();
//! let accessor = model
//!     .create_accessor(view, 0, 3, AccessorType::Vec3, ComponentType::Float)
//!     .unwrap();
//! model.calculate_min_max(accessor).unwrap();
//!
//! let span = model.accessor_span::<[f32; 3]>(accessor).unwrap();
//! assert_eq!(span.get(1), Some([1.0, 0.0, 0.0]));
//! assert_eq!(model.accessors[accessor as usize].max, vec![1.0, 1.0, 0.0]);
//! ```
//!
//! GLB and `.gltf` file I/O lives in the `gltfkit-io` crate.

pub mod accessor;
pub mod aliased_span;
pub mod animation;
pub mod asset;
pub mod base64;
pub mod buffer;
pub mod builder;
pub mod camera;
pub mod error;
pub mod gltf_types;
pub mod json;
pub mod material;
pub mod mesh;
pub mod model;
pub mod node;
pub mod texture;

pub use accessor::Accessor;
pub use aliased_span::{AliasedSpan, AliasedSpanMut, SpanError};
pub use animation::{Animation, AnimationChannel, AnimationChannelTarget, AnimationSampler};
pub use asset::{Asset, GLTF_VERSION};
pub use buffer::{calculate_buffer_chunk_size, Buffer, BufferView};
pub use camera::{Camera, CameraProjection, Orthographic, Perspective};
pub use error::{ModelError, Result};
pub use gltf_types::{
    AccessorType, AlphaMode, AnimationInterpolation, AnimationPath, BufferViewTarget, CameraType,
    ComponentType, MagFilter, MinFilter, PrimitiveMode, WrappingMode,
};
pub use json::JsonEntity;
pub use material::{
    Material, NormalTextureInfo, OcclusionTextureInfo, PbrMetallicRoughness, TextureInfo,
};
pub use mesh::{AttributeMap, Mesh, Primitive};
pub use model::Model;
pub use node::{Node, Scene, Skin, IDENTITY_MATRIX};
pub use texture::{Image, Sampler, Texture};
