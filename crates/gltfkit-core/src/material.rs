use serde::{Deserialize, Serialize};

use crate::gltf_types::AlphaMode;
use crate::json::{is_default, is_false, is_one, one, JsonEntity};

fn is_zero_u32(value: &u32) -> bool {
    *value == 0
}

fn default_alpha_cutoff() -> f32 {
    0.5
}

fn is_default_alpha_cutoff(value: &f32) -> bool {
    *value == 0.5
}

fn white() -> [f32; 4] {
    [1.0; 4]
}

fn is_white(value: &[f32; 4]) -> bool {
    *value == [1.0; 4]
}

fn is_black(value: &[f32; 3]) -> bool {
    *value == [0.0; 3]
}

/// Reference to a texture and the texcoord set that samples it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextureInfo {
    pub index: u32,
    #[serde(default, skip_serializing_if = "is_zero_u32")]
    pub tex_coord: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalTextureInfo {
    pub index: u32,
    #[serde(default, skip_serializing_if = "is_zero_u32")]
    pub tex_coord: u32,
    #[serde(default = "one", skip_serializing_if = "is_one")]
    pub scale: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcclusionTextureInfo {
    pub index: u32,
    #[serde(default, skip_serializing_if = "is_zero_u32")]
    pub tex_coord: u32,
    #[serde(default = "one", skip_serializing_if = "is_one")]
    pub strength: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PbrMetallicRoughness {
    #[serde(default = "white", skip_serializing_if = "is_white")]
    pub base_color_factor: [f32; 4],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_color_texture: Option<TextureInfo>,
    #[serde(default = "one", skip_serializing_if = "is_one")]
    pub metallic_factor: f32,
    #[serde(default = "one", skip_serializing_if = "is_one")]
    pub roughness_factor: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metallic_roughness_texture: Option<TextureInfo>,
}

impl Default for PbrMetallicRoughness {
    fn default() -> Self {
        Self {
            base_color_factor: [1.0; 4],
            base_color_texture: None,
            metallic_factor: 1.0,
            roughness_factor: 1.0,
            metallic_roughness_texture: None,
        }
    }
}

/// Surface appearance of a primitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "is_default")]
    pub pbr_metallic_roughness: PbrMetallicRoughness,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normal_texture: Option<NormalTextureInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occlusion_texture: Option<OcclusionTextureInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emissive_texture: Option<TextureInfo>,
    #[serde(default, skip_serializing_if = "is_black")]
    pub emissive_factor: [f32; 3],
    #[serde(default, skip_serializing_if = "is_default")]
    pub alpha_mode: AlphaMode,
    /// Only meaningful with [`AlphaMode::Mask`].
    #[serde(default = "default_alpha_cutoff", skip_serializing_if = "is_default_alpha_cutoff")]
    pub alpha_cutoff: f32,
    #[serde(default, skip_serializing_if = "is_false")]
    pub double_sided: bool,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: None,
            pbr_metallic_roughness: PbrMetallicRoughness::default(),
            normal_texture: None,
            occlusion_texture: None,
            emissive_texture: None,
            emissive_factor: [0.0; 3],
            alpha_mode: AlphaMode::Opaque,
            alpha_cutoff: 0.5,
            double_sided: false,
        }
    }
}

impl Material {
    /// Texture indices referenced by this material, in slot order.
    pub fn texture_indices(&self) -> Vec<u32> {
        let pbr = &self.pbr_metallic_roughness;
        [
            pbr.base_color_texture.as_ref().map(|t| t.index),
            pbr.metallic_roughness_texture.as_ref().map(|t| t.index),
            self.normal_texture.as_ref().map(|t| t.index),
            self.occlusion_texture.as_ref().map(|t| t.index),
            self.emissive_texture.as_ref().map(|t| t.index),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

impl JsonEntity for Material {}
