use serde::{Deserialize, Serialize};

use crate::gltf_types::{AnimationInterpolation, AnimationPath};
use crate::json::{is_default, JsonEntity};

/// Node property driven by a channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationChannelTarget {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node: Option<u32>,
    pub path: AnimationPath,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationChannel {
    /// Index into the owning animation's `samplers`.
    pub sampler: u32,
    pub target: AnimationChannelTarget,
}

/// Keyframe input times paired with output values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationSampler {
    pub input: u32,
    #[serde(default, skip_serializing_if = "is_default")]
    pub interpolation: AnimationInterpolation,
    pub output: u32,
}

impl AnimationSampler {
    pub fn new(input: u32, output: u32) -> Self {
        Self {
            input,
            interpolation: AnimationInterpolation::default(),
            output,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Animation {
    #[serde(default)]
    pub channels: Vec<AnimationChannel>,
    #[serde(default)]
    pub samplers: Vec<AnimationSampler>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Animation {
    /// Sampler referenced by `channel`, if it exists.
    pub fn channel_sampler(&self, channel: &AnimationChannel) -> Option<&AnimationSampler> {
        self.samplers.get(channel.sampler as usize)
    }
}

impl JsonEntity for AnimationChannel {}
impl JsonEntity for AnimationSampler {}
impl JsonEntity for Animation {}
