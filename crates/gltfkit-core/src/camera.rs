//! Camera projections.
//!
//! JSON carries the projection as a `type` tag plus a same-named object;
//! in memory the pair is a single [`CameraProjection`] enum.

use serde::{Deserialize, Serialize};

use crate::gltf_types::CameraType;
use crate::json::JsonEntity;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Perspective {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<f32>,
    /// Vertical field of view in radians.
    pub yfov: f32,
    /// `None` selects an infinite projection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zfar: Option<f32>,
    pub znear: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Orthographic {
    pub xmag: f32,
    pub ymag: f32,
    pub zfar: f32,
    pub znear: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraProjection {
    Perspective(Perspective),
    Orthographic(Orthographic),
}

impl CameraProjection {
    pub fn camera_type(&self) -> CameraType {
        match self {
            CameraProjection::Perspective(_) => CameraType::Perspective,
            CameraProjection::Orthographic(_) => CameraType::Orthographic,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CameraJson", into = "CameraJson")]
pub struct Camera {
    pub name: Option<String>,
    pub projection: CameraProjection,
}

impl Camera {
    pub fn perspective(yfov: f32, znear: f32) -> Self {
        Self {
            name: None,
            projection: CameraProjection::Perspective(Perspective {
                aspect_ratio: None,
                yfov,
                zfar: None,
                znear,
            }),
        }
    }

    pub fn orthographic(xmag: f32, ymag: f32, znear: f32, zfar: f32) -> Self {
        Self {
            name: None,
            projection: CameraProjection::Orthographic(Orthographic {
                xmag,
                ymag,
                zfar,
                znear,
            }),
        }
    }
}

impl JsonEntity for Camera {}

#[derive(Serialize, Deserialize)]
struct CameraJson {
    #[serde(rename = "type")]
    camera_type: CameraType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    perspective: Option<Perspective>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    orthographic: Option<Orthographic>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

impl TryFrom<CameraJson> for Camera {
    type Error = String;

    fn try_from(raw: CameraJson) -> Result<Self, Self::Error> {
        let projection = match raw.camera_type {
            CameraType::Perspective => raw
                .perspective
                .map(CameraProjection::Perspective)
                .ok_or("perspective camera without a \"perspective\" object")?,
            CameraType::Orthographic => raw
                .orthographic
                .map(CameraProjection::Orthographic)
                .ok_or("orthographic camera without an \"orthographic\" object")?,
        };
        Ok(Camera {
            name: raw.name,
            projection,
        })
    }
}

impl From<Camera> for CameraJson {
    fn from(camera: Camera) -> Self {
        let (perspective, orthographic) = match camera.projection {
            CameraProjection::Perspective(p) => (Some(p), None),
            CameraProjection::Orthographic(o) => (None, Some(o)),
        };
        CameraJson {
            camera_type: camera.projection.camera_type(),
            perspective,
            orthographic,
            name: camera.name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_perspective_camera() {
        let value = json!({
            "type": "perspective",
            "perspective": {"yfov": 0.5, "znear": 0.25, "aspectRatio": 1.5}
        });
        let camera = Camera::decode(&value).unwrap();
        match camera.projection {
            CameraProjection::Perspective(p) => {
                assert_eq!(p.aspect_ratio, Some(1.5));
                assert_eq!(p.zfar, None);
            }
            other => panic!("unexpected projection {other:?}"),
        }
        assert_eq!(camera.encode().unwrap(), value);
    }

    #[test]
    fn test_orthographic_camera() {
        let mut camera = Camera::orthographic(2.0, 1.0, 0.5, 100.0);
        camera.name = Some("ortho".into());
        let value = camera.encode().unwrap();
        assert_eq!(value["type"], "orthographic");
        assert_eq!(value["orthographic"]["zfar"], 100.0);
        assert!(value.get("perspective").is_none());
        assert_eq!(Camera::decode(&value).unwrap(), camera);
    }

    #[test]
    fn test_missing_projection_object() {
        assert!(Camera::decode(&json!({"type": "perspective"})).is_err());
        assert!(Camera::decode(&json!({"type": "fisheye", "perspective": {}})).is_err());
    }
}
