//! Scene graph entities: nodes, scenes and skins.

use serde::{Deserialize, Serialize};

use crate::json::JsonEntity;

pub const IDENTITY_MATRIX: [f32; 16] = [
    1.0, 0.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 1.0, 0.0, //
    0.0, 0.0, 0.0, 1.0,
];

const IDENTITY_ROTATION: [f32; 4] = [0.0, 0.0, 0.0, 1.0];
const UNIT_SCALE: [f32; 3] = [1.0; 3];
const ZERO_TRANSLATION: [f32; 3] = [0.0; 3];

fn identity_rotation() -> [f32; 4] {
    IDENTITY_ROTATION
}

fn unit_scale() -> [f32; 3] {
    UNIT_SCALE
}

fn is_identity_rotation(r: &[f32; 4]) -> bool {
    *r == IDENTITY_ROTATION
}

fn is_unit_scale(s: &[f32; 3]) -> bool {
    *s == UNIT_SCALE
}

fn is_zero_translation(t: &[f32; 3]) -> bool {
    *t == ZERO_TRANSLATION
}

/// A scene graph node.
///
/// The local transform is either `matrix` (column-major) or the
/// `translation` / `rotation` / `scale` triple, never both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skin: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matrix: Option<[f32; 16]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mesh: Option<u32>,
    /// Unit quaternion `[x, y, z, w]`.
    #[serde(default = "identity_rotation", skip_serializing_if = "is_identity_rotation")]
    pub rotation: [f32; 4],
    #[serde(default = "unit_scale", skip_serializing_if = "is_unit_scale")]
    pub scale: [f32; 3],
    #[serde(default, skip_serializing_if = "is_zero_translation")]
    pub translation: [f32; 3],
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub weights: Vec<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Default for Node {
    fn default() -> Self {
        Self {
            camera: None,
            children: Vec::new(),
            skin: None,
            matrix: None,
            mesh: None,
            rotation: IDENTITY_ROTATION,
            scale: UNIT_SCALE,
            translation: ZERO_TRANSLATION,
            weights: Vec::new(),
            name: None,
        }
    }
}

impl Node {
    pub fn new(name: Option<String>) -> Self {
        Self {
            name,
            ..Default::default()
        }
    }

    pub fn has_matrix(&self) -> bool {
        self.matrix.is_some()
    }

    /// Switches the node to a matrix transform, resetting TRS.
    pub fn set_matrix(&mut self, matrix: [f32; 16]) {
        self.matrix = Some(matrix);
        self.translation = ZERO_TRANSLATION;
        self.rotation = IDENTITY_ROTATION;
        self.scale = UNIT_SCALE;
    }

    /// Switches the node to a TRS transform, dropping any matrix.
    pub fn set_trs(&mut self, translation: [f32; 3], rotation: [f32; 4], scale: [f32; 3]) {
        self.matrix = None;
        self.translation = translation;
        self.rotation = rotation;
        self.scale = scale;
    }

    /// Local transform as a column-major 4x4 matrix (`T * R * S` when no
    /// matrix is set).
    pub fn local_matrix(&self) -> [f32; 16] {
        if let Some(m) = self.matrix {
            return m;
        }

        let t = self.translation;
        let s = self.scale;
        let [qx, qy, qz, qw] = self.rotation;

        let xx = qx * qx;
        let yy = qy * qy;
        let zz = qz * qz;
        let xy = qx * qy;
        let xz = qx * qz;
        let yz = qy * qz;
        let wx = qw * qx;
        let wy = qw * qy;
        let wz = qw * qz;

        // rot[row][col]
        let rot = [
            [1.0 - 2.0 * (yy + zz), 2.0 * (xy - wz), 2.0 * (xz + wy)],
            [2.0 * (xy + wz), 1.0 - 2.0 * (xx + zz), 2.0 * (yz - wx)],
            [2.0 * (xz - wy), 2.0 * (yz + wx), 1.0 - 2.0 * (xx + yy)],
        ];

        [
            rot[0][0] * s[0], rot[1][0] * s[0], rot[2][0] * s[0], 0.0,
            rot[0][1] * s[1], rot[1][1] * s[1], rot[2][1] * s[1], 0.0,
            rot[0][2] * s[2], rot[1][2] * s[2], rot[2][2] * s[2], 0.0,
            t[0], t[1], t[2], 1.0,
        ]
    }
}

impl JsonEntity for Node {}

/// Root nodes of one scene.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl JsonEntity for Scene {}

/// Joints and bind matrices for vertex skinning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skin {
    /// Accessor of MAT4 inverse bind matrices, one per joint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inverse_bind_matrices: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skeleton: Option<u32>,
    #[serde(default)]
    pub joints: Vec<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl JsonEntity for Skin {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_node_defaults() {
        let node = Node::decode(&json!({})).unwrap();
        assert_eq!(node, Node::default());
        assert!(!node.has_matrix());
        assert_eq!(node.rotation, [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(node.scale, [1.0, 1.0, 1.0]);
        assert_eq!(node.translation, [0.0, 0.0, 0.0]);
        assert_eq!(node.camera, None);
        assert_eq!(node.skin, None);
        assert_eq!(node.mesh, None);
        assert!(node.children.is_empty());
        assert_eq!(node.local_matrix(), IDENTITY_MATRIX);
        assert_eq!(node.encode().unwrap(), json!({}));
    }

    #[test]
    fn test_matrix_and_trs_are_exclusive() {
        let mut node = Node::new(Some("n".into()));
        node.set_trs([1.0, 2.0, 3.0], [0.0, 0.0, 0.0, 1.0], [2.0, 2.0, 2.0]);
        assert!(!node.has_matrix());

        node.set_matrix(IDENTITY_MATRIX);
        assert!(node.has_matrix());
        assert_eq!(node.translation, [0.0; 3]);
        assert_eq!(node.encode().unwrap(), json!({"matrix": IDENTITY_MATRIX, "name": "n"}));
    }

    #[test]
    fn test_local_matrix_from_trs() {
        let mut node = Node::default();
        node.set_trs([1.0, 2.0, 3.0], [0.0, 0.0, 0.0, 1.0], [2.0, 3.0, 4.0]);
        let m = node.local_matrix();
        assert_eq!(m[0], 2.0);
        assert_eq!(m[5], 3.0);
        assert_eq!(m[10], 4.0);
        assert_eq!([m[12], m[13], m[14], m[15]], [1.0, 2.0, 3.0, 1.0]);

        // 90 degrees about Z maps +X onto +Y.
        let half = std::f32::consts::FRAC_1_SQRT_2;
        node.set_trs([0.0; 3], [0.0, 0.0, half, half], [1.0; 3]);
        let m = node.local_matrix();
        assert!((m[0]).abs() < 1e-6);
        assert!((m[1] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_node_round_trip() {
        let value = json!({
            "children": [1, 2],
            "mesh": 0,
            "camera": 3,
            "skin": 1,
            "translation": [1.0, 0.0, 0.0],
            "weights": [0.5]
        });
        let node = Node::decode(&value).unwrap();
        assert_eq!(node.children, vec![1, 2]);
        assert_eq!(node.camera, Some(3));
        assert_eq!(node.encode().unwrap(), value);
    }

    #[test]
    fn test_scene_and_skin() {
        let scene = Scene::decode(&json!({"nodes": [0]})).unwrap();
        assert_eq!(scene.nodes, vec![0]);
        assert_eq!(Scene::decode(&json!({})).unwrap(), Scene::default());

        let skin = Skin::decode(&json!({"joints": [1, 2], "inverseBindMatrices": 4})).unwrap();
        assert_eq!(skin.inverse_bind_matrices, Some(4));
        assert_eq!(skin.skeleton, None);
        assert_eq!(
            skin.encode().unwrap(),
            json!({"inverseBindMatrices": 4, "joints": [1, 2]})
        );
    }
}
