//! Whole-document JSON decoding: default filling, key omission and
//! cross-reference traversal.

use gltfkit_core::{
    AlphaMode, AnimationInterpolation, AnimationPath, CameraProjection, JsonEntity, Model,
    ModelError, PrimitiveMode, WrappingMode,
};
use serde_json::{json, Value};

fn minimal_document() -> Value {
    json!({
        "asset": {"version": "2.0"},
        "scene": 0,
        "scenes": [{"nodes": [0]}],
        "nodes": [
            {"mesh": 0, "children": [1]},
            {"camera": 0, "skin": 0}
        ],
        "meshes": [{"primitives": [{"attributes": {"POSITION": 0, "NORMAL": 1}, "indices": 2, "material": 0}]}],
        "materials": [{}],
        "textures": [{"source": 0}],
        "images": [{"uri": "tex.png"}],
        "samplers": [{}],
        "cameras": [{"type": "perspective", "perspective": {"yfov": 1.0, "znear": 0.5}}],
        "skins": [{"joints": [1]}],
        "animations": [{
            "channels": [{"sampler": 0, "target": {"node": 1, "path": "translation"}}],
            "samplers": [{"input": 3, "output": 4}]
        }],
        "accessors": [
            {"bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3"},
            {"bufferView": 0, "byteOffset": 36, "componentType": 5126, "count": 3, "type": "VEC3"},
            {"bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR"},
            {"componentType": 5126, "count": 2, "type": "SCALAR"},
            {"componentType": 5126, "count": 2, "type": "VEC3"}
        ],
        "bufferViews": [
            {"buffer": 0, "byteLength": 72},
            {"buffer": 0, "byteOffset": 72, "byteLength": 6}
        ],
        "buffers": [{"byteLength": 78}]
    })
}

#[test]
fn test_defaults_are_filled() {
    let model = Model::decode(&minimal_document()).unwrap();

    let prim = &model.meshes[0].primitives[0];
    assert_eq!(prim.mode, PrimitiveMode::Triangles);
    assert!(prim.targets.is_empty());

    let node = &model.nodes[0];
    assert!(!node.has_matrix());
    assert_eq!(node.rotation, [0.0, 0.0, 0.0, 1.0]);
    assert_eq!(node.scale, [1.0; 3]);
    assert_eq!(node.camera, None);

    let material = &model.materials[0];
    assert_eq!(material.alpha_mode, AlphaMode::Opaque);
    assert_eq!(material.alpha_cutoff, 0.5);
    assert_eq!(material.pbr_metallic_roughness.base_color_factor, [1.0; 4]);
    assert_eq!(material.emissive_factor, [0.0; 3]);

    assert_eq!(model.samplers[0].wrap_s, WrappingMode::Repeat);
    assert_eq!(model.samplers[0].wrap_t, WrappingMode::Repeat);

    let sampler = &model.animations[0].samplers[0];
    assert_eq!(sampler.interpolation, AnimationInterpolation::Linear);
    assert_eq!(model.animations[0].channels[0].target.path, AnimationPath::Translation);

    assert_eq!(model.accessors[0].byte_offset, 0);
    assert!(!model.accessors[0].normalized);
    assert_eq!(model.accessors[3].buffer_view, None);
    assert_eq!(model.buffer_views[0].byte_stride, None);

    match model.cameras[0].projection {
        CameraProjection::Perspective(p) => assert_eq!(p.zfar, None),
        CameraProjection::Orthographic(_) => panic!("expected a perspective camera"),
    }
}

#[test]
fn test_encode_omits_defaults() {
    let document = minimal_document();
    let model = Model::decode(&document).unwrap();
    let encoded = model.encode().unwrap();

    assert_eq!(encoded, document);
    assert!(encoded["nodes"][0].get("camera").is_none());
    assert!(encoded["nodes"][0].get("rotation").is_none());
    assert!(encoded["meshes"][0]["primitives"][0].get("mode").is_none());
    assert!(encoded["bufferViews"][0].get("byteStride").is_none());
    assert_eq!(encoded["materials"][0], json!({}));
    assert_eq!(encoded["samplers"][0], json!({}));
}

#[test]
fn test_traversal_through_model() {
    let mut model = Model::decode(&minimal_document()).unwrap();
    model.buffers[0].set_data(vec![0; 78]);

    let scene = model.default_scene().unwrap();
    assert_eq!(scene.nodes, vec![0]);
    let mesh = model.node_mesh(0).unwrap();
    let prim = &mesh.primitives[0];
    assert_eq!(model.primitive_indices(prim).unwrap().count, 3);
    assert_eq!(model.primitive_material(prim).unwrap().alpha_mode, AlphaMode::Opaque);
    assert!(model.node_camera(1).is_ok());
    assert_eq!(model.skin_joints(0).unwrap().len(), 1);
    assert!(matches!(
        model.skin_inverse_bind_matrices(0),
        Err(ModelError::MissingReference(_))
    ));
    assert_eq!(model.texture_image(0).unwrap().uri.as_deref(), Some("tex.png"));
    assert!(matches!(
        model.texture_sampler(0),
        Err(ModelError::MissingReference(_))
    ));
    assert!(matches!(model.image_data(0), Err(ModelError::MissingReference(_))));

    let (input, output) = model.animation_sampler_accessors(0, 0).unwrap();
    assert_eq!((input.count, output.count), (2, 2));

    let normals = model.accessor_span::<[f32; 3]>(1).unwrap();
    assert_eq!(normals.len(), 3);
    let indices = model.accessor_span::<u16>(2).unwrap();
    assert_eq!(indices.to_vec(), vec![0, 0, 0]);
    // Accessor without a bufferView has no backing bytes.
    assert!(matches!(
        model.accessor_span::<f32>(3),
        Err(ModelError::MissingReference(_))
    ));
}

#[test]
fn test_layout_ids_match_for_equivalent_primitives() {
    let mut document = minimal_document();
    document["meshes"]
        .as_array_mut()
        .unwrap()
        .push(json!({"primitives": [{"attributes": {"NORMAL": 0, "POSITION": 1}}]}));
    let model = Model::decode(&document).unwrap();

    let a = &model.meshes[0].primitives[0];
    let b = &model.meshes[1].primitives[0];
    assert_eq!(
        model.primitive_layout_id(a).unwrap(),
        model.primitive_layout_id(b).unwrap()
    );
}

#[test]
fn test_unknown_entity_keys_are_dropped() {
    let mut document = minimal_document();
    document["nodes"][0]["futureField"] = json!(42);
    let model = Model::decode(&document).unwrap();
    let encoded = model.encode().unwrap();
    assert!(encoded["nodes"][0].get("futureField").is_none());
}
