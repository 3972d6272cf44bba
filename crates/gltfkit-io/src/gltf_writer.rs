// glTF/GLB writer.
//
// Every output format first merges the model's buffers into a single buffer
// (each source buffer starting on `WriteOptions::buffer_alignment`) and
// rebases the buffer views onto it. The merged buffer then becomes:
//
// - **GLB** - the BIN chunk of a single .glb file
// - **glTF + .bin** - a separate binary file referenced by relative uri
// - **glTF (embedded)** - a base64 `data:` uri inside the JSON
//
// # Example
//
// ```ignore
// use gltfkit_io::{GltfWriter, WriteOptions};
//
// let writer = GltfWriter::new(WriteOptions::default().with_pretty_json(true));
// writer.write_glb(&model, "out.glb")?;
// writer.write_gltf(&model, "out.gltf", "out.bin")?;
// ```

use std::fs;
use std::io;
use std::path::Path;

use gltfkit_core::base64::{self, OCTET_STREAM_MIME};
use gltfkit_core::{Model, ModelError};
use thiserror::Error;
use tracing::debug;

use crate::glb;
use crate::options::WriteOptions;

/// Errors that can occur when writing glTF files.
#[derive(Error, Debug)]
pub enum GltfWriteError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON serialize error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid model: {0}")]
    InvalidModel(String),

    #[error("Unsupported output: {0}")]
    Unsupported(String),

    #[error(transparent)]
    Model(#[from] ModelError),
}

pub type Result<T> = std::result::Result<T, GltfWriteError>;

/// Writes a [`Model`] as GLB or `.gltf`.
#[derive(Debug, Clone, Default)]
pub struct GltfWriter {
    options: WriteOptions,
}

impl GltfWriter {
    pub fn new(options: WriteOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &WriteOptions {
        &self.options
    }

    /// Copy of `model` with at most one buffer, ready to serialize.
    fn prepare(&self, model: &Model) -> Result<Model> {
        for (index, buffer) in model.buffers.iter().enumerate() {
            if buffer.len() != buffer.byte_length() {
                return Err(GltfWriteError::InvalidModel(format!(
                    "buffer {} declares {} bytes but holds {}",
                    index,
                    buffer.byte_length(),
                    buffer.len()
                )));
            }
        }

        let mut out = model.clone();
        out.merge_buffers_aligned(self.options.buffer_alignment)?;
        if let Some(generator) = &self.options.generator {
            out.asset.generator = Some(generator.clone());
        }
        Ok(out)
    }

    fn to_json(&self, model: &Model) -> Result<Vec<u8>> {
        let json = if self.options.pretty_json {
            serde_json::to_vec_pretty(model)?
        } else {
            serde_json::to_vec(model)?
        };
        Ok(json)
    }

    /// Serializes to GLB bytes. The BIN chunk is omitted when the model has
    /// no buffer data.
    pub fn to_glb(&self, model: &Model) -> Result<Vec<u8>> {
        let mut out = self.prepare(model)?;
        if let Some(buffer) = out.buffers.first_mut() {
            buffer.uri = None;
        }
        let json = self.to_json(&out)?;
        let bin = out
            .buffers
            .first()
            .map(|b| b.data())
            .filter(|d| !d.is_empty());

        let glb = glb::to_vec(&json, bin)?;
        debug!(
            json = json.len(),
            bin = bin.map_or(0, <[u8]>::len),
            total = glb.len(),
            "wrote GLB"
        );
        Ok(glb)
    }

    /// Write as GLB (binary glTF) file.
    pub fn write_glb<P: AsRef<Path>>(&self, model: &Model, path: P) -> Result<()> {
        let glb = self.to_glb(model)?;
        fs::write(path, glb)?;
        Ok(())
    }

    /// glTF JSON with the merged buffer embedded as a base64 data uri.
    pub fn to_gltf_embedded(&self, model: &Model) -> Result<String> {
        let mut out = self.prepare(model)?;
        if let Some(buffer) = out.buffers.first_mut() {
            buffer.uri = Some(base64::encode_data_uri(buffer.data(), OCTET_STREAM_MIME));
        }
        let json = self.to_json(&out)?;
        String::from_utf8(json).map_err(|e| GltfWriteError::InvalidModel(e.to_string()))
    }

    /// Write as a single self-contained `.gltf` file.
    pub fn write_gltf_embedded<P: AsRef<Path>>(&self, model: &Model, path: P) -> Result<()> {
        let json = self.to_gltf_embedded(model)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Write as `.gltf` JSON plus a separate binary file, referenced by its
    /// file name.
    pub fn write_gltf<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        model: &Model,
        json_path: P,
        bin_path: Q,
    ) -> Result<()> {
        let bin_path = bin_path.as_ref();
        let mut out = self.prepare(model)?;

        if let Some(buffer) = out.buffers.first_mut() {
            let bin_uri = bin_path
                .file_name()
                .map(|s| s.to_string_lossy().to_string())
                .ok_or_else(|| {
                    GltfWriteError::InvalidModel(format!(
                        "{} has no file name",
                        bin_path.display()
                    ))
                })?;
            fs::write(bin_path, buffer.data())?;
            buffer.uri = Some(bin_uri);
        }

        let json = self.to_json(&out)?;
        fs::write(json_path, json)?;
        Ok(())
    }

    /// Writes GLB for a `.glb` extension and embedded `.gltf` for `.gltf`.
    pub fn save<P: AsRef<Path>>(&self, model: &Model, path: P) -> Result<()> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase());
        match extension.as_deref() {
            Some("glb") => self.write_glb(model, path),
            Some("gltf") => self.write_gltf_embedded(model, path),
            _ => Err(GltfWriteError::Unsupported(format!(
                "cannot infer glTF format from {}",
                path.display()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gltf_reader::GltfReader;
    use gltfkit_core::{AccessorType, Buffer, ComponentType};

    fn two_buffer_model() -> Model {
        let mut model = Model::new();
        let a = model.create_buffer().unwrap();
        let b = model.create_buffer().unwrap();
        let va = model
            .create_buffer_view_with_data(a, &[1, 2, 3], None, 0, 1)
            .unwrap();
        let vb = model
            .create_buffer_view_with_data(b, &[10, 20, 30, 40], None, 0, 1)
            .unwrap();
        model
            .create_accessor(va, 0, 3, AccessorType::Scalar, ComponentType::UnsignedByte)
            .unwrap();
        model
            .create_accessor(vb, 0, 4, AccessorType::Scalar, ComponentType::UnsignedByte)
            .unwrap();
        model
    }

    #[test]
    fn test_create_glb() {
        let glb = GltfWriter::default().to_glb(&two_buffer_model()).unwrap();
        assert_eq!(&glb[0..4], b"glTF");
        assert_eq!(glb.len() % 4, 0);
        let declared = u32::from_le_bytes([glb[8], glb[9], glb[10], glb[11]]) as usize;
        assert_eq!(declared, glb.len());
    }

    #[test]
    fn test_roundtrip_merges_with_alignment() {
        let model = two_buffer_model();
        let glb = GltfWriter::default().to_glb(&model).unwrap();
        let read = GltfReader::default().read_glb(&glb).unwrap();

        assert_eq!(read.buffers.len(), 1);
        assert_eq!(read.buffer_views[1].byte_offset, 8);
        assert_eq!(read.buffer_view_data(0).unwrap(), &[1, 2, 3]);
        assert_eq!(read.buffer_view_data(1).unwrap(), &[10, 20, 30, 40]);
        assert_eq!(read.asset.generator.as_deref(), Some("gltfkit"));
        // The source model is left untouched.
        assert_eq!(model.buffers.len(), 2);
    }

    #[test]
    fn test_glb_without_buffers_has_no_bin_chunk() {
        let glb = GltfWriter::default().to_glb(&Model::new()).unwrap();
        let parsed = glb::parse(&glb).unwrap();
        assert!(parsed.bin.is_none());
        assert!(GltfReader::default().read_glb(&glb).is_ok());
    }

    #[test]
    fn test_embedded_gltf() {
        let json = GltfWriter::default()
            .to_gltf_embedded(&two_buffer_model())
            .unwrap();
        assert!(json.contains("data:application/octet-stream;base64,"));

        let read = GltfReader::default().read_gltf(json.as_bytes(), None).unwrap();
        assert_eq!(read.buffer_view_data(1).unwrap(), &[10, 20, 30, 40]);
    }

    #[test]
    fn test_rejects_buffer_without_data() {
        let mut model = Model::new();
        model.buffers.push(
            serde_json::from_str::<Buffer>(r#"{"byteLength": 16, "uri": "external.bin"}"#).unwrap(),
        );
        assert!(matches!(
            GltfWriter::default().to_glb(&model),
            Err(GltfWriteError::InvalidModel(_))
        ));
    }

    #[test]
    fn test_generator_override() {
        let mut model = two_buffer_model();
        model.asset.generator = Some("original".into());
        let writer = GltfWriter::new(WriteOptions::default().with_generator(None));
        let glb = writer.to_glb(&model).unwrap();
        let read = GltfReader::default().read_glb(&glb).unwrap();
        assert_eq!(read.asset.generator.as_deref(), Some("original"));
    }

    #[test]
    fn test_save_rejects_unknown_extension() {
        assert!(matches!(
            GltfWriter::default().save(&Model::new(), "model.obj"),
            Err(GltfWriteError::Unsupported(_))
        ));
    }
}
