//! glTF/GLB reader.
//!
//! Produces a [`Model`] with every buffer's bytes attached. Buffer bytes come
//! from the GLB BIN chunk, from base64 `data:` URIs, or from external files
//! resolved against a base directory.
//!
//! # Example
//!
//! ```ignore
//! use gltfkit_io::{GltfReader, ReadOptions};
//!
//! let model = GltfReader::new(ReadOptions::default()).open("BoomBox.glb")?;
//! let positions = model.accessor_span::<[f32; 3]>(0)?;
//! println!("{} vertices", positions.len());
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use gltfkit_core::base64;
use gltfkit_core::{Buffer, Model, ModelError};
use thiserror::Error;
use tracing::{debug, trace};

use crate::glb;
use crate::options::{ReadMode, ReadOptions};

/// Errors that can occur when reading glTF files.
#[derive(Error, Debug)]
pub enum GltfError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid GLB: {0}")]
    InvalidGlb(String),

    #[error("Invalid glTF: {0}")]
    InvalidGltf(String),

    #[error("Unsupported feature: {0}")]
    Unsupported(String),

    #[error(transparent)]
    Model(#[from] ModelError),
}

pub type Result<T> = std::result::Result<T, GltfError>;

/// A reader for glTF and GLB data.
#[derive(Debug, Clone, Default)]
pub struct GltfReader {
    options: ReadOptions,
}

impl GltfReader {
    pub fn new(options: ReadOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ReadOptions {
        &self.options
    }

    /// Reads a `.glb` or `.gltf` file.
    ///
    /// Relative buffer URIs resolve against `options.base_path`, or the
    /// file's directory when that is unset.
    pub fn open<P: AsRef<Path>>(&self, path: P) -> Result<Model> {
        let path = path.as_ref();
        let data = fs::read(path)?;
        debug!(path = %path.display(), bytes = data.len(), "reading glTF file");

        let base = self
            .options
            .base_path
            .clone()
            .or_else(|| path.parent().map(Path::to_path_buf));
        self.read_with_base(&data, base.as_deref())
    }

    /// Reads from memory according to the configured [`ReadMode`].
    pub fn read(&self, data: &[u8]) -> Result<Model> {
        self.read_with_base(data, self.options.base_path.as_deref())
    }

    fn read_with_base(&self, data: &[u8], base: Option<&Path>) -> Result<Model> {
        match self.options.mode {
            ReadMode::GlbOnly => self.glb_with_base(data, base),
            ReadMode::AutoDetect if glb::is_glb(data) => self.glb_with_base(data, base),
            ReadMode::AutoDetect => self.gltf_with_base(data, base),
        }
    }

    /// Parses a GLB container.
    pub fn read_glb(&self, data: &[u8]) -> Result<Model> {
        self.glb_with_base(data, self.options.base_path.as_deref())
    }

    /// Parses `.gltf` JSON, resolving relative buffer URIs against `base_path`.
    pub fn read_gltf(&self, json: &[u8], base_path: Option<&Path>) -> Result<Model> {
        self.gltf_with_base(json, base_path)
    }

    fn glb_with_base(&self, data: &[u8], base: Option<&Path>) -> Result<Model> {
        let glb = glb::parse(data)?;
        let mut model: Model = serde_json::from_slice(glb.json)?;

        if let Some(bin) = glb.bin {
            if model.buffers.len() != 1 {
                return Err(GltfError::InvalidGltf(format!(
                    "GLB with a BIN chunk must declare exactly one buffer, found {}",
                    model.buffers.len()
                )));
            }
            let buffer = &mut model.buffers[0];
            if buffer.uri.is_some() {
                return Err(GltfError::InvalidGltf(
                    "buffer 0 of a GLB with a BIN chunk must not have a uri".into(),
                ));
            }
            let declared = buffer.byte_length();
            if declared > bin.len() {
                return Err(GltfError::InvalidGlb(format!(
                    "buffer 0 declares {} bytes but the BIN chunk holds {}",
                    declared,
                    bin.len()
                )));
            }
            buffer.set_data(bin[..declared].to_vec());
            trace!(bytes = declared, "attached BIN chunk to buffer 0");
        } else {
            self.resolve_buffers(&mut model, base, true)?;
        }

        debug!(
            buffers = model.buffers.len(),
            meshes = model.meshes.len(),
            nodes = model.nodes.len(),
            bin = glb.bin.map_or(0, <[u8]>::len),
            "loaded GLB"
        );
        Ok(model)
    }

    fn gltf_with_base(&self, json: &[u8], base: Option<&Path>) -> Result<Model> {
        let mut model: Model = serde_json::from_slice(json)?;
        self.resolve_buffers(&mut model, base, false)?;
        debug!(
            buffers = model.buffers.len(),
            meshes = model.meshes.len(),
            nodes = model.nodes.len(),
            "loaded glTF"
        );
        Ok(model)
    }

    /// Attaches bytes to every buffer from its URI.
    fn resolve_buffers(&self, model: &mut Model, base: Option<&Path>, in_glb: bool) -> Result<()> {
        for (index, buffer) in model.buffers.iter_mut().enumerate() {
            let Some(uri) = buffer.uri.clone() else {
                if buffer.byte_length() == 0 {
                    continue;
                }
                return Err(if in_glb {
                    GltfError::InvalidGlb(format!(
                        "buffer {} has no uri and the file has no BIN chunk",
                        index
                    ))
                } else {
                    GltfError::InvalidGltf(format!("buffer {} has no uri", index))
                });
            };

            let data = if base64::is_data_uri(&uri) {
                base64::decode_data_uri(&uri)?.data
            } else if self.options.load_external_buffers {
                let path = resolve_path(base, &uri);
                trace!(buffer = index, path = %path.display(), "reading external buffer");
                fs::read(&path)?
            } else {
                debug!(buffer = index, uri = %uri, "skipping external buffer");
                continue;
            };
            attach(buffer, index, data)?;
        }
        Ok(())
    }
}

fn resolve_path(base: Option<&Path>, uri: &str) -> PathBuf {
    match base {
        Some(base) => base.join(uri),
        None => PathBuf::from(uri),
    }
}

/// Stores `data` in `buffer`, truncated to the declared `byteLength`.
fn attach(buffer: &mut Buffer, index: usize, mut data: Vec<u8>) -> Result<()> {
    let declared = buffer.byte_length();
    if data.len() < declared {
        return Err(GltfError::InvalidGltf(format!(
            "buffer {} declares {} bytes but its uri provides {}",
            index,
            declared,
            data.len()
        )));
    }
    data.truncate(declared);
    buffer.set_data(data);
    Ok(())
}
