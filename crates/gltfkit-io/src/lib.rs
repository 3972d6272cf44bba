//! glTF I/O library for reading and writing `.gltf` and `.glb` files.
//!
//! # Supported Formats
//!
//! | Format | Read | Write |
//! |--------|------|-------|
//! | GLB (binary container) | ✓ | ✓ |
//! | glTF + external `.bin` | ✓ | ✓ |
//! | glTF with embedded `data:` uris | ✓ | ✓ |
//!
//! # Quick Start
//!
//! ```ignore
//! use gltfkit_io::{load, save};
//!
//! let model = load("BoomBox.glb")?;
//! println!("{} meshes", model.meshes.len());
//! save(&model, "copy.glb")?;
//! ```
//!
//! Reading and writing are configured through [`ReadOptions`] and
//! [`WriteOptions`]:
//!
//! ```ignore
//! use gltfkit_io::{GltfReader, GltfWriter, ReadMode, ReadOptions, WriteOptions};
//!
//! let reader = GltfReader::new(ReadOptions::default().with_mode(ReadMode::GlbOnly));
//! let model = reader.open("scene.glb")?;
//!
//! let writer = GltfWriter::new(WriteOptions::default().with_pretty_json(true));
//! writer.write_gltf(&model, "scene.gltf", "scene.bin")?;
//! ```

use std::path::Path;

use gltfkit_core::Model;

pub mod glb;
pub mod gltf_reader;
pub mod gltf_writer;
pub mod options;

pub use gltf_reader::{GltfError, GltfReader};
pub use gltf_writer::{GltfWriteError, GltfWriter};
pub use options::{ReadMode, ReadOptions, WriteOptions};

/// Loads a `.glb` or `.gltf` file with default options.
pub fn load<P: AsRef<Path>>(path: P) -> gltf_reader::Result<Model> {
    load_with(path, ReadOptions::default())
}

pub fn load_with<P: AsRef<Path>>(path: P, options: ReadOptions) -> gltf_reader::Result<Model> {
    GltfReader::new(options).open(path)
}

/// Reads a model from memory.
pub fn from_slice(data: &[u8], options: ReadOptions) -> gltf_reader::Result<Model> {
    GltfReader::new(options).read(data)
}

/// Saves with default options; the extension selects GLB (`.glb`) or
/// embedded glTF (`.gltf`).
pub fn save<P: AsRef<Path>>(model: &Model, path: P) -> gltf_writer::Result<()> {
    GltfWriter::default().save(model, path)
}
