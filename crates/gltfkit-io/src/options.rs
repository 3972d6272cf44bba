//! Read and write settings.

use std::path::PathBuf;

/// How input bytes are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadMode {
    /// Only GLB containers are accepted.
    GlbOnly,
    /// GLB when the input starts with the GLB magic, `.gltf` JSON otherwise.
    #[default]
    AutoDetect,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadOptions {
    pub mode: ReadMode,
    /// Directory that relative buffer URIs resolve against. When reading
    /// from a file and this is unset, the file's directory is used.
    pub base_path: Option<PathBuf>,
    /// Whether buffers referencing external files are loaded. Skipped
    /// buffers keep their declared `byteLength` but no bytes.
    pub load_external_buffers: bool,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            mode: ReadMode::AutoDetect,
            base_path: None,
            load_external_buffers: true,
        }
    }
}

impl ReadOptions {
    pub fn with_mode(mut self, mode: ReadMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_base_path(mut self, base_path: impl Into<Option<PathBuf>>) -> Self {
        self.base_path = base_path.into();
        self
    }

    pub fn with_external_buffers(mut self, load: bool) -> Self {
        self.load_external_buffers = load;
        self
    }
}

pub const DEFAULT_GENERATOR: &str = "gltfkit";

/// Default start alignment of each source buffer in the merged output buffer.
pub const DEFAULT_BUFFER_ALIGNMENT: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOptions {
    /// Written to `asset.generator`; `None` keeps the model's own value.
    pub generator: Option<String>,
    pub pretty_json: bool,
    pub buffer_alignment: usize,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            generator: Some(DEFAULT_GENERATOR.to_string()),
            pretty_json: false,
            buffer_alignment: DEFAULT_BUFFER_ALIGNMENT,
        }
    }
}

impl WriteOptions {
    pub fn with_generator(mut self, generator: impl Into<Option<String>>) -> Self {
        self.generator = generator.into();
        self
    }

    pub fn with_pretty_json(mut self, pretty: bool) -> Self {
        self.pretty_json = pretty;
        self
    }

    /// Values of 0 are treated as 1.
    pub fn with_buffer_alignment(mut self, alignment: usize) -> Self {
        self.buffer_alignment = alignment.max(1);
        self
    }
}
