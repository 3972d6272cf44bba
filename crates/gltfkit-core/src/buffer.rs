//! Raw byte storage (`buffers`) and byte-range descriptors (`bufferViews`).

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::gltf_types::BufferViewTarget;
use crate::json::{is_zero, nonzero_u32, JsonEntity};

/// Rounds `size` up to the next multiple of `alignment`.
///
/// An alignment of 0 or 1 leaves `size` unchanged.
pub fn calculate_buffer_chunk_size(size: usize, alignment: usize) -> usize {
    if alignment <= 1 {
        return size;
    }
    (size + alignment - 1) / alignment * alignment
}

/// A glTF buffer.
///
/// `byteLength` is kept equal to the attached data length by every mutator.
/// Right after JSON decoding the buffer only carries its declared length;
/// readers attach the bytes with [`Buffer::set_data`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Buffer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    byte_length: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip)]
    data: Vec<u8>,
}

impl Buffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_data(data: Vec<u8>) -> Self {
        Self {
            uri: None,
            byte_length: data.len(),
            name: None,
            data,
        }
    }

    /// Declared `byteLength`.
    pub fn byte_length(&self) -> usize {
        self.byte_length
    }

    /// Length of the attached bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Mutable access to the bytes; the length cannot change through this.
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn set_data(&mut self, data: Vec<u8>) {
        self.byte_length = data.len();
        self.data = data;
    }

    pub fn take_data(&mut self) -> Vec<u8> {
        self.byte_length = 0;
        std::mem::take(&mut self.data)
    }

    pub fn resize(&mut self, new_len: usize) {
        self.data.resize(new_len, 0);
        self.byte_length = new_len;
    }

    pub fn extend_from_slice(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
        self.byte_length = self.data.len();
    }

    /// Zero-pads the data to a multiple of `alignment` and returns the new length.
    pub fn pad_to_alignment(&mut self, alignment: usize) -> usize {
        let padded = calculate_buffer_chunk_size(self.data.len(), alignment);
        self.resize(padded);
        padded
    }
}

impl JsonEntity for Buffer {}

/// A contiguous byte range of a buffer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BufferView {
    pub buffer: u32,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub byte_offset: usize,
    pub byte_length: usize,
    /// `None` means tightly packed.
    #[serde(
        default,
        deserialize_with = "nonzero_u32",
        skip_serializing_if = "Option::is_none"
    )]
    pub byte_stride: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<BufferViewTarget>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl BufferView {
    pub fn new(buffer: u32, byte_offset: usize, byte_length: usize) -> Self {
        Self {
            buffer,
            byte_offset,
            byte_length,
            ..Default::default()
        }
    }

    /// Step between elements of `element_size` bytes stored in this view.
    pub fn effective_stride(&self, element_size: usize) -> usize {
        match self.byte_stride {
            Some(stride) if stride > 0 => stride as usize,
            _ => element_size,
        }
    }

    /// Byte range covered inside the parent buffer.
    pub fn byte_range(&self) -> Range<usize> {
        self.byte_offset..self.byte_offset + self.byte_length
    }
}

impl JsonEntity for BufferView {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_size_alignment() {
        assert_eq!(calculate_buffer_chunk_size(507, 8), 512);
        assert_eq!(calculate_buffer_chunk_size(1033, 8), 1040);
        assert_eq!(calculate_buffer_chunk_size(283, 8), 288);
        assert_eq!(calculate_buffer_chunk_size(512, 8), 512);
        assert_eq!(calculate_buffer_chunk_size(0, 4), 0);
        assert_eq!(calculate_buffer_chunk_size(5, 1), 5);
        assert_eq!(calculate_buffer_chunk_size(5, 0), 5);
    }

    #[test]
    fn test_buffer_length_tracks_data() {
        let mut buffer = Buffer::from_data(vec![1, 2, 3]);
        assert_eq!(buffer.byte_length(), 3);

        assert_eq!(buffer.pad_to_alignment(4), 4);
        assert_eq!(buffer.data(), &[1, 2, 3, 0]);
        assert_eq!(buffer.byte_length(), 4);

        buffer.extend_from_slice(&[9, 9]);
        assert_eq!(buffer.byte_length(), 6);

        let data = buffer.take_data();
        assert_eq!(data.len(), 6);
        assert_eq!(buffer.byte_length(), 0);
    }

    #[test]
    fn test_buffer_json() {
        let buffer = Buffer::decode(&serde_json::json!({"byteLength": 12, "uri": "a.bin"})).unwrap();
        assert_eq!(buffer.byte_length(), 12);
        assert_eq!(buffer.uri.as_deref(), Some("a.bin"));
        assert!(buffer.is_empty());

        let json = Buffer::from_data(vec![0; 8]).encode().unwrap();
        assert_eq!(json, serde_json::json!({"byteLength": 8}));
    }

    #[test]
    fn test_buffer_view_defaults() {
        let view = BufferView::decode(&serde_json::json!({"buffer": 0, "byteLength": 16})).unwrap();
        assert_eq!(view.byte_offset, 0);
        assert_eq!(view.byte_stride, None);
        assert_eq!(view.target, None);
        assert_eq!(view.effective_stride(12), 12);

        let view =
            BufferView::decode(&serde_json::json!({"buffer": 0, "byteLength": 16, "byteStride": 0}))
                .unwrap();
        assert_eq!(view.byte_stride, None);

        let mut view = BufferView::new(1, 4, 32);
        view.byte_stride = Some(16);
        view.target = Some(BufferViewTarget::ArrayBuffer);
        assert_eq!(view.effective_stride(12), 16);
        assert_eq!(view.byte_range(), 4..36);
        assert_eq!(
            view.encode().unwrap(),
            serde_json::json!({
                "buffer": 1,
                "byteOffset": 4,
                "byteLength": 32,
                "byteStride": 16,
                "target": 34962
            })
        );
    }
}
