//! Typed, strided views over raw buffer bytes.
//!
//! glTF vertex data is frequently interleaved: consecutive elements of one
//! attribute sit `byteStride` bytes apart and that stride need not be a
//! multiple of the element's alignment. [`AliasedSpan`] and [`AliasedSpanMut`]
//! therefore never hand out references into the byte slice. Every read copies
//! `size_of::<T>()` bytes into a properly aligned value and every write copies
//! the value's bytes back out.
//!
//! # Example
//!
//! ```
//! use gltfkit_core::aliased_span::{AliasedSpan, AliasedSpanMut};
//!
//! // Two VEC2<u32> elements, 12 bytes apart (4 bytes of padding each).
//! let mut bytes = vec![0u8; 20];
//! let mut span = AliasedSpanMut::<[u32; 2]>::new(&mut bytes, 2, 12).unwrap();
//! span.set(0, [1, 2]).unwrap();
//! span.set(1, [3, 4]).unwrap();
//!
//! let span = AliasedSpan::<[u32; 2]>::new(&bytes, 2, 12).unwrap();
//! assert_eq!(span.iter().collect::<Vec<_>>(), vec![[1, 2], [3, 4]]);
//! ```
//!
//! Values are copied in host byte order; glTF data is little-endian.

use std::iter::FusedIterator;
use std::marker::PhantomData;
use std::mem::size_of;

use bytemuck::Pod;
use thiserror::Error;

/// Errors raised when building or writing through a span.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpanError {
    #[error("stride {stride} is smaller than the {size}-byte element")]
    StrideTooSmall { stride: usize, size: usize },

    #[error("{count} elements at stride {stride} need {required} bytes, but only {available} are available")]
    RangeTooShort {
        count: usize,
        stride: usize,
        required: usize,
        available: usize,
    },

    #[error("index {index} out of bounds for span of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },
}

/// Bytes spanned by `count` elements of `element_size` bytes at `stride`.
pub fn required_bytes(count: usize, stride: usize, element_size: usize) -> usize {
    if count == 0 {
        0
    } else {
        (count - 1) * stride + element_size
    }
}

fn validate<T>(available: usize, count: usize, stride: usize) -> Result<(), SpanError> {
    let size = size_of::<T>();
    if stride < size {
        return Err(SpanError::StrideTooSmall { stride, size });
    }
    let required = required_bytes(count, stride, size);
    if required > available {
        return Err(SpanError::RangeTooShort {
            count,
            stride,
            required,
            available,
        });
    }
    Ok(())
}

/// Read-only strided view of `len` values of `T`.
pub struct AliasedSpan<'a, T> {
    bytes: &'a [u8],
    len: usize,
    stride: usize,
    _marker: PhantomData<T>,
}

impl<T> Clone for AliasedSpan<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for AliasedSpan<'_, T> {}

impl<T> std::fmt::Debug for AliasedSpan<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AliasedSpan")
            .field("len", &self.len)
            .field("stride", &self.stride)
            .field("element_size", &size_of::<T>())
            .finish()
    }
}

impl<'a, T: Pod> AliasedSpan<'a, T> {
    /// Creates a span of `len` elements starting at `bytes[0]`, `stride` bytes apart.
    ///
    /// Fails when `stride < size_of::<T>()` or when `bytes` is too short.
    pub fn new(bytes: &'a [u8], len: usize, stride: usize) -> Result<Self, SpanError> {
        validate::<T>(bytes.len(), len, stride)?;
        Ok(Self {
            bytes,
            len,
            stride,
            _marker: PhantomData,
        })
    }

    /// Creates a tightly packed span (`stride == size_of::<T>()`).
    pub fn packed(bytes: &'a [u8], len: usize) -> Result<Self, SpanError> {
        Self::new(bytes, len, size_of::<T>())
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Copies out element `index`.
    pub fn get(&self, index: usize) -> Option<T> {
        self.element_bytes(index).map(bytemuck::pod_read_unaligned)
    }

    /// Raw bytes of element `index`.
    pub fn element_bytes(&self, index: usize) -> Option<&'a [u8]> {
        if index >= self.len {
            return None;
        }
        let offset = index * self.stride;
        Some(&self.bytes[offset..offset + size_of::<T>()])
    }

    pub fn front(&self) -> Option<T> {
        self.get(0)
    }

    pub fn back(&self) -> Option<T> {
        self.len.checked_sub(1).and_then(|i| self.get(i))
    }

    /// Lazy iterator over copies of every element. The span itself is `Copy`,
    /// so iteration can be restarted any number of times.
    pub fn iter(&self) -> Iter<'a, T> {
        Iter {
            span: *self,
            front: 0,
            back: self.len,
        }
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.iter().collect()
    }
}

impl<'a, T: Pod> IntoIterator for AliasedSpan<'a, T> {
    type Item = T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T: Pod> IntoIterator for &AliasedSpan<'a, T> {
    type Item = T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator returned by [`AliasedSpan::iter`].
pub struct Iter<'a, T> {
    span: AliasedSpan<'a, T>,
    front: usize,
    back: usize,
}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            span: self.span,
            front: self.front,
            back: self.back,
        }
    }
}

impl<T: Pod> Iterator for Iter<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.front >= self.back {
            return None;
        }
        let value = self.span.get(self.front);
        self.front += 1;
        value
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }
}

impl<T: Pod> DoubleEndedIterator for Iter<'_, T> {
    fn next_back(&mut self) -> Option<T> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        self.span.get(self.back)
    }
}

impl<T: Pod> ExactSizeIterator for Iter<'_, T> {}

impl<T: Pod> FusedIterator for Iter<'_, T> {}

/// Mutable strided view of `len` values of `T`.
pub struct AliasedSpanMut<'a, T> {
    bytes: &'a mut [u8],
    len: usize,
    stride: usize,
    _marker: PhantomData<T>,
}

impl<T> std::fmt::Debug for AliasedSpanMut<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AliasedSpanMut")
            .field("len", &self.len)
            .field("stride", &self.stride)
            .field("element_size", &size_of::<T>())
            .finish()
    }
}

impl<'a, T: Pod> AliasedSpanMut<'a, T> {
    /// Same contract as [`AliasedSpan::new`].
    pub fn new(bytes: &'a mut [u8], len: usize, stride: usize) -> Result<Self, SpanError> {
        validate::<T>(bytes.len(), len, stride)?;
        Ok(Self {
            bytes,
            len,
            stride,
            _marker: PhantomData,
        })
    }

    pub fn packed(bytes: &'a mut [u8], len: usize) -> Result<Self, SpanError> {
        Self::new(bytes, len, size_of::<T>())
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Read-only view over the same bytes.
    pub fn as_span(&self) -> AliasedSpan<'_, T> {
        AliasedSpan {
            bytes: &*self.bytes,
            len: self.len,
            stride: self.stride,
            _marker: PhantomData,
        }
    }

    pub fn get(&self, index: usize) -> Option<T> {
        self.as_span().get(index)
    }

    pub fn front(&self) -> Option<T> {
        self.get(0)
    }

    pub fn back(&self) -> Option<T> {
        self.as_span().back()
    }

    pub fn iter(&self) -> Iter<'_, T> {
        self.as_span().iter()
    }

    /// Overwrites element `index` with the bytes of `value`. Bytes between
    /// elements are left untouched.
    pub fn set(&mut self, index: usize, value: T) -> Result<(), SpanError> {
        if index >= self.len {
            return Err(SpanError::IndexOutOfBounds {
                index,
                len: self.len,
            });
        }
        let offset = index * self.stride;
        self.bytes[offset..offset + size_of::<T>()].copy_from_slice(bytemuck::bytes_of(&value));
        Ok(())
    }

    /// Writes `values` to elements `0..values.len()`.
    pub fn copy_from_slice(&mut self, values: &[T]) -> Result<(), SpanError> {
        if values.len() > self.len {
            return Err(SpanError::IndexOutOfBounds {
                index: values.len() - 1,
                len: self.len,
            });
        }
        for (i, value) in values.iter().enumerate() {
            self.set(i, *value)?;
        }
        Ok(())
    }

    /// Sets every element to `value`.
    pub fn fill(&mut self, value: T) {
        for i in 0..self.len {
            let offset = i * self.stride;
            self.bytes[offset..offset + size_of::<T>()].copy_from_slice(bytemuck::bytes_of(&value));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytemuck::{Pod, Zeroable};

    #[test]
    fn test_stride_smaller_than_element_fails() {
        let bytes = vec![0u8; 64];
        let err = AliasedSpan::<[u32; 3]>::new(&bytes, 4, 8).unwrap_err();
        assert_eq!(err, SpanError::StrideTooSmall { stride: 8, size: 12 });
    }

    #[test]
    fn test_range_too_short_fails() {
        let bytes = vec![0u8; 23];
        // 2 elements at stride 12 need 24 bytes.
        let err = AliasedSpan::<[u32; 3]>::new(&bytes, 2, 12).unwrap_err();
        assert!(matches!(err, SpanError::RangeTooShort { required: 24, available: 23, .. }));
    }

    #[test]
    fn test_set_touches_only_element_bytes() {
        for stride in [12usize, 16, 20] {
            let count = 3;
            let mut bytes = vec![0xAAu8; required_bytes(count, stride, 12)];
            {
                let mut span = AliasedSpanMut::<[u32; 3]>::new(&mut bytes, count, stride).unwrap();
                span.set(1, [0, 0, 0]).unwrap();
            }
            for (i, b) in bytes.iter().enumerate() {
                let inside = i >= stride && i < stride + 12;
                assert_eq!(*b == 0, inside, "stride {} byte {}", stride, i);
            }

            let mut span = AliasedSpanMut::<[u32; 3]>::new(&mut bytes, count, stride).unwrap();
            span.set(2, [7, 8, 9]).unwrap();
            assert_eq!(span.get(2), Some([7, 8, 9]));
            assert_eq!(span.get(1), Some([0, 0, 0]));
            assert_eq!(span.get(3), None);
        }
    }

    #[test]
    fn test_unaligned_reads() {
        // f32 values at odd offsets.
        let mut bytes = vec![0u8; 1 + 5 * 3];
        let values = [1.5f32, -2.25, 1024.0];
        for (i, v) in values.iter().enumerate() {
            let offset = 1 + i * 5;
            bytes[offset..offset + 4].copy_from_slice(&v.to_ne_bytes());
        }
        let span = AliasedSpan::<f32>::new(&bytes[1..], 3, 5).unwrap();
        assert_eq!(span.to_vec(), values.to_vec());
    }

    #[test]
    fn test_front_back_and_iteration() {
        let data: Vec<u8> = [10u16, 20, 30, 40]
            .iter()
            .flat_map(|v| v.to_ne_bytes())
            .collect();
        let span = AliasedSpan::<u16>::packed(&data, 4).unwrap();
        assert_eq!(span.front(), Some(10));
        assert_eq!(span.back(), Some(40));

        let first: Vec<u16> = span.iter().collect();
        let second: Vec<u16> = span.into_iter().collect();
        assert_eq!(first, second);
        assert_eq!(span.iter().rev().collect::<Vec<_>>(), vec![40, 30, 20, 10]);
        assert_eq!(span.iter().len(), 4);

        let empty = AliasedSpan::<u16>::packed(&[], 0).unwrap();
        assert!(empty.is_empty());
        assert_eq!(empty.front(), None);
        assert_eq!(empty.back(), None);
    }

    #[test]
    fn test_set_out_of_bounds() {
        let mut bytes = vec![0u8; 8];
        let mut span = AliasedSpanMut::<u32>::packed(&mut bytes, 2).unwrap();
        assert_eq!(
            span.set(2, 1),
            Err(SpanError::IndexOutOfBounds { index: 2, len: 2 })
        );
    }

    #[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
    #[repr(C)]
    struct Vertex {
        position: [f32; 3],
        uv: [f32; 2],
    }

    #[test]
    fn test_interleaved_struct_and_attribute_views() {
        let stride = size_of::<Vertex>();
        let mut bytes = vec![0u8; stride * 2];
        {
            let mut vertices = AliasedSpanMut::<Vertex>::packed(&mut bytes, 2).unwrap();
            vertices
                .copy_from_slice(&[
                    Vertex { position: [1.0, 2.0, 3.0], uv: [0.0, 1.0] },
                    Vertex { position: [4.0, 5.0, 6.0], uv: [1.0, 0.0] },
                ])
                .unwrap();
        }

        // Same bytes viewed as two interleaved attributes.
        let positions = AliasedSpan::<[f32; 3]>::new(&bytes, 2, stride).unwrap();
        let uvs = AliasedSpan::<[f32; 2]>::new(&bytes[12..], 2, stride).unwrap();
        assert_eq!(positions.to_vec(), vec![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
        assert_eq!(uvs.to_vec(), vec![[0.0, 1.0], [1.0, 0.0]]);
    }

    #[test]
    fn test_fill() {
        let mut bytes = vec![0u8; 10];
        let mut span = AliasedSpanMut::<u16>::new(&mut bytes, 3, 4).unwrap();
        span.fill(0xFFFF);
        assert_eq!(bytes, vec![0xFF, 0xFF, 0, 0, 0xFF, 0xFF, 0, 0, 0xFF, 0xFF]);
    }
}
