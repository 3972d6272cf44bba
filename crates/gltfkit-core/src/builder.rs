//! Allocation and bulk-data operations on a [`Model`].
//!
//! New data is appended to buffers: each buffer view starts at the buffer's
//! previous length padded to the requested alignment. Every operation checks
//! its inputs before touching the model, so a failed call leaves it unchanged.

use std::mem::size_of;

use bytemuck::Pod;
use num_traits::ToPrimitive;
use tracing::{debug, trace};

use crate::accessor::Accessor;
use crate::aliased_span::AliasedSpan;
use crate::buffer::{calculate_buffer_chunk_size, Buffer, BufferView};
use crate::error::{ModelError, Result};
use crate::gltf_types::{AccessorType, BufferViewTarget, ComponentType};
use crate::model::{check_stride, AccessorLayout, Model};

fn next_index(len: usize, kind: &str) -> Result<u32> {
    u32::try_from(len)
        .map_err(|_| ModelError::Capacity(format!("too many {}s for a u32 index", kind)))
}

/// New offsets are derived from the attached bytes, so they must match the
/// declared `byteLength`.
fn check_attached(buffer: &Buffer, index: u32) -> Result<()> {
    if buffer.len() != buffer.byte_length() {
        return Err(ModelError::MissingReference(format!(
            "buffer {} declares {} bytes but holds {}",
            index,
            buffer.byte_length(),
            buffer.len()
        )));
    }
    Ok(())
}

/// Per-component min/max over one accessor, read as `T`.
fn component_bounds<T: Pod + ToPrimitive>(
    bytes: &[u8],
    layout: &AccessorLayout,
    components: usize,
) -> Result<(Vec<f64>, Vec<f64>)> {
    let size = size_of::<T>();
    let mut min = vec![f64::INFINITY; components];
    let mut max = vec![f64::NEG_INFINITY; components];
    for c in 0..components {
        let span = AliasedSpan::<T>::new(&bytes[c * size..], layout.count, layout.stride)?;
        for value in span.iter().filter_map(|v| v.to_f64()) {
            min[c] = min[c].min(value);
            max[c] = max[c].max(value);
        }
    }
    Ok((min, max))
}

impl Model {
    /// Appends an empty buffer.
    pub fn create_buffer(&mut self) -> Result<u32> {
        let index = next_index(self.buffers.len(), "buffer")?;
        self.buffers.push(Buffer::new());
        trace!(buffer = index, "created buffer");
        Ok(index)
    }

    /// Reserves `byte_length` zeroed bytes at the end of `buffer` (after
    /// padding it to `alignment`) and describes them with a new buffer view.
    ///
    /// A `byte_stride` of 0 means tightly packed.
    pub fn create_buffer_view(
        &mut self,
        buffer: u32,
        byte_length: usize,
        target: impl Into<Option<BufferViewTarget>>,
        byte_stride: u32,
        alignment: usize,
    ) -> Result<u32> {
        let index = next_index(self.buffer_views.len(), "bufferView")?;
        let buf = self.buffer_mut(buffer)?;
        check_attached(buf, buffer)?;
        let byte_offset = buf.pad_to_alignment(alignment);
        buf.resize(byte_offset + byte_length);

        let mut view = BufferView::new(buffer, byte_offset, byte_length);
        view.byte_stride = (byte_stride != 0).then_some(byte_stride);
        view.target = target.into();
        self.buffer_views.push(view);

        trace!(
            buffer,
            view = index,
            byte_offset,
            byte_length,
            "created bufferView"
        );
        Ok(index)
    }

    /// Like [`create_buffer_view`](Self::create_buffer_view), filled with `data`.
    pub fn create_buffer_view_with_data(
        &mut self,
        buffer: u32,
        data: &[u8],
        target: impl Into<Option<BufferViewTarget>>,
        byte_stride: u32,
        alignment: usize,
    ) -> Result<u32> {
        let index = self.create_buffer_view(buffer, data.len(), target, byte_stride, alignment)?;
        self.buffer_view_data_mut(index)?.copy_from_slice(data);
        Ok(index)
    }

    /// Adds an accessor over `buffer_view`, failing if `count` elements at the
    /// view's stride do not fit after `byte_offset`.
    pub fn create_accessor(
        &mut self,
        buffer_view: u32,
        byte_offset: usize,
        count: usize,
        accessor_type: AccessorType,
        component_type: ComponentType,
    ) -> Result<u32> {
        let index = next_index(self.accessors.len(), "accessor")?;
        let accessor = Accessor::new(
            Some(buffer_view),
            byte_offset,
            count,
            accessor_type,
            component_type,
        );

        let view = self.buffer_view(buffer_view)?;
        let element_size = accessor.element_size();
        let stride = view.effective_stride(element_size);
        check_stride(index, buffer_view, stride, element_size)?;
        let needed = if count == 0 {
            Some(byte_offset)
        } else {
            (count - 1)
                .checked_mul(stride)
                .and_then(|n| n.checked_add(element_size))
                .and_then(|n| n.checked_add(byte_offset))
        };
        match needed {
            Some(needed) if needed <= view.byte_length => {}
            _ => {
                return Err(ModelError::Capacity(format!(
                    "{} {} {} elements at stride {} from offset {} exceed bufferView {} ({} bytes)",
                    count,
                    accessor_type,
                    component_type.as_u32(),
                    stride,
                    byte_offset,
                    buffer_view,
                    view.byte_length
                )))
            }
        }

        self.accessors.push(accessor);
        trace!(accessor = index, buffer_view, count, "created accessor");
        Ok(index)
    }

    /// Copies every element of `src` into the first elements of `dst`,
    /// honoring each side's stride.
    ///
    /// Both accessors must share component type and element type, and `dst`
    /// must hold at least as many elements as `src`.
    pub fn copy_accessor_data(&mut self, dst: u32, src: u32) -> Result<()> {
        let (dst_acc, src_acc) = (self.accessor(dst)?, self.accessor(src)?);
        if !dst_acc.is_layout_compatible(src_acc) {
            return Err(ModelError::TypeMismatch(format!(
                "cannot copy accessor {} ({} {:?}) into accessor {} ({} {:?})",
                src,
                src_acc.accessor_type,
                src_acc.component_type,
                dst,
                dst_acc.accessor_type,
                dst_acc.component_type
            )));
        }
        if dst_acc.count < src_acc.count {
            return Err(ModelError::Capacity(format!(
                "accessor {} holds {} elements, accessor {} needs {}",
                dst, dst_acc.count, src, src_acc.count
            )));
        }

        let src_layout = self.accessor_layout(src)?;
        let dst_layout = self.accessor_layout(dst)?;
        let element_size = src_layout.element_size;

        // Staged through a packed copy so overlapping ranges are safe.
        let src_data = self.buffer(src_layout.buffer)?.data();
        let mut staged = Vec::with_capacity(src_layout.count * element_size);
        for i in 0..src_layout.count {
            let start = src_layout.offset + i * src_layout.stride;
            staged.extend_from_slice(&src_data[start..start + element_size]);
        }

        let dst_data = self.buffer_mut(dst_layout.buffer)?.data_mut();
        for (i, element) in staged.chunks_exact(element_size).enumerate() {
            let start = dst_layout.offset + i * dst_layout.stride;
            dst_data[start..start + element_size].copy_from_slice(element);
        }

        trace!(src, dst, count = src_layout.count, "copied accessor data");
        Ok(())
    }

    /// Recomputes `min` and `max` of an accessor from its data.
    ///
    /// Both are left empty for an accessor with no elements.
    pub fn calculate_min_max(&mut self, accessor: u32) -> Result<()> {
        let acc = self.accessor(accessor)?;
        let (component_type, components) = (acc.component_type, acc.num_components());
        let layout = self.accessor_layout(accessor)?;

        let (min, max) = if layout.count == 0 {
            (Vec::new(), Vec::new())
        } else {
            let data = self.buffer(layout.buffer)?.data();
            let bytes = &data[layout.offset..layout.offset + layout.span_len()];
            match component_type {
                ComponentType::Byte => component_bounds::<i8>(bytes, &layout, components)?,
                ComponentType::UnsignedByte => component_bounds::<u8>(bytes, &layout, components)?,
                ComponentType::Short => component_bounds::<i16>(bytes, &layout, components)?,
                ComponentType::UnsignedShort => {
                    component_bounds::<u16>(bytes, &layout, components)?
                }
                ComponentType::Int => component_bounds::<i32>(bytes, &layout, components)?,
                ComponentType::UnsignedInt => component_bounds::<u32>(bytes, &layout, components)?,
                ComponentType::Float => component_bounds::<f32>(bytes, &layout, components)?,
                ComponentType::Double => component_bounds::<f64>(bytes, &layout, components)?,
            }
        };

        let acc = self.accessor_mut(accessor)?;
        acc.min = min;
        acc.max = max;
        Ok(())
    }

    /// Start offset of each buffer when all buffers are concatenated with
    /// every start padded to `alignment`, and the total merged length.
    pub fn merged_buffer_offsets(&self, alignment: usize) -> (Vec<usize>, usize) {
        let mut offsets = Vec::with_capacity(self.buffers.len());
        let mut end = 0;
        for buffer in &self.buffers {
            let start = calculate_buffer_chunk_size(end, alignment);
            offsets.push(start);
            end = start + buffer.len();
        }
        (offsets, end)
    }

    /// Concatenates all buffers into buffer 0 and rebases every buffer view.
    pub fn merge_buffers(&mut self) -> Result<()> {
        self.merge_buffers_aligned(1)
    }

    /// [`merge_buffers`](Self::merge_buffers) with each source buffer
    /// starting at a multiple of `alignment`.
    pub fn merge_buffers_aligned(&mut self, alignment: usize) -> Result<()> {
        if self.buffers.len() <= 1 {
            return Ok(());
        }
        for view in &self.buffer_views {
            self.buffer(view.buffer)?;
        }
        for (index, buffer) in self.buffers.iter().enumerate() {
            check_attached(buffer, index as u32)?;
        }

        let (offsets, total) = self.merged_buffer_offsets(alignment);
        let mut data = Vec::with_capacity(total);
        for (buffer, &start) in self.buffers.iter_mut().zip(&offsets) {
            data.resize(start, 0);
            data.extend_from_slice(&buffer.take_data());
        }

        for view in &mut self.buffer_views {
            view.byte_offset += offsets[view.buffer as usize];
            view.buffer = 0;
        }

        let name = self.buffers[0].name.take();
        let count = self.buffers.len();
        let mut merged = Buffer::from_data(data);
        merged.name = name;
        self.buffers = vec![merged];

        debug!(buffers = count, byte_length = total, alignment, "merged buffers");
        Ok(())
    }
}
