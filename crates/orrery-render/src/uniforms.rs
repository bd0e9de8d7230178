//! Dynamic-offset uniform ring
//!
//! Every draw of a frame gets its own [`DrawUniforms`] slot, and all slots
//! are uploaded with a single buffer write before any pass is encoded.

use std::mem::size_of;

use crate::gpu_types::DrawUniforms;
use crate::slots::UNIFORM_BINDING;

/// Starting capacity in draws; grows on demand.
const INITIAL_SLOTS: usize = 16;

/// Round `size` up to the device's dynamic offset alignment.
pub fn aligned_stride(size: u64, alignment: u64) -> u64 {
    let alignment = alignment.max(1);
    size.div_ceil(alignment) * alignment
}

/// Lay blocks out `stride` bytes apart; the gaps are zeroed.
pub fn pack_strided(blocks: &[DrawUniforms], stride: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; blocks.len() * stride];
    for (chunk, block) in bytes.chunks_exact_mut(stride).zip(blocks) {
        chunk[..size_of::<DrawUniforms>()].copy_from_slice(bytemuck::bytes_of(block));
    }
    bytes
}

pub struct UniformRing {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    stride: u64,
    capacity: usize,
}

impl UniformRing {
    pub fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout) -> Self {
        let alignment = device.limits().min_uniform_buffer_offset_alignment as u64;
        let stride = aligned_stride(size_of::<DrawUniforms>() as u64, alignment);
        let (buffer, bind_group) = Self::allocate(device, layout, stride, INITIAL_SLOTS);

        Self {
            buffer,
            bind_group,
            stride,
            capacity: INITIAL_SLOTS,
        }
    }

    fn allocate(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        stride: u64,
        slots: usize,
    ) -> (wgpu::Buffer, wgpu::BindGroup) {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Draw Uniform Ring"),
            size: stride * slots as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Draw Uniform Bind Group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: UNIFORM_BINDING,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(size_of::<DrawUniforms>() as u64),
                }),
            }],
        });
        (buffer, bind_group)
    }

    /// Upload one frame's blocks, reallocating if the frame has more draws
    /// than the ring has slots.
    pub fn write(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        blocks: &[DrawUniforms],
    ) {
        if blocks.len() > self.capacity {
            let slots = blocks.len().next_power_of_two();
            tracing::debug!("Growing uniform ring to {slots} slots");
            (self.buffer, self.bind_group) = Self::allocate(device, layout, self.stride, slots);
            self.capacity = slots;
        }
        queue.write_buffer(&self.buffer, 0, &pack_strided(blocks, self.stride as usize));
    }

    pub fn offset(&self, slot: usize) -> u32 {
        (slot as u64 * self.stride) as u32
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slots::RenderMode;
    use glam::Mat4;

    #[test]
    fn test_stride_rounds_up_to_alignment() {
        assert_eq!(aligned_stride(352, 256), 512);
        assert_eq!(aligned_stride(512, 256), 512);
        assert_eq!(aligned_stride(352, 0), 352);
    }

    #[test]
    fn test_blocks_land_at_their_offsets() {
        let a = DrawUniforms::new(RenderMode::Sky, Mat4::IDENTITY, Mat4::IDENTITY, Mat4::IDENTITY);
        let b = DrawUniforms::new(RenderMode::Clouds, Mat4::IDENTITY, Mat4::IDENTITY, Mat4::IDENTITY);
        let bytes = pack_strided(&[a, b], 512);

        assert_eq!(bytes.len(), 1024);
        assert_eq!(&bytes[..352], bytemuck::bytes_of(&a));
        assert!(bytes[352..512].iter().all(|&byte| byte == 0));
        assert_eq!(&bytes[512..864], bytemuck::bytes_of(&b));
    }
}
