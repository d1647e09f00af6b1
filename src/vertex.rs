use bytemuck::{Pod, Zeroable};

use crate::math::Vector;

/// RGBA color with straight (non-premultiplied) alpha.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const RED: Color = Color::new(1.0, 0.2, 0.2, 1.0);
    pub const GREEN: Color = Color::new(0.2, 1.0, 0.2, 1.0);
    pub const BLUE: Color = Color::new(0.2, 0.2, 1.0, 1.0);
    pub const YELLOW: Color = Color::new(1.0, 0.9, 0.2, 1.0);
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

/// One vertex as uploaded to the GPU: position at location 0, color at
/// location 1. Layout must stay in sync with `shader.wgsl`.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct Vertex {
    pub position: Vector,
    pub color: Color,
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x4];

    pub const fn new(position: Vector, color: Color) -> Self {
        Self { position, color }
    }

    pub fn layout<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::mem::offset_of;

    #[test]
    fn gpu_layout_matches_struct() {
        // 3 floats of position + 4 of color, no padding.
        assert_eq!(size_of::<Vertex>(), 28);
        assert_eq!(offset_of!(Vertex, position), 0);
        assert_eq!(offset_of!(Vertex, color), 12);

        let layout = Vertex::layout();
        assert_eq!(layout.array_stride, 28);
        assert_eq!(layout.attributes.len(), 2);
        assert_eq!(layout.attributes[1].offset, 12);
    }
}
