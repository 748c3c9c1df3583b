use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

/// Interleaved quad vertex: `in_vert` at location 0, `in_texcoord` at location 1.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct QuadVertex {
    pub in_vert: [f32; 2],     // clip space
    pub in_texcoord: [f32; 2], // 0..1, v down
}

impl QuadVertex {
    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x2, // in_vert
        1 => Float32x2  // in_texcoord
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Triangle-strip order: bottom-left, bottom-right, top-left, top-right.
pub const QUAD_VERTICES: [QuadVertex; 4] = [
    QuadVertex { in_vert: [-1.0, -1.0], in_texcoord: [0.0, 1.0] },
    QuadVertex { in_vert: [1.0, -1.0], in_texcoord: [1.0, 1.0] },
    QuadVertex { in_vert: [-1.0, 1.0], in_texcoord: [0.0, 0.0] },
    QuadVertex { in_vert: [1.0, 1.0], in_texcoord: [1.0, 0.0] },
];

/// Immutable full-target quad uploaded once at startup.
pub struct QuadMesh {
    vbo: wgpu::Buffer,
}

impl QuadMesh {
    pub fn new(device: &wgpu::Device) -> Self {
        let vbo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("shadeview quad vbo"),
            contents: bytemuck::cast_slice(&QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });
        Self { vbo }
    }

    pub fn vertex_buffer(&self) -> &wgpu::Buffer {
        &self.vbo
    }

    pub fn vertex_count(&self) -> u32 {
        QUAD_VERTICES.len() as u32
    }
}
