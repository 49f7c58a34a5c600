use bytemuck::{Pod, Zeroable};
use std::fmt;

/// One named attribute of a vertex.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VertexComponent {
    pub name: String,
    pub format: wgpu::VertexFormat,
}

impl VertexComponent {
    pub fn new(name: impl Into<String>, format: wgpu::VertexFormat) -> Self {
        Self {
            name: name.into(),
            format,
        }
    }
}

/// Ordered, tightly packed vertex layout.
///
/// Geometry pools only share a buffer between allocations of equal formats.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct VertexFormat {
    components: Vec<VertexComponent>,
}

impl VertexFormat {
    pub fn new(components: Vec<VertexComponent>) -> Self {
        Self { components }
    }

    pub fn components(&self) -> &[VertexComponent] {
        &self.components
    }

    /// Size of one vertex in bytes.
    pub fn stride(&self) -> usize {
        self.components
            .iter()
            .map(|c| c.format.size() as usize)
            .sum()
    }

    /// wgpu attributes with packed offsets and consecutive shader locations.
    pub fn attributes(&self) -> Vec<wgpu::VertexAttribute> {
        let mut offset = 0;
        self.components
            .iter()
            .enumerate()
            .map(|(location, component)| {
                let attribute = wgpu::VertexAttribute {
                    format: component.format,
                    offset,
                    shader_location: location as u32,
                };
                offset += component.format.size();
                attribute
            })
            .collect()
    }

    pub fn layout<'a>(&self, attributes: &'a [wgpu::VertexAttribute]) -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: self.stride() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes,
        }
    }
}

impl fmt::Display for VertexFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, component) in self.components.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}:{}", short_format_name(component.format), component.name)?;
        }
        Ok(())
    }
}

fn short_format_name(format: wgpu::VertexFormat) -> String {
    use wgpu::VertexFormat as F;
    match format {
        F::Float32 => "1f".into(),
        F::Float32x2 => "2f".into(),
        F::Float32x3 => "3f".into(),
        F::Float32x4 => "4f".into(),
        F::Uint32 => "1u".into(),
        F::Uint8x4 => "4ub".into(),
        F::Unorm8x4 => "4ubn".into(),
        other => format!("{other:?}"),
    }
}

/// Mesh vertex.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable, Debug)]
pub struct Vertex {
    pub pos: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    pub fn format() -> VertexFormat {
        VertexFormat::new(vec![
            VertexComponent::new("position", wgpu::VertexFormat::Float32x3),
            VertexComponent::new("normal", wgpu::VertexFormat::Float32x3),
            VertexComponent::new("uv", wgpu::VertexFormat::Float32x2),
        ])
    }
}

/// Vertex used for camera-facing sprites.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable, Debug, PartialEq)]
pub struct SpriteVertex {
    pub pos: [f32; 3],
    pub uv: [f32; 2],
}

impl SpriteVertex {
    pub fn format() -> VertexFormat {
        VertexFormat::new(vec![
            VertexComponent::new("position", wgpu::VertexFormat::Float32x3),
            VertexComponent::new("uv", wgpu::VertexFormat::Float32x2),
        ])
    }
}
