//! Vertex layout descriptions.
//!
//! A [`VertexLayout`] describes one interleaved vertex stream: its stride and
//! the attributes packed into each vertex.

use serde::{Deserialize, Serialize};

use super::data::MeshError;

/// What a vertex attribute represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VertexAttributeSemantic {
    /// Object-space position.
    Position,
    /// Surface normal.
    Normal,
    /// Tangent (xyz) with optional handedness in w.
    Tangent,
    /// Vertex color.
    Color,
    /// First UV set.
    TexCoord0,
    /// Second UV set.
    TexCoord1,
    /// Skinning joint indices.
    Joints,
    /// Skinning joint weights.
    Weights,
}

/// Storage format of a vertex attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VertexAttributeFormat {
    /// One f32.
    Float,
    /// Two f32.
    Float2,
    /// Three f32.
    Float3,
    /// Four f32.
    Float4,
    /// Four normalized u8.
    Unorm8x4,
    /// Four u8 (blend indices).
    Uint8x4,
    /// Four u16.
    Uint16x4,
}

impl VertexAttributeFormat {
    /// Size of the attribute in bytes.
    pub fn size(&self) -> usize {
        match self {
            Self::Float => 4,
            Self::Float2 => 8,
            Self::Float3 => 12,
            Self::Float4 => 16,
            Self::Unorm8x4 | Self::Uint8x4 => 4,
            Self::Uint16x4 => 8,
        }
    }
}

/// One attribute inside an interleaved vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VertexAttribute {
    /// What the attribute represents.
    pub semantic: VertexAttributeSemantic,
    /// Storage format.
    pub format: VertexAttributeFormat,
    /// Byte offset inside the vertex.
    pub offset: u32,
}

impl VertexAttribute {
    /// Create a new attribute.
    pub fn new(semantic: VertexAttributeSemantic, format: VertexAttributeFormat, offset: u32) -> Self {
        Self {
            semantic,
            format,
            offset,
        }
    }
}

/// Layout of one interleaved vertex stream.
///
/// Two layouts are equal when stride and attributes match exactly; streams
/// with equal layouts can be concatenated byte-for-byte.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VertexLayout {
    /// Bytes per vertex.
    pub stride: u32,
    /// Attributes in declaration order.
    pub attributes: Vec<VertexAttribute>,
}

impl VertexLayout {
    /// Create an empty layout with the given stride.
    pub fn new(stride: u32) -> Self {
        Self {
            stride,
            attributes: Vec::new(),
        }
    }

    /// Add an attribute.
    #[must_use]
    pub fn with_attribute(mut self, attribute: VertexAttribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Position only (12 bytes per vertex).
    pub fn position_only() -> Self {
        Self::new(12).with_attribute(VertexAttribute::new(
            VertexAttributeSemantic::Position,
            VertexAttributeFormat::Float3,
            0,
        ))
    }

    /// Position + normal + UV (32 bytes per vertex).
    pub fn position_normal_uv() -> Self {
        Self::new(32)
            .with_attribute(VertexAttribute::new(
                VertexAttributeSemantic::Position,
                VertexAttributeFormat::Float3,
                0,
            ))
            .with_attribute(VertexAttribute::new(
                VertexAttributeSemantic::Normal,
                VertexAttributeFormat::Float3,
                12,
            ))
            .with_attribute(VertexAttribute::new(
                VertexAttributeSemantic::TexCoord0,
                VertexAttributeFormat::Float2,
                24,
            ))
    }

    /// Position + UV (20 bytes per vertex).
    pub fn position_uv() -> Self {
        Self::new(20)
            .with_attribute(VertexAttribute::new(
                VertexAttributeSemantic::Position,
                VertexAttributeFormat::Float3,
                0,
            ))
            .with_attribute(VertexAttribute::new(
                VertexAttributeSemantic::TexCoord0,
                VertexAttributeFormat::Float2,
                12,
            ))
    }

    /// Bytes per vertex.
    pub fn stride(&self) -> usize {
        self.stride as usize
    }

    /// Find the first attribute with the given semantic.
    pub fn attribute(&self, semantic: VertexAttributeSemantic) -> Option<&VertexAttribute> {
        self.attributes.iter().find(|a| a.semantic == semantic)
    }

    /// Check that the stride is non-zero and every attribute fits in it.
    pub fn validate(&self) -> Result<(), MeshError> {
        if self.stride == 0 {
            return Err(MeshError::InvalidLayout("stride is zero".into()));
        }
        for attr in &self.attributes {
            let end = attr.offset as usize + attr.format.size();
            if end > self.stride() {
                return Err(MeshError::InvalidLayout(format!(
                    "{:?} ends at byte {end}, past stride {}",
                    attr.semantic, self.stride
                )));
            }
        }
        Ok(())
    }
}
