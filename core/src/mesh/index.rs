//! Index encoding helpers.

use super::data::{BufferData, DrawData, IndexBufferBinding, IndexFormat, MeshError};

/// Maximum vertex count addressable by 16-bit indices.
pub const U16_VERTEX_LIMIT: usize = 1 << 16;

/// Decode raw index bytes, widening to u32.
///
/// Trailing bytes that do not form a whole index are ignored.
pub fn decode_indices(bytes: &[u8], format: IndexFormat) -> Vec<u32> {
    match format {
        IndexFormat::Uint16 => bytes
            .chunks_exact(2)
            .map(|c| bytemuck::pod_read_unaligned::<u16>(c) as u32)
            .collect(),
        IndexFormat::Uint32 => bytes
            .chunks_exact(4)
            .map(bytemuck::pod_read_unaligned::<u32>)
            .collect(),
    }
}

/// Encode indices with the given width.
///
/// Values above `u16::MAX` are truncated for [`IndexFormat::Uint16`]; pick
/// the format with [`smallest_format`] first.
pub fn encode_indices(indices: &[u32], format: IndexFormat) -> Vec<u8> {
    match format {
        IndexFormat::Uint16 => {
            let narrow: Vec<u16> = indices.iter().map(|&i| i as u16).collect();
            bytemuck::cast_slice(&narrow).to_vec()
        }
        IndexFormat::Uint32 => bytemuck::cast_slice(indices).to_vec(),
    }
}

/// Narrowest format able to hold every index.
pub fn smallest_format(indices: &[u32]) -> IndexFormat {
    if indices.iter().all(|&i| i <= u16::MAX as u32) {
        IndexFormat::Uint16
    } else {
        IndexFormat::Uint32
    }
}

/// Rewrite a 32-bit index stream as 16-bit when every index fits.
///
/// The narrowed indices go to a new buffer appended to `buffers`; the old
/// buffer is left in place. Returns whether the draw was rewritten.
pub fn compact_index_buffer(
    draw: &mut DrawData,
    buffers: &mut Vec<BufferData>,
) -> Result<bool, MeshError> {
    let Some(binding) = &draw.index_buffer else {
        return Ok(false);
    };
    if !binding.is_32bit() {
        return Ok(false);
    }

    let indices = binding.indices(buffers)?;
    if smallest_format(&indices) != IndexFormat::Uint16 {
        return Ok(false);
    }

    buffers.push(BufferData::index(encode_indices(
        &indices,
        IndexFormat::Uint16,
    )));
    draw.index_buffer = Some(IndexBufferBinding {
        buffer: buffers.len() - 1,
        format: IndexFormat::Uint16,
        offset: 0,
        count: indices.len() as u32,
    });
    Ok(true)
}
