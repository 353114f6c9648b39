//! Fixed-offset field extraction and color packing.

use crate::error::Result;
use byteorder::{BigEndian, ByteOrder, LittleEndian};

//===========================================================================//

/// Returns the `len` bytes starting at `offset`, or a `FileUnsupported`
/// error if the buffer is too short.
pub(crate) fn bytes_at(
    data: &[u8],
    offset: usize,
    len: usize,
) -> Result<&[u8]> {
    match data.get(offset..offset.saturating_add(len)) {
        Some(bytes) => Ok(bytes),
        None => unsupported!(
            "Truncated header (needed {} bytes at offset {}, but only {} \
             bytes are available)",
            len,
            offset,
            data.len()
        ),
    }
}

pub(crate) fn u8_at(data: &[u8], offset: usize) -> Result<u8> {
    Ok(bytes_at(data, offset, 1)?[0])
}

pub(crate) fn u16_le_at(data: &[u8], offset: usize) -> Result<u16> {
    Ok(LittleEndian::read_u16(bytes_at(data, offset, 2)?))
}

pub(crate) fn u32_le_at(data: &[u8], offset: usize) -> Result<u32> {
    Ok(LittleEndian::read_u32(bytes_at(data, offset, 4)?))
}

pub(crate) fn u32_be_at(data: &[u8], offset: usize) -> Result<u32> {
    Ok(BigEndian::read_u32(bytes_at(data, offset, 4)?))
}

/// Packs an RGB triple into `0x00RRGGBB`.
pub(crate) fn pack_rgb(red: u8, green: u8, blue: u8) -> u32 {
    ((red as u32) << 16) | ((green as u32) << 8) | (blue as u32)
}

/// Packs the RGB part of a BMP pixel, stored as blue, green, red (and an
/// ignored fourth byte for 32 bpp), into `0x00RRGGBB`.
pub(crate) fn pack_bgr(pixel: &[u8]) -> u32 {
    pack_rgb(pixel[2], pixel[1], pixel[0])
}

//===========================================================================//


//===========================================================================//
