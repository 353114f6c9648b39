use crate::bmpdepth::BmpDepth;
use crate::error::{Error, Result};
use crate::fields::{
    bytes_at, pack_bgr, pack_rgb, u16_le_at, u32_be_at, u32_le_at, u8_at,
};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

//===========================================================================//

// The signatures that PNG and BMP files start with.
const PNG_SIGNATURE: &[u8] = &[0x89, b'P', b'N', b'G'];
const BMP_SIGNATURE: &[u8] = b"BM";

// Offsets into a PNG file (signature, then the IHDR chunk):
const PNG_CHUNK_TYPE_OFFSET: usize = 12;
const PNG_WIDTH_OFFSET: usize = 16;
const PNG_HEIGHT_OFFSET: usize = 20;
const PNG_BIT_DEPTH_OFFSET: usize = 24;
const PNG_COLOR_TYPE_OFFSET: usize = 25;
const PNG_CHUNK_IHDR: &[u8] = b"IHDR";

// Offsets into a BMP file (BITMAPFILEHEADER, then BITMAPINFOHEADER):
const BMP_PIXEL_OFFSET_OFFSET: usize = 10;
const BMP_WIDTH_OFFSET: usize = 18;
const BMP_HEIGHT_OFFSET: usize = 22;
const BMP_BITS_PER_PIXEL_OFFSET: usize = 28;
const BMP_COMPRESSION_OFFSET: usize = 30;
const BMP_BI_RGB: u32 = 0;

/// The size of the BITMAPINFOHEADER struct written for embedded bitmaps, in
/// bytes.
pub(crate) const BMP_HEADER_LEN: u32 = 40;

// Size limits for images in a container:
const MIN_DIMENSION: u32 = 1;
const MAX_DIMENSION: u32 = 256;

//===========================================================================//

/// The format a source image was decoded from.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub enum SourceKind {
    /// A PNG file, embedded in the container unmodified.
    Png,
    /// An uncompressed BMP file, embedded as a bitmap plus an AND mask.
    Bmp,
}

//===========================================================================//

/// How the AND mask of a 24- or 32-bit BMP source is built.
///
/// Masks for 1-bit sources are always the inverted pixel data, and masks for
/// 4-, 8- and 16-bit sources are always zero, whatever the policy.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub enum MaskPolicy {
    /// Every pixel is opaque; the mask is all zero bytes.
    #[default]
    Opaque,
    /// Pixels whose RGB color equals this one are transparent.  Alpha is
    /// ignored.  Each mask byte covers 8 pixels, most significant bit first:
    /// the first pixel of the group sets bit 7.
    ColorKey {
        /// Red component of the transparent color.
        red: u8,
        /// Green component of the transparent color.
        green: u8,
        /// Blue component of the transparent color.
        blue: u8,
    },
}

//===========================================================================//

/// One decoded source image, ready to be placed in a container.
#[derive(Clone, Debug)]
pub struct SourceImage {
    kind: SourceKind,
    width: u32,
    height: u32,
    bits_per_pixel: u16,
    pixel_size: usize,
    mask_size: usize,
    payload: Vec<u8>,
}

impl SourceImage {
    /// Determines whether `data` holds a PNG or a BMP file by looking at its
    /// signature.  Returns a `FileUnsupported` error for anything else.
    pub fn classify(data: &[u8]) -> Result<SourceKind> {
        if data.starts_with(PNG_SIGNATURE) {
            Ok(SourceKind::Png)
        } else if data.starts_with(BMP_SIGNATURE) {
            Ok(SourceKind::Bmp)
        } else {
            unsupported!("Source is neither a PNG nor a BMP file")
        }
    }

    /// Classifies `data` and decodes it as a PNG or BMP file.  The
    /// `mask_policy` only affects 24- and 32-bit BMP sources.
    pub fn decode(data: &[u8], mask_policy: MaskPolicy) -> Result<SourceImage> {
        match SourceImage::classify(data)? {
            SourceKind::Png => SourceImage::read_png(data),
            SourceKind::Bmp => SourceImage::read_bmp(data, mask_policy),
        }
    }

    /// Reads the IHDR chunk of a PNG file and keeps the whole file as the
    /// payload.  Only 8-bit RGBA images of at most 256x256 are accepted.
    pub fn read_png(data: &[u8]) -> Result<SourceImage> {
        if !data.starts_with(PNG_SIGNATURE) {
            unsupported!("Missing PNG signature");
        }
        let chunk_type = bytes_at(data, PNG_CHUNK_TYPE_OFFSET, 4)?;
        if chunk_type != PNG_CHUNK_IHDR {
            unsupported!("First PNG chunk is not IHDR");
        }
        let width = u32_be_at(data, PNG_WIDTH_OFFSET)?;
        let height = u32_be_at(data, PNG_HEIGHT_OFFSET)?;
        if width > MAX_DIMENSION || height > MAX_DIMENSION {
            unsupported!(
                "PNG is too large (was {}x{}, but max is {}x{})",
                width,
                height,
                MAX_DIMENSION,
                MAX_DIMENSION
            );
        }
        if width < MIN_DIMENSION || height < MIN_DIMENSION {
            unsupported!("PNG has an empty dimension ({}x{})", width, height);
        }
        let bit_depth = u8_at(data, PNG_BIT_DEPTH_OFFSET)?;
        let color_type = u8_at(data, PNG_COLOR_TYPE_OFFSET)?;
        let bits_per_pixel = png_bits_per_pixel(bit_depth, color_type);
        // The container's PNG path expects ARGB32-compatible data.
        if bits_per_pixel != 32 {
            unsupported!(
                "Unsupported PNG depth (bit depth {}, color type {} gives {} \
                 bpp, but must be 32)",
                bit_depth,
                color_type,
                bits_per_pixel
            );
        }
        Ok(SourceImage {
            kind: SourceKind::Png,
            width,
            height,
            bits_per_pixel,
            pixel_size: data.len(),
            mask_size: 0,
            payload: data.to_vec(),
        })
    }

    /// Reads an uncompressed BMP file.  Dimensions above 256 are clamped to
    /// 256 and the bits-per-pixel to 32.  The pixel bytes are copied as-is
    /// and followed by a synthesized AND mask.
    pub fn read_bmp(data: &[u8], mask_policy: MaskPolicy) -> Result<SourceImage> {
        if !data.starts_with(BMP_SIGNATURE) {
            unsupported!("Missing BMP signature");
        }
        let pixel_offset = u32_le_at(data, BMP_PIXEL_OFFSET_OFFSET)? as usize;
        let width = u32_le_at(data, BMP_WIDTH_OFFSET)?.min(MAX_DIMENSION);
        let height = u32_le_at(data, BMP_HEIGHT_OFFSET)?.min(MAX_DIMENSION);
        let header_bits = u16_le_at(data, BMP_BITS_PER_PIXEL_OFFSET)?;
        let compression = u32_le_at(data, BMP_COMPRESSION_OFFSET)?;
        // JPEG- and PNG-compressed bitmaps store a bit count of zero, so this
        // must come before the depth check.
        if compression != BMP_BI_RGB {
            return Err(Error::CompressionUnsupported(compression));
        }
        if width < MIN_DIMENSION || height < MIN_DIMENSION {
            unsupported!("BMP has an empty dimension ({}x{})", width, height);
        }
        let depth = match BmpDepth::from_header_bits(header_bits) {
            Some(depth) => depth,
            None => {
                unsupported!("Unsupported BMP bits-per-pixel ({})", header_bits)
            }
        };
        let bits_per_pixel = depth.bits_per_pixel();
        let num_pixels = (width as usize) * (height as usize);
        let pixel_size = num_pixels * (bits_per_pixel as usize) / 8;
        let mask_size = num_pixels / 8;
        let pixels = bytes_at(data, pixel_offset, pixel_size)?;
        let mut payload = Vec::with_capacity(pixel_size + mask_size);
        payload.extend_from_slice(pixels);
        write_mask(depth, pixels, mask_size, mask_policy, &mut payload);
        debug_assert_eq!(payload.len(), pixel_size + mask_size);
        Ok(SourceImage {
            kind: SourceKind::Bmp,
            width,
            height,
            bits_per_pixel,
            pixel_size,
            mask_size,
            payload,
        })
    }

    /// Returns the format this image was decoded from.
    pub fn source_kind(&self) -> SourceKind {
        self.kind
    }

    /// Returns true if the image came from a PNG file.
    pub fn is_png(&self) -> bool {
        self.kind == SourceKind::Png
    }

    /// Returns the width of the image, in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the height of the image, in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the bits-per-pixel (color depth) of the image.
    pub fn bits_per_pixel(&self) -> u16 {
        self.bits_per_pixel
    }

    /// Returns the number of color planes, which is always 1.
    pub fn plane_count(&self) -> u16 {
        1
    }

    /// Returns the length of the pixel data: the whole file for PNG sources.
    pub fn pixel_size(&self) -> usize {
        self.pixel_size
    }

    /// Returns the length of the AND mask (zero for PNG sources).
    pub fn mask_size(&self) -> usize {
        self.mask_size
    }

    /// Returns the pixel bytes followed by the mask bytes.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Returns just the pixel bytes of the payload.
    pub fn pixel_data(&self) -> &[u8] {
        &self.payload[..self.pixel_size]
    }

    /// Returns just the mask bytes of the payload.
    pub fn mask_data(&self) -> &[u8] {
        &self.payload[self.pixel_size..]
    }

    /// Returns the number of bytes this image occupies in a container.
    pub fn container_entry_size(&self) -> usize {
        match self.kind {
            SourceKind::Png => self.pixel_size,
            SourceKind::Bmp => {
                BMP_HEADER_LEN as usize + self.pixel_size + self.mask_size
            }
        }
    }
}

//===========================================================================//

fn png_bits_per_pixel(bit_depth: u8, color_type: u8) -> u16 {
    let bit_depth = bit_depth as u16;
    match color_type {
        0 | 3 => bit_depth,
        2 => bit_depth * 3,
        4 => bit_depth * 2,
        6 => bit_depth * 4,
        _ => 0,
    }
}

/// Appends `mask_size` AND-mask bytes, each covering 8 pixels.
fn write_mask(
    depth: BmpDepth,
    pixels: &[u8],
    mask_size: usize,
    mask_policy: MaskPolicy,
    mask: &mut Vec<u8>,
) {
    match (depth, mask_policy) {
        (BmpDepth::One, _) => {
            // At 1 bpp each pixel byte already covers 8 pixels.
            mask.extend(pixels.iter().take(mask_size).map(|&byte| !byte));
        }
        (BmpDepth::Four, _) | (BmpDepth::Eight, _) | (BmpDepth::Sixteen, _) => {
            // Palette and 16-bit masks are not supported.
            mask.resize(mask.len() + mask_size, 0);
        }
        (_, MaskPolicy::Opaque) => {
            mask.resize(mask.len() + mask_size, 0);
        }
        (_, MaskPolicy::ColorKey { red, green, blue }) => {
            let key = pack_rgb(red, green, blue);
            let stride = depth.true_color_bytes().unwrap_or(4);
            for group in pixels.chunks_exact(8 * stride).take(mask_size) {
                let mut byte = 0u8;
                for (bit, pixel) in group.chunks_exact(stride).enumerate() {
                    if pack_bgr(pixel) == key {
                        byte |= 1 << (7 - bit);
                    }
                }
                mask.push(byte);
            }
        }
    }
}

//===========================================================================//

#[cfg(test)]
mod tests {
    use super::{MaskPolicy, SourceImage, SourceKind};
    use crate::error::ErrorKind;
    use byteorder::{BigEndian, LittleEndian, WriteBytesExt};

    fn bmp(
        width: u32,
        height: u32,
        bpp: u16,
        compression: u32,
        pixels: &[u8],
    ) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(b"BM");
        data.write_u32::<LittleEndian>(54 + pixels.len() as u32).unwrap();
        data.write_u32::<LittleEndian>(0).unwrap();
        data.write_u32::<LittleEndian>(54).unwrap();
        data.write_u32::<LittleEndian>(40).unwrap();
        data.write_u32::<LittleEndian>(width).unwrap();
        data.write_u32::<LittleEndian>(height).unwrap();
        data.write_u16::<LittleEndian>(1).unwrap();
        data.write_u16::<LittleEndian>(bpp).unwrap();
        data.write_u32::<LittleEndian>(compression).unwrap();
        data.extend_from_slice(&[0; 20]);
        assert_eq!(data.len(), 54);
        data.extend_from_slice(pixels);
        data
    }

    fn png_header(width: u32, height: u32, depth: u8, color: u8) -> Vec<u8> {
        let mut data = b"\x89PNG\r\n\x1a\n\x00\x00\x00\x0dIHDR".to_vec();
        data.write_u32::<BigEndian>(width).unwrap();
        data.write_u32::<BigEndian>(height).unwrap();
        data.extend_from_slice(&[depth, color, 0, 0, 0]);
        data.extend_from_slice(b"\x00\x00\x00\x00");
        data
    }

    #[test]
    fn classify_by_signature() {
        assert_eq!(
            SourceImage::classify(b"\x89PNG\r\n\x1a\n").unwrap(),
            SourceKind::Png
        );
        assert_eq!(SourceImage::classify(b"BM\x00\x00").unwrap(), SourceKind::Bmp);
        let error = SourceImage::classify(b"GIF89a").unwrap_err();
        assert!(error.is(ErrorKind::FileUnsupported));
        assert!(SourceImage::classify(b"B").is_err());
    }

    #[test]
    fn png_depths_from_color_type() {
        assert_eq!(super::png_bits_per_pixel(8, 0), 8);
        assert_eq!(super::png_bits_per_pixel(4, 3), 4);
        assert_eq!(super::png_bits_per_pixel(8, 2), 24);
        assert_eq!(super::png_bits_per_pixel(8, 4), 16);
        assert_eq!(super::png_bits_per_pixel(8, 6), 32);
        assert_eq!(super::png_bits_per_pixel(8, 5), 0);
    }

    #[test]
    fn read_png_header_only() {
        let data = png_header(48, 32, 8, 6);
        let image = SourceImage::read_png(&data).unwrap();
        assert!(image.is_png());
        assert_eq!(image.width(), 48);
        assert_eq!(image.height(), 32);
        assert_eq!(image.bits_per_pixel(), 32);
        assert_eq!(image.plane_count(), 1);
        assert_eq!(image.pixel_size(), data.len());
        assert_eq!(image.mask_size(), 0);
        assert_eq!(image.payload(), data.as_slice());
        assert_eq!(image.container_entry_size(), data.len());
    }

    #[test]
    fn png_at_size_limit_is_accepted() {
        let data = png_header(256, 256, 8, 6);
        let image = SourceImage::read_png(&data).unwrap();
        assert_eq!((image.width(), image.height()), (256, 256));
    }

    #[test]
    fn oversized_png_is_rejected() {
        let error = SourceImage::read_png(&png_header(257, 16, 8, 6)).unwrap_err();
        assert!(error.is(ErrorKind::FileUnsupported));
        assert!(SourceImage::read_png(&png_header(16, 300, 8, 6)).is_err());
    }

    #[test]
    fn png_without_alpha_is_rejected() {
        let error = SourceImage::read_png(&png_header(16, 16, 8, 2)).unwrap_err();
        assert!(error.is(ErrorKind::FileUnsupported));
        assert!(SourceImage::read_png(&png_header(16, 16, 16, 6)).is_err());
        assert!(SourceImage::read_png(&png_header(16, 16, 8, 3)).is_err());
    }

    #[test]
    fn png_without_ihdr_is_rejected() {
        let mut data = png_header(16, 16, 8, 6);
        data[12..16].copy_from_slice(b"IDAT");
        let error = SourceImage::read_png(&data).unwrap_err();
        assert!(error.is(ErrorKind::FileUnsupported));
    }

    #[test]
    fn truncated_png_is_rejected() {
        let data = png_header(16, 16, 8, 6);
        assert!(SourceImage::read_png(&data[..20]).is_err());
    }

    #[test]
    fn read_bmp_24bpp_opaque() {
        let pixels: Vec<u8> = (0..(8 * 2 * 3)).map(|n| n as u8).collect();
        let data = bmp(8, 2, 24, 0, &pixels);
        let image = SourceImage::read_bmp(&data, MaskPolicy::Opaque).unwrap();
        assert_eq!(image.source_kind(), SourceKind::Bmp);
        assert_eq!(image.width(), 8);
        assert_eq!(image.height(), 2);
        assert_eq!(image.bits_per_pixel(), 24);
        assert_eq!(image.pixel_size(), 48);
        assert_eq!(image.mask_size(), 2);
        assert_eq!(image.pixel_data(), pixels.as_slice());
        assert_eq!(image.mask_data(), b"\x00\x00");
        assert_eq!(image.payload().len(), 50);
        assert_eq!(image.container_entry_size(), 40 + 48 + 2);
    }

    #[test]
    fn read_bmp_1bpp_inverts_pixels() {
        let pixels: &[u8] = b"\x0f\xf0\x55\x00\xff\xaa\x81\x3c";
        let data = bmp(8, 8, 1, 0, pixels);
        let image = SourceImage::read_bmp(&data, MaskPolicy::Opaque).unwrap();
        assert_eq!(image.pixel_size(), 8);
        assert_eq!(image.mask_size(), 8);
        assert_eq!(image.mask_data(), b"\xf0\x0f\xaa\xff\x00\x55\x7e\xc3");
    }

    #[test]
    fn read_bmp_palette_masks_are_zero() {
        for &bpp in &[4u16, 8, 16] {
            let pixel_size = 16 * (bpp as usize) / 8;
            let pixels = vec![0xff; pixel_size];
            let data = bmp(4, 4, bpp, 0, &pixels);
            let policy = MaskPolicy::ColorKey { red: 255, green: 255, blue: 255 };
            let image = SourceImage::read_bmp(&data, policy).unwrap();
            assert_eq!(image.pixel_size(), pixel_size);
            assert_eq!(image.mask_data(), b"\x00\x00");
        }
    }

    #[test]
    fn color_key_marks_matching_pixels() {
        // Eight 32-bit BGRA pixels; pixels 0 and 5 are magenta.
        let mut pixels = Vec::new();
        for index in 0..8 {
            if index == 0 || index == 5 {
                pixels.extend_from_slice(&[0xff, 0x00, 0xff, 0x12]);
            } else {
                pixels.extend_from_slice(&[0xff, 0x00, 0xfe, 0xff]);
            }
        }
        let data = bmp(8, 1, 32, 0, &pixels);
        let policy = MaskPolicy::ColorKey { red: 0xff, green: 0, blue: 0xff };
        let image = SourceImage::read_bmp(&data, policy).unwrap();
        assert_eq!(image.mask_data(), b"\x84");
        let image = SourceImage::read_bmp(&data, MaskPolicy::Opaque).unwrap();
        assert_eq!(image.mask_data(), b"\x00");
    }

    #[test]
    fn color_key_on_24bpp_pixels() {
        // Sixteen 24-bit BGR pixels; only the last one is white.
        let mut pixels = vec![0u8; 15 * 3];
        pixels.extend_from_slice(&[0xff, 0xff, 0xff]);
        let data = bmp(4, 4, 24, 0, &pixels);
        let policy = MaskPolicy::ColorKey { red: 0xff, green: 0xff, blue: 0xff };
        let image = SourceImage::read_bmp(&data, policy).unwrap();
        assert_eq!(image.mask_data(), b"\x00\x01");
    }

    #[test]
    fn oversized_bmp_is_clamped() {
        let data = bmp(300, 300, 32, 0, &vec![0; 256 * 256 * 4]);
        let image = SourceImage::read_bmp(&data, MaskPolicy::Opaque).unwrap();
        assert_eq!(image.width(), 256);
        assert_eq!(image.height(), 256);
        assert_eq!(image.pixel_size(), 256 * 256 * 4);
        assert_eq!(image.mask_size(), 256 * 256 / 8);
    }

    #[test]
    fn deep_bmp_is_clamped_to_32bpp() {
        let data = bmp(2, 2, 48, 0, &[0; 16]);
        let image = SourceImage::read_bmp(&data, MaskPolicy::Opaque).unwrap();
        assert_eq!(image.bits_per_pixel(), 32);
        assert_eq!(image.pixel_size(), 16);
    }

    #[test]
    fn compressed_bmp_is_rejected() {
        let data = bmp(2, 2, 8, 1, &[0; 4]);
        let error = SourceImage::read_bmp(&data, MaskPolicy::Opaque).unwrap_err();
        assert!(error.is(ErrorKind::FileUnsupported));
        assert!(error.is(ErrorKind::CompressionUnsupported));
    }

    #[test]
    fn png_compressed_bmp_with_zero_depth_reports_compression() {
        // BI_PNG bitmaps leave the bit count at zero.
        let data = bmp(4, 4, 0, 5, &[0; 16]);
        let error = SourceImage::read_bmp(&data, MaskPolicy::Opaque).unwrap_err();
        assert!(error.is(ErrorKind::FileUnsupported));
        assert!(error.is(ErrorKind::CompressionUnsupported));
        let data = bmp(0, 4, 0, 4, &[]);
        let error = SourceImage::decode(&data, MaskPolicy::Opaque).unwrap_err();
        assert!(error.is(ErrorKind::CompressionUnsupported));
    }

    #[test]
    fn bmp_with_odd_depth_is_rejected() {
        let data = bmp(2, 2, 2, 0, &[0; 4]);
        let error = SourceImage::read_bmp(&data, MaskPolicy::Opaque).unwrap_err();
        assert!(error.is(ErrorKind::FileUnsupported));
        assert!(!error.is(ErrorKind::CompressionUnsupported));
    }

    #[test]
    fn bmp_with_zero_width_is_rejected() {
        let data = bmp(0, 2, 24, 0, &[]);
        assert!(SourceImage::read_bmp(&data, MaskPolicy::Opaque).is_err());
    }

    #[test]
    fn truncated_bmp_pixels_are_rejected() {
        let data = bmp(4, 4, 32, 0, &[0; 10]);
        let error = SourceImage::read_bmp(&data, MaskPolicy::Opaque).unwrap_err();
        assert!(error.is(ErrorKind::FileUnsupported));
    }

    #[test]
    fn decode_dispatches_on_signature() {
        let image =
            SourceImage::decode(&png_header(16, 16, 8, 6), MaskPolicy::Opaque)
                .unwrap();
        assert!(image.is_png());
        let image =
            SourceImage::decode(&bmp(8, 1, 24, 0, &[0; 24]), MaskPolicy::Opaque)
                .unwrap();
        assert!(!image.is_png());
        assert!(SourceImage::decode(b"RIFF....", MaskPolicy::Opaque).is_err());
    }
}

//===========================================================================//
