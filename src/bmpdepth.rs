//===========================================================================//

// Depths above this are clamped down to it.
pub(crate) const MAX_BITS_PER_PIXEL: u16 = 32;

//===========================================================================//

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum BmpDepth {
    One,
    Four,
    Eight,
    Sixteen,
    TwentyFour,
    ThirtyTwo,
}

impl BmpDepth {
    /// Interprets a header's bits-per-pixel after clamping it to
    /// `MAX_BITS_PER_PIXEL`.
    pub(crate) fn from_header_bits(bits_per_pixel: u16) -> Option<BmpDepth> {
        BmpDepth::from_bits_per_pixel(bits_per_pixel.min(MAX_BITS_PER_PIXEL))
    }

    pub(crate) fn from_bits_per_pixel(
        bits_per_pixel: u16,
    ) -> Option<BmpDepth> {
        match bits_per_pixel {
            1 => Some(BmpDepth::One),
            4 => Some(BmpDepth::Four),
            8 => Some(BmpDepth::Eight),
            16 => Some(BmpDepth::Sixteen),
            24 => Some(BmpDepth::TwentyFour),
            32 => Some(BmpDepth::ThirtyTwo),
            _ => None,
        }
    }

    pub(crate) fn bits_per_pixel(&self) -> u16 {
        match *self {
            BmpDepth::One => 1,
            BmpDepth::Four => 4,
            BmpDepth::Eight => 8,
            BmpDepth::Sixteen => 16,
            BmpDepth::TwentyFour => 24,
            BmpDepth::ThirtyTwo => 32,
        }
    }

    /// Returns the number of bytes per pixel for depths that store whole
    /// bytes of RGB(A) color, or `None` for palette and 16-bit depths.
    pub(crate) fn true_color_bytes(&self) -> Option<usize> {
        match *self {
            BmpDepth::TwentyFour => Some(3),
            BmpDepth::ThirtyTwo => Some(4),
            _ => None,
        }
    }
}

/// The palette-count byte of a directory entry for the given depth.
pub(crate) fn directory_palette_count(bits_per_pixel: u16) -> u8 {
    match bits_per_pixel {
        1 | 4 => 1 << bits_per_pixel,
        _ => 0,
    }
}

//===========================================================================//


//===========================================================================//
