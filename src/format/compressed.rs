/// Compressed formats reachable through the transcoder.
#[derive(Copy, Clone, Hash, Eq, PartialEq, Debug)]
pub enum CompressedFormat {
    PvrtcI2bppRgb,
    PvrtcI2bppRgba,
    PvrtcI4bppRgb,
    PvrtcI4bppRgba,
    Etc1,
    Etc2Rgb,
    Etc2Rgba,
    Etc2RgbA1,
    EacR11,
    EacRg11,
    Astc4x4,
    Astc5x5,
    Astc6x6,
    Astc8x8,
    Astc10x10,
    Astc12x12,
}

impl CompressedFormat {
    /// The 64-bit native format id. Compressed ids occupy the low values with the
    /// high 32 bits cleared.
    pub const fn native_id(self) -> u64 {
        match self {
            CompressedFormat::PvrtcI2bppRgb => 0,
            CompressedFormat::PvrtcI2bppRgba => 1,
            CompressedFormat::PvrtcI4bppRgb => 2,
            CompressedFormat::PvrtcI4bppRgba => 3,
            CompressedFormat::Etc1 => 6,
            CompressedFormat::Etc2Rgb => 22,
            CompressedFormat::Etc2Rgba => 23,
            CompressedFormat::Etc2RgbA1 => 24,
            CompressedFormat::EacR11 => 25,
            CompressedFormat::EacRg11 => 26,
            CompressedFormat::Astc4x4 => 27,
            CompressedFormat::Astc5x5 => 29,
            CompressedFormat::Astc6x6 => 31,
            CompressedFormat::Astc8x8 => 34,
            CompressedFormat::Astc10x10 => 38,
            CompressedFormat::Astc12x12 => 40,
        }
    }

    /// Block footprint in pixels as `(width, height)`.
    pub const fn block_dimensions(self) -> (u32, u32) {
        match self {
            CompressedFormat::PvrtcI2bppRgb | CompressedFormat::PvrtcI2bppRgba => (8, 4),
            CompressedFormat::Astc5x5 => (5, 5),
            CompressedFormat::Astc6x6 => (6, 6),
            CompressedFormat::Astc8x8 => (8, 8),
            CompressedFormat::Astc10x10 => (10, 10),
            CompressedFormat::Astc12x12 => (12, 12),
            _ => (4, 4),
        }
    }

    pub const fn block_byte_size(self) -> usize {
        match self {
            CompressedFormat::PvrtcI2bppRgb
            | CompressedFormat::PvrtcI2bppRgba
            | CompressedFormat::PvrtcI4bppRgb
            | CompressedFormat::PvrtcI4bppRgba
            | CompressedFormat::Etc1
            | CompressedFormat::Etc2Rgb
            | CompressedFormat::Etc2RgbA1
            | CompressedFormat::EacR11 => 8,
            CompressedFormat::Etc2Rgba
            | CompressedFormat::EacRg11
            | CompressedFormat::Astc4x4
            | CompressedFormat::Astc5x5
            | CompressedFormat::Astc6x6
            | CompressedFormat::Astc8x8
            | CompressedFormat::Astc10x10
            | CompressedFormat::Astc12x12 => 16,
        }
    }

    /// Byte size of a `width * height` image, partial blocks rounded up.
    pub fn data_size(self, width: u32, height: u32) -> Option<usize> {
        let (block_width, block_height) = self.block_dimensions();
        let blocks_x = width.div_ceil(block_width) as usize;
        let blocks_y = height.div_ceil(block_height) as usize;
        blocks_x
            .checked_mul(blocks_y)?
            .checked_mul(self.block_byte_size())
    }

    pub const fn name(self) -> &'static str {
        match self {
            CompressedFormat::PvrtcI2bppRgb => "pvrtc1_2bpp_rgb",
            CompressedFormat::PvrtcI2bppRgba => "pvrtc1_2bpp_rgba",
            CompressedFormat::PvrtcI4bppRgb => "pvrtc1_4bpp_rgb",
            CompressedFormat::PvrtcI4bppRgba => "pvrtc1_4bpp_rgba",
            CompressedFormat::Etc1 => "etc1",
            CompressedFormat::Etc2Rgb => "etc2_rgb",
            CompressedFormat::Etc2Rgba => "etc2_rgba",
            CompressedFormat::Etc2RgbA1 => "etc2_rgb_a1",
            CompressedFormat::EacR11 => "eac_r11",
            CompressedFormat::EacRg11 => "eac_rg11",
            CompressedFormat::Astc4x4 => "astc_4x4",
            CompressedFormat::Astc5x5 => "astc_5x5",
            CompressedFormat::Astc6x6 => "astc_6x6",
            CompressedFormat::Astc8x8 => "astc_8x8",
            CompressedFormat::Astc10x10 => "astc_10x10",
            CompressedFormat::Astc12x12 => "astc_12x12",
        }
    }
}
