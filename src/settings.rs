use block_compression::BC7Settings;

/// Colour space the channel values are expressed in.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum ColorSpace {
    Linear,
    #[default]
    Srgb,
}

/// Compressor quality tier. Higher tiers search more encodings per block.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum CompressorQuality {
    Fastest,
    Fast,
    #[default]
    Normal,
    High,
    Best,
}

impl CompressorQuality {
    /// Maps the integer quality level callers pass across the C boundary.
    pub const fn from_level(level: i32) -> Self {
        match level {
            i32::MIN..=0 => CompressorQuality::Fastest,
            1 => CompressorQuality::Fast,
            2..=5 => CompressorQuality::Normal,
            6..=7 => CompressorQuality::High,
            _ => CompressorQuality::Best,
        }
    }
}

/// Settings of the fixed-format transcoder.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct TranscodeSettings {
    pub source_color_space: ColorSpace,
    pub target_color_space: ColorSpace,
    pub quality: CompressorQuality,
    /// Ordered dithering when quantising to fewer than 8 bits per channel.
    pub dither: bool,
}

impl TranscodeSettings {
    /// sRGB in and out, normal quality, no dithering.
    pub const fn new() -> Self {
        Self {
            source_color_space: ColorSpace::Srgb,
            target_color_space: ColorSpace::Srgb,
            quality: CompressorQuality::Normal,
            dither: false,
        }
    }

    pub const fn with_quality(mut self, quality: CompressorQuality) -> Self {
        self.quality = quality;
        self
    }

    pub const fn with_dither(mut self, dither: bool) -> Self {
        self.dither = dither;
        self
    }
}

impl Default for TranscodeSettings {
    fn default() -> Self {
        Self::new()
    }
}

/// Settings of the block compression codec.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct BlockSettings {
    pub quality: CompressorQuality,
}

impl BlockSettings {
    pub const fn new(quality: CompressorQuality) -> Self {
        Self { quality }
    }

    pub const fn from_level(level: i32) -> Self {
        Self::new(CompressorQuality::from_level(level))
    }

    /// BC7 preset for this quality tier.
    pub fn bc7_settings(&self, has_alpha: bool) -> BC7Settings {
        match (self.quality, has_alpha) {
            (CompressorQuality::Fastest, false) => BC7Settings::opaque_ultra_fast(),
            (CompressorQuality::Fast, false) => BC7Settings::opaque_very_fast(),
            (CompressorQuality::Normal, false) => BC7Settings::opaque_fast(),
            (CompressorQuality::High, false) => BC7Settings::opaque_basic(),
            (CompressorQuality::Best, false) => BC7Settings::opaque_slow(),
            (CompressorQuality::Fastest, true) => BC7Settings::alpha_ultrafast(),
            (CompressorQuality::Fast, true) => BC7Settings::alpha_very_fast(),
            (CompressorQuality::Normal, true) => BC7Settings::alpha_fast(),
            (CompressorQuality::High, true) => BC7Settings::alpha_basic(),
            (CompressorQuality::Best, true) => BC7Settings::alpha_slow(),
        }
    }
}

impl Default for BlockSettings {
    fn default() -> Self {
        Self::new(CompressorQuality::Normal)
    }
}

/// Mip chain mode of the crunched encoder.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum MipMode {
    #[default]
    NoMips,
    GenerateMips {
        max_levels: u32,
    },
}

impl MipMode {
    /// Maps a requested level count; anything below 2 means no mips.
    pub const fn from_count(mips: i32) -> Self {
        if mips <= 1 {
            MipMode::NoMips
        } else {
            MipMode::GenerateMips {
                max_levels: mips as u32,
            }
        }
    }

    /// Number of levels produced for a `width * height` base level.
    pub fn level_count(&self, width: u32, height: u32) -> u32 {
        match *self {
            MipMode::NoMips => 1,
            MipMode::GenerateMips { max_levels } => {
                let full_chain = 32 - width.max(height).max(1).leading_zeros();
                max_levels.clamp(1, full_chain)
            }
        }
    }
}

/// Settings of the crunched (variable-output) encoder.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct CrunchSettings {
    /// 0 (smallest output) to 100 (least loss).
    pub quality: u8,
    /// Dither while reducing colour precision.
    pub dither: bool,
    pub mips: MipMode,
    /// Opaque version tag written into the container header.
    pub version: u32,
    /// Worker threads. Values above 1 only take effect with the `rayon` feature.
    pub threads: usize,
}

impl CrunchSettings {
    pub const MAX_QUALITY: u8 = 100;

    pub const fn new() -> Self {
        Self {
            quality: Self::MAX_QUALITY,
            dither: false,
            mips: MipMode::NoMips,
            version: 1,
            threads: 1,
        }
    }

    /// Clamps a caller level into `0..=100`.
    pub const fn with_level(mut self, level: i32) -> Self {
        self.quality = if level < 0 {
            0
        } else if level > Self::MAX_QUALITY as i32 {
            Self::MAX_QUALITY
        } else {
            level as u8
        };
        self
    }

    pub const fn with_mips(mut self, mips: MipMode) -> Self {
        self.mips = mips;
        self
    }

    pub const fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    pub const fn with_dither(mut self, dither: bool) -> Self {
        self.dither = dither;
        self
    }

    pub const fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Channel step of the colour reduction pass; 1 leaves the source untouched.
    pub const fn posterize_step(&self) -> u8 {
        1 + (Self::MAX_QUALITY - self.quality) / 16
    }

    /// Block encoder tier used for each mip level.
    pub const fn compressor_quality(&self) -> CompressorQuality {
        CompressorQuality::from_level(self.quality as i32 / 10)
    }
}

impl Default for CrunchSettings {
    fn default() -> Self {
        Self::new()
    }
}
