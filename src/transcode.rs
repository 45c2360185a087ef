//! Fixed-format transcoder between RGBA8 and the formats of [`crate::format::resolve`].

mod compressed;
mod pixels;

use std::borrow::Cow;

use crate::{
    codec::FixedCodec,
    error::{Result, TexWrapError},
    etc,
    format::{self, NativeFormat, ResolvedFormat},
    settings::{ColorSpace, TranscodeSettings},
};

/// Transcodes between RGBA8 and uncompressed or ETC/EAC/PVRTC/ASTC data.
///
/// PVRTC and ASTC are decode only.
#[derive(Copy, Clone, Debug, Default)]
pub struct Transcoder {
    settings: TranscodeSettings,
}

impl Transcoder {
    pub const fn new(settings: TranscodeSettings) -> Self {
        Self { settings }
    }

    pub const fn settings(&self) -> &TranscodeSettings {
        &self.settings
    }
}

impl FixedCodec for Transcoder {
    type Format = ResolvedFormat;

    fn name(&self) -> &'static str {
        "transcode"
    }

    fn resolve(&self, mode: i32) -> Result<ResolvedFormat> {
        format::resolve(mode)
    }

    fn data_size(&self, format: ResolvedFormat, width: u32, height: u32) -> Option<usize> {
        format.data_size(width, height)
    }

    fn decode(
        &self,
        format: ResolvedFormat,
        source: &[u8],
        rgba: &mut [u8],
        width: u32,
        height: u32,
    ) -> Result<()> {
        match format.format {
            NativeFormat::Uncompressed(layout) => {
                pixels::unpack_rgba8(&layout, format.variable_type, source, rgba)
            }
            NativeFormat::Compressed(compressed) => {
                compressed::decode_rgba8(compressed, source, rgba, width, height)?
            }
        }

        convert_color_space(
            rgba,
            self.settings.source_color_space,
            self.settings.target_color_space,
        );
        Ok(())
    }

    fn encode(
        &self,
        format: ResolvedFormat,
        rgba: &[u8],
        destination: &mut [u8],
        width: u32,
        height: u32,
    ) -> Result<()> {
        let rgba = if self.settings.source_color_space != self.settings.target_color_space {
            let mut converted = rgba.to_vec();
            convert_color_space(
                &mut converted,
                self.settings.source_color_space,
                self.settings.target_color_space,
            );
            Cow::Owned(converted)
        } else {
            Cow::Borrowed(rgba)
        };

        match format.format {
            NativeFormat::Uncompressed(layout) => {
                pixels::pack_rgba8(
                    &layout,
                    format.variable_type,
                    &rgba,
                    destination,
                    width as usize,
                    self.settings.dither,
                );
                Ok(())
            }
            NativeFormat::Compressed(compressed) if etc::can_encode(compressed) => {
                etc::compress_rgba8(
                    compressed,
                    &rgba,
                    destination,
                    width,
                    height,
                    self.settings.quality,
                )
            }
            NativeFormat::Compressed(compressed) => Err(TexWrapError::codec(
                self.name(),
                format!("{} encoding is not supported", compressed.name()),
            )),
        }
    }
}

fn srgb_to_linear(value: f32) -> f32 {
    if value <= 0.04045 {
        value / 12.92
    } else {
        ((value + 0.055) / 1.055).powf(2.4)
    }
}

fn linear_to_srgb(value: f32) -> f32 {
    if value <= 0.003_130_8 {
        value * 12.92
    } else {
        1.055 * value.powf(1.0 / 2.4) - 0.055
    }
}

/// Converts the colour channels of an RGBA8 image in place. Alpha is linear in both spaces.
fn convert_color_space(rgba: &mut [u8], from: ColorSpace, to: ColorSpace) {
    let transfer: fn(f32) -> f32 = match (from, to) {
        (ColorSpace::Srgb, ColorSpace::Linear) => srgb_to_linear,
        (ColorSpace::Linear, ColorSpace::Srgb) => linear_to_srgb,
        _ => return,
    };

    let mut table = [0u8; 256];
    for (value, entry) in table.iter_mut().enumerate() {
        *entry = (transfer(value as f32 / 255.0) * 255.0).round().clamp(0.0, 255.0) as u8;
    }

    for pixel in rgba.chunks_exact_mut(4) {
        for channel in &mut pixel[..3] {
            *channel = table[*channel as usize];
        }
    }
}
