//! BC1/BC3/BC4/BC5/BC7 block compression.
//!
//! Encoding runs through the CPU encoder of `block_compression`, which only accepts
//! dimensions that are multiples of 4; other sizes are edge padded first. Decoding
//! runs through `texture2ddecoder`.

use std::borrow::Cow;

use block_compression::CompressionVariant;

use crate::{
    codec::FixedCodec,
    error::{Result, TexWrapError},
    format::{self, BlockFormat},
    settings::BlockSettings,
};

/// Block compression codec.
#[derive(Copy, Clone, Debug, Default)]
pub struct BlockCodec {
    settings: BlockSettings,
}

impl BlockCodec {
    pub const fn new(settings: BlockSettings) -> Self {
        Self { settings }
    }

    fn variant(&self, format: BlockFormat, rgba: &[u8]) -> CompressionVariant {
        match format {
            BlockFormat::Bc1 => CompressionVariant::BC1,
            BlockFormat::Bc3 => CompressionVariant::BC3,
            BlockFormat::Bc4 => CompressionVariant::BC4,
            BlockFormat::Bc5 => CompressionVariant::BC5,
            BlockFormat::Bc7 => {
                let has_alpha = rgba.chunks_exact(4).any(|pixel| pixel[3] != u8::MAX);
                CompressionVariant::BC7(self.settings.bc7_settings(has_alpha))
            }
        }
    }
}

/// Copies `rgba` into a `padded_width * padded_height` image, repeating the last
/// column and row.
pub(crate) fn pad_rgba8(
    rgba: &[u8],
    width: usize,
    height: usize,
    padded_width: usize,
    padded_height: usize,
) -> Vec<u8> {
    let mut padded = Vec::with_capacity(padded_width * padded_height * 4);

    for y in 0..padded_height {
        let row = &rgba[y.min(height - 1) * width * 4..][..width * 4];
        padded.extend_from_slice(row);
        let last = &row[(width - 1) * 4..];
        for _ in width..padded_width {
            padded.extend_from_slice(last);
        }
    }

    padded
}

impl FixedCodec for BlockCodec {
    type Format = BlockFormat;

    fn name(&self) -> &'static str {
        "block"
    }

    fn resolve(&self, mode: i32) -> Result<BlockFormat> {
        format::resolve_block(mode)
    }

    fn data_size(&self, format: BlockFormat, width: u32, height: u32) -> Option<usize> {
        format.data_size(width, height)
    }

    fn decode(
        &self,
        format: BlockFormat,
        source: &[u8],
        rgba: &mut [u8],
        width: u32,
        height: u32,
    ) -> Result<()> {
        let width = width as usize;
        let height = height as usize;
        let mut pixels = vec![0u32; width * height];

        let decoded = match format {
            BlockFormat::Bc1 => texture2ddecoder::decode_bc1(source, width, height, &mut pixels),
            BlockFormat::Bc3 => texture2ddecoder::decode_bc3(source, width, height, &mut pixels),
            BlockFormat::Bc4 => texture2ddecoder::decode_bc4(source, width, height, &mut pixels),
            BlockFormat::Bc5 => texture2ddecoder::decode_bc5(source, width, height, &mut pixels),
            BlockFormat::Bc7 => texture2ddecoder::decode_bc7(source, width, height, &mut pixels),
        };
        decoded.map_err(|reason| TexWrapError::codec(self.name(), reason))?;

        for (pixel, out) in pixels.iter().zip(rgba.chunks_exact_mut(4)) {
            let [b, g, r, a] = pixel.to_le_bytes();
            out.copy_from_slice(&[r, g, b, a]);
        }

        Ok(())
    }

    fn encode(
        &self,
        format: BlockFormat,
        rgba: &[u8],
        destination: &mut [u8],
        width: u32,
        height: u32,
    ) -> Result<()> {
        let padded_width = width.next_multiple_of(4);
        let padded_height = height.next_multiple_of(4);

        let rgba = if padded_width == width && padded_height == height {
            Cow::Borrowed(rgba)
        } else {
            log::trace!("padding {width}x{height} to {padded_width}x{padded_height}");
            Cow::Owned(pad_rgba8(
                rgba,
                width as usize,
                height as usize,
                padded_width as usize,
                padded_height as usize,
            ))
        };

        let variant = self.variant(format, &rgba);
        block_compression::encode::compress_rgba8(
            variant,
            &rgba,
            destination,
            padded_width,
            padded_height,
            padded_width * 4,
        );

        Ok(())
    }
}
