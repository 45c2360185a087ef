//! Variable-output "crunched" encoder.
//!
//! A crunched container holds a whole mip chain of DXT1/DXT5/ETC1/ETC2 block data,
//! reduced in colour precision by the quality level and then lz4 compressed, behind a
//! fixed [header](ContainerInfo). Its size is only known once compression finishes, so
//! the encoder allocates its own output.
//!
//! Decoding validates the container and returns the block data of the base level.

mod container;
mod mips;

pub use container::{read_info, ContainerInfo};

use crate::{
    block::BlockCodec,
    codec::{FixedCodec, VariableCodec},
    error::{Result, TexWrapError},
    etc,
    format::{self, CrunchPayload, CrunchedFormat},
    settings::{BlockSettings, CrunchSettings},
};

use mips::MipLevel;

/// The crunched codec.
#[derive(Copy, Clone, Debug, Default)]
pub struct CrunchCodec {
    settings: CrunchSettings,
}

impl CrunchCodec {
    pub const fn new(settings: CrunchSettings) -> Self {
        Self { settings }
    }

    pub const fn settings(&self) -> &CrunchSettings {
        &self.settings
    }

    fn encode_level(&self, payload: CrunchPayload, level: &MipLevel) -> Result<Vec<u8>> {
        let size = payload
            .data_size(level.width, level.height)
            .ok_or(TexWrapError::InvalidDimensions {
                width: level.width,
                height: level.height,
            })?;

        let mut blocks = Vec::new();
        blocks
            .try_reserve_exact(size)
            .map_err(|_| TexWrapError::AllocationFailure { size })?;
        blocks.resize(size, 0);

        let quality = self.settings.compressor_quality();
        match payload {
            CrunchPayload::Block(block_format) => BlockCodec::new(BlockSettings::new(quality))
                .encode(block_format, &level.rgba, &mut blocks, level.width, level.height)?,
            CrunchPayload::Etc(etc_format) => etc::compress_rgba8(
                etc_format,
                &level.rgba,
                &mut blocks,
                level.width,
                level.height,
                quality,
            )?,
        }

        Ok(blocks)
    }

    fn encode_levels(&self, payload: CrunchPayload, levels: &[MipLevel]) -> Result<Vec<Vec<u8>>> {
        #[cfg(feature = "rayon")]
        {
            use rayon::prelude::*;

            if self.settings.threads > 1 && levels.len() > 1 {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(self.settings.threads)
                    .build()
                    .map_err(|error| TexWrapError::codec("crunch", error.to_string()))?;
                return pool.install(|| {
                    levels
                        .par_iter()
                        .map(|level| self.encode_level(payload, level))
                        .collect()
                });
            }
        }

        levels
            .iter()
            .map(|level| self.encode_level(payload, level))
            .collect()
    }
}

impl VariableCodec for CrunchCodec {
    type Format = CrunchedFormat;

    fn name(&self) -> &'static str {
        "crunch"
    }

    fn resolve(&self, mode: i32) -> Result<CrunchedFormat> {
        format::resolve_crunched(mode)
    }

    fn encode(
        &self,
        format: CrunchedFormat,
        rgba: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Vec<u8>> {
        let level_count = self.settings.mips.level_count(width, height);
        let mut levels = mips::build_chain(rgba, width, height, level_count)?;
        for level in &mut levels {
            mips::posterize(level, self.settings.posterize_step(), self.settings.dither);
        }

        let encoded = self.encode_levels(format.payload(), &levels)?;

        let size = encoded.iter().map(Vec::len).sum();
        let mut payload = Vec::new();
        payload
            .try_reserve_exact(size)
            .map_err(|_| TexWrapError::AllocationFailure { size })?;
        for level in &encoded {
            payload.extend_from_slice(level);
        }

        let info = ContainerInfo {
            version: self.settings.version,
            mode: format.mode_code(),
            width,
            height,
            level_count,
            quality: self.settings.quality as u32,
            payload_size: 0,
            compressed_size: 0,
        };
        let container = container::write(info, &payload)?;

        log::debug!(
            "crunched {width}x{height} {format:?}: {level_count} levels, {size} -> {} bytes",
            container.len()
        );

        Ok(container)
    }

    fn decoded_size(&self, format: CrunchedFormat, width: u32, height: u32) -> Option<usize> {
        format.payload().data_size(width, height)
    }

    fn decode(
        &self,
        format: CrunchedFormat,
        source: &[u8],
        destination: &mut [u8],
        width: u32,
        height: u32,
    ) -> Result<()> {
        let (info, payload) = container::read(source)?;

        if info.mode != format.mode_code() {
            return Err(TexWrapError::codec(
                self.name(),
                format!("container holds mode {}, expected {}", info.mode, format.mode_code()),
            ));
        }
        if info.width != width || info.height != height {
            return Err(TexWrapError::codec(
                self.name(),
                format!(
                    "container is {}x{}, expected {width}x{height}",
                    info.width, info.height
                ),
            ));
        }

        let base_size = destination.len();
        TexWrapError::check_len(base_size, payload.len())?;
        destination.copy_from_slice(&payload[..base_size]);

        Ok(())
    }
}
