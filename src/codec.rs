//! Codec capabilities and the invoker that drives them.
//!
//! A codec either writes into a destination whose size is known before the call
//! ([`FixedCodec`]) or produces an owned buffer whose size is only known afterwards
//! ([`VariableCodec`]). The invoker functions resolve the mode code, check buffer sizes
//! and, for variable output, hand the finished buffer to a [`ResultRegistry`].

use std::fmt;

use crate::{
    error::{rgba8_len, Result, TexWrapError},
    registry::{ResultHandle, ResultRegistry},
};

/// A codec whose encoded size follows from format and dimensions alone.
///
/// The decoded side is always RGBA8, `width * height * 4` bytes.
pub trait FixedCodec {
    type Format: Copy + fmt::Debug;

    fn name(&self) -> &'static str;

    fn resolve(&self, mode: i32) -> Result<Self::Format>;

    /// Encoded byte size of a `width * height` image, `None` on overflow.
    fn data_size(&self, format: Self::Format, width: u32, height: u32) -> Option<usize>;

    /// Decodes exactly `data_size` bytes of `source` into `rgba`.
    fn decode(
        &self,
        format: Self::Format,
        source: &[u8],
        rgba: &mut [u8],
        width: u32,
        height: u32,
    ) -> Result<()>;

    /// Encodes `rgba` into exactly `data_size` bytes of `destination`.
    fn encode(
        &self,
        format: Self::Format,
        rgba: &[u8],
        destination: &mut [u8],
        width: u32,
        height: u32,
    ) -> Result<()>;
}

/// A codec that allocates its own output.
pub trait VariableCodec {
    type Format: Copy + fmt::Debug;

    fn name(&self) -> &'static str;

    fn resolve(&self, mode: i32) -> Result<Self::Format>;

    /// Encodes a `width * height` RGBA8 image into a new buffer.
    fn encode(&self, format: Self::Format, rgba: &[u8], width: u32, height: u32)
        -> Result<Vec<u8>>;

    /// Size of what [`VariableCodec::decode`] writes for a `width * height` image.
    fn decoded_size(&self, format: Self::Format, width: u32, height: u32) -> Option<usize>;

    /// Decodes a buffer produced by [`VariableCodec::encode`].
    fn decode(
        &self,
        format: Self::Format,
        source: &[u8],
        destination: &mut [u8],
        width: u32,
        height: u32,
    ) -> Result<()>;
}

fn checked_size(size: Option<usize>, width: u32, height: u32) -> Result<usize> {
    match size {
        Some(size) if width != 0 && height != 0 => Ok(size),
        _ => Err(TexWrapError::InvalidDimensions { width, height }),
    }
}

/// Encoded byte size of `mode` for `codec`. Fails for modes the codec cannot resolve.
pub fn encoded_size<C: FixedCodec>(codec: &C, mode: i32, width: u32, height: u32) -> Result<usize> {
    let format = codec.resolve(mode)?;
    checked_size(codec.data_size(format, width, height), width, height)
}

/// Decodes `source` into the RGBA8 `destination`, returning the bytes written.
pub fn decode_fixed<C: FixedCodec>(
    codec: &C,
    mode: i32,
    source: &[u8],
    destination: &mut [u8],
    width: u32,
    height: u32,
) -> Result<usize> {
    let format = codec.resolve(mode)?;
    let source_len = checked_size(codec.data_size(format, width, height), width, height)?;
    let rgba_len = rgba8_len(width, height)?;
    TexWrapError::check_len(source_len, source.len())?;
    TexWrapError::check_len(rgba_len, destination.len())?;

    log::trace!("{} decode {format:?} {width}x{height}", codec.name());

    codec.decode(
        format,
        &source[..source_len],
        &mut destination[..rgba_len],
        width,
        height,
    )?;
    Ok(rgba_len)
}

/// Encodes the RGBA8 `source` into `destination`, returning the bytes written.
pub fn encode_fixed<C: FixedCodec>(
    codec: &C,
    mode: i32,
    source: &[u8],
    destination: &mut [u8],
    width: u32,
    height: u32,
) -> Result<usize> {
    let format = codec.resolve(mode)?;
    let encoded_len = checked_size(codec.data_size(format, width, height), width, height)?;
    let rgba_len = rgba8_len(width, height)?;
    TexWrapError::check_len(rgba_len, source.len())?;
    TexWrapError::check_len(encoded_len, destination.len())?;

    log::trace!("{} encode {format:?} {width}x{height}", codec.name());

    codec.encode(
        format,
        &source[..rgba_len],
        &mut destination[..encoded_len],
        width,
        height,
    )?;
    Ok(encoded_len)
}

/// Encodes the RGBA8 `source` and parks the result in `registry`.
///
/// Nothing is stored unless the codec succeeds.
pub fn encode_deferred<C: VariableCodec>(
    codec: &C,
    registry: &ResultRegistry,
    mode: i32,
    source: &[u8],
    width: u32,
    height: u32,
) -> Result<(ResultHandle, usize)> {
    let format = codec.resolve(mode)?;
    let rgba_len = rgba8_len(width, height)?;
    TexWrapError::check_len(rgba_len, source.len())?;

    log::trace!("{} encode {format:?} {width}x{height}", codec.name());

    let buffer = codec.encode(format, &source[..rgba_len], width, height)?;
    if buffer.is_empty() {
        return Err(TexWrapError::codec(codec.name(), "empty output"));
    }

    let size = buffer.len();
    let handle = registry.store(buffer, size)?;
    Ok((handle, size))
}

/// Decodes a buffer produced by a [`VariableCodec`], returning the bytes written.
pub fn decode_variable<C: VariableCodec>(
    codec: &C,
    mode: i32,
    source: &[u8],
    destination: &mut [u8],
    width: u32,
    height: u32,
) -> Result<usize> {
    let format = codec.resolve(mode)?;
    let decoded_len = checked_size(codec.decoded_size(format, width, height), width, height)?;
    TexWrapError::check_len(decoded_len, destination.len())?;

    log::trace!("{} decode {format:?} {width}x{height}", codec.name());

    codec.decode(
        format,
        source,
        &mut destination[..decoded_len],
        width,
        height,
    )?;
    Ok(decoded_len)
}
