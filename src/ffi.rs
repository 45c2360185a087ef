//! C exports.
//!
//! Every function returns `0` (or `false`) on any failure, including null pointers,
//! zero dimensions, unknown mode codes and caught panics. Buffer lengths are implied
//! by the arguments:
//!
//! * RGBA8 images are `width * height * 4` bytes,
//! * encoded images are the native size of the resolved format. A mode whose native
//!   size exceeds [`encoded_byte_size`](crate::format::encoded_byte_size), the size
//!   callers allocate, is rejected. ETC2 RGB and RGB A1 use 8 byte blocks, half of what
//!   the caller table reserves,
//! * crunched containers are `byte_size` bytes,
//! * decoded crunched containers are the base level's block data.
//!
//! Results of [`EncodeByCrunchUnity`] live in a process wide [`ResultRegistry`] until
//! [`PickUpAndFree`] or [`FreeAllPending`].

#![allow(non_snake_case)]

use std::{
    ffi::c_void,
    panic::{self, AssertUnwindSafe},
    slice,
    sync::LazyLock,
};

use crate::{
    block::BlockCodec,
    codec::{self, FixedCodec},
    crunch::CrunchCodec,
    error::{rgba8_len, Result, TexWrapError},
    format,
    registry::{ResultHandle, ResultRegistry},
    settings::{BlockSettings, CompressorQuality, CrunchSettings, MipMode, TranscodeSettings},
    transcode::Transcoder,
};

static REGISTRY: LazyLock<ResultRegistry> = LazyLock::new(ResultRegistry::new);

/// The registry behind the C exports.
pub fn registry() -> &'static ResultRegistry {
    &REGISTRY
}

fn report(entry: &str, error: &TexWrapError) {
    match error {
        TexWrapError::UnsupportedFormat { .. } | TexWrapError::InvalidHandle { .. } => {
            log::debug!("{entry}: {error}")
        }
        _ => log::warn!("{entry}: {error}"),
    }
}

/// Runs `call`, mapping errors and panics to `fallback`.
fn guarded<T>(entry: &str, fallback: T, call: impl FnOnce() -> Result<T>) -> T {
    match panic::catch_unwind(AssertUnwindSafe(call)) {
        Ok(Ok(value)) => value,
        Ok(Err(error)) => {
            report(entry, &error);
            fallback
        }
        Err(_) => {
            log::error!("{entry}: codec panicked");
            fallback
        }
    }
}

fn byte_count(size: usize) -> Result<u32> {
    u32::try_from(size).map_err(|_| TexWrapError::AllocationFailure { size })
}

fn caller_size(mode: i32, width: u32, height: u32) -> Result<usize> {
    format::encoded_byte_size(mode, width, height).ok_or(TexWrapError::UnsupportedFormat { mode })
}

/// Native encoded size of `mode` for `codec`, never more than callers allocate for it.
fn native_size<C: FixedCodec>(codec: &C, mode: i32, width: u32, height: u32) -> Result<usize> {
    let allocated = caller_size(mode, width, height)?;
    let native = codec::encoded_size(codec, mode, width, height)?;
    TexWrapError::check_len(native, allocated)?;
    Ok(native)
}

/// Decodes a mode coded texture into RGBA8. Returns the bytes written.
///
/// # Safety
/// - `data` must be valid for reads of the native encoded size of `mode`, the value
///   [`EncodeByPVRTexLib`] returns for the same mode and dimensions
/// - `out` must be valid for writes of `w * h * 4` bytes
#[no_mangle]
pub unsafe extern "C" fn DecodeByPVRTexLib(
    data: *const c_void,
    out: *mut c_void,
    mode: i32,
    width: u32,
    height: u32,
) -> u32 {
    if data.is_null() || out.is_null() {
        return 0;
    }

    guarded("DecodeByPVRTexLib", 0, || {
        let transcoder = Transcoder::default();
        let source_len = native_size(&transcoder, mode, width, height)?;
        let rgba_len = rgba8_len(width, height)?;
        let source = unsafe { slice::from_raw_parts(data.cast::<u8>(), source_len) };
        let destination = unsafe { slice::from_raw_parts_mut(out.cast::<u8>(), rgba_len) };

        let written = codec::decode_fixed(
            &transcoder,
            mode,
            source,
            destination,
            width,
            height,
        )?;
        byte_count(written)
    })
}

/// Encodes RGBA8 into a mode coded texture. Returns the bytes written, the native
/// encoded size, which can be less than `encoded_byte_size(mode, w, h)`.
///
/// # Safety
/// - `data` must be valid for reads of `w * h * 4` bytes
/// - `out` must be valid for writes of `encoded_byte_size(mode, w, h)` bytes
#[no_mangle]
pub unsafe extern "C" fn EncodeByPVRTexLib(
    data: *const c_void,
    out: *mut c_void,
    mode: i32,
    level: i32,
    width: u32,
    height: u32,
) -> u32 {
    if data.is_null() || out.is_null() {
        return 0;
    }

    guarded("EncodeByPVRTexLib", 0, || {
        let transcoder = Transcoder::new(
            TranscodeSettings::new().with_quality(CompressorQuality::from_level(level)),
        );
        let rgba_len = rgba8_len(width, height)?;
        let destination_len = native_size(&transcoder, mode, width, height)?;
        let source = unsafe { slice::from_raw_parts(data.cast::<u8>(), rgba_len) };
        let destination = unsafe { slice::from_raw_parts_mut(out.cast::<u8>(), destination_len) };

        let written = codec::encode_fixed(&transcoder, mode, source, destination, width, height)?;
        byte_count(written)
    })
}

/// Block compresses RGBA8 into BC1, BC3, BC4, BC5 or BC7. Returns the bytes written.
///
/// # Safety
/// - `data` must be valid for reads of `w * h * 4` bytes
/// - `out` must be valid for writes of `encoded_byte_size(mode, w, h)` bytes
#[no_mangle]
pub unsafe extern "C" fn EncodeByISPC(
    data: *const c_void,
    out: *mut c_void,
    mode: i32,
    level: i32,
    width: u32,
    height: u32,
) -> u32 {
    if data.is_null() || out.is_null() {
        return 0;
    }

    guarded("EncodeByISPC", 0, || {
        let block_codec = BlockCodec::new(BlockSettings::from_level(level));
        let rgba_len = rgba8_len(width, height)?;
        let destination_len = native_size(&block_codec, mode, width, height)?;
        let source = unsafe { slice::from_raw_parts(data.cast::<u8>(), rgba_len) };
        let destination = unsafe { slice::from_raw_parts_mut(out.cast::<u8>(), destination_len) };

        let written = codec::encode_fixed(&block_codec, mode, source, destination, width, height)?;
        byte_count(written)
    })
}

/// Decodes BC1, BC3, BC4, BC5 or BC7 blocks into RGBA8. Returns the bytes written.
///
/// # Safety
/// - `data` must be valid for reads of the native encoded size of `mode`, which for these
///   modes equals `encoded_byte_size(mode, w, h)`
/// - `out` must be valid for writes of `w * h * 4` bytes
#[no_mangle]
pub unsafe extern "C" fn DecodeByBlockCompression(
    data: *const c_void,
    out: *mut c_void,
    mode: i32,
    width: u32,
    height: u32,
) -> u32 {
    if data.is_null() || out.is_null() {
        return 0;
    }

    guarded("DecodeByBlockCompression", 0, || {
        let block_codec = BlockCodec::default();
        let source_len = native_size(&block_codec, mode, width, height)?;
        let rgba_len = rgba8_len(width, height)?;
        let source = unsafe { slice::from_raw_parts(data.cast::<u8>(), source_len) };
        let destination = unsafe { slice::from_raw_parts_mut(out.cast::<u8>(), rgba_len) };

        let written = codec::decode_fixed(
            &block_codec,
            mode,
            source,
            destination,
            width,
            height,
        )?;
        byte_count(written)
    })
}

/// Encodes RGBA8 into a crunched container.
///
/// On success the container is parked in the registry, its handle is written to
/// `out_handle` and its size returned. Pick it up with [`PickUpAndFree`].
///
/// # Safety
/// - `data` must be valid for reads of `w * h * 4` bytes
/// - `out_handle` must be valid for a write of one `i32`
#[no_mangle]
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn EncodeByCrunchUnity(
    data: *const c_void,
    out_handle: *mut i32,
    mode: i32,
    level: i32,
    width: u32,
    height: u32,
    version: u32,
    mips: i32,
) -> u32 {
    if data.is_null() || out_handle.is_null() {
        return 0;
    }

    guarded("EncodeByCrunchUnity", 0, || {
        let rgba_len = rgba8_len(width, height)?;
        let source = unsafe { slice::from_raw_parts(data.cast::<u8>(), rgba_len) };

        let crunch_codec = CrunchCodec::new(
            CrunchSettings::new()
                .with_level(level)
                .with_version(version)
                .with_mips(MipMode::from_count(mips)),
        );
        let (handle, size) =
            codec::encode_deferred(&crunch_codec, registry(), mode, source, width, height)?;

        unsafe { out_handle.write(handle.raw()) };
        byte_count(size)
    })
}

/// Decodes a crunched container into the block data of its base level. Returns the
/// bytes written.
///
/// Only containers written by [`EncodeByCrunchUnity`] are understood; engine crunch
/// assets are rejected as malformed.
///
/// # Safety
/// - `data` must be valid for reads of `byte_size` bytes
/// - `out` must be valid for writes of the base level's block data
#[no_mangle]
pub unsafe extern "C" fn DecodeByCrunchUnity(
    data: *const c_void,
    out: *mut c_void,
    mode: i32,
    width: u32,
    height: u32,
    byte_size: u32,
) -> u32 {
    if data.is_null() || out.is_null() {
        return 0;
    }

    guarded("DecodeByCrunchUnity", 0, || {
        if width == 0 || height == 0 {
            return Err(TexWrapError::InvalidDimensions { width, height });
        }
        let destination_len = format::resolve_crunched(mode)?
            .payload()
            .data_size(width, height)
            .ok_or(TexWrapError::InvalidDimensions { width, height })?;
        let source = unsafe { slice::from_raw_parts(data.cast::<u8>(), byte_size as usize) };
        let destination = unsafe { slice::from_raw_parts_mut(out.cast::<u8>(), destination_len) };

        let written = codec::decode_variable(
            &CrunchCodec::default(),
            mode,
            source,
            destination,
            width,
            height,
        )?;
        byte_count(written)
    })
}

/// Copies `size` bytes of a pending result into `out` and releases it.
///
/// # Safety
/// - `out` must be valid for writes of `size` bytes
#[no_mangle]
pub unsafe extern "C" fn PickUpAndFree(out: *mut c_void, size: u32, handle: i32) -> bool {
    if out.is_null() {
        return false;
    }

    guarded("PickUpAndFree", false, || {
        let size = size as usize;
        let destination = unsafe { slice::from_raw_parts_mut(out.cast::<u8>(), size) };
        registry().pickup(ResultHandle::from_raw(handle), destination, size)?;
        Ok(true)
    })
}

/// Expected encoded byte size of a `w * h` image in `mode`, `0` if unknown.
#[no_mangle]
pub extern "C" fn GetEncodedByteSize(mode: i32, width: u32, height: u32) -> u32 {
    guarded("GetEncodedByteSize", 0, || {
        byte_count(caller_size(mode, width, height)?)
    })
}

/// Releases every result that was never picked up. Returns how many there were.
#[no_mangle]
pub extern "C" fn FreeAllPending() -> u32 {
    guarded("FreeAllPending", 0, || byte_count(registry().drain()))
}
