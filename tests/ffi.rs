use std::ptr;

use rstest::rstest;
use textoolwrap::{
    ffi::{
        DecodeByBlockCompression, DecodeByCrunchUnity, DecodeByPVRTexLib, EncodeByCrunchUnity,
        EncodeByISPC, EncodeByPVRTexLib, GetEncodedByteSize, PickUpAndFree,
    },
    format::{self, mode},
};

use crate::common::{
    channel_ramps_rgba, gradient_rgba,
    metrics::{compare_rgba8, ChannelError},
    noise_rgba,
};

mod common;

fn decode_pvr(data: &[u8], out: &mut [u8], mode: i32, width: u32, height: u32) -> u32 {
    unsafe { DecodeByPVRTexLib(data.as_ptr().cast(), out.as_mut_ptr().cast(), mode, width, height) }
}

fn encode_pvr(rgba: &[u8], out: &mut [u8], mode: i32, level: i32, width: u32, height: u32) -> u32 {
    unsafe {
        EncodeByPVRTexLib(
            rgba.as_ptr().cast(),
            out.as_mut_ptr().cast(),
            mode,
            level,
            width,
            height,
        )
    }
}

fn encode_ispc(rgba: &[u8], out: &mut [u8], mode: i32, level: i32, width: u32, height: u32) -> u32 {
    unsafe {
        EncodeByISPC(
            rgba.as_ptr().cast(),
            out.as_mut_ptr().cast(),
            mode,
            level,
            width,
            height,
        )
    }
}

fn encode_crunch(rgba: &[u8], mode: i32, level: i32, width: u32, height: u32, mips: i32) -> (u32, i32) {
    let mut handle = -1;
    let size = unsafe {
        EncodeByCrunchUnity(rgba.as_ptr().cast(), &mut handle, mode, level, width, height, 1, mips)
    };
    (size, handle)
}

fn pick_up(out: &mut [u8], size: u32, handle: i32) -> bool {
    unsafe { PickUpAndFree(out.as_mut_ptr().cast(), size, handle) }
}

fn encoded_size(mode: i32, width: u32, height: u32) -> usize {
    GetEncodedByteSize(mode, width, height) as usize
}

fn native_size(mode: i32, width: u32, height: u32) -> usize {
    format::resolve(mode).unwrap().data_size(width, height).unwrap()
}

#[test]
fn rgba32_decode_of_zeros() {
    let data = [0u8; 16];
    let mut out = [0xAAu8; 16];
    assert_eq!(decode_pvr(&data, &mut out, mode::RGBA32, 2, 2), 16);
    assert_eq!(out, [0u8; 16]);
}

#[rstest]
#[case(0)]
#[case(6)]
#[case(mode::ETC_RGB4_3DS)]
#[case(mode::ETC_RGBA8_3DS)]
#[case(mode::DXT1_CRUNCHED)]
#[case(999)]
#[case(-7)]
fn unknown_modes_leave_destination_untouched(#[case] code: i32) {
    let data = [0x55u8; 256];
    let mut out = [0xAAu8; 256];

    assert_eq!(decode_pvr(&data, &mut out, code, 4, 4), 0);
    assert_eq!(encode_pvr(&data[..64], &mut out, code, 5, 4, 4), 0);
    assert_eq!(out, [0xAAu8; 256]);
}

#[test]
fn null_pointers_and_empty_images_return_zero() {
    let data = [0u8; 64];
    let mut out = [0u8; 64];

    unsafe {
        assert_eq!(DecodeByPVRTexLib(ptr::null(), out.as_mut_ptr().cast(), mode::RGBA32, 4, 4), 0);
        assert_eq!(DecodeByPVRTexLib(data.as_ptr().cast(), ptr::null_mut(), mode::RGBA32, 4, 4), 0);
        assert_eq!(EncodeByISPC(ptr::null(), out.as_mut_ptr().cast(), mode::DXT1, 5, 4, 4), 0);
        assert_eq!(
            EncodeByCrunchUnity(data.as_ptr().cast(), ptr::null_mut(), mode::DXT1_CRUNCHED, 100, 4, 4, 1, 1),
            0
        );
        assert!(!PickUpAndFree(ptr::null_mut(), 4, 1));
    }

    assert_eq!(decode_pvr(&data, &mut out, mode::RGBA32, 0, 4), 0);
    assert_eq!(encode_ispc(&data, &mut out, mode::DXT1, 5, 4, 0), 0);
    assert_eq!(encode_crunch(&data, mode::DXT1_CRUNCHED, 100, 0, 0, 1), (0, -1));
}

#[rstest]
#[case(mode::RGBA32)]
#[case(mode::ARGB32)]
#[case(mode::BGRA32)]
#[case(mode::RGBAFLOAT)]
fn lossless_layouts_round_trip(#[case] code: i32) {
    let rgba = noise_rgba(7, 5, 42);
    let mut encoded = vec![0u8; encoded_size(code, 7, 5)];
    let written = encode_pvr(&rgba, &mut encoded, code, 5, 7, 5);
    assert_eq!(written as usize, encoded.len());

    let mut decoded = vec![0u8; rgba.len()];
    assert_eq!(decode_pvr(&encoded, &mut decoded, code, 7, 5), 140);
    assert_eq!(decoded, rgba);
}

#[test]
fn rgb24_round_trip_is_exact_for_opaque_images() {
    let rgba = gradient_rgba(9, 3);
    let mut encoded = vec![0u8; encoded_size(mode::RGB24, 9, 3)];
    assert_eq!(encode_pvr(&rgba, &mut encoded, mode::RGB24, 5, 9, 3), 81);

    let mut decoded = vec![0u8; rgba.len()];
    decode_pvr(&encoded, &mut decoded, mode::RGB24, 9, 3);
    assert_eq!(decoded, rgba);
}

#[rstest]
#[case(mode::ETC_RGB4, 30.0)]
#[case(mode::ETC2_RGB, 30.0)]
#[case(mode::ETC2_RGBA8, 30.0)]
#[case(mode::ETC2_RGBA1, 30.0)]
fn etc_encode_through_the_transcoder(#[case] code: i32, #[case] min_psnr: f64) {
    let rgba = gradient_rgba(32, 32);
    let allocated = encoded_size(code, 32, 32);
    let mut blocks = vec![0u8; allocated];
    let written = encode_pvr(&rgba, &mut blocks, code, 5, 32, 32) as usize;
    assert_eq!(written, native_size(code, 32, 32));
    assert!(written <= allocated);
    blocks.truncate(written);

    let mut decoded = vec![0u8; rgba.len()];
    assert_eq!(decode_pvr(&blocks, &mut decoded, code, 32, 32), 32 * 32 * 4);
    let error = compare_rgba8(&rgba, &decoded);
    assert!(
        error.color_psnr() > min_psnr,
        "psnr {:.2} for mode {code}",
        error.color_psnr()
    );
}

#[rstest]
#[case(mode::ETC2_RGB)]
#[case(mode::ETC2_RGBA1)]
fn etc2_decode_reads_only_native_blocks(#[case] code: i32) {
    let rgba = gradient_rgba(8, 8);
    let mut blocks = vec![0u8; encoded_size(code, 8, 8)];
    assert_eq!(encode_pvr(&rgba, &mut blocks, code, 5, 8, 8), 32);
    assert_eq!(encoded_size(code, 8, 8), 64);

    let exact = blocks[..32].to_vec();
    let mut decoded = vec![0u8; rgba.len()];
    assert_eq!(decode_pvr(&exact, &mut decoded, code, 8, 8), 256);
}

#[test]
fn modes_larger_than_their_allocation_are_rejected() {
    let data = [0x40u8; 64];
    let mut out = [0xAAu8; 64];

    assert_eq!(decode_pvr(&data[..8], &mut out, mode::RG16, 2, 2), 0);
    assert_eq!(encode_pvr(&data[..16], &mut out, mode::RG16, 5, 2, 2), 0);
    assert_eq!(out, [0xAAu8; 64]);
}

fn channel(error: &crate::common::metrics::ImageError, index: usize) -> ChannelError {
    [error.red, error.green, error.blue, error.alpha][index]
}

#[rstest]
#[case(mode::EAC_R, &[0])]
#[case(mode::EAC_R_SIGNED, &[0])]
#[case(mode::EAC_RG, &[0, 1])]
#[case(mode::EAC_RG_SIGNED, &[0, 1])]
#[case(mode::ETC2_RGBA8, &[3])]
fn eac_channels_round_trip_through_the_exports(#[case] code: i32, #[case] channels: &[usize]) {
    let (width, height) = (8, 8);
    let rgba = channel_ramps_rgba(width, height);

    let mut blocks = vec![0u8; encoded_size(code, width, height)];
    let written = encode_pvr(&rgba, &mut blocks, code, 5, width, height) as usize;
    assert_eq!(written, native_size(code, width, height));
    blocks.truncate(written);

    let mut decoded = vec![0u8; rgba.len()];
    assert_eq!(decode_pvr(&blocks, &mut decoded, code, width, height), 256);

    let error = compare_rgba8(&rgba, &decoded);
    for &index in channels {
        let channel = channel(&error, index);
        assert!(
            channel.max_difference <= 12 && channel.psnr > 32.0,
            "mode {code}, channel {index}: {channel:?}"
        );
    }
}

#[rstest]
#[case(mode::PVRTC_RGBA4)]
#[case(mode::ASTC_RGB_6X6)]
fn formats_without_encoder_fail(#[case] code: i32) {
    let rgba = gradient_rgba(16, 16);
    let mut blocks = vec![0u8; encoded_size(code, 16, 16)];
    assert_eq!(encode_pvr(&rgba, &mut blocks, code, 5, 16, 16), 0);
}

#[rstest]
#[case(mode::DXT1, 8, 30.0)]
#[case(mode::DXT5, 16, 30.0)]
#[case(mode::BC7, 16, 35.0)]
fn block_compression_size_law_and_quality(
    #[case] code: i32,
    #[case] block_size: usize,
    #[case] min_psnr: f64,
) {
    let (width, height) = (30, 18);
    let rgba = gradient_rgba(width, height);
    let expected = 8 * 5 * block_size;
    assert_eq!(encoded_size(code, width, height), expected);

    let mut blocks = vec![0u8; expected];
    assert_eq!(encode_ispc(&rgba, &mut blocks, code, 5, width, height) as usize, expected);

    let mut decoded = vec![0u8; rgba.len()];
    let written = unsafe {
        DecodeByBlockCompression(
            blocks.as_ptr().cast(),
            decoded.as_mut_ptr().cast(),
            code,
            width,
            height,
        )
    };
    assert_eq!(written as usize, rgba.len());
    assert!(compare_rgba8(&rgba, &decoded).color_psnr() > min_psnr);
}

#[test]
fn crunched_dxt1_scenario() {
    let (width, height) = (64, 64);
    let rgba = gradient_rgba(width, height);

    let (size, handle) = encode_crunch(&rgba, mode::DXT1_CRUNCHED, 100, width, height, 1);
    assert!(size > 0);
    assert!(handle > 0);

    let mut container = vec![0u8; size as usize];
    assert!(pick_up(&mut container, size, handle));
    assert!(!pick_up(&mut container, size, handle));

    let (again_size, again_handle) = encode_crunch(&rgba, mode::DXT1_CRUNCHED, 100, width, height, 1);
    assert_ne!(again_handle, handle);
    let mut again = vec![0u8; again_size as usize];
    assert!(pick_up(&mut again, again_size, again_handle));
    assert_eq!(again, container);

    let mut base_level = vec![0u8; encoded_size(mode::DXT1, width, height)];
    let written = unsafe {
        DecodeByCrunchUnity(
            container.as_ptr().cast(),
            base_level.as_mut_ptr().cast(),
            mode::DXT1_CRUNCHED,
            width,
            height,
            size,
        )
    };
    assert_eq!(written as usize, base_level.len());

    let mut direct = vec![0u8; base_level.len()];
    encode_ispc(&rgba, &mut direct, mode::DXT1, 5, width, height);
    assert_eq!(base_level, direct);
}

#[test]
fn crunched_decode_rejects_truncated_input() {
    let rgba = gradient_rgba(16, 16);
    let (size, handle) = encode_crunch(&rgba, mode::ETC_RGB4_CRUNCHED, 60, 16, 16, 3);
    let mut container = vec![0u8; size as usize];
    assert!(pick_up(&mut container, size, handle));

    let mut base_level = vec![0u8; encoded_size(mode::ETC_RGB4, 16, 16)];
    let mut decode = |byte_size: u32, mode: i32| unsafe {
        DecodeByCrunchUnity(
            container.as_ptr().cast(),
            base_level.as_mut_ptr().cast(),
            mode,
            16,
            16,
            byte_size,
        )
    };

    assert_eq!(decode(size - 1, mode::ETC_RGB4_CRUNCHED), 0);
    assert_eq!(decode(16, mode::ETC_RGB4_CRUNCHED), 0);
    assert_eq!(decode(size, mode::DXT5_CRUNCHED), 0);
    assert_eq!(decode(size, mode::ETC_RGB4_CRUNCHED), 128);
}

#[test]
fn crunched_decode_rejects_foreign_containers() {
    // Engine crunch files start with the "Hx" signature and a big-endian header size.
    let mut foreign = vec![0u8; 256];
    foreign[..4].copy_from_slice(&[0x48, 0x78, 0x00, 0x4A]);
    let mut out = vec![0xAAu8; encoded_size(mode::DXT1, 16, 16)];

    let written = unsafe {
        DecodeByCrunchUnity(
            foreign.as_ptr().cast(),
            out.as_mut_ptr().cast(),
            mode::DXT1_CRUNCHED,
            16,
            16,
            foreign.len() as u32,
        )
    };
    assert_eq!(written, 0);
    assert!(out.iter().all(|&byte| byte == 0xAA));
}

#[test]
fn failed_pickup_keeps_result_pending() {
    let rgba = gradient_rgba(8, 8);
    let (size, handle) = encode_crunch(&rgba, mode::DXT5_CRUNCHED, 80, 8, 8, 1);
    assert!(size > 0);

    let mut oversized = vec![0u8; size as usize + 8];
    assert!(!pick_up(&mut oversized, size + 8, handle));

    let mut container = vec![0u8; size as usize];
    assert!(pick_up(&mut container, size, handle));
    assert!(!pick_up(&mut container, size, -1));
}

#[test]
fn crunch_rejects_non_crunched_modes() {
    let rgba = gradient_rgba(8, 8);
    assert_eq!(encode_crunch(&rgba, mode::DXT1, 100, 8, 8, 1), (0, -1));
}

#[test]
fn encoded_byte_sizes() {
    assert_eq!(GetEncodedByteSize(mode::RGBA32, 3, 3), 36);
    assert_eq!(GetEncodedByteSize(mode::DXT1, 5, 5), 32);
    assert_eq!(GetEncodedByteSize(mode::ASTC_RGBA_12X12, 24, 13), 4 * 16);
    assert_eq!(GetEncodedByteSize(mode::DXT1_CRUNCHED, 4, 4), 0);
    assert_eq!(GetEncodedByteSize(12345, 4, 4), 0);
}
