//! # textoolwrap
//!
//! C-callable texture encode/decode shim for managed callers.
//!
//! Callers select formats with the integer mode codes of the engine texture format
//! enumeration. Three codec families sit behind the exports:
//!
//!  * a fixed-format transcoder between RGBA8 and uncompressed, ETC1/ETC2/EAC, PVRTC and
//!    ASTC data (PVRTC and ASTC decode only),
//!  * block compression to and from BC1, BC3, BC4, BC5 and BC7,
//!  * a variable-output "crunched" encoder producing an lz4 compressed mip chain of
//!    DXT1/DXT5/ETC1/ETC2 blocks.
//!
//! Fixed-format codecs write straight into caller storage. Crunched output is only
//! sized once it is finished, so it is parked in a [`ResultRegistry`] under a handle;
//! the caller allocates the reported size and picks the result up, which frees it.
//!
//! The C surface lives in [`ffi`]. Everything behind it is usable from Rust as well:
//!
//! ```
//! use textoolwrap::{codec, format::mode, BlockCodec};
//!
//! let rgba = vec![255u8; 8 * 8 * 4];
//! let mut blocks = vec![0u8; 4 * 8];
//! let written = codec::encode_fixed(&BlockCodec::default(), mode::DXT1, &rgba, &mut blocks, 8, 8)
//!     .unwrap();
//! assert_eq!(written, 32);
//! ```
mod block;
pub mod codec;
mod crunch;
mod error;
pub mod etc;
pub mod ffi;
pub mod format;
mod registry;
mod settings;
mod transcode;

pub use block::BlockCodec;
pub use codec::{FixedCodec, VariableCodec};
pub use crunch::{read_info, ContainerInfo, CrunchCodec};
pub use error::{Result, TexWrapError};
pub use registry::{ResultHandle, ResultRegistry};
pub use settings::{
    BlockSettings, ColorSpace, CompressorQuality, CrunchSettings, MipMode, TranscodeSettings,
};
pub use transcode::Transcoder;
