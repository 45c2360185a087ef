//! Error types shared by every codec and the result registry.

/// Result type alias for textoolwrap operations.
pub type Result<T> = std::result::Result<T, TexWrapError>;

/// Everything that can go wrong between a mode code coming in and bytes going out.
///
/// None of these escalate past the C boundary: the exports map every variant to a
/// `0` byte count or `false`.
#[derive(Debug, thiserror::Error)]
pub enum TexWrapError {
    /// The mode code is outside the domain of the resolver that was asked.
    #[error("unsupported texture format: mode {mode}")]
    UnsupportedFormat { mode: i32 },

    /// A codec refused the input or failed internally.
    #[error("{codec} codec failure: {reason}")]
    CodecFailure { codec: &'static str, reason: String },

    /// Pickup of a handle that is unknown or already consumed.
    #[error("invalid result handle: {handle}")]
    InvalidHandle { handle: i32 },

    /// An output buffer could not be obtained.
    #[error("allocation failure: {size} bytes")]
    AllocationFailure { size: usize },

    /// Zero sized or overflowing image dimensions.
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// A caller supplied buffer is shorter than the operation requires.
    #[error("buffer too small: required {required}, got {actual}")]
    BufferTooSmall { required: usize, actual: usize },
}

impl TexWrapError {
    pub(crate) fn codec(codec: &'static str, reason: impl Into<String>) -> Self {
        Self::CodecFailure {
            codec,
            reason: reason.into(),
        }
    }

    /// Checks that `actual` can hold `required` bytes.
    pub(crate) fn check_len(required: usize, actual: usize) -> Result<()> {
        if actual < required {
            Err(Self::BufferTooSmall { required, actual })
        } else {
            Ok(())
        }
    }
}

/// Byte length of a `width * height` RGBA8 image, rejecting empty or overflowing sizes.
pub(crate) fn rgba8_len(width: u32, height: u32) -> Result<usize> {
    if width == 0 || height == 0 {
        return Err(TexWrapError::InvalidDimensions { width, height });
    }
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|pixels| pixels.checked_mul(4))
        .ok_or(TexWrapError::InvalidDimensions { width, height })
}
