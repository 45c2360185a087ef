/// Error of one channel between two RGBA8 images.
#[derive(Debug, Clone, Copy)]
pub struct ChannelError {
    pub mse: f64,
    pub psnr: f64,
    pub max_difference: u8,
}

/// Per channel error of a decoded image against its source.
#[derive(Debug, Clone, Copy)]
pub struct ImageError {
    pub red: ChannelError,
    pub green: ChannelError,
    pub blue: ChannelError,
    pub alpha: ChannelError,
}

impl ImageError {
    /// Mean PSNR over the colour channels.
    pub fn color_psnr(&self) -> f64 {
        let mse = (self.red.mse + self.green.mse + self.blue.mse) / 3.0;
        psnr(mse)
    }

    pub fn max_difference(&self) -> u8 {
        self.red
            .max_difference
            .max(self.green.max_difference)
            .max(self.blue.max_difference)
            .max(self.alpha.max_difference)
    }
}

fn psnr(mse: f64) -> f64 {
    if mse == 0.0 {
        f64::INFINITY
    } else {
        10.0 * (255.0 * 255.0 / mse).log10()
    }
}

/// Compares two RGBA8 images of the same size on the 8-bit scale.
pub fn compare_rgba8(original: &[u8], decoded: &[u8]) -> ImageError {
    assert_eq!(original.len(), decoded.len(), "image sizes differ");
    assert_eq!(original.len() % 4, 0, "not an RGBA8 image");

    let mut squared = [0.0f64; 4];
    let mut max_difference = [0u8; 4];

    for (original, decoded) in original.chunks_exact(4).zip(decoded.chunks_exact(4)) {
        for channel in 0..4 {
            let difference = original[channel].abs_diff(decoded[channel]);
            squared[channel] += (difference as f64).powi(2);
            max_difference[channel] = max_difference[channel].max(difference);
        }
    }

    let pixels = (original.len() / 4).max(1) as f64;
    let channel = |index: usize| {
        let mse = squared[index] / pixels;
        ChannelError {
            mse,
            psnr: psnr(mse),
            max_difference: max_difference[index],
        }
    };

    ImageError {
        red: channel(0),
        green: channel(1),
        blue: channel(2),
        alpha: channel(3),
    }
}
