use super::StepError;
use image::{GrayImage, Luma};
use imageproc::morphology::{grayscale_dilate, grayscale_open, Mask};

/// Largest side `Mask::from_image` accepts
const MAX_KERNEL_SIDE: u32 = 511;

/// Rectangular structuring element of `w`x`h` pixels.
/// The anchor sits at `(w / 2, h / 2)`, so even-sized kernels reach one
/// pixel further up/left than down/right.
pub struct Kernel {
    mask: Mask,
}

impl Kernel {
    pub fn new((width, height): (u32, u32)) -> Result<Self, StepError> {
        if width == 0 || height == 0 || width > MAX_KERNEL_SIDE || height > MAX_KERNEL_SIDE {
            return Err(StepError::InvalidParameter(format!(
                "morphology kernel must be 1x1 to {MAX_KERNEL_SIDE}x{MAX_KERNEL_SIDE}, got {width}x{height}"
            )));
        }

        let footprint = GrayImage::from_pixel(width, height, Luma([255]));
        // Both halves are at most 255 after the size check
        let mask = Mask::from_image(&footprint, (width / 2) as u8, (height / 2) as u8);
        Ok(Self { mask })
    }
}

/// Grayscale dilation (local maximum), repeated `iterations` times.
/// Pixels outside the image are ignored.
pub fn dilate(image: &GrayImage, kernel: &Kernel, iterations: u32) -> GrayImage {
    let mut current = image.clone();
    for _ in 0..iterations {
        current = grayscale_dilate(&current, &kernel.mask);
    }
    current
}

/// Morphological opening: erosion followed by dilation.
/// Removes bright specks smaller than the kernel.
pub fn open(image: &GrayImage, kernel: &Kernel) -> GrayImage {
    grayscale_open(image, &kernel.mask)
}
