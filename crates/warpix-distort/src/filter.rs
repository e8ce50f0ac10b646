use warpix_image::{Image, ImageError};

/// Create a gaussian blur kernel.
///
/// # Arguments
///
/// * `kernel_size` - The size of the kernel.
/// * `sigma` - The sigma of the gaussian kernel.
///
/// # Returns
///
/// A normalized vector of kernel taps.
pub fn gaussian_kernel_1d(kernel_size: usize, sigma: f64) -> Vec<f64> {
    let mut kernel = Vec::with_capacity(kernel_size);

    let mean = (kernel_size - 1) as f64 / 2.0;
    let sigma_sq = sigma * sigma;

    for i in 0..kernel_size {
        let x = i as f64 - mean;
        kernel.push((-(x * x) / (2.0 * sigma_sq)).exp());
    }

    let norm = kernel.iter().sum::<f64>();
    kernel.iter_mut().for_each(|k| *k /= norm);
    kernel
}

/// Create the 3-tap sobel kernel pair `(derivative, smoothing)`.
pub fn sobel_kernel_1d() -> (Vec<f64>, Vec<f64>) {
    (vec![-1.0, 0.0, 1.0], vec![1.0, 2.0, 1.0])
}

/// Reflect an out-of-range index back into `[0, len)` without repeating the
/// border sample (the `gfedcb|abcdefgh|gfedcba` scheme).
fn reflect_101(idx: isize, len: usize) -> usize {
    if len == 1 {
        return 0;
    }
    let len = len as isize;
    let mut i = idx;
    loop {
        if i < 0 {
            i = -i;
        } else if i >= len {
            i = 2 * len - 2 - i;
        } else {
            return i as usize;
        }
    }
}

/// Apply a separable 2D filter to an image.
///
/// The horizontal kernel runs first into a scratch buffer, then the vertical
/// kernel produces the destination. Samples past the image border are
/// reflected (reflect-101), so a constant image stays constant under any
/// normalized kernel.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `dst` - The destination image with shape (H, W, C).
/// * `kernel_x` - The horizontal kernel taps.
/// * `kernel_y` - The vertical kernel taps.
pub fn separable_filter<const C: usize>(
    src: &Image<f64, C>,
    dst: &mut Image<f64, C>,
    kernel_x: &[f64],
    kernel_y: &[f64],
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    let rows = src.rows();
    let cols = src.cols();
    if rows == 0 || cols == 0 {
        return Ok(());
    }

    let half_x = (kernel_x.len() / 2) as isize;
    let half_y = (kernel_y.len() / 2) as isize;

    let src_data = src.as_slice();
    let mut temp = vec![0.0f64; src_data.len()];

    // horizontal pass
    for r in 0..rows {
        let row_offset = r * cols * C;
        for c in 0..cols {
            let mut acc = [0.0f64; C];
            for (k, &tap) in kernel_x.iter().enumerate() {
                let x = reflect_101(c as isize + k as isize - half_x, cols);
                let idx = row_offset + x * C;
                for (ch, acc_val) in acc.iter_mut().enumerate() {
                    *acc_val += src_data[idx + ch] * tap;
                }
            }
            let out_idx = row_offset + c * C;
            temp[out_idx..out_idx + C].copy_from_slice(&acc);
        }
    }

    // vertical pass
    let dst_data = dst.as_slice_mut();
    for r in 0..rows {
        for c in 0..cols {
            let mut acc = [0.0f64; C];
            for (k, &tap) in kernel_y.iter().enumerate() {
                let y = reflect_101(r as isize + k as isize - half_y, rows);
                let idx = (y * cols + c) * C;
                for (ch, acc_val) in acc.iter_mut().enumerate() {
                    *acc_val += temp[idx + ch] * tap;
                }
            }
            let out_idx = (r * cols + c) * C;
            dst_data[out_idx..out_idx + C].copy_from_slice(&acc);
        }
    }

    Ok(())
}

/// Blur an image using a gaussian filter.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `dst` - The destination image with shape (H, W, C).
/// * `kernel_size` - The side length of the kernel.
/// * `sigma` - The sigma of the gaussian kernel.
pub fn gaussian_blur<const C: usize>(
    src: &Image<f64, C>,
    dst: &mut Image<f64, C>,
    kernel_size: usize,
    sigma: f64,
) -> Result<(), ImageError> {
    let kernel = gaussian_kernel_1d(kernel_size, sigma);
    separable_filter(src, dst, &kernel, &kernel)
}

/// Compute the horizontal sobel derivative of an image.
pub fn sobel_x<const C: usize>(
    src: &Image<f64, C>,
    dst: &mut Image<f64, C>,
) -> Result<(), ImageError> {
    let (deriv, smooth) = sobel_kernel_1d();
    separable_filter(src, dst, &deriv, &smooth)
}

/// Compute the vertical sobel derivative of an image.
pub fn sobel_y<const C: usize>(
    src: &Image<f64, C>,
    dst: &mut Image<f64, C>,
) -> Result<(), ImageError> {
    let (deriv, smooth) = sobel_kernel_1d();
    separable_filter(src, dst, &smooth, &deriv)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use warpix_image::ImageSize;

    #[test]
    fn gaussian_kernel_normalized() {
        let kernel = gaussian_kernel_1d(5, 1.1);
        assert_eq!(kernel.len(), 5);
        assert_relative_eq!(kernel.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
        // symmetric, peaked at the center
        assert_relative_eq!(kernel[0], kernel[4], epsilon = 1e-12);
        assert_relative_eq!(kernel[1], kernel[3], epsilon = 1e-12);
        assert!(kernel[2] > kernel[1] && kernel[1] > kernel[0]);
    }

    #[test]
    fn reflect_101_indices() {
        assert_eq!(reflect_101(-1, 5), 1);
        assert_eq!(reflect_101(-2, 5), 2);
        assert_eq!(reflect_101(0, 5), 0);
        assert_eq!(reflect_101(4, 5), 4);
        assert_eq!(reflect_101(5, 5), 3);
        assert_eq!(reflect_101(6, 5), 2);
        assert_eq!(reflect_101(-1, 1), 0);
    }

    #[test]
    fn blur_keeps_constant_image() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 6,
            height: 4,
        };
        let src = Image::<f64, 1>::from_size_val(size, 42.0)?;
        let mut dst = Image::<f64, 1>::from_size_val(size, 0.0)?;
        gaussian_blur(&src, &mut dst, 5, 1.1)?;
        for &v in dst.as_slice() {
            assert_relative_eq!(v, 42.0, epsilon = 1e-9);
        }
        Ok(())
    }

    #[test]
    fn sobel_x_on_ramp() -> Result<(), ImageError> {
        // image values increase by 1 per column, so the x-derivative is
        // the kernel response 2 everywhere and the y-derivative is 0
        let size = ImageSize {
            width: 5,
            height: 4,
        };
        let data = (0..size.height)
            .flat_map(|_| (0..size.width).map(|c| c as f64))
            .collect();
        let src = Image::<f64, 1>::new(size, data)?;

        let mut gx = Image::<f64, 1>::from_size_val(size, 0.0)?;
        sobel_x(&src, &mut gx)?;
        let mut gy = Image::<f64, 1>::from_size_val(size, 0.0)?;
        sobel_y(&src, &mut gy)?;

        for r in 0..size.height {
            for c in 1..size.width - 1 {
                assert_relative_eq!(*gx.get_pixel(c, r, 0).unwrap(), 8.0, epsilon = 1e-9);
                assert_relative_eq!(*gy.get_pixel(c, r, 0).unwrap(), 0.0, epsilon = 1e-9);
            }
        }
        Ok(())
    }
}
