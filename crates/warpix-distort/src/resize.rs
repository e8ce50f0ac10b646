use warpix_image::{Image, ImageError};

// OpenCV's INTER_CUBIC coefficient.
const CUBIC_A: f64 = -0.75;

/// Cubic convolution weight for a tap at distance `t` from the sample point.
fn cubic_weight(t: f64) -> f64 {
    let t = t.abs();
    if t <= 1.0 {
        ((CUBIC_A + 2.0) * t - (CUBIC_A + 3.0)) * t * t + 1.0
    } else if t < 2.0 {
        (((t - 5.0) * t + 8.0) * t - 4.0) * CUBIC_A
    } else {
        0.0
    }
}

/// Resize an image using bicubic (cubic convolution) interpolation.
///
/// Source coordinates map through pixel centers,
/// `src = (dst + 0.5) * (src_dim / dst_dim) - 0.5`, and taps past the
/// border are clamped to the edge sample. Intended for the small scalar
/// fields used in noise synthesis; runs serially.
///
/// # Arguments
///
/// * `src` - The input image with shape (H, W, C).
/// * `dst` - The output image, pre-allocated to the target size.
pub fn resize_bicubic<const C: usize>(
    src: &Image<f64, C>,
    dst: &mut Image<f64, C>,
) -> Result<(), ImageError> {
    let (src_rows, src_cols) = (src.rows(), src.cols());
    let (dst_rows, dst_cols) = (dst.rows(), dst.cols());

    if src_rows == 0 || src_cols == 0 {
        return Err(ImageError::ImageDataNotInitialized);
    }
    if dst_rows == 0 || dst_cols == 0 {
        return Ok(());
    }

    let scale_y = src_rows as f64 / dst_rows as f64;
    let scale_x = src_cols as f64 / dst_cols as f64;

    let src_data = src.as_slice();
    let dst_data = dst.as_slice_mut();

    for r in 0..dst_rows {
        let sy = (r as f64 + 0.5) * scale_y - 0.5;
        let y0 = sy.floor();
        let fy = sy - y0;
        let wy: [f64; 4] = std::array::from_fn(|k| cubic_weight(k as f64 - 1.0 - fy));

        for c in 0..dst_cols {
            let sx = (c as f64 + 0.5) * scale_x - 0.5;
            let x0 = sx.floor();
            let fx = sx - x0;
            let wx: [f64; 4] = std::array::from_fn(|k| cubic_weight(k as f64 - 1.0 - fx));

            let mut acc = [0.0f64; C];
            for (ky, &weight_y) in wy.iter().enumerate() {
                let y = (y0 as isize + ky as isize - 1).clamp(0, src_rows as isize - 1) as usize;
                for (kx, &weight_x) in wx.iter().enumerate() {
                    let x =
                        (x0 as isize + kx as isize - 1).clamp(0, src_cols as isize - 1) as usize;
                    let idx = (y * src_cols + x) * C;
                    let w = weight_y * weight_x;
                    for (ch, acc_val) in acc.iter_mut().enumerate() {
                        *acc_val += src_data[idx + ch] * w;
                    }
                }
            }

            let out_idx = (r * dst_cols + c) * C;
            dst_data[out_idx..out_idx + C].copy_from_slice(&acc);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use warpix_image::ImageSize;

    #[test]
    fn cubic_weights_partition_unity() {
        for i in 0..=20 {
            let f = i as f64 / 20.0;
            let sum: f64 = (0..4).map(|k| cubic_weight(k as f64 - 1.0 - f)).sum();
            assert_relative_eq!(sum, 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn upsample_constant_stays_constant() -> Result<(), ImageError> {
        let src = Image::<f64, 1>::from_size_val(
            ImageSize {
                width: 3,
                height: 2,
            },
            17.0,
        )?;
        let mut dst = Image::<f64, 1>::from_size_val(
            ImageSize {
                width: 7,
                height: 5,
            },
            0.0,
        )?;
        resize_bicubic(&src, &mut dst)?;
        for &v in dst.as_slice() {
            assert_relative_eq!(v, 17.0, epsilon = 1e-9);
        }
        Ok(())
    }

    #[test]
    fn identity_resize_preserves_samples() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 4,
            height: 3,
        };
        let data: Vec<f64> = (0..12).map(|v| v as f64).collect();
        let src = Image::<f64, 1>::new(size, data.clone())?;
        let mut dst = Image::<f64, 1>::from_size_val(size, 0.0)?;
        resize_bicubic(&src, &mut dst)?;
        for (&a, &b) in dst.as_slice().iter().zip(data.iter()) {
            assert_relative_eq!(a, b, epsilon = 1e-9);
        }
        Ok(())
    }

    #[test]
    fn upsample_from_single_pixel() -> Result<(), ImageError> {
        let src = Image::<f64, 1>::new(
            ImageSize {
                width: 1,
                height: 1,
            },
            vec![128.0],
        )?;
        let mut dst = Image::<f64, 1>::from_size_val(
            ImageSize {
                width: 4,
                height: 4,
            },
            0.0,
        )?;
        resize_bicubic(&src, &mut dst)?;
        for &v in dst.as_slice() {
            assert_relative_eq!(v, 128.0, epsilon = 1e-9);
        }
        Ok(())
    }
}
