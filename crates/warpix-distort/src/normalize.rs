use num_traits::Float;

use warpix_image::{Image, ImageError};

/// Find the minimum and maximum values in an image.
///
/// # Arguments
///
/// * `image` - The input image of shape (H, W, C).
///
/// # Errors
///
/// If the image contains no data, an error is returned.
pub fn find_min_max<T, const C: usize>(image: &Image<T, C>) -> Result<(T, T), ImageError>
where
    T: Copy + PartialOrd,
{
    let first = match image.as_slice().first() {
        Some(x) => *x,
        None => return Err(ImageError::ImageDataNotInitialized),
    };

    let mut min = first;
    let mut max = first;
    for &x in image.as_slice() {
        if x < min {
            min = x;
        }
        if x > max {
            max = x;
        }
    }

    Ok((min, max))
}

/// Normalize an image to the range `[new_min, new_max]` using its minimum
/// and maximum values.
///
/// The formula is `(v - min) / (max - min) * (new_max - new_min) + new_min`,
/// so the extremes map exactly onto `new_min` and `new_max`. A constant
/// image has no value spread to rescale and maps to the midpoint of the
/// target range.
///
/// # Arguments
///
/// * `src` - The input image of shape (H, W, C).
/// * `dst` - The output image of shape (H, W, C).
/// * `new_min` - The minimum value of the target range.
/// * `new_max` - The maximum value of the target range.
pub fn normalize_min_max<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    new_min: T,
    new_max: T,
) -> Result<(), ImageError>
where
    T: Float + Send + Sync,
{
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    let (min, max) = find_min_max(src)?;
    let spread = max - min;

    if spread == T::zero() {
        let two = T::one() + T::one();
        let mid = (new_min + new_max) / two;
        dst.as_slice_mut().iter_mut().for_each(|out| *out = mid);
        return Ok(());
    }

    let range = new_max - new_min;
    dst.as_slice_mut()
        .iter_mut()
        .zip(src.as_slice().iter())
        .for_each(|(out, &v)| {
            *out = (v - min) / spread * range + new_min;
        });

    Ok(())
}
