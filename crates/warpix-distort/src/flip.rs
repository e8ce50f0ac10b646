use rayon::{
    iter::{IndexedParallelIterator, ParallelIterator},
    slice::ParallelSliceMut,
};
use warpix_image::{Image, ImageError};

/// Flip the input image horizontally (mirror left-right).
///
/// # Arguments
///
/// * `src` - The input image with shape (H, W, C).
///
/// # Returns
///
/// The flipped image.
///
/// # Example
///
/// ```
/// use warpix_image::{Image, ImageSize};
/// use warpix_distort::flip::horizontal_flip;
///
/// let image = Image::<u8, 3>::new(
///     ImageSize {
///         width: 2,
///         height: 3,
///     },
///     vec![0u8; 2 * 3 * 3],
/// )
/// .unwrap();
///
/// let flipped = horizontal_flip(&image).unwrap();
///
/// assert_eq!(flipped.size().width, 2);
/// assert_eq!(flipped.size().height, 3);
/// ```
pub fn horizontal_flip<T, const C: usize>(src: &Image<T, C>) -> Result<Image<T, C>, ImageError>
where
    T: Copy + Send + Sync,
{
    let mut dst = src.clone();
    let cols = src.cols();
    if cols < 2 {
        return Ok(dst);
    }

    dst.as_slice_mut()
        .par_chunks_exact_mut(cols * C)
        .for_each(|row| {
            let mut i = 0;
            let mut j = cols - 1;
            while i < j {
                for c in 0..C {
                    row.swap(i * C + c, j * C + c);
                }
                i += 1;
                j -= 1;
            }
        });

    Ok(dst)
}

/// Flip the input image vertically (mirror top-bottom).
///
/// # Arguments
///
/// * `src` - The input image with shape (H, W, C).
///
/// # Returns
///
/// The flipped image.
pub fn vertical_flip<T, const C: usize>(src: &Image<T, C>) -> Result<Image<T, C>, ImageError>
where
    T: Copy + Send + Sync,
{
    let mut dst = src.clone();
    let rows = src.rows();
    let cols = src.cols();
    if rows < 2 || cols == 0 {
        return Ok(dst);
    }

    let data = dst.as_slice_mut();
    let row_stride = cols * C;
    let (top, bottom) = data.split_at_mut(row_stride * (rows / 2));
    let skip = row_stride * (rows % 2);
    top.par_chunks_exact_mut(row_stride)
        .zip(bottom[skip..].par_chunks_exact_mut(row_stride).rev())
        .for_each(|(row_a, row_b)| {
            row_a.swap_with_slice(row_b);
        });

    Ok(dst)
}

/// Rotate the input image by 180 degrees (horizontal and vertical flip).
///
/// # Arguments
///
/// * `src` - The input image with shape (H, W, C).
///
/// # Returns
///
/// The rotated image.
pub fn rotate180<T, const C: usize>(src: &Image<T, C>) -> Result<Image<T, C>, ImageError>
where
    T: Copy + Send + Sync,
{
    vertical_flip(&horizontal_flip(src)?)
}
