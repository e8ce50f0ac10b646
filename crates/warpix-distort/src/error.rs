use warpix_image::ImageError;

/// An error type for distortion operations.
#[derive(thiserror::Error, Debug)]
pub enum DistortError {
    /// Error from the underlying image container.
    #[error(transparent)]
    Image(#[from] ImageError),

    /// Error when a displacement field does not cover the image it is
    /// applied to.
    #[error(
        "displacement field ({rows}x{cols} intersections, spacing {spacing}) \
         does not cover a {width}x{height} image"
    )]
    FieldSizeMismatch {
        /// Intersection rows of the field.
        rows: usize,
        /// Intersection columns of the field.
        cols: usize,
        /// Pixel spacing of the field.
        spacing: usize,
        /// Width of the image.
        width: usize,
        /// Height of the image.
        height: usize,
    },
}
