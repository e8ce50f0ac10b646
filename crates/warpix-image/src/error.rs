/// An error type for the image module.
#[derive(thiserror::Error, Debug)]
pub enum ImageError {
    /// Error when the data length does not match the image shape.
    #[error("data length ({0}) does not match the image size ({1})")]
    InvalidChannelShape(usize, usize),

    /// Error when two images that must share a shape do not.
    #[error("image sizes do not match ({0}x{1} vs {2}x{3})")]
    InvalidImageSize(usize, usize, usize, usize),

    /// Error when a pixel coordinate lies outside the image.
    #[error("pixel coordinate ({0}, {1}, {2}) is out of bounds")]
    PixelIndexOutOfBounds(usize, usize, usize),

    /// Error when an operation needs a non-empty image.
    #[error("image contains no data")]
    ImageDataNotInitialized,
}
