use crate::error::DistortError;
use crate::flip;
use crate::generator::Generator;
use crate::resample;
use warpix_image::Image;

/// A single image transformation stage.
#[derive(Clone, Debug)]
pub enum Transform {
    /// Mirror the image along the selected axes; both axes together rotate
    /// the image by 180 degrees, neither returns the image unchanged.
    Flip {
        /// Mirror left-right.
        horizontal: bool,
        /// Mirror top-bottom.
        vertical: bool,
    },
    /// Warp the image through a generated displacement field.
    Warp(Generator),
}

impl Transform {
    /// Apply the transformation to an image, producing a new image of the
    /// same size.
    ///
    /// The no-op flip is the only stage that returns its input without
    /// allocating a new buffer.
    pub fn apply<const C: usize>(&mut self, image: Image<u8, C>) -> Result<Image<u8, C>, DistortError> {
        match self {
            Transform::Flip {
                horizontal,
                vertical,
            } => match (*horizontal, *vertical) {
                (false, false) => Ok(image),
                (true, false) => Ok(flip::horizontal_flip(&image)?),
                (false, true) => Ok(flip::vertical_flip(&image)?),
                (true, true) => Ok(flip::rotate180(&image)?),
            },
            Transform::Warp(generator) => {
                let field = generator.generate(image.size())?;
                let mut warped = Image::from_size_val(image.size(), 0)?;
                resample::warp(&image, &mut warped, &field)?;
                Ok(warped)
            }
        }
    }
}

/// An ordered sequence of transformations applied to every image.
///
/// Built once from configuration and immutable afterwards, except for the
/// random generator caches updated lazily during [`Pipeline::apply`].
#[derive(Clone, Debug, Default)]
pub struct Pipeline {
    transforms: Vec<Transform>,
}

impl Pipeline {
    /// Create a pipeline from an ordered list of transformations.
    pub fn new(transforms: Vec<Transform>) -> Self {
        Self { transforms }
    }

    /// The number of stages in the pipeline.
    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    /// Whether the pipeline has no stages.
    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    /// Apply all stages in order, each consuming the previous stage's
    /// output, and return the final image.
    pub fn apply<const C: usize>(&mut self, image: Image<u8, C>) -> Result<Image<u8, C>, DistortError> {
        let mut image = image;
        for transform in &mut self.transforms {
            image = transform.apply(image)?;
        }
        Ok(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::GridSize;
    use crate::generator::SineWave;
    use warpix_image::ImageSize;

    fn checkerboard() -> Image<u8, 1> {
        let size = ImageSize {
            width: 4,
            height: 4,
        };
        let data = (0..16).map(|v| if v % 2 == 0 { 0 } else { 255 }).collect();
        Image::new(size, data).unwrap()
    }

    #[test]
    fn noop_flip_returns_input() -> Result<(), DistortError> {
        let image = checkerboard();
        let expected = image.clone();
        let mut transform = Transform::Flip {
            horizontal: false,
            vertical: false,
        };
        let out = transform.apply(image)?;
        assert_eq!(out, expected);
        Ok(())
    }

    #[test]
    fn pipeline_applies_in_order() -> Result<(), DistortError> {
        let size = ImageSize {
            width: 2,
            height: 2,
        };
        let image = Image::<u8, 1>::new(size, vec![1, 2, 3, 4])?;

        // horizontal then vertical flip is a 180 degree rotation
        let mut pipeline = Pipeline::new(vec![
            Transform::Flip {
                horizontal: true,
                vertical: false,
            },
            Transform::Flip {
                horizontal: false,
                vertical: true,
            },
        ]);
        let out = pipeline.apply(image)?;
        assert_eq!(out.as_slice(), &[4, 3, 2, 1]);
        Ok(())
    }

    #[test]
    fn zero_sine_stage_is_identity() -> Result<(), DistortError> {
        let image = checkerboard();
        let expected = image.clone();
        let mut pipeline = Pipeline::new(vec![Transform::Warp(Generator::Sine(SineWave::new(
            GridSize::Fixed(2),
            [0.0; 4],
            [0.0; 4],
        )))]);
        let out = pipeline.apply(image)?;
        assert_eq!(out, expected);
        Ok(())
    }

    #[test]
    fn empty_pipeline_is_identity() -> Result<(), DistortError> {
        let image = checkerboard();
        let expected = image.clone();
        let mut pipeline = Pipeline::default();
        assert!(pipeline.is_empty());
        let out = pipeline.apply(image)?;
        assert_eq!(out, expected);
        Ok(())
    }
}
