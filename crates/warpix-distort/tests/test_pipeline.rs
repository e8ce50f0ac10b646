use warpix_distort::config::parse_pipeline;
use warpix_distort::DistortError;
use warpix_image::{Image, ImageSize};

fn gradient_image(width: usize, height: usize) -> Image<u8, 3> {
    let data = (0..width * height * 3)
        .map(|v| (v * 31 % 256) as u8)
        .collect();
    Image::new(ImageSize { width, height }, data).unwrap()
}

#[test]
fn configured_flips_compose_to_rotation() -> Result<(), DistortError> {
    let image = gradient_image(7, 5);
    let expected: Vec<u8> = image
        .as_slice()
        .chunks_exact(3)
        .rev()
        .flatten()
        .copied()
        .collect();

    let mut pipeline = parse_pipeline(["flip:h", "flip:v"], ':').unwrap();
    let out = pipeline.apply(image)?;
    assert_eq!(out.as_slice(), expected.as_slice());
    Ok(())
}

#[test]
fn zero_sine_descriptor_is_identity_for_any_grid() -> Result<(), DistortError> {
    for descriptor in ["sine", "sine:1", "sine:3", "sine:64"] {
        let image = gradient_image(16, 12);
        let expected = image.clone();
        let mut pipeline = parse_pipeline([descriptor], ':').unwrap();
        let out = pipeline.apply(image)?;
        assert_eq!(out, expected, "descriptor {descriptor}");
    }
    Ok(())
}

#[test]
fn random_descriptor_preserves_shape() -> Result<(), DistortError> {
    let image = gradient_image(20, 14);
    let mut pipeline = parse_pipeline(["random:4:2.0"], ':').unwrap();
    let out = pipeline.apply(image)?;
    assert_eq!(
        out.size(),
        ImageSize {
            width: 20,
            height: 14
        }
    );
    assert_eq!(out.num_channels(), 3);
    Ok(())
}

#[test]
fn chained_warp_and_flip_preserve_shape() -> Result<(), DistortError> {
    let image = gradient_image(9, 9);
    let mut pipeline =
        parse_pipeline(["sine:2:3:45:0:0:2:0:45:90", "flip:h", "random:3"], ':').unwrap();
    let out = pipeline.apply(image)?;
    assert_eq!(
        out.size(),
        ImageSize {
            width: 9,
            height: 9
        }
    );
    Ok(())
}

#[test]
fn invalid_descriptor_fails_before_any_image() {
    assert!(parse_pipeline(["flip:h", "swirl:2"], ':').is_err());
    assert!(parse_pipeline(["flip"], ':').is_err());
    assert!(parse_pipeline(["sine:abc"], ':').is_err());
}
