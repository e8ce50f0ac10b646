use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use argh::FromArgs;
use image::{DynamicImage, GenericImageView};

use warpix::distort::config;
use warpix::distort::{DistortError, Pipeline};
use warpix::image::{Image, ImageSize};

const IMAGE_EXTENSIONS: &[&str] = &["bmp", "jpeg", "jpg", "png", "tif", "tiff", "webp"];

#[derive(FromArgs)]
/// Apply geometric distortions (flips, sine warps, random warps) to images.
struct Args {
    /// image file or directory with images to transform (repeatable)
    #[argh(option, short = 's')]
    source: Vec<PathBuf>,

    /// existing directory to write transformed images into; defaults to
    /// writing next to each source with a "_tf" name suffix
    #[argh(option, short = 't')]
    target: Option<PathBuf>,

    /// recurse into subdirectories when a source is a directory
    #[argh(switch, short = 'r')]
    recursive: bool,

    /// transform descriptor such as "random:5:2" or "flip:v"
    /// (repeatable, applied in order)
    #[argh(option, short = 'f', long = "transform")]
    transforms: Vec<String>,

    /// print the available transformations and exit
    #[argh(switch)]
    list_transforms: bool,
}

/// One image file to transform, remembering where it sat relative to its
/// source directory so the layout can be mirrored under the target.
struct ImageJob {
    path: PathBuf,
    rel_dir: PathBuf,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    if args.list_transforms {
        print_transforms();
        return Ok(());
    }

    if args.transforms.is_empty() {
        return Err(
            "no transformations given; pass at least one --transform (see --list-transforms)"
                .into(),
        );
    }
    if args.source.is_empty() {
        return Err("no sources given; pass at least one --source image or directory".into());
    }
    if let Some(target) = &args.target {
        if !target.is_dir() {
            return Err(
                format!("target \"{}\" is not an existing directory", target.display()).into(),
            );
        }
    }

    // all configuration errors surface here, before any image is read
    let mut pipeline = config::parse_pipeline(&args.transforms, ':')?;

    let jobs = collect_jobs(&args.source, args.recursive)?;
    log::info!("found {} image file(s)", jobs.len());
    if jobs.is_empty() && !args.recursive {
        log::warn!("no image files found; did you forget --recursive?");
        return Ok(());
    }

    for job in &jobs {
        let out_path = output_path(job, args.target.as_deref());
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)?;
        }
        transform_file(&mut pipeline, &job.path, &out_path)
            .map_err(|e| format!("{}: {}", job.path.display(), e))?;
        log::info!("{} -> {}", job.path.display(), out_path.display());
    }

    log::info!("done");
    Ok(())
}

fn print_transforms() {
    println!("Transform parameters are appended with colons, e.g. random:5:2 or flip:v.");
    println!("Chain transforms by repeating --transform; they are applied in order.");
    println!();
    for entry in config::REGISTRY {
        println!(
            "{}\n    Takes at least {} and at most {} parameter(s).\n",
            entry.description, entry.min_params, entry.max_params
        );
    }
}

fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            IMAGE_EXTENSIONS.iter().any(|known| *known == ext)
        })
        .unwrap_or(false)
}

/// Collect the image files under the given sources. A file source is taken
/// as-is; a directory source is searched for files with known image
/// extensions, recursively when requested.
fn collect_jobs(sources: &[PathBuf], recursive: bool) -> Result<Vec<ImageJob>, Box<dyn Error>> {
    let mut jobs = Vec::new();
    for source in sources {
        if source.is_file() {
            jobs.push(ImageJob {
                path: source.clone(),
                rel_dir: PathBuf::new(),
            });
            continue;
        }
        if !source.is_dir() {
            return Err(format!(
                "source \"{}\" is neither an image file nor a directory",
                source.display()
            )
            .into());
        }

        let max_depth = if recursive { usize::MAX } else { 1 };
        for entry in walkdir::WalkDir::new(source).max_depth(max_depth) {
            let entry = entry?;
            if !entry.file_type().is_file() || !is_image_file(entry.path()) {
                continue;
            }
            let rel_dir = entry
                .path()
                .parent()
                .and_then(|parent| parent.strip_prefix(source).ok())
                .map(Path::to_path_buf)
                .unwrap_or_default();
            jobs.push(ImageJob {
                path: entry.path().to_path_buf(),
                rel_dir,
            });
        }
    }
    jobs.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(jobs)
}

/// Where the transformed image goes: under the target directory, mirroring
/// the source-relative layout, or next to the source with a `_tf` suffix.
fn output_path(job: &ImageJob, target: Option<&Path>) -> PathBuf {
    match (target, job.path.file_name()) {
        (Some(target), Some(file_name)) => target.join(&job.rel_dir).join(file_name),
        _ => sibling_path(&job.path),
    }
}

/// `pictures/cat.png` -> `pictures/cat_tf.png`
fn sibling_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("image");
    let name = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{stem}_tf.{ext}"),
        None => format!("{stem}_tf"),
    };
    path.with_file_name(name)
}

fn transform_file(
    pipeline: &mut Pipeline,
    input: &Path,
    output: &Path,
) -> Result<(), Box<dyn Error>> {
    let decoded = image::open(input)?;
    let (width, height) = (decoded.width(), decoded.height());

    match decoded {
        DynamicImage::ImageLuma8(buf) => {
            let data = transform_raw::<1>(pipeline, width, height, buf.into_raw())?;
            rebuild::<image::Luma<u8>>(width, height, data)?.save(output)?;
        }
        DynamicImage::ImageLumaA8(buf) => {
            let data = transform_raw::<2>(pipeline, width, height, buf.into_raw())?;
            rebuild::<image::LumaA<u8>>(width, height, data)?.save(output)?;
        }
        DynamicImage::ImageRgb8(buf) => {
            let data = transform_raw::<3>(pipeline, width, height, buf.into_raw())?;
            rebuild::<image::Rgb<u8>>(width, height, data)?.save(output)?;
        }
        DynamicImage::ImageRgba8(buf) => {
            let data = transform_raw::<4>(pipeline, width, height, buf.into_raw())?;
            rebuild::<image::Rgba<u8>>(width, height, data)?.save(output)?;
        }
        // 16-bit and exotic layouts are narrowed to 8-bit rgb
        other => {
            let buf = other.to_rgb8();
            let data = transform_raw::<3>(pipeline, width, height, buf.into_raw())?;
            rebuild::<image::Rgb<u8>>(width, height, data)?.save(output)?;
        }
    }

    Ok(())
}

fn transform_raw<const C: usize>(
    pipeline: &mut Pipeline,
    width: u32,
    height: u32,
    data: Vec<u8>,
) -> Result<Vec<u8>, DistortError> {
    let size = ImageSize {
        width: width as usize,
        height: height as usize,
    };
    let src = Image::<u8, C>::new(size, data)?;
    Ok(pipeline.apply(src)?.into_vec())
}

fn rebuild<P: image::Pixel<Subpixel = u8>>(
    width: u32,
    height: u32,
    data: Vec<u8>,
) -> Result<image::ImageBuffer<P, Vec<u8>>, Box<dyn Error>> {
    image::ImageBuffer::from_raw(width, height, data)
        .ok_or_else(|| "transformed buffer does not match the image dimensions".into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_extension_filter() {
        assert!(is_image_file(Path::new("a/b/photo.PNG")));
        assert!(is_image_file(Path::new("photo.jpeg")));
        assert!(!is_image_file(Path::new("notes.txt")));
        assert!(!is_image_file(Path::new("no_extension")));
    }

    #[test]
    fn sibling_naming() {
        assert_eq!(
            sibling_path(Path::new("pictures/cat.png")),
            Path::new("pictures/cat_tf.png")
        );
        assert_eq!(sibling_path(Path::new("cat")), Path::new("cat_tf"));
    }

    #[test]
    fn output_path_mirrors_subdirectories() {
        let job = ImageJob {
            path: PathBuf::from("/data/in/sub/cat.png"),
            rel_dir: PathBuf::from("sub"),
        };
        assert_eq!(
            output_path(&job, Some(Path::new("/data/out"))),
            Path::new("/data/out/sub/cat.png")
        );
        assert_eq!(
            output_path(&job, None),
            Path::new("/data/in/sub/cat_tf.png")
        );
    }

    #[test]
    fn collect_respects_recursion() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let root = dir.path();
        fs::write(root.join("a.png"), b"not a real image")?;
        fs::write(root.join("skip.txt"), b"text")?;
        fs::create_dir(root.join("sub"))?;
        fs::write(root.join("sub/b.jpg"), b"not a real image")?;

        let flat = collect_jobs(&[root.to_path_buf()], false)?;
        assert_eq!(flat.len(), 1);
        assert_eq!(flat[0].rel_dir, Path::new(""));

        let deep = collect_jobs(&[root.to_path_buf()], true)?;
        assert_eq!(deep.len(), 2);
        let nested = deep
            .iter()
            .find(|job| job.path.ends_with("b.jpg"))
            .expect("nested job present");
        assert_eq!(nested.rel_dir, Path::new("sub"));
        Ok(())
    }
}
