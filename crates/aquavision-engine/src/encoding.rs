use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use aquavision_contracts::image::ImageData;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader, Rgba, RgbaImage};
use sha2::{Digest, Sha256};

const JPEG_QUALITY: u8 = 90;

/// Reads an image file for upload.
pub fn load_image_file(path: &Path, max_dim: u32) -> Result<ImageData> {
    let bytes = fs::read(path).with_context(|| format!("failed reading {}", path.display()))?;
    encode_image_bytes(bytes, Some(path), max_dim)
        .with_context(|| format!("cannot use {} as a photo", path.display()))
}

/// Detects the MIME type from content and downsizes pictures whose longest
/// side exceeds `max_dim`. Bytes that are not an image are rejected.
pub fn encode_image_bytes(bytes: Vec<u8>, path_hint: Option<&Path>, max_dim: u32) -> Result<ImageData> {
    if bytes.is_empty() {
        bail!("image file is empty");
    }
    let Ok(format) = image::guess_format(&bytes) else {
        if let Some(mime) = path_hint.and_then(undecodable_image_mime) {
            return Ok(ImageData::new(bytes, mime));
        }
        bail!("not a recognised image format");
    };
    let mime = format.to_mime_type();

    let dimensions = ImageReader::new(Cursor::new(&bytes))
        .with_guessed_format()
        .context("cannot read image header")
        .and_then(|reader| reader.into_dimensions().context("cannot read image dimensions"));
    let (width, height) = match dimensions {
        Ok(dimensions) => dimensions,
        Err(err) => match path_hint.and_then(undecodable_image_mime) {
            Some(mime) => return Ok(ImageData::new(bytes, mime)),
            None => return Err(err.context(format!("damaged {mime} image"))),
        },
    };
    if width.max(height) <= max_dim {
        return Ok(ImageData::new(bytes, mime));
    }

    match downscale_to_jpeg(&bytes, max_dim) {
        Some(resized) => Ok(ImageData::new(resized, "image/jpeg")),
        None => Ok(ImageData::new(bytes, mime)),
    }
}

fn downscale_to_jpeg(bytes: &[u8], max_dim: u32) -> Option<Vec<u8>> {
    let image = image::load_from_memory(bytes).ok()?;
    let rgba = image.to_rgba8();
    let mut flattened = RgbaImage::new(rgba.width(), rgba.height());
    for (x, y, pixel) in rgba.enumerate_pixels() {
        let alpha = u16::from(pixel[3]);
        let blend = |channel: u8| -> u8 {
            (((u16::from(channel) * alpha) + (255 * (255 - alpha))) / 255) as u8
        };
        flattened.put_pixel(
            x,
            y,
            Rgba([blend(pixel[0]), blend(pixel[1]), blend(pixel[2]), 255]),
        );
    }
    let resized = DynamicImage::ImageRgba8(flattened)
        .resize(max_dim, max_dim, FilterType::Triangle)
        .to_rgb8();
    let mut out = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY);
    encoder
        .encode_image(&DynamicImage::ImageRgb8(resized))
        .ok()?;
    Some(out)
}

/// Phone formats the decoder cannot read but the model accepts as-is.
fn undecodable_image_mime(path: &Path) -> Option<&'static str> {
    let ext = path
        .extension()
        .and_then(|value| value.to_str())
        .map(|value| value.to_ascii_lowercase())?;
    match ext.as_str() {
        "heic" => Some("image/heic"),
        "heif" => Some("image/heif"),
        _ => None,
    }
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Writes `image` as `{stem}.{ext}` inside `dir`, creating the directory.
pub fn save_image(dir: &Path, stem: &str, image: &ImageData) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    let path = dir.join(format!("{stem}.{}", image.extension()));
    fs::write(&path, &image.bytes)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}
