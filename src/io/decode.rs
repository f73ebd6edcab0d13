use std::path::Path;

use anyhow::Context;

use crate::foundation::{
    core::{Frame, MediaImage},
    error::MoshResult,
};

/// Decode any format the `image` crate knows into straight RGBA8.
pub fn decode_image(bytes: &[u8]) -> MoshResult<MediaImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    MediaImage::new(width, height, rgba.into_raw())
}

pub fn load_image(path: &Path) -> MoshResult<MediaImage> {
    let bytes =
        std::fs::read(path).with_context(|| format!("read image '{}'", path.display()))?;
    decode_image(&bytes)
}

/// Load an image file as a working frame stamped with `timestamp`.
pub fn load_frame(path: &Path, timestamp: f64) -> MoshResult<Frame> {
    let img = load_image(path)?;
    let data = std::sync::Arc::unwrap_or_clone(img.rgba8);
    Frame::new(img.width, img.height, data, timestamp)
}

/// Write `frame` as an RGBA8 PNG, creating parent directories as needed.
pub fn save_png(frame: &Frame, path: &Path) -> MoshResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        path,
        frame.data(),
        frame.width(),
        frame.height(),
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/io/decode.rs"]
mod tests;
