//! Raster preparation for embedded images

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{ImageReader, Rgb, RgbImage};

use crate::document::{Color, Rect};
use crate::error::{Error, Result};

/// A JPEG ready to be embedded as a DCTDecode image XObject
#[derive(Debug, Clone)]
pub(crate) struct PreparedImage {
    pub width: u32,
    pub height: u32,
    pub jpeg: Vec<u8>,
}

/// Decode `bytes`, shrink to at most `max_width` pixels wide and flatten
/// transparency onto `background`
pub(crate) fn prepare_image(
    bytes: &[u8],
    max_width: u32,
    background: Color,
    quality: u8,
) -> Result<PreparedImage> {
    let decoded = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .decode()?;

    if decoded.width() == 0 || decoded.height() == 0 {
        return Err(Error::General("image has no pixels".to_string()));
    }

    let decoded = if max_width > 0 && decoded.width() > max_width {
        let height = (decoded.height() as f64 * max_width as f64 / decoded.width() as f64)
            .round()
            .max(1.0) as u32;
        decoded.resize_exact(max_width, height, FilterType::Lanczos3)
    } else {
        decoded
    };

    let rgba = decoded.to_rgba8();
    let Color(br, bg, bb) = background;
    let flattened = RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let alpha = a as f64 / 255.0;
        let blend = |fg: u8, bk: u8| (fg as f64 * alpha + bk as f64 * (1.0 - alpha)).round() as u8;
        Rgb([blend(r, br), blend(g, bg), blend(b, bb)])
    });

    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, quality.clamp(1, 100)).encode_image(&flattened)?;

    Ok(PreparedImage {
        width: flattened.width(),
        height: flattened.height(),
        jpeg,
    })
}

/// Largest rectangle with the image's aspect ratio inside `frame`,
/// centered horizontally and aligned to the frame's top
pub(crate) fn contain(frame: &Rect, width: u32, height: u32) -> Rect {
    if width == 0 || height == 0 {
        return *frame;
    }
    let aspect = width as f64 / height as f64;
    let draw_width = frame.width.min(frame.height * aspect);
    let draw_height = draw_width / aspect;
    Rect::new(
        frame.x + (frame.width - draw_width) / 2.0,
        frame.y,
        draw_width,
        draw_height,
    )
}
