//! # Image Loading
//!
//! Resolves an image source (file path, `data:` URI or raw base64) to bytes
//! the PDF backend can embed. JPEG passes through untouched since PDF decodes
//! it natively (DCTDecode). PNG is decoded to RGB with the alpha channel split
//! off for an SMask.

use std::io::Cursor;
use std::path::Path;

use base64::Engine;

use crate::error::{FolioError, Result};

/// An image ready for embedding.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub pixel_data: ImagePixelData,
    pub width_px: u32,
    pub height_px: u32,
}

#[derive(Debug, Clone)]
pub enum ImagePixelData {
    /// Raw JPEG bytes, embedded as-is.
    Jpeg {
        data: Vec<u8>,
        color_space: JpegColorSpace,
    },
    /// width * height * 3 RGB bytes, plus width * height alpha bytes when
    /// any pixel is translucent.
    Decoded { rgb: Vec<u8>, alpha: Option<Vec<u8>> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JpegColorSpace {
    DeviceRGB,
    DeviceGray,
}

impl JpegColorSpace {
    pub fn pdf_name(self) -> &'static str {
        match self {
            JpegColorSpace::DeviceRGB => "/DeviceRGB",
            JpegColorSpace::DeviceGray => "/DeviceGray",
        }
    }
}

/// Load and decode the image behind `src`.
pub fn load_image(src: &str) -> Result<LoadedImage> {
    let bytes = read_source_bytes(src)?;
    decode_image_bytes(&bytes).map_err(|e| FolioError::Image(format!("{}: {}", short(src), e)))
}

fn read_source_bytes(src: &str) -> Result<Vec<u8>> {
    if let Some(rest) = src.strip_prefix("data:image/") {
        let (_, payload) = rest
            .split_once(',')
            .ok_or_else(|| FolioError::Image("invalid data URI: missing comma".to_string()))?;
        return base64_decode(payload);
    }

    let path = Path::new(src);
    if path.is_file() {
        return std::fs::read(path)
            .map_err(|e| FolioError::Image(format!("failed to read '{}': {}", src, e)));
    }

    base64_decode(src).map_err(|_| {
        FolioError::Image(format!(
            "'{}' is neither a readable file nor base64 image data",
            short(src)
        ))
    })
}

fn base64_decode(input: &str) -> Result<Vec<u8>> {
    base64::engine::general_purpose::STANDARD
        .decode(input.trim())
        .map_err(|e| FolioError::Image(format!("base64 decode error: {}", e)))
}

/// First few characters of a source, for error messages.
fn short(src: &str) -> String {
    if src.chars().count() > 48 {
        format!("{}...", src.chars().take(48).collect::<String>())
    } else {
        src.to_string()
    }
}

fn decode_image_bytes(data: &[u8]) -> std::result::Result<LoadedImage, String> {
    if data.len() < 4 {
        return Err("image data too short".to_string());
    }
    if is_jpeg(data) {
        decode_jpeg(data)
    } else if is_png(data) {
        decode_png(data)
    } else {
        Err("unsupported image format (expected JPEG or PNG)".to_string())
    }
}

fn is_jpeg(data: &[u8]) -> bool {
    data.starts_with(&[0xFF, 0xD8])
}

fn is_png(data: &[u8]) -> bool {
    data.starts_with(&[0x89, b'P', b'N', b'G'])
}

fn decode_jpeg(data: &[u8]) -> std::result::Result<LoadedImage, String> {
    let (width, height) = image::io::Reader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| format!("JPEG format detection error: {}", e))?
        .into_dimensions()
        .map_err(|e| format!("failed to read JPEG dimensions: {}", e))?;

    Ok(LoadedImage {
        pixel_data: ImagePixelData::Jpeg {
            data: data.to_vec(),
            color_space: jpeg_color_space(data),
        },
        width_px: width,
        height_px: height,
    })
}

/// Read the component count from the first SOF segment.
fn jpeg_color_space(data: &[u8]) -> JpegColorSpace {
    let mut i = 2;
    while i + 3 < data.len() && data[i] == 0xFF {
        let marker = data[i + 1];
        let is_sof = matches!(marker, 0xC0..=0xC3 | 0xC5..=0xC7 | 0xC9..=0xCB | 0xCD..=0xCF);
        if is_sof && i + 9 < data.len() {
            return if data[i + 9] == 1 {
                JpegColorSpace::DeviceGray
            } else {
                JpegColorSpace::DeviceRGB
            };
        }
        let segment_len = u16::from_be_bytes([data[i + 2], data[i + 3]]) as usize;
        i += 2 + segment_len;
    }
    JpegColorSpace::DeviceRGB
}

fn decode_png(data: &[u8]) -> std::result::Result<LoadedImage, String> {
    let img = image::load_from_memory_with_format(data, image::ImageFormat::Png)
        .map_err(|e| format!("failed to decode PNG: {}", e))?;

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    let pixel_count = (width * height) as usize;
    let mut rgb = Vec::with_capacity(pixel_count * 3);
    let mut alpha = Vec::with_capacity(pixel_count);

    for pixel in rgba.pixels() {
        rgb.extend_from_slice(&pixel.0[..3]);
        alpha.push(pixel.0[3]);
    }
    let translucent = alpha.iter().any(|&a| a != 255);

    Ok(LoadedImage {
        pixel_data: ImagePixelData::Decoded {
            rgb,
            alpha: translucent.then_some(alpha),
        },
        width_px: width,
        height_px: height,
    })
}
