// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Drawable → PNG rendering for banners and icons.

use std::io::Cursor;

use appdeck_core::Drawable;
use appdeck_core::error::{LauncherError, Result};
use image::{ImageFormat, RgbaImage};
use tracing::{instrument, trace};

/// Encode a rasterized drawable as PNG.
///
/// Returns `Ok(None)` when the drawable has no intrinsic size (colour
/// drawables report -1), matching what the UI layer treats as "no image".
#[instrument(skip(drawable), fields(width = drawable.width, height = drawable.height))]
pub fn drawable_to_png(drawable: &Drawable) -> Result<Option<Vec<u8>>> {
    if !drawable.has_intrinsic_size() {
        return Ok(None);
    }

    let (width, height) = (drawable.width as u32, drawable.height as u32);
    let image = RgbaImage::from_raw(width, height, drawable.pixels.clone()).ok_or_else(|| {
        LauncherError::ImageError(format!(
            "pixel buffer of {} bytes does not fit {width}x{height} RGBA",
            drawable.pixels.len()
        ))
    })?;

    let mut buf = Cursor::new(Vec::new());
    image
        .write_to(&mut buf, ImageFormat::Png)
        .map_err(|e| LauncherError::ImageError(format!("PNG encode failed: {e}")))?;

    let png = buf.into_inner();
    trace!(bytes = png.len(), "Drawable encoded");
    Ok(Some(png))
}

/// Number of ARGB pixels a `width`x`height` bitmap holds, as the `jint`
/// length `getPixels` needs.
pub fn pixel_count(width: i32, height: i32) -> Result<i32> {
    width
        .checked_mul(height)
        .filter(|&len| len >= 0)
        .ok_or_else(|| LauncherError::ImageError(format!("drawable too large: {width}x{height}")))
}

/// Convert `Bitmap.getPixels` output (packed, non-premultiplied ARGB) to RGBA8 bytes.
pub fn argb_to_rgba(argb: &[i32]) -> Vec<u8> {
    let mut out = Vec::with_capacity(argb.len() * 4);
    for &px in argb {
        let px = px as u32;
        out.extend_from_slice(&[(px >> 16) as u8, (px >> 8) as u8, px as u8, (px >> 24) as u8]);
    }
    out
}
