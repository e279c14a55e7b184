use anyhow::{Result, anyhow};
use rayon::prelude::*;
use yuv::{YuvPackedImage, YuvRange, YuvStandardMatrix, yuyv422_to_rgba};

use crate::types::{Canvas, ColorFormat, ColorFrame};

/// Convert a raw sensor color frame into the mutable RGBA canvas the overlay
/// compositor draws onto.
pub fn to_canvas(frame: &ColorFrame) -> Result<Canvas> {
    let rgba = match frame.format {
        ColorFormat::Bgra => bgra_to_rgba(&frame.data, frame.width, frame.height)?,
        ColorFormat::Yuyv => yuyv_to_rgba(&frame.data, frame.width, frame.height)?,
        ColorFormat::Rgba => rgba_passthrough(&frame.data, frame.width, frame.height)?,
    };

    Ok(Canvas {
        rgba,
        width: frame.width,
        height: frame.height,
    })
}

fn bgra_to_rgba(data: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
    let expected_len = width as usize * height as usize * 4;
    if data.len() < expected_len {
        return Err(anyhow!(
            "BGRA buffer too small: got {}, expected {}",
            data.len(),
            expected_len
        ));
    }

    let mut rgba = vec![0u8; expected_len];
    rgba.par_chunks_mut(4)
        .zip(data.par_chunks_exact(4))
        .for_each(|(dst, src)| {
            dst[0] = src[2];
            dst[1] = src[1];
            dst[2] = src[0];
            dst[3] = 255;
        });

    Ok(rgba)
}

fn yuyv_to_rgba(data: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
    let expected_len = width as usize * height as usize * 2;
    if data.len() < expected_len {
        return Err(anyhow!(
            "YUYV buffer too small: got {}, expected {}",
            data.len(),
            expected_len
        ));
    }

    let mut rgba = vec![0u8; (width as usize * height as usize) * 4];
    let packed = YuvPackedImage {
        yuy: data,
        yuy_stride: width * 2,
        width,
        height,
    };

    yuyv422_to_rgba(
        &packed,
        &mut rgba,
        width * 4,
        YuvRange::Full,
        YuvStandardMatrix::Bt709,
    )
    .map_err(|err| anyhow!("YUYV422→RGBA failed: {err:?}"))?;

    Ok(rgba)
}

fn rgba_passthrough(data: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
    let expected_len = width as usize * height as usize * 4;
    if data.len() < expected_len {
        return Err(anyhow!(
            "RGBA buffer too small: got {}, expected {}",
            data.len(),
            expected_len
        ));
    }
    Ok(data[..expected_len].to_vec())
}
