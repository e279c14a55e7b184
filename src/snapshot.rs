use std::{
    fs,
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

use anyhow::{Context, Result};
use image::{ImageBuffer, Rgba};

use crate::types::Canvas;

/// Write a composited canvas into `dir` as a timestamped PNG and return the
/// path.
pub fn save_canvas(canvas: &Canvas, dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create snapshot dir {}", dir.display()))?;

    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let path = dir.join(format!("skywrite-{stamp}.png"));

    let image: ImageBuffer<Rgba<u8>, Vec<u8>> =
        ImageBuffer::from_raw(canvas.width, canvas.height, canvas.rgba.clone())
            .context("canvas buffer does not match its dimensions")?;
    image
        .save(&path)
        .with_context(|| format!("failed to write snapshot {}", path.display()))?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_lands_in_the_requested_dir() {
        let dir = std::env::temp_dir().join("skywrite-snapshot-test");
        let canvas = Canvas {
            rgba: vec![128u8; 4 * 4 * 4],
            width: 4,
            height: 4,
        };

        let path = save_canvas(&canvas, &dir).unwrap();
        assert!(path.exists());
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("png"));

        let _ = fs::remove_file(path);
    }

    #[test]
    fn mismatched_buffer_is_rejected() {
        let dir = std::env::temp_dir().join("skywrite-snapshot-test");
        let canvas = Canvas {
            rgba: vec![0u8; 7],
            width: 4,
            height: 4,
        };
        assert!(save_canvas(&canvas, &dir).is_err());
    }
}
