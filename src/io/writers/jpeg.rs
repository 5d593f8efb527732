use jpeg_encoder::{ColorType, Encoder};
use std::path::Path;
use tracing::info;

use crate::error::{Error, Result};
use crate::io::writers::{StagedFile, stage_file};

/// JPEG dimensions are limited to `u16`.
fn jpeg_dim(arg: &'static str, value: usize) -> Result<u16> {
    u16::try_from(value).map_err(|_| Error::InvalidArgument {
        arg,
        value: value.to_string(),
    })
}

/// Encode a grayscale JPEG (quality 100) into a staged file next to `output`.
pub fn stage_gray_jpeg(
    output: &Path,
    cols: usize,
    rows: usize,
    data: &[u8],
) -> Result<StagedFile> {
    let width = jpeg_dim("width", cols)?;
    let height = jpeg_dim("height", rows)?;
    stage_file(output, |writer| {
        let encoder = Encoder::new(writer, 100);
        encoder
            .encode(data, width, height, ColorType::Luma)
            .map_err(Error::encode)
    })
}

pub fn write_gray_jpeg(output: &Path, cols: usize, rows: usize, data: &[u8]) -> Result<()> {
    stage_gray_jpeg(output, cols, rows, data)?.commit()?;
    info!("Wrote JPEG {}x{}: {:?}", cols, rows, output);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_jpeg_markers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gray.jpg");
        let data: Vec<u8> = (0..64u8).map(|v| v * 4).collect();
        write_gray_jpeg(&path, 8, 8, &data).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
        assert_eq!(&bytes[bytes.len() - 2..], &[0xFF, 0xD9]);
    }

    #[test]
    fn rejects_oversized_width_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wide.jpg");
        let err = write_gray_jpeg(&path, 70_000, 1, &[]).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { arg: "width", .. }));
        assert!(!path.exists());
    }
}
