//! Output writers for the normalized raster and its metadata sidecar.
//!
//! Every writer stages its bytes in a temporary file next to the destination
//! ([`stage_file`]) and renames it into place only once writing succeeded
//! ([`StagedFile::commit`]). Artifacts that belong together are committed with
//! [`commit_all`], so a failed run never leaves a partial artifact behind.
pub mod jpeg;
pub mod metadata;
pub mod tiff;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::warn;

use crate::core::raster::Raster;
use crate::error::{Error, Result};
use crate::types::OutputFormat;

/// A completely written temporary file waiting to be renamed onto its target.
/// Dropping it without committing removes the temporary file.
#[derive(Debug)]
pub struct StagedFile {
    tmp: NamedTempFile,
    target: PathBuf,
}

impl StagedFile {
    pub fn target(&self) -> &Path {
        &self.target
    }

    pub fn commit(self) -> Result<PathBuf> {
        self.tmp.persist(&self.target).map_err(|e| Error::Io(e.error))?;
        Ok(self.target)
    }
}

pub(crate) fn stage_file<F>(output: &Path, write: F) -> Result<StagedFile>
where
    F: FnOnce(&mut BufWriter<&mut File>) -> Result<()>,
{
    let dir = match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::Builder::new()
        .prefix(".dbraster-")
        .suffix(".part")
        .tempfile_in(dir)?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        write(&mut writer)?;
        writer.flush()?;
    }
    Ok(StagedFile {
        tmp,
        target: output.to_path_buf(),
    })
}

/// Commit staged files in order. If one fails, the files committed before it
/// are removed again and the remaining temporaries are discarded.
pub fn commit_all(staged: Vec<StagedFile>) -> Result<Vec<PathBuf>> {
    let mut committed: Vec<PathBuf> = Vec::with_capacity(staged.len());
    for file in staged {
        match file.commit() {
            Ok(path) => committed.push(path),
            Err(err) => {
                for path in &committed {
                    if let Err(e) = std::fs::remove_file(path) {
                        warn!("Could not remove {:?} after failed commit: {}", path, e);
                    }
                }
                return Err(err);
            }
        }
    }
    Ok(committed)
}

/// Encode a grayscale raster in the requested format into a staged file.
/// `description` is embedded where the format supports it (TIFF ImageDescription).
pub fn stage_gray_image(
    output: &Path,
    image: &Raster<u8>,
    format: OutputFormat,
    description: Option<&str>,
) -> Result<StagedFile> {
    let data = match image.as_slice() {
        Some(slice) => std::borrow::Cow::Borrowed(slice),
        None => std::borrow::Cow::Owned(image.to_vec()),
    };
    match format {
        OutputFormat::JPEG => jpeg::stage_gray_jpeg(output, image.width(), image.height(), &data),
        OutputFormat::TIFF => tiff::stage_tiff_u8(
            output,
            image.width(),
            image.height(),
            &data,
            description,
        ),
    }
}

/// Write a grayscale raster in the requested format.
pub fn write_gray_image(
    output: &Path,
    image: &Raster<u8>,
    format: OutputFormat,
    description: Option<&str>,
) -> Result<()> {
    stage_gray_image(output, image, format, description)?.commit()?;
    Ok(())
}
