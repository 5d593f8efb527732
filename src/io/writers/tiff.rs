use std::path::Path;
use tiff::encoder::{TiffEncoder, colortype};
use tiff::tags::Tag;
use tracing::info;

use crate::error::{Error, Result};
use crate::io::writers::{StagedFile, stage_file};

fn tiff_dim(arg: &'static str, value: usize) -> Result<u32> {
    u32::try_from(value).map_err(|_| Error::InvalidArgument {
        arg,
        value: value.to_string(),
    })
}

/// Encode a single-band 8-bit TIFF, with an optional ImageDescription tag,
/// into a staged file next to `output`.
pub fn stage_tiff_u8(
    output: &Path,
    cols: usize,
    rows: usize,
    data: &[u8],
    description: Option<&str>,
) -> Result<StagedFile> {
    let width = tiff_dim("width", cols)?;
    let height = tiff_dim("height", rows)?;
    stage_file(output, |writer| {
        let mut encoder = TiffEncoder::new(writer).map_err(Error::encode)?;
        let mut image = encoder
            .new_image::<colortype::Gray8>(width, height)
            .map_err(Error::encode)?;
        if let Some(desc) = description {
            image
                .encoder()
                .write_tag(Tag::ImageDescription, desc)
                .map_err(Error::encode)?;
        }
        image.write_data(data).map_err(Error::encode)
    })
}

pub fn write_tiff_u8(
    output: &Path,
    cols: usize,
    rows: usize,
    data: &[u8],
    description: Option<&str>,
) -> Result<()> {
    stage_tiff_u8(output, cols, rows, data, description)?.commit()?;
    info!("Wrote TIFF {}x{}: {:?}", cols, rows, output);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tiff::decoder::{Decoder, DecodingResult};

    #[test]
    fn tiff_round_trips_pixels_and_description() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gray.tiff");
        let data: Vec<u8> = vec![0, 64, 128, 255, 1, 2];
        write_tiff_u8(&path, 3, 2, &data, Some("{\"k\":1}")).unwrap();

        let mut decoder = Decoder::new(File::open(&path).unwrap()).unwrap();
        assert_eq!(decoder.dimensions().unwrap(), (3, 2));
        let desc = decoder.get_tag_ascii_string(Tag::ImageDescription).unwrap();
        assert_eq!(desc.trim_end_matches('\0'), "{\"k\":1}");
        match decoder.read_image().unwrap() {
            DecodingResult::U8(pixels) => assert_eq!(pixels, data),
            _ => panic!("expected 8-bit samples"),
        }
    }
}
