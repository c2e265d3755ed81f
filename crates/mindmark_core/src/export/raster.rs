//! SVG rasterization into PNG and JPEG.
//!
//! # Invariants
//! - Output pixels are composited over opaque white; no transparency leaks
//!   into either encoding.
//! - Pixel size equals the SVG's declared width/height.

use super::{ExportArtifact, ExportError, ExportFormat, ExportResult};
use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder};
use once_cell::sync::Lazy;
use resvg::tiny_skia::{Color, Pixmap, Transform};
use resvg::usvg::{fontdb, Options, Tree};
use std::sync::Arc;

pub const JPEG_QUALITY: u8 = 92;

static FONT_DB: Lazy<Arc<fontdb::Database>> = Lazy::new(|| {
    let mut db = fontdb::Database::new();
    db.load_system_fonts();
    Arc::new(db)
});

/// Raster encodings supported by export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterEncoding {
    Png,
    Jpeg,
}

impl RasterEncoding {
    pub fn format(self) -> ExportFormat {
        match self {
            Self::Png => ExportFormat::Png,
            Self::Jpeg => ExportFormat::Jpeg,
        }
    }
}

/// Rasterizes SVG markup on a white background.
///
/// CPU-bound; async callers should run it on a blocking worker.
pub fn rasterize(markup: &str, encoding: RasterEncoding) -> ExportResult<ExportArtifact> {
    let mut options = Options::default();
    options.fontdb = Arc::clone(&FONT_DB);

    let tree =
        Tree::from_str(markup, &options).map_err(|err| ExportError::SvgParse(err.to_string()))?;
    let size = tree.size().to_int_size();
    let mut pixmap = Pixmap::new(size.width(), size.height()).ok_or_else(|| {
        ExportError::Raster(format!(
            "cannot allocate {}x{} pixel buffer",
            size.width(),
            size.height()
        ))
    })?;
    pixmap.fill(Color::WHITE);
    resvg::render(&tree, Transform::identity(), &mut pixmap.as_mut());

    let bytes = match encoding {
        RasterEncoding::Png => pixmap
            .encode_png()
            .map_err(|err| ExportError::Raster(err.to_string()))?,
        RasterEncoding::Jpeg => encode_jpeg(&pixmap)?,
    };

    Ok(ExportArtifact {
        format: encoding.format(),
        bytes,
    })
}

fn encode_jpeg(pixmap: &Pixmap) -> ExportResult<Vec<u8>> {
    // Background is opaque, so premultiplied RGBA equals straight RGB here.
    let rgb = pixmap
        .data()
        .chunks_exact(4)
        .flat_map(|px| [px[0], px[1], px[2]])
        .collect::<Vec<u8>>();
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, JPEG_QUALITY)
        .write_image(
            &rgb,
            pixmap.width(),
            pixmap.height(),
            ExtendedColorType::Rgb8,
        )
        .map_err(|err| ExportError::Raster(err.to_string()))?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::{rasterize, RasterEncoding};
    use crate::export::{ExportError, ExportFormat};
    use resvg::tiny_skia::Pixmap;

    const SAMPLE: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="20" height="10" viewBox="0 0 20 10"><rect x="10" y="0" width="10" height="10" fill="#ff0000"/></svg>"##;

    #[test]
    fn png_has_declared_size_and_opaque_background() {
        let artifact = rasterize(SAMPLE, RasterEncoding::Png).unwrap();
        assert_eq!(artifact.format, ExportFormat::Png);
        assert!(artifact.bytes.starts_with(b"\x89PNG"));

        let decoded = Pixmap::decode_png(&artifact.bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (20, 10));
        let corner = decoded.pixel(0, 0).unwrap();
        assert_eq!(
            (corner.red(), corner.green(), corner.blue(), corner.alpha()),
            (255, 255, 255, 255)
        );
        let filled = decoded.pixel(15, 5).unwrap();
        assert_eq!((filled.red(), filled.green()), (255, 0));
    }

    #[test]
    fn jpeg_output_has_jpeg_magic() {
        let artifact = rasterize(SAMPLE, RasterEncoding::Jpeg).unwrap();
        assert_eq!(artifact.format, ExportFormat::Jpeg);
        assert!(artifact.bytes.starts_with(&[0xFF, 0xD8]));
    }

    #[test]
    fn invalid_markup_is_reported() {
        let err = rasterize("not svg", RasterEncoding::Png).unwrap_err();
        assert!(matches!(err, ExportError::SvgParse(_)));
    }
}
