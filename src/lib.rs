//! Viewport transforms and multi-view synchronization for side-by-side image
//! comparison.

pub mod config;
pub mod error;
pub mod filter_chain;
pub mod geometry;
pub mod input;
pub mod logging;
pub mod minimap;
pub mod rotation;
pub mod transform;
pub mod viewport;
pub use error::{AppError, AppResult};

use std::path::Path;

use image::RgbaImage;

use crate::filter_chain::{current_epoch_millis, FilterChain, PresetLibrary};
use crate::geometry::{CanvasSize, ImageSize};
use crate::minimap::MinimapRenderer;
use crate::viewport::{ViewId, ViewMode, ViewportStore};

/// Inputs for [`render_overview`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverviewRequest {
    pub renderer: MinimapRenderer,
    pub canvas: CanvasSize,
    /// Renders the view in pinpoint mode rotated by this many degrees.
    pub rotation_deg: Option<f64>,
}

/// Decodes the image at `path` into a single default view and renders its
/// minimap. `Ok(None)` means there was nothing drawable.
pub fn render_overview(path: &Path, request: &OverviewRequest) -> AppResult<Option<RgbaImage>> {
    let bitmap = image::open(path)?.to_rgba8();
    let image = ImageSize::from_pixels(bitmap.width(), bitmap.height());

    let view = ViewId(0);
    let mut store = ViewportStore::new();
    if let Some(degrees) = request.rotation_deg {
        store.set_mode(ViewMode::Pinpoint);
        store.set_pinpoint_rotation(view, degrees);
    }

    let transform = store.transform_for(view, image, request.canvas);
    tracing::debug!(
        ?path,
        width = bitmap.width(),
        height = bitmap.height(),
        mode = ?store.mode(),
        "rendering overview"
    );
    Ok(request
        .renderer
        .render(Some(&bitmap), transform.as_ref(), Some(request.canvas)))
}

/// Reads a chain file from disk into `library`.
pub fn load_preset_file<'a>(
    library: &'a mut PresetLibrary,
    path: &Path,
) -> AppResult<&'a FilterChain> {
    let contents = std::fs::read_to_string(path)?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(library.import_file(&file_name, &contents, current_epoch_millis())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter_chain::ChainImportError;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("pinpoint-view-{}-{name}", std::process::id()))
    }

    #[test]
    fn render_overview_reports_missing_file() {
        let request = OverviewRequest {
            renderer: MinimapRenderer::default(),
            canvas: CanvasSize::new(100.0, 100.0),
            rotation_deg: None,
        };
        let err = render_overview(Path::new("/nonexistent/input.png"), &request)
            .expect_err("missing file");
        assert!(matches!(err, AppError::Image(_)));
    }

    #[test]
    fn render_overview_draws_rotated_minimap() {
        let path = temp_path("overview.png");
        RgbaImage::from_pixel(200, 100, image::Rgba([0, 0, 255, 255]))
            .save(&path)
            .expect("write fixture");

        let request = OverviewRequest {
            renderer: MinimapRenderer::new(100, Default::default()),
            canvas: CanvasSize::new(100.0, 50.0),
            rotation_deg: Some(90.0),
        };
        let minimap = render_overview(&path, &request)
            .expect("decodes")
            .expect("drawable");
        let _ = std::fs::remove_file(&path);

        assert_eq!(minimap.width(), 100);
        assert_eq!(minimap.height(), 50);
    }

    #[test]
    fn load_preset_file_rejects_non_json_names() {
        let path = temp_path("chain.txt");
        std::fs::write(&path, "{}").expect("write fixture");
        let mut library = PresetLibrary::new();

        let err = load_preset_file(&mut library, &path).expect_err("not json");
        let _ = std::fs::remove_file(&path);

        assert!(matches!(
            err,
            AppError::ChainImport(ChainImportError::NotJson { .. })
        ));
        assert!(library.is_empty());
    }

    #[test]
    fn load_preset_file_reports_io_errors() {
        let mut library = PresetLibrary::new();
        let err = load_preset_file(&mut library, Path::new("/nonexistent/chain.json"))
            .expect_err("missing file");
        assert!(matches!(err, AppError::Io(_)));
    }
}
