use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;

use pinpoint_view::config::load_app_config;
use pinpoint_view::filter_chain::PresetLibrary;
use pinpoint_view::geometry::CanvasSize;
use pinpoint_view::{load_preset_file, logging, render_overview, OverviewRequest};

/// Renders the comparison minimap of an image for manual inspection.
#[derive(Parser, Debug)]
#[command(name = "pinpoint-view", version)]
struct Cli {
    /// Image to load (PNG, JPEG, WEBP or BMP).
    image: PathBuf,

    /// Minimap width in pixels, clamped to 60..=400. Overrides config.json.
    #[arg(long, value_name = "N")]
    width: Option<u32>,

    /// Pinpoint rotation in degrees.
    #[arg(long, value_name = "DEG", allow_negative_numbers = true)]
    rotation: Option<f64>,

    /// Visible canvas size.
    #[arg(long, value_name = "WxH", default_value = "800x600", value_parser = parse_canvas)]
    canvas: CanvasSize,

    /// Filter chain file to import and list.
    #[arg(long, value_name = "FILE")]
    chain: Option<PathBuf>,

    /// Output PNG path.
    #[arg(short, long, value_name = "PATH", default_value = "minimap.png")]
    out: PathBuf,
}

fn parse_canvas(value: &str) -> Result<CanvasSize, String> {
    let (width, height) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WxH, got `{value}`"))?;
    let parse = |text: &str| {
        text.trim()
            .parse::<u32>()
            .ok()
            .filter(|size| *size > 0)
            .ok_or_else(|| format!("invalid canvas dimension `{text}`"))
    };
    Ok(CanvasSize::new(
        f64::from(parse(width)?),
        f64::from(parse(height)?),
    ))
}

fn main() -> anyhow::Result<()> {
    logging::init();
    let cli = Cli::parse();
    let config = load_app_config();
    tracing::info!(image = ?cli.image, "starting pinpoint-view");

    if let Some(path) = &cli.chain {
        let mut library = PresetLibrary::new();
        let chain = load_preset_file(&mut library, path)
            .with_context(|| format!("failed to import filter chain {}", path.display()))?;
        for (index, step) in chain.items.iter().enumerate() {
            tracing::info!(index, filter = %step.filter_type, enabled = step.enabled, "chain step");
        }
    }

    let mut renderer = config.minimap_renderer();
    if let Some(width) = cli.width {
        renderer.set_width(width);
    }
    let request = OverviewRequest {
        renderer,
        canvas: cli.canvas,
        rotation_deg: cli.rotation,
    };

    let Some(minimap) = render_overview(&cli.image, &request)
        .with_context(|| format!("failed to render {}", cli.image.display()))?
    else {
        bail!("{} has no drawable content", cli.image.display());
    };
    minimap
        .save(&cli.out)
        .with_context(|| format!("failed to write {}", cli.out.display()))?;
    tracing::info!(out = ?cli.out, width = minimap.width(), height = minimap.height(), "minimap written");
    Ok(())
}
