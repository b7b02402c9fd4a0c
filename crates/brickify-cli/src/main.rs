//! brickify-cli: crop a photo and build a brick mosaic without a browser.
//!
//! Runs the same session as the web app: the photo is cropped to the
//! aspect ratio of the panel grid, uploaded to blob storage, and sent
//! to the mosaic service. The mosaic, the instructions, the piece list
//! and a printable page are written to the output directory.
//!
//! # Usage
//!
//! ```text
//! brickify-cli photo.jpg --panels-wide 2 --panels-high 3 --out mosaic/
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use brickify_export::{
    HtmlRenderer, INSTRUCTIONS_FILE_NAME, MOSAIC_FILE_NAME, PIECES_FILE_NAME, PRINT_FILE_NAME,
    Renderer, to_csv,
};
use brickify_pipeline::{
    Completion, CropError, CropSelection, DecodeError, DisplayRect, DisplaySize, Framing,
    LayoutError, LayoutParameters, MosaicResult, PanelSize, Session, SessionError, SourceImage,
    SubmitError, crop,
};
use brickify_service::{
    ConfigError, FirebaseStorage, HttpMosaicService, ServiceConfig, SessionDriver, Timer,
};
use clap::Parser;

/// Turn a photo into a printable brick mosaic.
///
/// The photo is cropped to the aspect ratio of the panel grid, either
/// around a focus point (`--zoom`, `--center-x`, `--center-y`) or to an
/// explicit pixel rectangle (`--crop`).
#[derive(Parser, Debug)]
#[command(name = "brickify-cli", version)]
struct Cli {
    /// Photo to convert (PNG or JPEG).
    image: PathBuf,

    /// Panels across.
    #[arg(long, default_value_t = 1)]
    panels_wide: u32,

    /// Panels down.
    #[arg(long, default_value_t = 1)]
    panels_high: u32,

    /// Studs per panel side (32 or 50).
    #[arg(long, default_value = "32", value_parser = parse_panel_size)]
    panel_size: PanelSize,

    /// Zoom factor (1.0 to 3.0).
    #[arg(long, default_value_t = 1.0)]
    zoom: f64,

    /// Horizontal focus as a fraction of the width.
    #[arg(long, default_value_t = 0.5)]
    center_x: f64,

    /// Vertical focus as a fraction of the height.
    #[arg(long, default_value_t = 0.5)]
    center_y: f64,

    /// Explicit crop rectangle in source pixels, overriding the framing.
    #[arg(long, value_name = "X,Y,W,H", value_parser = parse_crop)]
    crop: Option<DisplayRect>,

    /// Service configuration (TOML). `BRICKIFY_*` variables override it.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output directory.
    #[arg(short, long)]
    out: PathBuf,

    /// Only write the cropped photo; no upload, no mosaic.
    #[arg(long)]
    dry_run: bool,
}

/// Everything that can stop a run.
#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Crop(#[from] CropError),

    #[error("{note}: {0}", note = .0.notification())]
    Submit(SubmitError),

    #[error("the session was reset before the mosaic arrived")]
    Discarded,
}

fn parse_panel_size(raw: &str) -> Result<PanelSize, String> {
    let studs: u32 = raw
        .trim()
        .parse()
        .map_err(|e| format!("invalid panel size '{raw}': {e}"))?;
    PanelSize::try_from(studs).map_err(|e| e.to_string())
}

fn parse_crop(raw: &str) -> Result<DisplayRect, String> {
    let parts = raw
        .split(',')
        .map(|p| {
            p.trim()
                .parse::<f64>()
                .map_err(|e| format!("invalid crop value '{p}': {e}"))
        })
        .collect::<Result<Vec<_>, _>>()?;
    match parts.as_slice() {
        &[x, y, width, height] => Ok(DisplayRect::new(x, y, width, height)),
        _ => Err(format!("crop must be 'X,Y,W,H', got: '{raw}'")),
    }
}

/// Sleeps on the tokio timer wheel.
struct TokioTimer;

impl Timer for TokioTimer {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

fn read(path: &Path) -> Result<Vec<u8>, CliError> {
    std::fs::read(path).map_err(|source| CliError::Io {
        path: path.to_owned(),
        source,
    })
}

fn write(dir: &Path, name: &str, bytes: &[u8]) -> Result<PathBuf, CliError> {
    let path = dir.join(name);
    std::fs::write(&path, bytes).map_err(|source| CliError::Io {
        path: path.clone(),
        source,
    })?;
    log::info!("wrote {} ({} bytes)", path.display(), bytes.len());
    Ok(path)
}

fn load_config(path: Option<&Path>) -> Result<ServiceConfig, CliError> {
    let mut config = match path {
        Some(path) => {
            let raw = read(path)?;
            ServiceConfig::from_toml_str(&String::from_utf8_lossy(&raw))?
        }
        None => ServiceConfig::default(),
    };
    config.apply_overrides(|key| std::env::var(key).ok())?;
    Ok(config)
}

/// Apply the photo and the command-line framing to `session`.
fn prepare(session: &mut Session, cli: &Cli, source: SourceImage) -> Result<(), CliError> {
    let natural = source.dimensions();
    session.select_file(source)?;
    session.set_layout(LayoutParameters::new(
        cli.panels_wide,
        cli.panels_high,
        cli.panel_size,
    )?)?;
    session.set_framing(Framing::new(cli.zoom, cli.center_x, cli.center_y))?;
    if let Some(rect) = cli.crop {
        let display = DisplaySize::new(f64::from(natural.width), f64::from(natural.height));
        session.set_crop_selection(CropSelection::new(rect, display))?;
    }
    Ok(())
}

/// Write the cropped photo that would be uploaded.
fn dry_run(session: &Session, out: &Path) -> Result<PathBuf, CliError> {
    let source = session.source().ok_or(SessionError::NoImage)?;
    let region = match session.crop_selection() {
        Some(selection) => selection.resolve(source.dimensions())?,
        None => return Err(SessionError::NoImage.into()),
    };
    let cropped = crop(&source, region, source.format().output_format())?;
    println!("crop {region} of {}", source.dimensions());
    write(
        out,
        &format!("cropped.{}", source.format().extension()),
        &cropped.bytes,
    )
}

fn write_result(result: &MosaicResult, out: &Path) -> Result<(), CliError> {
    write(out, MOSAIC_FILE_NAME, result.mosaic.bytes())?;
    write(out, INSTRUCTIONS_FILE_NAME, result.instructions.bytes())?;
    write(out, PIECES_FILE_NAME, to_csv(&result.pieces).as_bytes())?;
    let Ok(page) = HtmlRenderer::default().render_printable(result);
    write(out, PRINT_FILE_NAME, page.html.as_bytes())?;
    Ok(())
}

async fn run(cli: &Cli) -> Result<(), CliError> {
    let bytes = read(&cli.image)?;
    let name = cli
        .image
        .file_name()
        .map_or_else(|| cli.image.to_string_lossy(), |n| n.to_string_lossy())
        .into_owned();
    let source = SourceImage::decode(bytes, name)?;

    std::fs::create_dir_all(&cli.out).map_err(|source| CliError::Io {
        path: cli.out.clone(),
        source,
    })?;

    if cli.dry_run {
        let mut session = Session::new();
        prepare(&mut session, cli, source)?;
        dry_run(&session, &cli.out)?;
        return Ok(());
    }

    let config = load_config(cli.config.as_deref())?;
    let client = reqwest::Client::new();
    let driver = SessionDriver::new(
        FirebaseStorage::from_config(client.clone(), &config)?,
        HttpMosaicService::from_config(client, &config)?,
        TokioTimer,
        config.compute_timeout(),
    );
    driver.update(|session| prepare(session, cli, source))?;
    if let Some(region) = driver.session().crop_region() {
        log::info!("submitting crop {region} as {}", driver.session().layout());
    }

    match driver.submit().await? {
        Completion::Finished { total_pieces } => {
            let result = driver.session().result().ok_or(CliError::Discarded)?;
            write_result(&result, &cli.out)?;
            println!("{total_pieces} pieces, written to {}", cli.out.display());
            Ok(())
        }
        Completion::Failed(err) => Err(CliError::Submit(err)),
        Completion::Stale => Err(CliError::Discarded),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
