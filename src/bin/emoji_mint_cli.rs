//! Emoji Mint CLI - Terminal host for the widget
//!
//! Mints one token, writes `preview.png` (`preview.svg` with `--svg`), prints
//! the record as JSON to stdout, then asks for the code on the image before
//! saving the download.
//! Returns 2 on a rejected code.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use emoji_mint::{
    widget::{DownloadFile, Host, WidgetView},
    Canvas, Options, PngCanvas, SvgCanvas, Widget, WidgetError,
};

const CONTAINER_ID: &str = "terminal";

#[derive(Parser)]
#[command(name = "emoji-mint-cli")]
#[command(about = "Emoji Mint CLI - mint a token image and unlock its download")]
struct Cli {
    /// Wallet address (overrides defaultWallet)
    #[arg(short, long)]
    wallet: Option<String>,

    /// Display name (overrides defaultName)
    #[arg(short, long)]
    name: Option<String>,

    /// Path to a JSON options file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Gradient start colour (overrides primaryColor)
    #[arg(long)]
    color: Option<String>,

    /// Width of the simulated container in pixels
    #[arg(long, default_value_t = 800.0)]
    container_width: f64,

    /// Re-render at this container width after minting
    #[arg(long)]
    resize_to: Option<f64>,

    /// Gate code; read from stdin when omitted
    #[arg(long)]
    code: Option<String>,

    /// Skip the simulated mint latency
    #[arg(long)]
    no_delay: bool,

    /// Download an SVG master instead of a PNG
    #[arg(long)]
    svg: bool,

    /// Output directory
    #[arg(short, long, default_value = ".")]
    out: PathBuf,
}

struct TerminalHost {
    container_width: f64,
    code: Option<String>,
    out: PathBuf,
}

impl Host for TerminalHost {
    fn container_width(&self, container_id: &str) -> Option<f64> {
        (container_id == CONTAINER_ID).then_some(self.container_width)
    }

    fn present(&mut self, container_id: &str, view: &WidgetView) {
        tracing::debug!(container_id, button = %view.mint_button.label, download = view.download_visible, "view updated");
    }

    fn prompt(&mut self, message: &str) -> Option<String> {
        if let Some(code) = self.code.take() {
            return Some(code);
        }
        eprint!("{message} ");
        io::stderr().flush().ok()?;
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line).ok()?;
        Some(line.trim_end_matches(['\r', '\n']).to_string())
    }

    fn notify(&mut self, message: &str) {
        eprintln!("{message}");
    }

    fn save(&mut self, file: &DownloadFile) -> io::Result<()> {
        fs::write(self.out.join(&file.filename), &file.bytes)
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_time().build() {
        Ok(r) => r,
        Err(e) => {
            eprintln!(r#"{{"error": "Failed to start runtime: {}"}}"#, e);
            return ExitCode::FAILURE;
        }
    };

    let result = if cli.svg {
        runtime.block_on(run(cli, SvgCanvas::new()))
    } else {
        runtime.block_on(run(cli, PngCanvas::new()))
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(WidgetError::GateMismatch) => ExitCode::from(2),
        Err(e) => {
            let output = serde_json::json!({ "success": false, "error": e.to_string() });
            println!("{}", output);
            ExitCode::FAILURE
        }
    }
}

async fn run<C: Canvas>(cli: Cli, canvas: C) -> Result<(), WidgetError> {
    let file_options = match &cli.config {
        Some(path) => Options::load_from_path(path)?,
        None => Options::default(),
    };
    let options = file_options.merged_with(Options {
        default_wallet: cli.wallet,
        default_name: cli.name,
        primary_color: cli.color,
        mint_delay_ms: cli.no_delay.then_some(0),
        ..Default::default()
    });

    fs::create_dir_all(&cli.out)?;
    let host = TerminalHost {
        container_width: cli.container_width,
        code: cli.code,
        out: cli.out.clone(),
    };

    let mut widget = Widget::init(host, canvas, CONTAINER_ID, options)?;

    let record = widget.mint().await?;
    let output = serde_json::json!({ "success": true, "record": record });
    println!("{}", serde_json::to_string_pretty(&output)?);
    write_preview(&widget, &cli.out)?;

    if let Some(width) = cli.resize_to {
        widget.host_mut().container_width = width;
        if let Some(size) = widget.resize() {
            tracing::info!(width = size.width, height = size.height, "preview resized");
            write_preview(&widget, &cli.out)?;
        }
    }

    let file = widget.download()?;
    let output = serde_json::json!({ "success": true, "download": file });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn write_preview<C: Canvas>(
    widget: &Widget<TerminalHost, C>,
    out: &Path,
) -> Result<(), WidgetError> {
    let bytes = widget.canvas().encode()?;
    let name = format!("preview.{}", widget.canvas().format().extension());
    fs::write(out.join(name), bytes)?;
    Ok(())
}
