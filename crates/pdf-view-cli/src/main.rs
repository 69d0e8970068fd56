use anyhow::{Result, anyhow, bail};
use clap::{Parser, Subcommand};
use log::{Level, LevelFilter};
use pdf_view_core::{DocumentSource, KeyPress, Phase, ViewerOptions};
use std::path::PathBuf;

mod logger;

use logger::CliLogger;

#[derive(Parser)]
#[command(name = "pdfv", about = "Paginated PDF viewer", version)]
struct Cli {
    /// Log debug messages
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print page count and page sizes without rendering
    Info {
        /// Input PDF file
        input: PathBuf,

        /// Print sizes as JSON
        #[arg(long)]
        json: bool,
    },

    /// Open a document, replay key presses and save the page on screen
    View {
        /// Input PDF file
        input: PathBuf,

        /// Page to jump to after loading (1-indexed)
        #[arg(long)]
        page: Option<String>,

        /// Key presses to replay, comma separated (e.g. "Right,Right,Ctrl++,Ctrl+0")
        #[arg(long, value_delimiter = ',')]
        keys: Vec<KeyPress>,

        /// Width of the viewport in pixels, used by fit-to-width
        #[arg(long)]
        width: Option<f32>,

        /// Viewer options JSON file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Write the displayed page to this PNG file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Directory containing the Pdfium library
        #[arg(long)]
        pdfium_dir: Option<PathBuf>,
    },

    /// Write the default viewer options as JSON
    Config {
        /// Output JSON file
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else if cli.quiet {
        LevelFilter::Warn
    } else {
        LevelFilter::Info
    };
    let logger = CliLogger::new(200, level);
    logger.clone().init()?;

    match cli.command {
        Commands::Info { input, json } => {
            let sizes = pdf_view_core::backend::inspect(&DocumentSource::Path(input.clone())).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&sizes)?);
            } else {
                println!("{}: {} pages", input.display(), sizes.len());
                for (i, size) in sizes.iter().enumerate() {
                    println!("  Page {}: {:.1} x {:.1} pt", i + 1, size.width, size.height);
                }
            }
        }

        Commands::View {
            input,
            page,
            keys,
            width,
            config,
            output,
            pdfium_dir,
        } => {
            let options = match config {
                Some(path) => ViewerOptions::load(&path).await?,
                None => ViewerOptions::default(),
            };
            view(input, page, keys, width, options, output, pdfium_dir).await?;

            let warnings = logger.count_at_least(Level::Warn);
            if warnings > 0 {
                eprintln!("{} warning(s) logged", warnings);
            }
        }

        Commands::Config { output } => {
            ViewerOptions::default().save(&output).await?;
            println!("Wrote default options → {}", output.display());
        }
    }

    Ok(())
}

#[cfg(feature = "pdfium")]
async fn view(
    input: PathBuf,
    page: Option<String>,
    keys: Vec<KeyPress>,
    width: Option<f32>,
    options: ViewerOptions,
    output: Option<PathBuf>,
    pdfium_dir: Option<PathBuf>,
) -> Result<()> {
    use pdf_view_core::backend::PdfiumRenderer;
    use pdf_view_core::{ViewController, worker_task};
    use tokio::sync::mpsc;

    let renderer = match pdfium_dir {
        Some(dir) => PdfiumRenderer::with_library_dir(dir),
        None => PdfiumRenderer::new(),
    };

    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (update_tx, mut update_rx) = mpsc::unbounded_channel();
    let worker = tokio::spawn(worker_task(
        renderer,
        options.cache_pages,
        command_rx,
        update_tx,
    ));

    let mut ctrl = ViewController::new(options, command_tx)?;
    if let Some(width) = width {
        ctrl.set_viewport_width(width);
    }

    ctrl.load(DocumentSource::Path(input.clone()));
    settle(&mut ctrl, &mut update_rx).await?;
    if let Phase::Failed(fault) = ctrl.phase() {
        bail!("{}", fault);
    }

    if let Some(page) = page {
        if !ctrl.go_to_input(&page) {
            log::warn!("Ignoring page {:?}", page);
        }
    }

    for key in keys {
        if !ctrl.handle_key(key) {
            log::info!("{:?} changed nothing", key);
        }
        settle(&mut ctrl, &mut update_rx).await?;
    }

    let snapshot = ctrl.snapshot();
    println!(
        "{}: page {} of {} at {:.0}%{}",
        input.display(),
        snapshot.current_page,
        snapshot.total_pages,
        snapshot.scale * 100.0,
        if snapshot.fullscreen { " (fullscreen)" } else { "" }
    );
    if let Some(fault) = &snapshot.fault {
        log::error!("{}", fault);
    }

    if let Some(output) = output {
        let displayed = ctrl
            .displayed()
            .ok_or_else(|| anyhow!("No page has been rendered"))?;
        let image = image::RgbaImage::from_raw(
            displayed.surface.width as u32,
            displayed.surface.height as u32,
            displayed.surface.rgba_data.to_vec(),
        )
        .ok_or_else(|| anyhow!("Rendered surface has an unexpected size"))?;
        image.save(&output)?;
        println!(
            "Page {} ({}x{}) → {}",
            displayed.page,
            displayed.surface.width,
            displayed.surface.height,
            output.display()
        );
    }

    ctrl.close();
    drop(ctrl);
    worker.await?;
    Ok(())
}

/// Apply worker updates until nothing is outstanding
#[cfg(feature = "pdfium")]
async fn settle(
    ctrl: &mut pdf_view_core::ViewController,
    update_rx: &mut tokio::sync::mpsc::UnboundedReceiver<pdf_view_core::ViewerUpdate>,
) -> Result<()> {
    if !ctrl.settle(update_rx).await {
        bail!("Render worker stopped unexpectedly");
    }
    Ok(())
}

#[cfg(not(feature = "pdfium"))]
async fn view(
    _input: PathBuf,
    _page: Option<String>,
    _keys: Vec<KeyPress>,
    _width: Option<f32>,
    _options: ViewerOptions,
    _output: Option<PathBuf>,
    _pdfium_dir: Option<PathBuf>,
) -> Result<()> {
    bail!("Page rendering not available (pdfium feature disabled)")
}
