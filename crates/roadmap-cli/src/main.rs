//! roadmap CLI - Manufacturing roadmap generator
//!
//! Command-line interface for checking roadmap documents, building the static
//! roadmap page, inspecting product timelines and running the editor server.

use std::fs;
use std::io::Write;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use roadmap_cli::config::RoadmapConfig;
use roadmap_cli::diagnostics::{DiagnosticConfig, DiagnosticEmitter, JsonEmitter, TerminalEmitter};
use roadmap_cli::server::{self, AppState};
use roadmap_cli::SAMPLE_ROADMAP;
use roadmap_core::{has_errors, parse_date, validate, Document, FileStore, TimelineRenderer};
use roadmap_layout::TimelineLayoutEngine;
use roadmap_render::{HtmlPageRenderer, HtmlTimelineRenderer, SvgTimelineRenderer, TextTimelineRenderer};
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "roadmap")]
#[command(author, version, about = "Manufacturing roadmap generator", long_about = None)]
struct Cli {
    /// Verbose output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file (defaults to ./roadmap.toml when present)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a roadmap document
    Check {
        /// Input file path
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = CheckFormat::Text)]
        format: CheckFormat,

        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,

        /// Only report errors
        #[arg(short, long)]
        quiet: bool,
    },

    /// Build the static roadmap page
    Build {
        /// Input file path
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// First day of the timeline window (YYYY-MM-DD, default today)
        #[arg(long)]
        start: Option<String>,

        /// Number of quarters in the timeline window
        #[arg(long)]
        quarters: Option<usize>,

        /// Also copy the page into this directory
        #[arg(long, value_name = "DIR")]
        copy_to: Option<PathBuf>,

        /// Page title
        #[arg(long)]
        title: Option<String>,
    },

    /// Lay out one product timeline
    Timeline {
        /// Input file path
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Product id
        #[arg(short, long)]
        product: String,

        /// First day of the timeline window (YYYY-MM-DD, default today)
        #[arg(long)]
        start: Option<String>,

        /// Material system shown in the M&P lane
        #[arg(short, long)]
        material: Option<String>,

        /// Number of quarters in the timeline window
        #[arg(long)]
        quarters: Option<usize>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = TimelineFormat::Text)]
        format: TimelineFormat,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write a sample roadmap document
    Init {
        /// Output file path
        #[arg(value_name = "PATH", default_value = "roadmap.json")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Run the editor server
    Serve {
        /// Document to edit (defaults to [server] data)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        /// Listen port (defaults to [server] port)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum CheckFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum TimelineFormat {
    Text,
    Json,
    Svg,
    Html,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // RUST_LOG wins over -v
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .init();

    let config = RoadmapConfig::load(cli.config.as_deref()).context("failed to load configuration")?;

    match cli.command {
        Commands::Check {
            file,
            format,
            strict,
            quiet,
        } => cmd_check(&file, format, DiagnosticConfig { strict, quiet }),
        Commands::Build {
            file,
            output,
            start,
            quarters,
            copy_to,
            title,
        } => cmd_build(config, &file, output, start.as_deref(), quarters, copy_to, title),
        Commands::Timeline {
            file,
            product,
            start,
            material,
            quarters,
            format,
            output,
        } => cmd_timeline(
            config,
            &file,
            &product,
            start.as_deref(),
            material.as_deref(),
            quarters,
            format,
            output.as_deref(),
        ),
        Commands::Init { path, force } => cmd_init(&path, force),
        Commands::Serve { file, port } => cmd_serve(config, file, port),
    }
}

fn load_document(file: &Path) -> Result<Document> {
    FileStore::new(file)
        .load()
        .with_context(|| format!("failed to load {}", file.display()))
}

/// `--start` value, or today
fn start_date(raw: Option<&str>) -> Result<NaiveDate> {
    match raw {
        Some(raw) => parse_date(raw).with_context(|| format!("invalid --start date {:?} (expected YYYY-MM-DD)", raw)),
        None => Ok(Local::now().date_naive()),
    }
}

fn write_output(output: Option<&Path>, contents: &str) -> Result<()> {
    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), bytes = contents.len(), "wrote output");
        }
        None => {
            std::io::stdout()
                .write_all(contents.as_bytes())
                .context("failed to write to stdout")?;
        }
    }
    Ok(())
}

fn cmd_check(file: &Path, format: CheckFormat, config: DiagnosticConfig) -> Result<ExitCode> {
    let doc = load_document(file)?;
    let diagnostics = validate(&doc);
    debug!(count = diagnostics.len(), "validated document");

    let code = match format {
        CheckFormat::Text => {
            let stdout = std::io::stdout();
            let mut emitter = TerminalEmitter::new(stdout.lock(), config);
            emitter.emit_all(&diagnostics);
            emitter.finish().context("failed to write to stdout")?;
            emitter.exit_code()
        }
        CheckFormat::Json => {
            let mut emitter = JsonEmitter::new(config);
            emitter.emit_all(&diagnostics);
            println!("{}", emitter.to_json_string()?);
            emitter.exit_code()
        }
    };
    Ok(code.into())
}

fn cmd_build(
    config: RoadmapConfig,
    file: &Path,
    output: Option<PathBuf>,
    start: Option<&str>,
    quarters: Option<usize>,
    copy_to: Option<PathBuf>,
    title: Option<String>,
) -> Result<ExitCode> {
    let config = config.with_quarters(quarters)?;
    let doc = load_document(file)?;

    let diagnostics = validate(&doc);
    let mut emitter = TerminalEmitter::new(std::io::stderr(), DiagnosticConfig::default());
    emitter.emit_all(&diagnostics);
    emitter.check_writes().context("failed to write diagnostics")?;
    if has_errors(&diagnostics) {
        bail!("{} has validation errors; run `roadmap check` for details", file.display());
    }

    let renderer = HtmlPageRenderer::new(start_date(start)?)
        .title(title.unwrap_or(config.build.title))
        .layout(config.layout);
    let html = renderer.render(&doc)?;

    let output = output.unwrap_or(config.build.output);
    write_output(Some(&output), &html)?;
    println!("Wrote: {}", output.display());

    if let Some(dir) = copy_to.or(config.build.copy_to) {
        let name = output.file_name().context("output path has no file name")?;
        fs::create_dir_all(&dir).with_context(|| format!("failed to create {}", dir.display()))?;
        let target = dir.join(name);
        fs::copy(&output, &target)
            .with_context(|| format!("failed to copy to {}", target.display()))?;
        println!("Copied: {}", target.display());
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_timeline(
    config: RoadmapConfig,
    file: &Path,
    product: &str,
    start: Option<&str>,
    material: Option<&str>,
    quarters: Option<usize>,
    format: TimelineFormat,
    output: Option<&Path>,
) -> Result<ExitCode> {
    let config = config.with_quarters(quarters)?;
    let doc = load_document(file)?;
    let engine = TimelineLayoutEngine::new(config.layout);
    let Some(layout) = engine.layout_product(&doc, product, start_date(start)?, material) else {
        bail!("unknown product {:?}", product);
    };

    let rendered = match format {
        TimelineFormat::Text => TextTimelineRenderer::new().render(&layout)?,
        TimelineFormat::Json => {
            let mut json = serde_json::to_string_pretty(&layout)?;
            json.push('\n');
            json
        }
        TimelineFormat::Svg => SvgTimelineRenderer::default().render(&layout)?,
        TimelineFormat::Html => HtmlTimelineRenderer::new().render_document(&layout)?,
    };
    write_output(output, &rendered)?;
    Ok(ExitCode::SUCCESS)
}

fn cmd_init(path: &Path, force: bool) -> Result<ExitCode> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    write_output(Some(path), SAMPLE_ROADMAP)?;
    println!("Created: {}", path.display());
    Ok(ExitCode::SUCCESS)
}

fn cmd_serve(config: RoadmapConfig, file: Option<PathBuf>, port: Option<u16>) -> Result<ExitCode> {
    let data = file.unwrap_or(config.server.data);
    if !data.is_file() {
        tracing::warn!(path = %data.display(), "data file does not exist yet; run `roadmap init` to create one");
    }
    let addr = SocketAddr::from(([127, 0, 0, 1], port.unwrap_or(config.server.port)));
    let state = AppState::new(FileStore::new(data), config.layout).title(&config.build.title);

    println!("Editor running at http://{}", addr);
    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    runtime
        .block_on(server::serve(addr, state))
        .with_context(|| format!("server on {} failed", addr))?;
    Ok(ExitCode::SUCCESS)
}
