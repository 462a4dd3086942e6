//! CLI binary for hiremeter.
//!
//! A thin shim over the library crate: maps flags to `EvaluationConfig`,
//! runs one action and prints the provider's text.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use hiremeter::provider::resolve_provider;
use hiremeter::{
    prepare_document, EvaluationConfig, EvaluationConfigBuilder, EvaluationMode,
    EvaluationProgressCallback, Evaluator, PageRasterizer, PdfiumRasterizer, SourceDocument,
};
use hiremeter_pdfium::{LocateOptions, PdfiumLibrary};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

/// Exit status for "the user forgot something" outcomes.
const EXIT_WARNING: u8 = 2;

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Single spinner that follows the action through its stages.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(TICKS),
        );
        bar.set_prefix("Starting");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl EvaluationProgressCallback for CliProgressCallback {
    fn on_preparation_start(&self, document_name: &str) {
        self.bar.set_prefix("Preparing");
        self.bar.set_message(format!("rendering {document_name}…"));
    }

    fn on_document_prepared(&self, page_count: usize, payload_len: usize) {
        if page_count > 1 {
            self.bar.println(format!(
                "  {} {} pages in resume, only page 1 is evaluated",
                yellow("⚠"),
                page_count
            ));
        }
        self.bar.println(format!(
            "  {} Page 1 rendered  {}",
            green("✓"),
            dim(&format!("{:.1} KB payload", payload_len as f64 / 1024.0))
        ));
    }

    fn on_provider_call(&self, mode: EvaluationMode, provider: &str) {
        self.bar.set_prefix("Evaluating");
        self.bar.set_message(format!("{mode} via {provider}…"));
    }

    fn on_evaluation_complete(&self, _text_len: usize) {
        self.bar.finish_and_clear();
    }

    fn on_evaluation_error(&self, _error: &str) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Qualitative review against a job description
  hiremeter review --resume cv.pdf --job "Senior Go developer, Kubernetes, gRPC"

  # ATS-style match percentage, job description from a file
  hiremeter match --resume cv.pdf --job-file posting.txt

  # Machine-readable result
  hiremeter match --resume cv.pdf --job-file posting.txt --json > result.json

  # Only render and encode the first page (no API key needed)
  hiremeter prepare cv.pdf -o page1.jpg

ENVIRONMENT VARIABLES:
  GOOGLE_API_KEY            Gemini API key (also read from a .env file)
  HIREMETER_PROVIDER        Provider: gemini (default), openai, anthropic, ollama, …
  HIREMETER_MODEL           Model ID (default for Gemini: gemini-1.5-flash)
  HIREMETER_API_BASE_URL    Override the Gemini endpoint host
  PDFIUM_LIB_PATH           Path to an existing libpdfium; skips auto-download
  PDFIUM_CACHE_DIR          Override the PDFium cache directory

SETUP:
  1. Set API key:     export GOOGLE_API_KEY=AIza...
  2. Evaluate:        hiremeter review --resume cv.pdf --job "..."

  PDFium (~30 MB) is downloaded automatically on first run and cached in
  ~/.cache/hiremeter/pdfium-7690/.
"#;

/// Evaluate a resume against a job description with a vision LLM.
#[derive(Parser, Debug)]
#[command(
    name = "hiremeter",
    version,
    about = "Evaluate a PDF resume against a job description with a vision LLM",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to an existing PDFium library (file or directory).
    #[arg(long, global = true, env = "PDFIUM_LIB_PATH")]
    pdfium_lib: Option<PathBuf>,

    /// Never download PDFium; fail if no local copy is found.
    #[arg(long, global = true, env = "HIREMETER_NO_DOWNLOAD")]
    no_download: bool,

    /// PDF user password for encrypted resumes.
    #[arg(long, global = true, env = "HIREMETER_PASSWORD")]
    password: Option<String>,

    /// Longest edge of the rendered page in pixels.
    #[arg(long, global = true, env = "HIREMETER_MAX_PIXELS", default_value_t = 2000)]
    max_pixels: u32,

    /// JPEG quality of the page sent to the model (1–100).
    #[arg(long, global = true, env = "HIREMETER_JPEG_QUALITY", default_value_t = 75,
          value_parser = clap::value_parser!(u8).range(1..=100))]
    jpeg_quality: u8,

    /// Disable the progress spinner.
    #[arg(long, global = true, env = "HIREMETER_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "HIREMETER_VERBOSE")]
    verbose: bool,

    /// Suppress all output except results and errors.
    #[arg(short, long, global = true, env = "HIREMETER_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Strengths and weaknesses of the candidate for the role.
    Review(EvalArgs),
    /// Match percentage, missing keywords and final thoughts.
    Match(EvalArgs),
    /// Render and encode the first page only.
    Prepare(PrepareArgs),
}

#[derive(Args, Debug)]
struct EvalArgs {
    /// The resume, as a PDF.
    #[arg(long)]
    resume: Option<PathBuf>,

    /// Job description text.
    #[arg(long, conflicts_with = "job_file")]
    job: Option<String>,

    /// Read the job description from a file.
    #[arg(long)]
    job_file: Option<PathBuf>,

    /// LLM provider: gemini, openai, anthropic, ollama, …
    #[arg(long, env = "HIREMETER_PROVIDER")]
    provider: Option<String>,

    /// Model ID.
    #[arg(long, env = "HIREMETER_MODEL")]
    model: Option<String>,

    /// Gemini API key.
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Gemini endpoint host.
    #[arg(long, env = "HIREMETER_API_BASE_URL")]
    api_base_url: Option<String>,

    /// Sampling temperature (0.0–2.0). Provider default when unset.
    #[arg(long, env = "HIREMETER_TEMPERATURE")]
    temperature: Option<f32>,

    /// Output token limit. Provider default when unset.
    #[arg(long, env = "HIREMETER_MAX_TOKENS")]
    max_tokens: Option<usize>,

    /// Print the result as JSON.
    #[arg(long, env = "HIREMETER_JSON")]
    json: bool,
}

#[derive(Args, Debug)]
struct PrepareArgs {
    /// The resume, as a PDF.
    file: PathBuf,

    /// Write the decoded JPEG here instead of printing the payload JSON.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Credentials may live in .env; load it before clap reads env fallbacks.
    let dotenv = dotenvy::dotenv();
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner gives all the feedback that matters; keep library INFO
    // logs out of its way unless asked.
    let json = matches!(&cli.command, Command::Review(a) | Command::Match(a) if a.json);
    let show_progress = !cli.quiet && !cli.no_progress && !json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    if let Ok(path) = dotenv {
        tracing::debug!("Loaded environment from {}", path.display());
    }

    match cli.command {
        Command::Review(ref args) => run_evaluation(&cli, EvaluationMode::Review, args, show_progress).await,
        Command::Match(ref args) => {
            run_evaluation(&cli, EvaluationMode::MatchPercentage, args, show_progress).await
        }
        Command::Prepare(ref args) => run_prepare(&cli, args).await,
    }
}

async fn run_evaluation(
    cli: &Cli,
    mode: EvaluationMode,
    args: &EvalArgs,
    show_progress: bool,
) -> Result<ExitCode> {
    // Nothing uploaded: warn and stop before any engine or provider work.
    let Some(ref resume_path) = args.resume else {
        eprintln!("{} Please upload your resume.", yellow("⚠"));
        return Ok(ExitCode::from(EXIT_WARNING));
    };

    let job_description = match (&args.job, &args.job_file) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read job description from {:?}", path))?,
        (None, None) => String::new(),
    };

    let document = match SourceDocument::from_path(resume_path).await {
        Ok(doc) => doc,
        Err(e) if e.is_warning() => return Ok(warn_and_exit(&e.to_string())),
        Err(e) => return Err(e).context("Failed to read resume"),
    };

    let mut builder = base_config(cli);
    if let Some(ref name) = args.provider {
        builder = builder.provider_name(name.clone());
    }
    if let Some(ref model) = args.model {
        builder = builder.model(model.clone());
    }
    if let Some(ref key) = args.api_key {
        builder = builder.api_key(key.clone());
    }
    if let Some(ref url) = args.api_base_url {
        builder = builder.api_base_url(url.clone());
    }
    if let Some(t) = args.temperature {
        builder = builder.temperature(t);
    }
    if let Some(n) = args.max_tokens {
        builder = builder.max_tokens(n);
    }
    let mut config = builder.build().context("Invalid configuration")?;

    // Provider first: a missing key should not cost an engine download.
    let provider = resolve_provider(&config).context("Failed to set up the LLM provider")?;
    let rasterizer = engine(cli, &config)?;

    // The spinner starts only once the download bar is gone.
    if show_progress {
        config.progress_callback =
            Some(CliProgressCallback::new() as Arc<dyn EvaluationProgressCallback>);
    }

    let evaluator = Evaluator::with_parts(config, rasterizer, provider);
    let result = match evaluator.evaluate(mode, Some(document), &job_description).await {
        Ok(r) => r,
        Err(e) if e.is_warning() => return Ok(warn_and_exit(&e.to_string())),
        Err(e) => return Err(e).context("Evaluation failed"),
    };

    if args.json {
        let json = serde_json::to_string_pretty(&result).context("Failed to serialise result")?;
        println!("{json}");
        return Ok(ExitCode::SUCCESS);
    }

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{}\n", bold(&result.heading)).context("Failed to write to stdout")?;
    handle
        .write_all(result.text.as_bytes())
        .context("Failed to write to stdout")?;
    if !result.text.ends_with('\n') {
        handle.write_all(b"\n").ok();
    }

    if !cli.quiet {
        eprintln!(
            "{}  {} / {}  {}ms",
            green("✔"),
            result.provider,
            result.model,
            result.total_duration_ms
        );
        if let (Some(i), Some(o)) = (result.input_tokens, result.output_tokens) {
            eprintln!(
                "   {} tokens in  /  {} tokens out",
                dim(&i.to_string()),
                dim(&o.to_string())
            );
        }
    }
    Ok(ExitCode::SUCCESS)
}

async fn run_prepare(cli: &Cli, args: &PrepareArgs) -> Result<ExitCode> {
    let document = match SourceDocument::from_path(&args.file).await {
        Ok(doc) => doc,
        Err(e) if e.is_warning() => return Ok(warn_and_exit(&e.to_string())),
        Err(e) => return Err(e).context("Failed to read resume"),
    };

    let config = base_config(cli).build().context("Invalid configuration")?;
    let rasterizer = engine(cli, &config)?;

    let prepared = match prepare_document(&rasterizer, document, &config).await {
        Ok(p) => p,
        Err(e) if e.is_warning() => return Ok(warn_and_exit(&e.to_string())),
        Err(e) => return Err(e).context("Document preparation failed"),
    };

    match args.output {
        Some(ref path) => {
            let jpeg = prepared.payload.decode().context("Failed to decode payload")?;
            tokio::fs::write(path, &jpeg)
                .await
                .with_context(|| format!("Failed to write {:?}", path))?;
            if !cli.quiet {
                eprintln!(
                    "{}  page 1 of {}  {} bytes  →  {}",
                    green("✔"),
                    prepared.page_count,
                    jpeg.len(),
                    bold(&path.display().to_string())
                );
            }
        }
        None => {
            let json = serde_json::to_string_pretty(&prepared.payload)
                .context("Failed to serialise payload")?;
            println!("{json}");
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Options shared by every subcommand.
fn base_config(cli: &Cli) -> EvaluationConfigBuilder {
    let mut builder = EvaluationConfig::builder()
        .max_rendered_pixels(cli.max_pixels)
        .jpeg_quality(cli.jpeg_quality)
        .allow_pdfium_download(!cli.no_download);
    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd.clone());
    }
    if let Some(ref path) = cli.pdfium_lib {
        builder = builder.pdfium_library_path(path.clone());
    }
    builder
}

/// Locate PDFium, showing a download bar on first run.
fn engine(cli: &Cli, config: &EvaluationConfig) -> Result<Arc<dyn PageRasterizer>> {
    let options = LocateOptions {
        explicit_path: config.pdfium_library_path.clone(),
        allow_download: config.allow_pdfium_download,
    };

    let library: PdfiumLibrary = if cli.quiet {
        tokio::task::block_in_place(|| hiremeter_pdfium::locate(&options))
            .context("Failed to locate the PDFium engine")?
    } else {
        // Spinner until the server reports a length.
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {bytes}  {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(TICKS),
        );
        bar.set_prefix("PDF engine");

        let found = tokio::task::block_in_place(|| {
            hiremeter_pdfium::locate_with_progress(
                &options,
                Some(&|downloaded, total| {
                    if let Some(t) = total {
                        if bar.length() != Some(t) {
                            bar.set_style(
                                ProgressStyle::with_template(
                                    "{spinner:.cyan} {prefix:.bold}  \
                                     [{bar:42.green/238}] {bytes}/{total_bytes}  ETA {eta_precise}",
                                )
                                .unwrap_or_else(|_| ProgressStyle::default_bar())
                                .progress_chars("█▉▊▋▌▍▎▏  ")
                                .tick_strings(TICKS),
                            );
                            bar.set_length(t);
                        }
                    } else {
                        bar.set_message("downloading…");
                    }
                    bar.set_position(downloaded);
                    bar.tick();
                }),
            )
        });
        bar.finish_and_clear();
        found.context("Failed to locate the PDFium engine")?
    };

    tracing::info!("PDF engine: {}", library);
    Ok(Arc::new(PdfiumRasterizer::new(library, config)))
}

fn warn_and_exit(message: &str) -> ExitCode {
    eprintln!("{} {}", yellow("⚠"), message);
    ExitCode::from(EXIT_WARNING)
}
