//! CLI binary for edgequake-pdf2xml.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ConversionConfig` / `ConversionService` calls and prints results.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use edgequake_pdf2xml::pipeline::input::load_pdf;
use edgequake_pdf2xml::{
    convert, inspect, ConversionConfig, ConversionOutput, ConversionService, FsStore,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn ansi(enabled: bool, code: &str, s: &str) -> String {
    if enabled {
        format!("\x1b[{code}m{s}\x1b[0m")
    } else {
        s.to_string()
    }
}
/// Status lines go to stderr; colour them only when it is a terminal.
fn paint(code: &str, s: &str) -> String {
    ansi(io::stderr().is_terminal(), code, s)
}
fn green(s: &str) -> String {
    paint("32", s)
}
fn dim(s: &str) -> String {
    paint("2", s)
}
fn bold(s: &str) -> String {
    paint("1", s)
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert to stdout
  pdf2xml convert document.pdf

  # Convert to a file, compact XML
  pdf2xml convert document.pdf -o document.xml --compact

  # Convert and keep the result in a store
  pdf2xml convert report.pdf --owner alice --store ./pdf2xml-store

  # List, inspect and download stored conversions
  pdf2xml history --owner alice
  pdf2xml status 5f0c… --owner alice
  pdf2xml download 5f0c… --owner alice -o report.xml

  # Page count and document info only
  pdf2xml inspect document.pdf --json

ENVIRONMENT VARIABLES:
  PDF2XML_STORE     Store directory (default: ./pdf2xml-store)
  PDF2XML_OWNER     Default owner id for store commands
  PDFIUM_LIB_PATH   Path to libpdfium (file or directory)
  RUST_LOG          Override log filter
"#;

/// Convert PDF files to structured XML.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2xml",
    version,
    about = "Convert PDF files to structured XML (headings and paragraphs)",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to libpdfium (file or directory).
    #[arg(long, global = true, env = "PDFIUM_LIB_PATH")]
    pdfium_lib: Option<PathBuf>,

    /// Reject inputs larger than this many MiB.
    #[arg(long, global = true, env = "PDF2XML_MAX_MB", default_value_t = 50)]
    max_mb: u64,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "PDF2XML_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "PDF2XML_QUIET")]
    quiet: bool,

    /// Disable the spinner (INFO logs are shown instead).
    #[arg(long, global = true, env = "PDF2XML_NO_PROGRESS")]
    no_progress: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a PDF to XML.
    Convert(ConvertArgs),
    /// Print page count and document info without converting.
    Inspect {
        /// Local PDF file path.
        input: PathBuf,
        /// PDF user password for encrypted documents.
        #[arg(long, env = "PDF2XML_PASSWORD")]
        password: Option<String>,
        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// List stored conversions, newest first.
    History {
        #[command(flatten)]
        store: StoreArgs,
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Show one stored conversion.
    Status {
        /// Conversion id.
        id: String,
        #[command(flatten)]
        store: StoreArgs,
        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Write a stored conversion's XML to a file or stdout.
    Download {
        /// Conversion id.
        id: String,
        #[command(flatten)]
        store: StoreArgs,
        /// Output file. Use `-o .` to write `<original>.xml` into the current directory.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct ConvertArgs {
    /// Local PDF file path.
    input: PathBuf,

    /// Write XML to this file instead of stdout.
    #[arg(short, long, env = "PDF2XML_OUTPUT")]
    output: Option<PathBuf>,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "PDF2XML_PASSWORD")]
    password: Option<String>,

    /// Emit XML without indentation.
    #[arg(long)]
    compact: bool,

    /// Spaces per indent level (0–8).
    #[arg(long, default_value_t = 2)]
    indent: usize,

    /// Output the structured document and stats as JSON.
    #[arg(long)]
    json: bool,

    /// Also save the conversion in the store under this owner.
    #[arg(long, env = "PDF2XML_OWNER")]
    owner: Option<String>,

    /// Store directory used with --owner.
    #[arg(long, env = "PDF2XML_STORE", default_value = "./pdf2xml-store")]
    store: PathBuf,
}

#[derive(Args, Debug)]
struct StoreArgs {
    /// Owner id the conversions belong to.
    #[arg(long, env = "PDF2XML_OWNER")]
    owner: String,

    /// Store directory.
    #[arg(long, env = "PDF2XML_STORE", default_value = "./pdf2xml-store")]
    store: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs while the spinner is active.
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress(&cli) {
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

    match &cli.command {
        Command::Convert(args) => run_convert(&cli, args).await,
        Command::Inspect {
            input,
            password,
            json,
        } => run_inspect(&cli, input, password.clone(), *json).await,
        Command::History { store, json } => run_history(&cli, store, *json).await,
        Command::Status { id, store, json } => run_status(&cli, id, store, *json).await,
        Command::Download { id, store, output } => {
            run_download(&cli, id, store, output.as_deref()).await
        }
    }
}

/// Map global flags plus per-command options to `ConversionConfig`.
fn build_config(
    cli: &Cli,
    password: Option<String>,
    pretty: bool,
    indent: usize,
) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .pretty(pretty)
        .indent_width(indent)
        .max_input_bytes(cli.max_mb.saturating_mul(1024 * 1024).max(1));
    if let Some(pwd) = password {
        builder = builder.password(pwd);
    }
    if let Some(ref lib) = cli.pdfium_lib {
        builder = builder.pdfium_lib_path(lib);
    }
    builder.build().context("Invalid configuration")
}

fn show_progress(cli: &Cli) -> bool {
    !cli.quiet && !cli.no_progress
}

/// Spinner on stderr while pdfium works.
fn spinner(cli: &Cli, msg: String) -> ProgressBar {
    if !show_progress(cli) {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
    );
    bar.set_prefix("Converting");
    bar.set_message(msg);
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

async fn open_service(store: &Path, config: ConversionConfig) -> Result<ConversionService<FsStore>> {
    let store = FsStore::open(store)
        .await
        .with_context(|| format!("Failed to open store at {}", store.display()))?;
    Ok(ConversionService::with_pdfium(Arc::new(store), config))
}

async fn run_convert(cli: &Cli, args: &ConvertArgs) -> Result<()> {
    let config = build_config(cli, args.password.clone(), !args.compact, args.indent)?;
    let bar = spinner(cli, args.input.display().to_string());

    // With --owner the stored conversion is the one we print: convert once.
    let output: ConversionOutput = match args.owner {
        Some(ref owner) => {
            let loaded = load_pdf(&args.input, config.max_input_bytes)
                .await
                .with_context(|| format!("Failed to read {}", args.input.display()))?;
            let svc = open_service(&args.store, config.clone()).await?;
            let (record, output) = svc
                .submit_with_output(owner, &loaded.file_name, loaded.bytes)
                .await
                .context("Conversion failed")?;
            bar.finish_and_clear();
            if !cli.quiet {
                eprintln!("{} saved as {}", green("✔"), bold(&record.id));
            }
            output
        }
        None => {
            let output = convert(&args.input, &config)
                .await
                .context("Conversion failed")?;
            bar.finish_and_clear();
            output
        }
    };

    if let Some(ref out_path) = args.output {
        write_file(out_path, output.xml.as_bytes()).await?;
    } else if args.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    } else {
        write_stdout(output.xml.as_bytes())?;
    }

    if !cli.quiet {
        let s = &output.stats;
        eprintln!(
            "{}  {} pages  {} headings  {} paragraphs  {}",
            green("✔"),
            s.page_count,
            s.heading_count,
            s.paragraph_count,
            dim(&format!("{}ms", s.total_duration_ms)),
        );
        if let Some(ref out_path) = args.output {
            eprintln!("   → {}", bold(&out_path.display().to_string()));
        }
    }
    Ok(())
}

async fn run_inspect(cli: &Cli, input: &Path, password: Option<String>, json: bool) -> Result<()> {
    let config = build_config(cli, password, true, 2)?;
    let bar = spinner(cli, input.display().to_string());
    bar.set_prefix("Inspecting");
    let info = inspect(input, &config).await.context("Failed to inspect PDF")?;
    bar.finish_and_clear();

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&info).context("Failed to serialize metadata")?
        );
    } else {
        println!("File:           {}", info.file_name);
        println!("Pages:          {}", info.page_count);
        println!("Author:         {}", info.author.as_deref().unwrap_or("Unknown"));
        println!(
            "Creation date:  {}",
            info.creation_date.as_deref().unwrap_or("Unknown")
        );
        println!("Text bytes:     {}", info.text_bytes);
    }
    Ok(())
}

async fn run_history(cli: &Cli, args: &StoreArgs, json: bool) -> Result<()> {
    let svc = open_service(&args.store, build_config(cli, None, true, 2)?).await?;
    let items = svc.history(&args.owner).await.context("Failed to list conversions")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }
    if items.is_empty() {
        if !cli.quiet {
            eprintln!("No conversions for '{}'", args.owner);
        }
        return Ok(());
    }
    for item in &items {
        println!(
            "{}  {}  {}",
            item.id,
            dim(&item.created_at.format("%Y-%m-%d %H:%M:%S").to_string()),
            item.original_filename
        );
    }
    Ok(())
}

async fn run_status(cli: &Cli, id: &str, args: &StoreArgs, json: bool) -> Result<()> {
    let svc = open_service(&args.store, build_config(cli, None, true, 2)?).await?;
    let record = svc.status(&args.owner, id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        println!("Conversion:     {}", record.id);
        println!("Status:         {}", record.status);
        println!("File:           {}", record.original_filename);
        println!("Created:        {}", record.created_at.to_rfc3339());
    }
    Ok(())
}

async fn run_download(cli: &Cli, id: &str, args: &StoreArgs, output: Option<&Path>) -> Result<()> {
    let svc = open_service(&args.store, build_config(cli, None, true, 2)?).await?;
    let download = svc.fetch_xml(&args.owner, id).await?;

    match output {
        Some(p) if p.is_dir() => {
            let target = p.join(&download.file_name);
            write_file(&target, &download.bytes).await?;
            if !cli.quiet {
                eprintln!("{} {}", green("✔"), bold(&target.display().to_string()));
            }
        }
        Some(p) => {
            write_file(p, &download.bytes).await?;
            if !cli.quiet {
                eprintln!("{} {}", green("✔"), bold(&p.display().to_string()));
            }
        }
        None => write_stdout(&download.bytes)?,
    }
    Ok(())
}

async fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    tokio::fs::write(path, bytes)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))
}

fn write_stdout(bytes: &[u8]) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle.write_all(bytes).context("Failed to write to stdout")?;
    // Ensure a trailing newline on stdout.
    if !bytes.ends_with(b"\n") {
        handle.write_all(b"\n").ok();
    }
    Ok(())
}
