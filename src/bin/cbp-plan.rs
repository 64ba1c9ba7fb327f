//! CLI binary for cbp-plan.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `build_plan` / `DocumentRenderer` and prints results.

use anyhow::{Context, Result};
use cbp_plan::{
    build_plan, course_records, load_json, normalize_courses, render_to_file, DocumentRenderer,
    PlanMetadata, RenderConfig, RoleMapping,
};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Assemble a plan (stdout, JSON)
  cbp-plan assemble --role-mapping role.json --courses recommendations.json

  # Keep only two courses, in this order
  cbp-plan assemble --role-mapping role.json --courses recs.json --select do_113,do_107 -o plan.json

  # Render template output to PDF
  cbp-plan render plan.html -o plan.pdf

  # Use a specific browser binary
  cbp-plan render plan.html -o plan.pdf --chrome /usr/bin/chromium

  # Show which browser would be used
  cbp-plan locate

INPUT SHAPES:
  --role-mapping   object with designation_name, wing_division_section,
                   role_responsibilities, activities, competencies
  --courses        a JSON array of course records, or a stored recommendation
                   object holding them in "filtered_courses"

ENVIRONMENT VARIABLES:
  CHROME_PATH                 Browser executable (overrides auto-detection)
  PLAYWRIGHT_BROWSERS_PATH    Playwright browser cache to search
  RUST_LOG                    Log filter, e.g. cbp_plan=debug
"#;

/// Build competency-based learning plans and render them to PDF.
#[derive(Parser, Debug)]
#[command(
    name = "cbp-plan",
    version,
    about = "Build competency-based learning plans and render them to PDF",
    long_about = "Normalise role mappings and course recommendations into a canonical plan \
document, and print template markup to A4 PDF with headless Chromium.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "CBP_PLAN_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "CBP_PLAN_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Normalise records and assemble the plan document (JSON).
    Assemble(AssembleArgs),
    /// Render an HTML file to PDF.
    Render(RenderArgs),
    /// Print the browser executable that would be used.
    Locate,
}

#[derive(Args, Debug)]
struct AssembleArgs {
    /// Role mapping JSON file.
    #[arg(long)]
    role_mapping: PathBuf,

    /// Course recommendations JSON file.
    #[arg(long)]
    courses: PathBuf,

    /// Selected course identifiers, comma separated, in display order.
    /// Default: every course, in recommendation order.
    #[arg(long, value_delimiter = ',')]
    select: Option<Vec<String>>,

    /// Plan id. Default: a fresh UUID.
    #[arg(long)]
    plan_id: Option<Uuid>,

    /// User id. Default: the nil UUID.
    #[arg(long, env = "CBP_PLAN_USER_ID")]
    user_id: Option<Uuid>,

    /// Write JSON to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// HTML file produced by the template stage.
    input: PathBuf,

    /// PDF output path.
    #[arg(short, long, env = "CBP_PLAN_OUTPUT")]
    output: PathBuf,

    /// Browser executable.
    #[arg(long, env = "CHROME_PATH")]
    chrome: Option<PathBuf>,

    /// Keep the Chromium sandbox enabled.
    #[arg(long, env = "CBP_PLAN_SANDBOX")]
    sandbox: bool,

    /// Browser start-up timeout in seconds.
    #[arg(long, env = "CBP_PLAN_LAUNCH_TIMEOUT", default_value_t = 30)]
    launch_timeout: u64,

    /// Content load (network idle) timeout in seconds.
    #[arg(long, env = "CBP_PLAN_LOAD_TIMEOUT", default_value_t = 30)]
    load_timeout: u64,

    /// PDF export timeout in seconds.
    #[arg(long, env = "CBP_PLAN_EXPORT_TIMEOUT", default_value_t = 30)]
    export_timeout: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Command::Assemble(ref args) => assemble(args).await,
        Command::Render(ref args) => render(args, cli.quiet).await,
        Command::Locate => {
            let path = chrome_locate::find_chrome().context("No browser found")?;
            println!("{}", path.display());
            Ok(())
        }
    }
}

async fn assemble(args: &AssembleArgs) -> Result<()> {
    let role: RoleMapping = load_json(&args.role_mapping)
        .await
        .context("Failed to load role mapping")?;
    let raw: Value = load_json(&args.courses)
        .await
        .context("Failed to load course recommendations")?;
    let courses = course_records(raw).context("Unrecognised course recommendations")?;

    let selected: Vec<String> = match args.select {
        Some(ref ids) => ids.iter().map(|s| s.trim().to_string()).collect(),
        None => normalize_courses(&courses)
            .context("Invalid course record")?
            .into_iter()
            .filter_map(|c| c.identifier)
            .collect(),
    };

    let mut metadata = PlanMetadata::new(args.user_id.unwrap_or_default(), role.id);
    if let Some(id) = args.plan_id {
        metadata.id = id;
    }

    let plan = build_plan(&role, &courses, &selected, metadata).context("Failed to build plan")?;
    let json = serde_json::to_string_pretty(&plan.to_value()?).context("Failed to serialise plan")?;

    match args.output {
        Some(ref path) => {
            tokio::fs::write(path, json.as_bytes())
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!(
                "{} {} courses  →  {}",
                green("✔"),
                plan.courses.len(),
                bold(&path.display().to_string())
            );
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(json.as_bytes())
                .context("Failed to write to stdout")?;
            handle.write_all(b"\n").ok();
        }
    }
    Ok(())
}

async fn render(args: &RenderArgs, quiet: bool) -> Result<()> {
    let markup = tokio::fs::read_to_string(&args.input)
        .await
        .with_context(|| format!("Failed to read {}", args.input.display()))?;

    let mut builder = RenderConfig::builder()
        .no_sandbox(!args.sandbox)
        .launch_timeout_secs(args.launch_timeout)
        .load_timeout_secs(args.load_timeout)
        .export_timeout_secs(args.export_timeout);
    if let Some(ref chrome) = args.chrome {
        builder = builder.chrome_executable(chrome);
    }
    let config = builder.build().context("Invalid configuration")?;
    let renderer = DocumentRenderer::chromium(config);

    let spinner = (!quiet).then(|| {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
        );
        bar.set_prefix("Rendering");
        bar.set_message(args.input.display().to_string());
        bar.enable_steady_tick(Duration::from_millis(80));
        bar
    });

    let start = Instant::now();
    let result = render_to_file(&markup, &args.output, &renderer).await;
    if let Some(ref bar) = spinner {
        bar.finish_and_clear();
    }
    let bytes = result.context("PDF rendering failed")?;

    if !quiet {
        eprintln!(
            "{}  {}  {}ms  →  {}",
            green("✔"),
            dim(&format!("{bytes} bytes")),
            start.elapsed().as_millis(),
            bold(&args.output.display().to_string()),
        );
    }
    Ok(())
}
