//! CLI binary for ats-scorer.
//!
//! `serve` (the default) runs the form server. The other subcommands run one
//! workflow from the terminal and print the result.

use anyhow::{anyhow, Context, Result};
use ats_scorer::pipeline::layout::RESUME_FILE_NAME;
use ats_scorer::{
    ranked, require_credential, web, CsvLeaderboard, LeaderboardStore, Pipeline, ResumeRequest,
    ScholarshipForm, ScorerConfig, ServerConfig,
};
use clap::{Args, FromArgMatches, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::future::Future;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Start the form server on http://127.0.0.1:8501
  ats-scorer

  # Matching analysis from the terminal
  ats-scorer match cv.pdf --job offre.txt

  # Optimised résumé as a PDF
  ats-scorer optimize cv.pdf --job offre.txt -o CV_Optimise.pdf

  # Score a scholarship application and record it
  ats-scorer evaluate cv.pdf --name "Awa Diop" --email awa@example.com \
      --level Master --income 200000 --motivation lettre.txt

  # Show the leaderboard
  ats-scorer leaderboard --json

ENVIRONMENT VARIABLES:
  GEMINI_API_KEY       Google Gemini API key (default provider)
  OPENAI_API_KEY       OpenAI API key
  ANTHROPIC_API_KEY    Anthropic API key
  ATS_PROVIDER         Provider: gemini, openai, anthropic, ollama, auto
  ATS_MODEL            Model ID (default: gemini-2.0-flash)
  ATS_LEADERBOARD      Leaderboard CSV path (default: candidatures.csv)
  PDFIUM_LIB_PATH      Path to libpdfium or the directory holding it

  A .env file in the working directory is loaded at startup.
"#;

/// Score résumés and scholarship applications with a vision LLM.
#[derive(Parser, Debug)]
#[command(
    name = "ats-scorer",
    version,
    about = "Score résumés and scholarship applications with a vision LLM",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Args, Debug)]
struct GlobalArgs {
    /// LLM provider: gemini, openai, anthropic, ollama, or auto.
    #[arg(long, global = true, env = "ATS_PROVIDER")]
    provider: Option<String>,

    /// LLM model ID.
    #[arg(long, global = true, env = "ATS_MODEL")]
    model: Option<String>,

    /// Rendering DPI for the CV's first page (72–400).
    #[arg(long, global = true, env = "ATS_DPI", default_value_t = 200,
          value_parser = clap::value_parser!(u32).range(72..=400))]
    dpi: u32,

    /// LLM temperature (0.0–2.0).
    #[arg(long, global = true, env = "ATS_TEMPERATURE", default_value_t = 0.4)]
    temperature: f32,

    /// Max LLM output tokens.
    #[arg(long, global = true, env = "ATS_MAX_TOKENS", default_value_t = 4096)]
    max_tokens: usize,

    /// Pause before every model call, in milliseconds.
    #[arg(long, global = true, env = "ATS_REQUEST_DELAY_MS", default_value_t = 0)]
    request_delay_ms: u64,

    /// Leaderboard CSV file.
    #[arg(long, global = true, env = "ATS_LEADERBOARD", default_value = "candidatures.csv")]
    leaderboard: PathBuf,

    /// Path to libpdfium, or the directory that holds it.
    #[arg(long, global = true, env = "PDFIUM_LIB_PATH")]
    pdfium_lib_path: Option<PathBuf>,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "ATS_VERBOSE")]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the form server (default).
    Serve(ServeArgs),
    /// Analyse how well a CV matches a job description.
    Match(ResumeArgs),
    /// Rewrite a CV for a job description and save it as a PDF.
    Optimize(OptimizeArgs),
    /// Evaluate a scholarship application and record its score.
    Evaluate(EvaluateArgs),
    /// Print the leaderboard, best score first.
    Leaderboard(LeaderboardArgs),
}

#[derive(Args, Debug)]
struct ServeArgs {
    #[arg(long, env = "ATS_HOST", default_value = "127.0.0.1")]
    host: String,

    #[arg(long, env = "ATS_PORT", default_value_t = 8501)]
    port: u16,

    /// Largest accepted form body in bytes.
    #[arg(long, env = "ATS_MAX_UPLOAD_BYTES", default_value_t = 10 * 1024 * 1024)]
    max_upload_bytes: usize,
}

#[derive(Args, Debug)]
struct ResumeArgs {
    /// CV to analyse (PDF).
    cv: PathBuf,

    /// Text file holding the job description.
    #[arg(long)]
    job: PathBuf,
}

#[derive(Args, Debug)]
struct OptimizeArgs {
    #[command(flatten)]
    resume: ResumeArgs,

    /// Where to write the optimised PDF.
    #[arg(short, long, default_value = RESUME_FILE_NAME)]
    output: PathBuf,
}

#[derive(Args, Debug)]
struct EvaluateArgs {
    /// Applicant's CV (PDF).
    cv: PathBuf,

    #[arg(long)]
    name: String,

    #[arg(long)]
    email: String,

    /// Bac, Licence, Master or Doctorat.
    #[arg(long)]
    level: String,

    /// Monthly family income (0–1000000, multiple of 5000).
    #[arg(long)]
    income: String,

    /// Text file holding the motivation statement.
    #[arg(long)]
    motivation: PathBuf,

    /// Print the outcome as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct LeaderboardArgs {
    /// Print rows as JSON.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Before clap and the log filter read ATS_* and RUST_LOG.
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let filter = if cli.global.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let config = build_config(&cli.global)?;

    let command = match cli.command {
        Some(command) => command,
        None => Command::Serve(ServeArgs::from_env().unwrap_or_else(|e| e.exit())),
    };

    match command {
        Command::Serve(args) => {
            let pipeline = build_pipeline(config)?;
            let server = ServerConfig {
                host: args.host,
                port: args.port,
                max_upload_bytes: args.max_upload_bytes,
            };
            info!("Starting ats-scorer v{}", env!("CARGO_PKG_VERSION"));
            web::serve(pipeline, server).await.context("Server failed")?;
        }
        Command::Match(args) => {
            let pipeline = build_pipeline(config)?;
            let request = load_resume_request(&args).await?;
            let analysis = with_spinner("Analyse du matching…", pipeline.analyze_matching(request))
                .await
                .context("Matching analysis failed")?;
            println!("{analysis}");
        }
        Command::Optimize(args) => {
            let pipeline = build_pipeline(config)?;
            let request = load_resume_request(&args.resume).await?;
            let optimized = with_spinner("Optimisation du CV…", pipeline.optimize_resume(request))
                .await
                .context("Résumé optimisation failed")?;
            write_atomically(&args.output, &optimized.pdf)?;
            eprintln!("✔ {} written ({} bytes)", args.output.display(), optimized.pdf.len());
        }
        Command::Evaluate(args) => {
            let pipeline = build_pipeline(config)?;
            let form = ScholarshipForm {
                name: Some(args.name),
                email: Some(args.email),
                education_level: Some(args.level),
                income: Some(args.income),
                motivation: Some(read_text(&args.motivation).await?),
                cv: Some(read_bytes(&args.cv).await?),
            };
            let application = form.validate().map_err(|e| anyhow!(e.user_message()))?;
            let outcome = with_spinner(
                "Évaluation de la candidature…",
                pipeline.evaluate_scholarship(application),
            )
            .await
            .context("Scholarship evaluation failed")?;

            if args.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&outcome).context("Failed to serialise outcome")?
                );
            } else {
                println!("{}", outcome.evaluation);
                match outcome.score {
                    Some(score) if outcome.recorded => eprintln!("✔ Score {score}/100 recorded"),
                    _ => eprintln!("⚠ No score found; nothing recorded"),
                }
            }
        }
        Command::Leaderboard(args) => {
            // Reading the board needs neither a model nor a credential.
            let store = CsvLeaderboard::new(config.leaderboard_path.clone());
            let records = ranked(store.load_all().with_context(|| {
                format!("Failed to read {}", config.leaderboard_path.display())
            })?);
            if args.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&records).context("Failed to serialise leaderboard")?
                );
            } else if records.is_empty() {
                eprintln!("No scored applications yet.");
            } else {
                let stdout = io::stdout();
                let mut out = stdout.lock();
                writeln!(
                    out,
                    "{:>3}  {:>5}  {:<24}  {:<28}  {:<9}  {:>9}",
                    "#", "Score", "Name", "Email", "Level", "Income"
                )?;
                for (i, r) in records.iter().enumerate() {
                    let score = r.score.map_or_else(|| "-".to_string(), |s| s.to_string());
                    writeln!(
                        out,
                        "{:>3}  {:>5}  {:<24}  {:<28}  {:<9}  {:>9}",
                        i + 1,
                        score,
                        r.name,
                        r.email,
                        r.education_level,
                        r.income
                    )?;
                }
            }
        }
    }

    Ok(())
}

impl ServeArgs {
    /// `serve` arguments when no subcommand was given. clap still applies
    /// the `ATS_*` fallbacks and rejects malformed values.
    fn from_env() -> Result<Self, clap::Error> {
        let command = Self::augment_args(clap::Command::new("serve"));
        let matches = command.try_get_matches_from(["serve"])?;
        Self::from_arg_matches(&matches)
    }
}

/// Map CLI args to `ScorerConfig`.
fn build_config(args: &GlobalArgs) -> Result<ScorerConfig> {
    let mut builder = ScorerConfig::builder()
        .dpi(args.dpi)
        .temperature(args.temperature)
        .max_tokens(args.max_tokens)
        .request_delay_ms(args.request_delay_ms)
        .leaderboard_path(&args.leaderboard);

    if let Some(ref provider) = args.provider {
        builder = builder.provider_name(provider);
    }
    if let Some(ref model) = args.model {
        builder = builder.model(model);
    }
    if let Some(ref path) = args.pdfium_lib_path {
        builder = builder.pdfium_lib_path(path);
    }

    builder.build().context("Invalid configuration")
}

/// Check the credential, then wire the production pipeline.
fn build_pipeline(config: ScorerConfig) -> Result<Pipeline> {
    let provider = config.effective_provider().to_string();
    match require_credential(&provider)
        .with_context(|| format!("Provider '{provider}' is missing its API key"))?
    {
        Some(var) => info!("Using provider {} (credential from {})", provider, var),
        None => info!("Using provider {} (no credential required)", provider),
    }
    Pipeline::from_config(config).context("Failed to initialise the pipeline")
}

async fn load_resume_request(args: &ResumeArgs) -> Result<ResumeRequest> {
    let job = read_text(&args.job).await?;
    let cv = read_bytes(&args.cv).await?;
    ResumeRequest::new(Some(job), Some(cv)).map_err(|e| anyhow!(e.user_message()))
}

async fn read_text(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
}

async fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
}

/// Write via a temp file in the target directory, then rename into place.
fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create a temp file in {}", dir.display()))?;
    tmp.write_all(bytes).context("Failed to write PDF")?;
    tmp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("Failed to save {}", path.display()))?;
    Ok(())
}

/// Show a spinner on stderr while `fut` runs.
async fn with_spinner<F: Future>(message: &'static str, fut: F) -> F::Output {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}  {elapsed}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
    );
    bar.set_message(message);
    bar.enable_steady_tick(Duration::from_millis(80));
    let output = fut.await;
    bar.finish_and_clear();
    output
}
