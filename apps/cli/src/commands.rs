//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use contentfactory_artifacts::DocxWriter;
use contentfactory_core::pipeline::{BatchConfig, BatchProgress, BatchResult, run_batch};
use contentfactory_core::table::{TableSchema, load_table};
use contentfactory_document::ConvertOptions;
use contentfactory_generation::{FixedIntervalGate, OpenAiClient};
use contentfactory_shared::{
    AppConfig, GenerationSettings, Model, init_config, load_config, resolve_api_key,
};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// ContentFactory — turn a topic table into finished articles.
#[derive(Parser)]
#[command(
    name = "content-factory",
    version,
    about = "Generate definitions and articles for a table of topics and package them as documents.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Generate articles for every row of a topic table.
    Generate(GenerateArgs),

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Flags for `generate`. Unset flags fall back to the config file.
#[derive(Args, Debug, Default)]
pub(crate) struct GenerateArgs {
    /// Topic table (CSV).
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Site domain used to build article URLs, e.g. example.com.
    #[arg(short, long)]
    pub domain: Option<String>,

    /// Generation model: gpt-3.5-turbo or gpt-4.
    #[arg(long)]
    pub model: Option<Model>,

    /// Maximum tokens per completion (1-4096).
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// Sampling temperature (0-2).
    #[arg(long)]
    pub temperature: Option<f32>,

    /// Nucleus sampling (0-1).
    #[arg(long)]
    pub top_p: Option<f32>,

    /// Presence penalty (0-2).
    #[arg(long)]
    pub presence_penalty: Option<f32>,

    /// Frequency penalty (0-2).
    #[arg(long)]
    pub frequency_penalty: Option<f32>,

    /// 1-based column where outline sections start.
    #[arg(long)]
    pub outline_start: Option<usize>,

    /// Directory for documents and the summary table.
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Archive path.
    #[arg(long)]
    pub archive: Option<PathBuf>,

    /// Minimum pause between generation calls, in milliseconds (0 disables).
    #[arg(long)]
    pub pace_ms: Option<u64>,

    /// Reject malformed article markup instead of converting what parses.
    #[arg(long)]
    pub strict_markup: bool,
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "contentfactory=info,content_factory=info",
        1 => "contentfactory=debug,content_factory=debug",
        _ => "contentfactory=trace,content_factory=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Generate(args) => cmd_generate(args).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

// ---------------------------------------------------------------------------
// generate
// ---------------------------------------------------------------------------

/// Everything `generate` needs, resolved from flags and config.
#[derive(Debug)]
struct GeneratePlan {
    input: PathBuf,
    domain: String,
    schema: TableSchema,
    batch: BatchConfig,
    pace: Duration,
}

/// Operator inputs that must be present before anything is written.
fn missing_inputs(args: &GenerateArgs, api_key: Option<&str>, api_key_env: &str) -> Vec<String> {
    let mut missing = Vec::new();
    if api_key.is_none() {
        missing.push(format!("API key (set the {api_key_env} environment variable)"));
    }
    if args.domain.as_deref().is_none_or(|d| d.trim().is_empty()) {
        missing.push("domain (--domain)".to_string());
    }
    match &args.input {
        None => missing.push("input table (--input)".to_string()),
        Some(path) if !path.is_file() => {
            missing.push(format!("input table ({} does not exist)", path.display()));
        }
        Some(_) => {}
    }
    missing
}

/// Merge flags over the config file and validate the result.
fn plan(args: GenerateArgs, config: &AppConfig) -> Result<GeneratePlan> {
    let mut settings = GenerationSettings::from(&config.generation);
    if let Some(model) = args.model {
        settings.model = model;
    }
    if let Some(v) = args.max_tokens {
        settings.max_tokens = v;
    }
    if let Some(v) = args.temperature {
        settings.temperature = v;
    }
    if let Some(v) = args.top_p {
        settings.top_p = v;
    }
    if let Some(v) = args.presence_penalty {
        settings.presence_penalty = v;
    }
    if let Some(v) = args.frequency_penalty {
        settings.frequency_penalty = v;
    }
    settings.validate()?;

    let defaults = &config.batch;
    let output_dir = args.out.unwrap_or_else(|| PathBuf::from(&defaults.output_dir));
    let archive_path = args
        .archive
        .unwrap_or_else(|| PathBuf::from(&defaults.archive_file_name));

    Ok(GeneratePlan {
        input: args.input.ok_or_else(|| eyre!("missing input table"))?,
        domain: args
            .domain
            .map(|d| d.trim().to_string())
            .ok_or_else(|| eyre!("missing domain"))?,
        schema: TableSchema::with_outline_start(
            args.outline_start.unwrap_or(defaults.outline_start_column),
        ),
        batch: BatchConfig {
            settings,
            output_dir,
            summary_file_name: defaults.summary_file_name.clone(),
            archive_path,
            convert: ConvertOptions {
                strict: args.strict_markup || defaults.strict_markup,
            },
        },
        pace: Duration::from_millis(args.pace_ms.unwrap_or(defaults.pace_ms)),
    })
}

async fn cmd_generate(args: GenerateArgs) -> Result<()> {
    let config = load_config()?;

    // Report every missing input at once, before touching the filesystem.
    let api_key = resolve_api_key(&config).ok();
    let missing = missing_inputs(&args, api_key.as_deref(), &config.generation.api_key_env);
    if !missing.is_empty() {
        return Err(eyre!("cannot start: missing {}", missing.join(", ")));
    }
    let api_key = api_key.ok_or_else(|| eyre!("missing API key"))?;

    let plan = plan(args, &config)?;
    let table = load_table(&plan.input, &plan.schema, &plan.domain)?;
    if table.is_empty() {
        return Err(eyre!("{} has no topic rows", plan.input.display()));
    }

    let client = OpenAiClient::new(
        &api_key,
        &config.generation.base_url()?,
        Duration::from_secs(config.generation.timeout_secs),
    )?;
    let gate = FixedIntervalGate::new(plan.pace);

    info!(
        input = %plan.input.display(),
        domain = %plan.domain,
        topics = table.len(),
        model = %plan.batch.settings.model,
        "generating articles"
    );

    let reporter = CliProgress::new();
    let result = run_batch(&plan.batch, table, &client, &gate, &DocxWriter, &reporter).await?;

    println!();
    println!("  Batch complete!");
    println!("  ID:        {}", result.batch_id);
    println!("  Topics:    {}", result.topic_count());
    println!("  Documents: {}", plan.batch.output_dir.display());
    println!("  Summary:   {}", result.summary_path.display());
    println!("  Archive:   {}", result.archive_path.display());
    println!(
        "  Time:      {:.1}s",
        result.elapsed.as_secs_f64()
    );
    println!();

    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using indicatif spinners.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(Duration::from_millis(80));
        Self { spinner }
    }
}

impl BatchProgress for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn topic_started(&self, topic: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Generating [{current}/{total}] {topic}"));
    }

    fn document_written(&self, path: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Wrote [{current}/{total}] {path}"));
    }

    fn done(&self, _result: &BatchResult) {
        self.spinner.finish_and_clear();
    }
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
