//! CLI command definitions, routing, and tracing setup.

use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use lexigen_generator::{OpenAiClient, generate_for, normalize_categories};
use lexigen_shared::{
    AppConfig, GenerationRequest, GenerationSettings, VocabularyDictionary, config_file_path,
    init_config, load_config, load_config_from, resolve_api_key, validate_api_key,
};
use tracing::{info, warn};
use url::Url;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Lexigen: themed Spanish vocabulary lists, validated.
#[derive(Parser)]
#[command(
    name = "lexigen",
    version,
    about = "Generate validated, themed Spanish vocabulary lists with a text-generation model.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of ~/.lexigen/lexigen.toml.
    #[arg(long, env = "LEXIGEN_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// How `generate` prints its result.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub(crate) enum OutputFormat {
    /// Pretty-printed JSON dictionary.
    Json,
    /// One line per entry, grouped by category.
    Table,
}

/// Flags that override the `[generation]` config section.
#[derive(Args, Clone, Debug, Default)]
pub(crate) struct GenerationOverrides {
    /// Model identifier sent to the completion service.
    #[arg(long)]
    pub model: Option<String>,

    /// Base URL of the OpenAI-compatible API.
    #[arg(long)]
    pub base_url: Option<Url>,

    /// Timeout in seconds for the completion call.
    #[arg(long)]
    pub timeout: Option<u64>,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Generate vocabulary for one or more categories.
    Generate {
        /// Thematic categories (separate arguments or comma-separated).
        #[arg(required = true)]
        categories: Vec<String>,

        /// Write the result to a file instead of stdout.
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Output format.
        #[arg(short, long, default_value = "json")]
        format: OutputFormat,

        #[command(flatten)]
        overrides: GenerationOverrides,
    },

    /// Serve the generation pipeline over HTTP.
    Serve {
        /// Address to bind (defaults to server.bind from config).
        #[arg(long)]
        bind: Option<SocketAddr>,

        #[command(flatten)]
        overrides: GenerationOverrides,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
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
        0 => "lexigen=info",
        1 => "lexigen=debug,tower_http=debug",
        _ => "lexigen=trace,tower_http=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config;
    match cli.command {
        Command::Generate {
            categories,
            out,
            format,
            overrides,
        } => {
            cmd_generate(
                config_path.as_deref(),
                &categories,
                out.as_deref(),
                format,
                &overrides,
            )
            .await
        }
        Command::Serve { bind, overrides } => {
            cmd_serve(config_path.as_deref(), bind, &overrides).await
        }
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show(config_path.as_deref()).await,
        },
    }
}

// ---------------------------------------------------------------------------
// Config helpers
// ---------------------------------------------------------------------------

fn load(config_path: Option<&Path>) -> Result<AppConfig> {
    let config = match config_path {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    Ok(config)
}

/// Merge CLI overrides on top of config-file settings.
fn resolve_settings(
    config: &AppConfig,
    overrides: &GenerationOverrides,
) -> Result<GenerationSettings> {
    let mut settings = GenerationSettings::from_config(config)?;
    if let Some(model) = &overrides.model {
        settings.model = model.clone();
    }
    if let Some(base_url) = &overrides.base_url {
        settings.base_url = base_url.clone();
    }
    if let Some(secs) = overrides.timeout {
        settings.timeout = Duration::from_secs(secs);
    }
    Ok(settings)
}

// ---------------------------------------------------------------------------
// generate
// ---------------------------------------------------------------------------

async fn cmd_generate(
    config_path: Option<&Path>,
    categories: &[String],
    out: Option<&Path>,
    format: OutputFormat,
    overrides: &GenerationOverrides,
) -> Result<()> {
    let request = normalize_categories(categories)?;

    let config = load(config_path)?;
    validate_api_key(&config)?;
    let settings = resolve_settings(&config, overrides)?;
    let client = OpenAiClient::new(&settings)?;

    let labels = request
        .categories()
        .iter()
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    info!(
        categories = %labels,
        model = %settings.model,
        "generating vocabulary"
    );

    let spinner = spinner(format!("Generating vocabulary for {labels}"));
    let result = generate_for(&request, &client).await;
    spinner.finish_and_clear();
    let dictionary = result?;

    let rendered = match format {
        OutputFormat::Json => dictionary.to_pretty_json()?,
        OutputFormat::Table => render_table(&dictionary, &request),
    };

    match out {
        Some(path) => {
            std::fs::write(path, format!("{rendered}\n"))
                .map_err(|e| eyre!("failed to write '{}': {e}", path.display()))?;
            println!();
            println!("  Vocabulary written!");
            println!("  Categories: {}", request.len());
            println!("  Path:       {}", path.display());
            println!();
        }
        None => println!("{rendered}"),
    }

    Ok(())
}

/// Render requested categories as aligned text, one line per entry.
fn render_table(dictionary: &VocabularyDictionary, request: &GenerationRequest) -> String {
    let mut seen = HashSet::new();
    let mut lines = Vec::new();

    for category in request.categories() {
        if !seen.insert(category.as_str()) {
            continue;
        }
        let Some(entries) = dictionary.entries(category.as_str()) else {
            continue;
        };

        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push(format!("{category} ({} words)", entries.len()));
        for entry in entries {
            lines.push(format!(
                "  {:<24} {:<24} {} / {} ({})",
                entry.spanish, entry.english, entry.parts.category, entry.parts.kind, entry.parts.formality
            ));
        }
    }

    lines.join("\n")
}

/// Steady-ticking spinner shown while waiting on the completion service.
fn spinner(message: String) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
    spinner.set_style(style);
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

// ---------------------------------------------------------------------------
// serve
// ---------------------------------------------------------------------------

async fn cmd_serve(
    config_path: Option<&Path>,
    bind: Option<SocketAddr>,
    overrides: &GenerationOverrides,
) -> Result<()> {
    let config = load(config_path)?;

    if let Err(e) = validate_api_key(&config) {
        warn!(error = %e, "no completion service credential; generation requests will fail");
    }

    let settings = resolve_settings(&config, overrides)?;
    let addr = match bind {
        Some(addr) => addr,
        None => config
            .server
            .bind
            .parse()
            .map_err(|e| eyre!("invalid server.bind '{}': {e}", config.server.bind))?,
    };

    let client = OpenAiClient::new(&settings)?;
    info!(
        %addr,
        model = %settings.model,
        endpoint = client.endpoint(),
        "starting vocabulary server"
    );

    lexigen_server::serve(addr, client).await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show(config_path: Option<&Path>) -> Result<()> {
    let config = load(config_path)?;
    let path = match config_path {
        Some(p) => p.to_path_buf(),
        None => config_file_path()?,
    };
    let key_status = if resolve_api_key(&config).is_some() {
        "set"
    } else {
        "NOT SET"
    };

    println!("# {}", path.display());
    println!(
        "# {} is {key_status}",
        config.generation.api_key_env
    );
    println!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}
