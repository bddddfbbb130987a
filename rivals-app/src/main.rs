use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr, eyre};
use rivals_common::observability::init_logging;
use rivals_config::{DEFAULT_CONFIG_FILE, RivalsConfig, RivalsConfigLoader};
use rivals_discovery::{CompetitorFinder, CompetitorQuery, MentionQuery, MentionScraper};
use rivals_exa::{ExaClient, SearchProvider};
use rivals_tui::SummaryItem;
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

#[derive(Debug, Parser)]
#[command(name = "rivals", version, about = "Find similar companies and discussion of a website")]
struct Cli {
    /// Config file. Defaults to ./rivals.yaml when present.
    #[arg(long, global = true, env = "RIVALS_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the HTTP API.
    Serve,
    /// Find competitors of a website and show them in the terminal.
    Competitors {
        url: String,
        /// Description of the company, used when few similar pages are found.
        #[arg(long, value_name = "TEXT")]
        summary: Option<String>,
        /// JSON array of {"heading", "text"} blocks shown above the grid.
        #[arg(long, value_name = "FILE")]
        company_summary: Option<PathBuf>,
        /// Print the results as JSON instead of opening the terminal view.
        #[arg(long)]
        json: bool,
    },
    /// Print discussion of a website as JSON.
    Mentions { url: String },
}

impl Command {
    fn is_interactive(&self) -> bool {
        matches!(self, Command::Competitors { json: false, .. })
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<RivalsConfig> {
    let loader = match path {
        Some(path) => RivalsConfigLoader::new().with_file(path),
        None => RivalsConfigLoader::new().with_optional_file(DEFAULT_CONFIG_FILE),
    };
    Ok(loader.load()?)
}

fn load_company_summary(path: &Path) -> Result<Vec<SummaryItem>> {
    let raw = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).wrap_err_with(|| format!("invalid company summary in {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let cfg = load_config(cli.config.as_ref())?;

    // The terminal view owns the screen; log to file only.
    let mut log = cfg.logging.to_log_config();
    if cli.command.is_interactive() {
        log.emit_stderr = false;
    }
    let log_path = init_logging(log).map_err(|e| eyre!("{e:#}"))?;
    tracing::debug!(path = %log_path.display(), "logging.ready");

    let provider: Arc<dyn SearchProvider> = Arc::new(ExaClient::from_config(&cfg.provider)?);

    match cli.command {
        Command::Serve => rivals_server::serve(&cfg, provider)
            .await
            .map_err(|e| eyre!("{e:#}")),
        Command::Competitors {
            url,
            summary,
            company_summary,
            json,
        } => {
            let items = match &company_summary {
                Some(path) => load_company_summary(path)?,
                None => Vec::new(),
            };
            let query = CompetitorQuery {
                website_url: Some(url),
                summary_text: summary,
            };
            let competitors = CompetitorFinder::new(provider)
                .find_competitors(&query)
                .await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&competitors)?);
                return Ok(());
            }
            tokio::task::spawn_blocking(move || rivals_tui::run(items, competitors))
                .await?
                .map_err(|e| eyre!("{e:#}"))
        }
        Command::Mentions { url } => {
            let mentions = MentionScraper::with_domain(provider, cfg.mentions.domain.clone())
                .find_mentions(&MentionQuery::new(url))
                .await?;
            println!("{}", serde_json::to_string_pretty(&mentions)?);
            Ok(())
        }
    }
}
