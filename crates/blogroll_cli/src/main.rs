//! `blogroll` command line entry point.
//!
//! # Responsibility
//! - Wire config, logging, repository, seed source and renderer together.
//! - Expose list/truncate/delete against a running articles server.

use blogroll_core::{
    default_log_level, init_logging, parse_base_url, Article, ArticleRenderer, ArticleService,
    ArticleStore, ClientConfig, FileSeed, HttpArticleRepository, HttpSeed, LogTarget,
    SeedLocation, SeedProvider, TemplateRegistry, DEFAULT_ARTICLE_TEMPLATE,
};
use clap::{Parser, Subcommand};
use log::error;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "blogroll", version, about = "Article model client")]
struct Cli {
    /// Origin serving `/articles` (overrides BLOGROLL_BASE_URL).
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Seed dataset path or URL (overrides BLOGROLL_SEED).
    #[arg(long, global = true)]
    seed: Option<String>,

    /// Template file used instead of the bundled article template.
    #[arg(long, global = true)]
    template: Option<PathBuf>,

    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Absolute directory for log files; logs go to stderr when omitted.
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Fetch (seeding an empty remote) and print every rendered article.
    List,
    /// Delete every remote article.
    Truncate,
    /// Delete one remote article.
    Delete { article_id: i64 },
}

type CliResult<T> = Result<T, Box<dyn Error>>;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| default_log_level().to_string());
    let target = cli
        .log_dir
        .clone()
        .map(LogTarget::Directory)
        .unwrap_or(LogTarget::Stderr);
    if let Err(message) = init_logging(&level, target) {
        eprintln!("logging disabled: {message}");
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_exit module=cli status=error error={err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    let mut config = ClientConfig::from_env()?;
    if let Some(base_url) = cli.base_url {
        config.base_url = parse_base_url("--base-url", &base_url)?;
    }
    if let Some(seed) = cli.seed {
        config.seed = SeedLocation::parse(&seed);
    }

    let repo = HttpArticleRepository::from_config(&config)?;
    let seed: Box<dyn SeedProvider> = match &config.seed {
        SeedLocation::File(path) => Box::new(FileSeed::new(path.clone())),
        SeedLocation::Url(url) => Box::new(HttpSeed::from_config(url.clone(), &config)?),
    };
    let service = ArticleService::from_config(repo, seed, &config);

    match cli.command {
        Command::List => {
            let renderer = build_renderer(&config, cli.template.as_deref())?;
            let mut store = ArticleStore::new();
            service.fetch_all(&mut store).await?;
            for html in renderer.render_all(&store)? {
                println!("{html}");
            }
        }
        Command::Truncate => {
            let ack = service.truncate_table().await?;
            println!("{ack}");
        }
        Command::Delete { article_id } => {
            let article = Article {
                article_id: Some(article_id),
                ..Article::default()
            };
            let ack = service.delete_article(&article).await?;
            println!("{ack}");
        }
    }

    Ok(())
}

fn build_renderer(config: &ClientConfig, template: Option<&Path>) -> CliResult<ArticleRenderer> {
    let source = match template {
        Some(path) => std::fs::read_to_string(path)?,
        None => DEFAULT_ARTICLE_TEMPLATE.to_string(),
    };
    let mut templates = TemplateRegistry::new();
    templates.register(config.template_name.as_str(), &source)?;
    Ok(ArticleRenderer::new(templates).with_template_name(config.template_name.as_str()))
}
