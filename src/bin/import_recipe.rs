use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgGroup, Parser};
use sqlx::Connection;

use recipe_import::config::{ImportDefaults, ServiceConfig};
use recipe_import::connection::{ConnectionProvider, parse_connection_string};
use recipe_import::import::{BatchRequest, CmwebImporter};
use recipe_import::models::default_batch_label;
use recipe_import::{extract_recipe_documents, map_recipes};

#[derive(Parser, Debug)]
#[command(
    name = "import_recipe",
    about = "Map a Nooko recipe export and import it into CMWeb",
    group(ArgGroup::new("target").args(["database_url", "api_key"]))
)]
struct Args {
    /// Nooko JSON file (bare recipe, `{content}`, `{recipes: [...]}` or a
    /// generator envelope).
    #[arg(long)]
    file: PathBuf,

    /// Connection string of the CMWeb database. Falls back to
    /// `DATABASE_URL` when neither this nor `--api-key` is given.
    #[arg(long)]
    database_url: Option<String>,

    /// Resolve the connection string through the lookup service instead.
    #[arg(long)]
    api_key: Option<String>,

    /// `FileName` passed to the batch-create procedure.
    #[arg(long)]
    batch_label: Option<String>,

    #[arg(long)]
    code_site: Option<i32>,

    #[arg(long)]
    code_user: Option<i32>,

    #[arg(long)]
    site_language: Option<i32>,

    /// Statement timeout for each import step, in milliseconds.
    #[arg(long, default_value_t = 60_000)]
    timeout_ms: u64,

    /// Print the staging rows as JSON and exit without touching the database.
    #[arg(long)]
    dry_run: bool,
}

impl Args {
    fn database_url(&self) -> Option<String> {
        if self.api_key.is_some() {
            return None;
        }
        self.database_url
            .clone()
            .or_else(|| std::env::var("DATABASE_URL").ok())
            .filter(|url| !url.trim().is_empty())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let args = Args::parse();

    let raw = std::fs::read_to_string(&args.file)?;
    let payload: serde_json::Value = serde_json::from_str(&raw)?;
    let recipes = match extract_recipe_documents(&payload) {
        Ok(recipes) => recipes,
        Err(err) => {
            writeln!(io::stderr(), "error: {err}")?;
            std::process::exit(1);
        }
    };
    let rows = map_recipes(&recipes);

    if args.dry_run {
        let stdout = io::stdout();
        serde_json::to_writer_pretty(stdout.lock(), &rows)?;
        writeln!(io::stdout())?;
        return Ok(());
    }

    let defaults = ImportDefaults::from_env();
    let request = BatchRequest {
        batch_label: args.batch_label.clone().unwrap_or_else(default_batch_label),
        code_site: args.code_site.clone().unwrap_or(defaults.code_site),
        code_user: args.code_user.clone().unwrap_or(defaults.code_user),
        site_language: args.site_language.clone().unwrap_or(defaults.site_language),
    };
    let importer = CmwebImporter::new(Duration::from_millis(args.timeout_ms));

    let stats = match args.database_url() {
        Some(url) => {
            let mut conn = sqlx::PgConnection::connect_with(&parse_connection_string(&url)?).await?;
            let stats = importer.import(&mut conn, &rows, &request).await;
            conn.close().await?;
            stats
        }
        None => {
            let provider = ConnectionProvider::from_config(&ServiceConfig::from_env()?)?;
            let mut conn = provider.acquire(args.api_key.as_deref()).await?;
            importer.import(&mut conn, &rows, &request).await
        }
    };

    match stats {
        Ok(stats) => {
            log::info!(
                "imported {} recipe(s) as batch {} ({} staging rows)",
                recipes.len(),
                stats.id_main,
                stats.staged_rows
            );
            writeln!(io::stdout(), "{}", stats.id_main)?;
            Ok(())
        }
        Err(err) => {
            writeln!(io::stderr(), "error: import rolled back: {err}")?;
            std::process::exit(1);
        }
    }
}
