use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use dotenvy::dotenv;
use pushkind_common::db::establish_connection_pool;

use pushkind_recipes::repository::DieselRepository;
use pushkind_recipes::services::ingredients::import_ingredients;

/// Loads reference ingredients from a CSV or JSON file.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// File with `name,measurement_unit` rows or a JSON array of ingredients.
    file: PathBuf,
    /// SQLite database to import into.
    #[arg(long, env = "DATABASE_URL", default_value = "app.db")]
    database_url: String,
}

fn main() -> ExitCode {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let args = Args::parse();

    let bytes = match std::fs::read(&args.file) {
        Ok(bytes) => bytes,
        Err(e) => {
            log::error!("Failed to read {}: {e}", args.file.display());
            return ExitCode::FAILURE;
        }
    };

    let pool = match establish_connection_pool(&args.database_url) {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to establish database connection: {e}");
            return ExitCode::FAILURE;
        }
    };
    let repo = DieselRepository::new(pool);

    match import_ingredients(&repo, &bytes) {
        Ok(summary) => {
            log::info!(
                "Loaded {} ingredients from {} ({} new)",
                summary.parsed,
                args.file.display(),
                summary.inserted
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("Import failed: {e}");
            ExitCode::FAILURE
        }
    }
}
