//! campus CLI - university records API
//!
//! Entry point for running the HTTP API (`serve`) and applying the
//! database schema (`migrate`).

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod tracing_setup;

#[derive(Parser, Debug)]
#[command(
    name = "campus",
    author,
    version,
    about = "Student, course, and enrollment records over HTTP"
)]
struct Cli {
    /// Enable debug logging (ignored when RUST_LOG is set)
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run HTTP API server
    Serve(commands::serve::ServeArgs),
    /// Create or update the database schema
    Migrate(commands::migrate::MigrateArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    tracing_setup::init(&tracing_setup::TracingConfig { debug: cli.debug }).ok();

    match cli.command {
        Commands::Serve(args) => commands::run_serve(args).await?,
        Commands::Migrate(args) => commands::run_migrate(args).await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn migrate_requires_database_url() {
        if std::env::var_os("DATABASE_URL").is_some() {
            return;
        }
        assert!(Cli::try_parse_from(["campus", "migrate"]).is_err());
    }

    #[test]
    fn serve_defaults() {
        let cli = Cli::try_parse_from(["campus", "serve", "--in-memory"]).unwrap();
        let Commands::Serve(args) = cli.command else {
            panic!("expected serve");
        };
        assert!(args.in_memory);
        assert!(!args.cors_permissive);
    }

    #[test]
    fn serve_pool_size_defaults_to_library_value() {
        if std::env::var_os("CAMPUS_MAX_CONNECTIONS").is_some() {
            return;
        }
        let cli = Cli::try_parse_from(["campus", "serve", "--in-memory"]).unwrap();
        let Commands::Serve(args) = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(
            args.max_connections,
            campus_server::db::pool::DEFAULT_MAX_CONNECTIONS
        );
    }
}
