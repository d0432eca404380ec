//! drone-migrate CLI - Drone 0.x to 1.x database migration.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use drone_migrate::reconcile::{self, ResolutionReport};
use drone_migrate::remote;
use drone_migrate::{
    drivers, migrate, schema, Config, MigrateError, Overrides, S3BlobStore, StepSummary, Store,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "drone-migrate")]
#[command(about = "Migrate a Drone 0.x database to the Drone 1.x schema")]
#[command(version)]
struct Cli {
    /// Path to YAML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(flatten)]
    settings: Settings,

    /// Output JSON result to stdout
    #[arg(long, global = true)]
    output_json: bool,

    /// Log format: text or json
    #[arg(long, default_value = "text", global = true)]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "info", global = true)]
    verbosity: String,

    #[command(subcommand)]
    command: Commands,
}

/// Connection settings. Each one overrides the configuration file.
#[derive(Args, Debug, Default)]
struct Settings {
    /// Source database driver (sqlite3, postgres, mysql)
    #[arg(long, env = "SOURCE_DATABASE_DRIVER", global = true)]
    source_driver: Option<String>,

    /// Source database datasource
    #[arg(long, env = "SOURCE_DATABASE_DATASOURCE", global = true, hide_env_values = true)]
    source_datasource: Option<String>,

    /// Target database driver (sqlite3, postgres, mysql)
    #[arg(long, env = "TARGET_DATABASE_DRIVER", global = true)]
    target_driver: Option<String>,

    /// Target database datasource
    #[arg(long, env = "TARGET_DATABASE_DATASOURCE", global = true, hide_env_values = true)]
    target_datasource: Option<String>,

    /// Target PostgreSQL TLS mode (disable, require, verify-ca, verify-full)
    #[arg(long, env = "TARGET_DATABASE_SSL_MODE", global = true)]
    target_ssl_mode: Option<String>,

    /// Source control provider (github, gitlab, gitea, gogs)
    #[arg(long, env = "SCM_DRIVER", global = true)]
    scm_driver: Option<String>,

    /// Source control server address
    #[arg(long, env = "SCM_SERVER", global = true)]
    scm_server: Option<String>,

    /// Drone 1.x server address
    #[arg(long, env = "DRONE_SERVER", global = true)]
    drone_server: Option<String>,

    /// S3 bucket for logs
    #[arg(long, env = "S3_BUCKET", global = true)]
    s3_bucket: Option<String>,

    /// S3 key prefix for logs
    #[arg(long, env = "S3_PREFIX", global = true)]
    s3_prefix: Option<String>,

    /// Custom S3 endpoint
    #[arg(long, env = "S3_ENDPOINT", global = true)]
    s3_endpoint: Option<String>,

    /// Use path-style S3 addressing
    #[arg(long, env = "S3_PATH_STYLE", global = true)]
    s3_path_style: Option<bool>,

    /// 32-byte secret encryption key
    #[arg(long, env = "DRONE_DATABASE_SECRET", global = true, hide_env_values = true)]
    encryption_key: Option<String>,
}

impl From<Settings> for Overrides {
    fn from(s: Settings) -> Self {
        Overrides {
            source_driver: s.source_driver,
            source_datasource: s.source_datasource,
            target_driver: s.target_driver,
            target_datasource: s.target_datasource,
            target_ssl_mode: s.target_ssl_mode,
            scm_driver: s.scm_driver,
            scm_server: s.scm_server,
            drone_server: s.drone_server,
            s3_bucket: s.s3_bucket,
            s3_prefix: s.s3_prefix,
            s3_endpoint: s.s3_endpoint,
            s3_path_style: s.s3_path_style,
            encryption_key: s.encryption_key,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create the 1.x schema in the target database
    SetupDatabase,

    /// Migrate users
    MigrateUsers,

    /// Migrate repositories
    MigrateRepos,

    /// Migrate builds
    MigrateBuilds,

    /// Migrate processes into stages and steps
    MigrateStages,

    /// Migrate step logs into the target database
    MigrateLogs,

    /// Migrate step logs into S3
    MigrateLogsS3,

    /// Migrate secrets
    MigrateSecrets,

    /// Migrate registry credentials into .dockerconfigjson secrets
    MigrateRegistries,

    /// Replace temporary repository ids with the provider's ids
    UpdateRepos,

    /// Activate every repository on the Drone server
    ActivateRepos,

    /// Encrypt secrets at rest
    EncryptSecrets,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run() -> Result<(), MigrateError> {
    let cli = Cli::parse();

    setup_logging(&cli.verbosity, &cli.log_format)
        .map_err(|e| MigrateError::Config(e.to_string()))?;

    let config = match &cli.config {
        Some(path) => {
            let config = Config::load(path)?;
            info!("Loaded configuration from {:?}", path);
            config
        }
        None => Config::default(),
    }
    .apply(cli.settings.into());

    match cli.command {
        Commands::SetupDatabase => {
            let target = open_target(&config).await?;
            let applied = schema::setup(target.as_ref()).await?;
            println!("Applied {} schema migrations", applied);
        }

        Commands::MigrateUsers => {
            let (source, target) = open_both(&config).await?;
            let summary = migrate::migrate_users(source.as_ref(), target.as_ref()).await?;
            print_summary(&summary, cli.output_json)?;
        }

        Commands::MigrateRepos => {
            let (source, target) = open_both(&config).await?;
            let summary = migrate::migrate_repos(source.as_ref(), target.as_ref()).await?;
            print_summary(&summary, cli.output_json)?;
        }

        Commands::MigrateBuilds => {
            let (source, target) = open_both(&config).await?;
            let summary = migrate::migrate_builds(source.as_ref(), target.as_ref()).await?;
            print_summary(&summary, cli.output_json)?;
        }

        Commands::MigrateStages => {
            let (source, target) = open_both(&config).await?;
            let summary = migrate::migrate_stages(source.as_ref(), target.as_ref()).await?;
            print_summary(&summary, cli.output_json)?;
        }

        Commands::MigrateLogs => {
            let (source, target) = open_both(&config).await?;
            let summary = migrate::migrate_logs(source.as_ref(), target.as_ref()).await?;
            print_summary(&summary, cli.output_json)?;
        }

        Commands::MigrateLogsS3 => {
            let s3 = config.require_s3()?;
            let source = open_source(&config).await?;
            let storage = S3BlobStore::new(s3)?;
            let summary =
                migrate::migrate_logs_to_storage(source.as_ref(), &storage, &s3.prefix).await?;
            print_summary(&summary, cli.output_json)?;
        }

        Commands::MigrateSecrets => {
            let (source, target) = open_both(&config).await?;
            let summary = migrate::migrate_secrets(source.as_ref(), target.as_ref()).await?;
            print_summary(&summary, cli.output_json)?;
        }

        Commands::MigrateRegistries => {
            let (source, target) = open_both(&config).await?;
            let summary = migrate::migrate_registries(source.as_ref(), target.as_ref()).await?;
            print_summary(&summary, cli.output_json)?;
        }

        Commands::UpdateRepos => {
            let scm = remote::scm_client(config.require_scm()?)?;
            let target = open_target(&config).await?;
            let report = reconcile::resolve_identifiers(target.as_ref(), scm.as_ref()).await?;
            print_report("Repository metadata update", &report, cli.output_json)?;
            report.into_result()?;
        }

        Commands::ActivateRepos => {
            let server = remote::ci_server(config.require_drone()?)?;
            let target = open_target(&config).await?;
            let report = reconcile::activate_repos(target.as_ref(), server.as_ref()).await?;
            print_report("Repository activation", &report, cli.output_json)?;
            report.into_result()?;
        }

        Commands::EncryptSecrets => {
            let key = config.require_encryption_key()?;
            let target = open_target(&config).await?;
            let summary = migrate::encrypt_secrets(target.as_ref(), key).await?;
            print_summary(&summary, cli.output_json)?;
        }
    }

    Ok(())
}

async fn open_source(config: &Config) -> Result<Box<dyn Store>, MigrateError> {
    drivers::connect(config.require_source()?, true).await
}

async fn open_target(config: &Config) -> Result<Box<dyn Store>, MigrateError> {
    drivers::connect(config.require_target()?, false).await
}

/// Validate both sections before opening either connection.
async fn open_both(config: &Config) -> Result<(Box<dyn Store>, Box<dyn Store>), MigrateError> {
    config.require_source()?;
    config.require_target()?;
    Ok((open_source(config).await?, open_target(config).await?))
}

fn print_summary(summary: &StepSummary, json: bool) -> Result<(), MigrateError> {
    if json {
        println!("{}", summary.to_json()?);
    } else {
        println!("\nMigrated {}", summary.resource);
        println!("  Extracted: {}", summary.extracted);
        println!("  Loaded: {}", summary.loaded);
        if summary.skipped > 0 {
            println!("  Skipped: {}", summary.skipped);
        }
        println!("  Duration: {:.2}s", summary.duration_seconds);
    }
    Ok(())
}

fn print_report(title: &str, report: &ResolutionReport, json: bool) -> Result<(), MigrateError> {
    if json {
        let failures: Vec<_> = report
            .failures()
            .map(|o| {
                serde_json::json!({
                    "repo_id": o.repo_id,
                    "slug": o.slug,
                    "error": o.result.as_ref().err().map(|e| e.to_string()),
                })
            })
            .collect();
        let doc = serde_json::json!({
            "total": report.total(),
            "succeeded": report.succeeded(),
            "failures": failures,
        });
        println!("{}", serde_json::to_string_pretty(&doc)?);
    } else {
        println!("\n{}: {}/{} repositories", title, report.succeeded(), report.total());
        for outcome in report.failures() {
            if let Err(e) = &outcome.result {
                println!("  ✗ {}: {}", outcome.slug, e);
            }
        }
    }
    Ok(())
}

fn setup_logging(verbosity: &str, format: &str) -> Result<(), String> {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => "debug",
        "info" => "info",
        "warn" => "warn",
        "error" => "error",
        other => return Err(format!("unknown verbosity '{}'", other)),
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    match format {
        "json" => subscriber.json().init(),
        "text" => subscriber.init(),
        other => return Err(format!("unknown log format '{}'", other)),
    }

    Ok(())
}
