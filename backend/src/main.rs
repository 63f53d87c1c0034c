//! Gymsync CLI - push membership changes to Gym Manager
//!
//! # Commands
//!
//! ```bash
//! gymsync check changes.csv             # Validate and transform, no network
//! gymsync login                         # Authenticate and test the connection
//! gymsync upload changes.csv            # Full run, writes report.csv
//! gymsync report report.csv             # Summarize an exported report
//! ```
//!
//! Credentials come from `--username` / `--password`, the
//! `GYM_MANAGER_USERNAME` / `GYM_MANAGER_PASSWORD` variables, or a prompt.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use dialoguer::{Input, Password};
use gymsync::logs::LOG_BROADCASTER;
use gymsync::report::{read_export_file, DEFAULT_REPORT_FILE};
use gymsync::{
    transform_csv, ApiConfig, GymManagerClient, Progress, ReportBuilder, Session,
    TransformOptions, TransformedBatch, Uploader,
};
use indicatif::{ProgressBar, ProgressStyle};

type CliResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "gymsync")]
#[command(about = "Validate membership changes and upload them to Gym Manager", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct Credentials {
    /// Gym Manager username
    #[arg(short, long, env = "GYM_MANAGER_USERNAME")]
    username: Option<String>,

    /// Gym Manager password (prompted when absent)
    #[arg(short, long, env = "GYM_MANAGER_PASSWORD", hide_env_values = true)]
    password: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate and transform a CSV file without uploading
    Check {
        /// Input CSV file
        input: PathBuf,

        /// CSV delimiter
        #[arg(short, long, default_value = ";")]
        delimiter: char,

        /// Skip validation (article ids are still checked)
        #[arg(long)]
        no_validate: bool,

        /// Write the request descriptors as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Log in and run the connection test
    Login {
        #[command(flatten)]
        credentials: Credentials,
    },

    /// Transform, upload and write the report
    Upload {
        /// Input CSV file
        input: PathBuf,

        /// CSV delimiter
        #[arg(short, long, default_value = ";")]
        delimiter: char,

        /// Skip validation (article ids are still checked)
        #[arg(long)]
        no_validate: bool,

        /// Report file
        #[arg(short, long, default_value = DEFAULT_REPORT_FILE)]
        report: PathBuf,

        #[command(flatten)]
        credentials: Credentials,
    },

    /// Summarize an exported report
    Report {
        /// Report CSV file
        input: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = ApiConfig::from_env();

    let result = match cli.command {
        Commands::Check {
            input,
            delimiter,
            no_validate,
            output,
        } => cmd_check(&input, transform_options(&config, delimiter, no_validate), output.as_deref()),

        Commands::Login { credentials } => cmd_login(config, credentials).await.map(|_| ()),

        Commands::Upload {
            input,
            delimiter,
            no_validate,
            report,
            credentials,
        } => {
            let options = transform_options(&config, delimiter, no_validate);
            cmd_upload(&input, options, &report, config, credentials).await
        }

        Commands::Report { input } => cmd_report(&input),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn transform_options(config: &ApiConfig, delimiter: char, no_validate: bool) -> TransformOptions {
    TransformOptions {
        skip_validation: no_validate,
        delimiter,
        api_base: config.base_url.clone(),
    }
}

fn transform(input: &Path, options: &TransformOptions) -> Result<TransformedBatch, Box<dyn std::error::Error>> {
    eprintln!("📄 File selected: {}", input.display());
    let batch = transform_csv(input, options)?;
    eprintln!("   Columns: {}", batch.csv_info.headers.join(", "));
    eprintln!("{}", batch.summary);
    Ok(batch)
}

fn cmd_check(input: &Path, options: TransformOptions, output: Option<&Path>) -> CliResult {
    let batch = transform(input, &options)?;

    if let Some(path) = output {
        let json = serde_json::to_string_pretty(&batch.requests)?;
        fs::write(path, json)?;
        eprintln!("💾 Requests written to: {}", path.display());
    }

    Ok(())
}

async fn cmd_login(config: ApiConfig, credentials: Credentials) -> Result<Session, Box<dyn std::error::Error>> {
    let username = match credentials.username {
        Some(u) => u,
        None => Input::new().with_prompt("Username").interact_text()?,
    };
    let password = match credentials.password {
        Some(p) => p,
        None => Password::new().with_prompt("Password").interact()?,
    };

    let session = GymManagerClient::new(config)?
        .authenticate(username.trim(), &password)
        .await?;
    session.connection_test().await?;

    Ok(session)
}

async fn cmd_upload(
    input: &Path,
    options: TransformOptions,
    report_path: &Path,
    config: ApiConfig,
    credentials: Credentials,
) -> CliResult {
    // Nothing touches the network until the whole file is valid
    let batch = transform(input, &options)?;
    if batch.is_empty() {
        eprintln!("⚠️  Nothing to upload.");
        return Ok(());
    }
    let session = cmd_login(config, credentials).await?;

    let bar = ProgressBar::new(batch.len() as u64);
    bar.set_style(
        ProgressStyle::with_template("{bar:40.green/red} {pos}/{len} records ({elapsed})")?
            .progress_chars("=> "),
    );

    LOG_BROADCASTER.set_echo(false);
    let report = Uploader::new(&session)
        .upload_batch(&batch, &mut |p: Progress| bar.set_position((p.step + 1) as u64))
        .await;
    LOG_BROADCASTER.set_echo(true);
    bar.finish();

    let builder = ReportBuilder::new(&report);
    builder.save(report_path)?;

    eprintln!("\n✨ Uploading complete.");
    println!("{}", builder.summary(report_path));

    Ok(())
}

fn cmd_report(input: &Path) -> CliResult {
    let rows = read_export_file(input)?;

    let mut by_status: BTreeMap<u16, usize> = BTreeMap::new();
    for row in &rows {
        *by_status.entry(row.status_code).or_default() += 1;
    }

    println!("📊 {} records in {}", rows.len(), input.display());
    for (status, count) in by_status {
        let label = match status {
            0 => "no response".to_string(),
            s => s.to_string(),
        };
        println!("   {:>12}: {}", label, count);
    }

    for row in rows.iter().filter(|r| !(200..300).contains(&r.status_code)).take(10) {
        println!("   ❌ {} ({}): {}", row.ppl_mshp_id, row.status_code, row.message);
    }

    Ok(())
}
