use std::{
    fs::File,
    path::{Path, PathBuf},
    process::ExitCode,
    sync::{Arc, Mutex},
};

use anyhow::{Context, Result, bail};
use arffsplit_api::{API_BASE_ENV, DEFAULT_API_BASE, SplitServiceClient};
use arffsplit_engine::{DownloadDirectory, UploadWorkflow, drive_submission};
use arffsplit_types::{SelectedFile, StratifyOption, SubmissionState};
use arffsplit_util::{ColorScheme, ColorSchemeSignal, detect_locale};
use clap::{Parser, Subcommand};
use tracing::{debug, warn};

const DOWNLOAD_DIR_ENV: &str = "ARFFSPLIT_DOWNLOAD_DIR";
const LOG_FILE_NAME: &str = "arffsplit.log";

/// Upload an ARFF dataset and download its stratified splits.
///
/// Without a subcommand the terminal UI starts.
#[derive(Debug, Parser)]
#[command(name = "arffsplit", version, about)]
struct Cli {
    /// Base URL of the processing service
    #[arg(long, global = true, env = API_BASE_ENV, default_value = DEFAULT_API_BASE)]
    api_base: String,

    /// Directory archives are saved into (defaults to the platform download directory)
    #[arg(long, global = true, env = DOWNLOAD_DIR_ENV)]
    out: Option<String>,

    /// UI language (en, es); defaults to ARFFSPLIT_LANG, then LANG
    #[arg(long, global = true)]
    lang: Option<String>,

    /// Column the split is stratified on
    #[arg(long, global = true, default_value_t = StratifyOption::default())]
    stratify: StratifyOption,

    /// Force a color scheme instead of following the terminal
    #[arg(long, value_parser = parse_color_scheme)]
    theme: Option<ColorScheme>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Upload one file, save the returned archive and print its path
    Upload {
        /// Path to an .arff dataset
        file: PathBuf,
    },
    /// List the columns accepted by --stratify
    StratifyOptions,
}

fn parse_color_scheme(value: &str) -> Result<ColorScheme, String> {
    ColorScheme::parse(value).ok_or_else(|| format!("expected 'light' or 'dark', got '{value}'"))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    match cli.command {
        // No subcommand => TUI
        None => {
            init_tracing(LogTarget::File);
            run_tui(&cli).await.map(|_| ExitCode::SUCCESS)
        }
        Some(Command::StratifyOptions) => {
            for option in StratifyOption::ALL {
                println!("{option}");
            }
            Ok(ExitCode::SUCCESS)
        }
        Some(Command::Upload { ref file }) => {
            init_tracing(LogTarget::Stderr);
            run_upload(&cli, file).await
        }
    }
}

enum LogTarget {
    /// The UI owns the terminal, so logs go to `<temp>/arffsplit.log`.
    File,
    Stderr,
}

fn init_tracing(target: LogTarget) {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let _ = match target {
        LogTarget::Stderr => builder.with_writer(std::io::stderr).try_init(),
        LogTarget::File => {
            let path = std::env::temp_dir().join(LOG_FILE_NAME);
            match File::create(&path) {
                Ok(file) => builder.with_ansi(false).with_writer(Mutex::new(file)).try_init(),
                // Without a log file, stay silent rather than draw over the UI.
                Err(_) => builder.with_writer(std::io::sink).try_init(),
            }
        }
    };
}

fn build_workflow(cli: &Cli) -> UploadWorkflow {
    let locale = detect_locale(cli.lang.as_deref());
    debug!(?locale, stratify = %cli.stratify, "session settings");
    UploadWorkflow::new(cli.stratify, locale)
}

async fn run_tui(cli: &Cli) -> Result<()> {
    let client = SplitServiceClient::new(&cli.api_base)?;
    let downloads = DownloadDirectory::resolve(cli.out.as_deref());
    let mut session = arffsplit_tui::Session::new(Arc::new(client), downloads, build_workflow(cli));
    if let Some(scheme) = cli.theme {
        session = session.with_color_scheme(ColorSchemeSignal::new(Some(scheme)));
    }
    arffsplit_tui::run(session).await
}

async fn run_upload(cli: &Cli, file: &Path) -> Result<ExitCode> {
    let client = SplitServiceClient::new(&cli.api_base)?;
    let downloads = DownloadDirectory::resolve(cli.out.as_deref());
    let selected = SelectedFile::from_path(file).with_context(|| format!("'{}' does not name a file", file.display()))?;

    let mut workflow = build_workflow(cli);
    let locale = workflow.locale();
    let report = drive_submission(&mut workflow, selected, &client, &downloads).await;

    match workflow.state() {
        SubmissionState::Succeeded { .. } => {
            if let Some((_, path)) = report.saved.first() {
                println!("{}", path.display());
                return Ok(ExitCode::SUCCESS);
            }
            for err in &report.save_failures {
                warn!(error = %err, "archive not saved");
                eprintln!("{}: {}", locale.save_failed(), err);
            }
            Ok(ExitCode::FAILURE)
        }
        SubmissionState::Failed { error, .. } => {
            eprintln!("{}", error.message);
            Ok(ExitCode::FAILURE)
        }
        other => bail!("upload ended in unexpected state '{}'", other.label()),
    }
}
