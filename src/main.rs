//! insta-forensic - CLI entry point.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Local;
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use insta_forensic::{
    cli::Args,
    config::{parse_profile_username, validate_config, Config},
    download::{download_profile, DownloadRequest, InstaloaderDownloader},
    error::{exit_codes, Error, Result},
    fs::{default_log_directory, ensure_dir, posts_folder, profile_folder, run_log_file_name},
    oplog::OperationLog,
    output::{
        create_run_bar, print_banner, print_config_summary, print_error, print_info,
        print_run_report, print_success, print_warning,
    },
    pipeline::{Pipeline, RunReport},
};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(report) if report.succeeded() => ExitCode::from(exit_codes::SUCCESS as u8),
        Ok(report) => match report.failure {
            Some(Error::Cancelled) => ExitCode::from(exit_codes::CANCELLED as u8),
            Some(Error::Download(_)) | Some(Error::DownloaderNotFound) => {
                ExitCode::from(exit_codes::DOWNLOAD_ERROR as u8)
            }
            _ => ExitCode::from(exit_codes::RUN_FAILED as u8),
        },
        Err(e) => {
            print_error(&format!("{}", e));
            match e {
                Error::Config(_)
                | Error::ConfigValidation { .. }
                | Error::InvalidProfile(_)
                | Error::TomlParse(_)
                | Error::UrlParse(_) => ExitCode::from(exit_codes::CONFIG_ERROR as u8),
                _ => ExitCode::from(exit_codes::RUN_FAILED as u8),
            }
        }
    }
}

async fn run() -> Result<RunReport> {
    // Parse CLI arguments
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    fmt().with_env_filter(filter).with_target(false).init();

    print_banner();

    // Load configuration and merge CLI arguments
    let mut config = Config::load_or_default(&args.config)?;
    args.merge_into_config(&mut config);
    validate_config(&config)?;

    // Resolve the profile directory
    let (profile_dir, username) = if args.download {
        let username = parse_profile_username(&args.profile)?;
        (profile_folder(&config, &username)?, Some(username))
    } else {
        (PathBuf::from(&args.profile), None)
    };

    print_config_summary(
        &profile_dir.display().to_string(),
        config.pipeline.algorithm,
        &config.pipeline.extensions,
        config.pipeline.workers,
    );

    // Open the operation log for this run
    let profile_name = username
        .clone()
        .unwrap_or_else(|| profile_display_name(&profile_dir));
    let log_dir = config
        .pipeline
        .log_directory
        .clone()
        .unwrap_or_else(|| default_log_directory(&profile_dir));
    ensure_dir(&log_dir)?;
    let log_path = log_dir.join(run_log_file_name(&profile_name, &Local::now()));
    let log = Arc::new(OperationLog::open(&log_path)?);
    print_info(&format!("Operation log: {}", log_path.display()));

    let mut pipeline = Pipeline::new(&profile_dir, config.pipeline.clone(), Arc::clone(&log));
    if config.pipeline.show_progress {
        pipeline = pipeline.with_progress(create_run_bar());
    }

    // Ctrl-C stops scheduling new files; in-flight files finish
    let abort = pipeline.abort_handle();
    watch_interrupt(Arc::clone(&abort));

    if let Some(username) = username {
        let downloader = InstaloaderDownloader::new(config.download.clone());
        let request = DownloadRequest {
            username,
            target_dir: posts_folder(&profile_dir),
        };

        if let Err(e) =
            download_profile(&downloader, &config.download, &request, &log, &abort).await
        {
            let report = pipeline.finish(Err(e));
            print_run_report(&report);
            return Ok(report);
        }
    }

    let report = pipeline.run().await;
    print_run_report(&report);

    if report.succeeded() {
        print_success("Verification run completed");
    } else if let Some(failure) = &report.failure {
        print_error(&format!("Run failed: {}", failure));
    }

    Ok(report)
}

/// Name used for the log file when processing an existing directory.
fn profile_display_name(profile_dir: &Path) -> String {
    profile_dir
        .canonicalize()
        .ok()
        .as_deref()
        .unwrap_or(profile_dir)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "profile".to_string())
}

fn watch_interrupt(abort: Arc<AtomicBool>) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            print_warning("Interrupt received, finishing files in progress...");
            abort.store(true, Ordering::SeqCst);
        }
    });
}
