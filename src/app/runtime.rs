use std::io::{self, IsTerminal};
use std::path::PathBuf;

use anyhow::{Context, Result};
use mediafetch_core::download::{DEFAULT_YTDLP_PROGRAM, list_downloaded_files};
use mediafetch_core::{
    DEFAULT_OUTPUT_DIR, DownloadError, DownloadMode, DownloadRequest, EngineConfig, Orchestrator,
    YtDlpEngine,
};
use tracing::{debug, info};

use crate::ProcessExit;
use crate::app::{config_manager, config_runtime, exit_handler, progress_manager, terminal};
use crate::output;

pub(crate) async fn run_mediafetch() -> Result<ProcessExit> {
    let (args, cli_sources) = config_runtime::parse_cli_with_sources();
    let resolved = config_manager::resolve_config(args, &cli_sources)?;
    let args = resolved.args;

    let default_level = config_runtime::resolve_default_log_level(&args);
    let force_cli_log_level = config_runtime::should_force_cli_log_level(&cli_sources);
    let no_color = terminal::is_no_color_requested(&args);
    terminal::init_tracing(default_level, force_cli_log_level, no_color);

    debug!(
        config_path = ?resolved.config_path,
        loaded_from_file = resolved.loaded_from_file,
        verbosity = config_runtime::verbosity_label(args.verbose, args.quiet),
        "Configuration resolved"
    );

    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));

    if args.list {
        let files = list_downloaded_files(&output_dir)
            .with_context(|| format!("Failed to list '{}'", output_dir.display()))?;
        output::print_folder_listing(&output_dir, &files);
        return Ok(ProcessExit::Success);
    }

    let Some(url) = args.url.clone() else {
        output::print_quick_start_guidance();
        return Ok(ProcessExit::Success);
    };

    let mode = DownloadMode::from(args.mode);
    let request = DownloadRequest::new(url, mode, output_dir);
    let program = args
        .ytdlp
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_YTDLP_PROGRAM));
    let engine = YtDlpEngine::new(program).with_ffmpeg_location(args.ffmpeg_location.clone());

    if args.dry_run {
        if let Err(error) = request.validate() {
            let error = DownloadError::from(error);
            output::print_failure(&error);
            return Ok(exit_handler::determine_exit_outcome(&Err(error)));
        }
        let config = EngineConfig::for_request(&request);
        let command_args = engine.command_args(&request.url, &config);
        output::print_dry_run(engine.program(), &command_args, &config)?;
        return Ok(ProcessExit::Success);
    }

    info!(mode = %mode, dir = %request.output_dir.display(), "Mediafetch starting");

    let show_bar = terminal::should_use_progress_bar(
        io::stderr().is_terminal(),
        args.quiet,
        terminal::is_dumb_terminal(),
    );
    let mut progress = progress_manager::TerminalProgress::new(show_bar);
    let orchestrator = Orchestrator::new(engine);
    let result = orchestrator.submit(&request, &mut progress).await;
    progress.finish();

    match &result {
        Ok(outcome) => output::print_success(outcome),
        Err(error) => {
            debug!(
                last_percent = progress.position(),
                last_status = %progress.message(),
                "Progress when the download stopped"
            );
            output::print_failure(error);
        }
    }

    Ok(exit_handler::determine_exit_outcome(&result))
}
