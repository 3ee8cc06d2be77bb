//! Configuration lifecycle: load file config and merge CLI overrides.

use std::path::PathBuf;

use anyhow::Result;

use crate::app::config_runtime::{self, CliValueSources};
use crate::app_config::load_default_file_config;
use crate::cli::Args;

/// Effective arguments plus where the file config came from.
pub(crate) struct ResolvedConfig {
    pub(crate) args: Args,
    pub(crate) config_path: Option<PathBuf>,
    pub(crate) loaded_from_file: bool,
}

/// Loads the file config and merges CLI overrides on top of it.
pub(crate) fn resolve_config(args: Args, cli_sources: &CliValueSources) -> Result<ResolvedConfig> {
    let loaded_config = load_default_file_config()?;
    let loaded_from_file = loaded_config.config.is_some();
    let args =
        config_runtime::apply_config_defaults(args, cli_sources, loaded_config.config.as_ref());
    Ok(ResolvedConfig {
        args,
        config_path: loaded_config.path,
        loaded_from_file,
    })
}
