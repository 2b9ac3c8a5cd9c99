//! Command-line interface module
//!
//! This module handles argument parsing and output formatting.
//! It contains no business logic - that belongs in the [`crate::core`] module.

pub mod output;

use std::path::PathBuf;

use clap::Parser;

use crate::config::defaults;
use crate::core::options::BuildOptions;
use crate::core::pipeline::{Pipeline, PipelineSummary};
use crate::core::settings::{BuildConfig, ConfigSection};
use crate::core::source::SourceResolver;
use crate::core::stage::SkipSet;
use crate::error::{ToolchainError, UsageError};
use crate::infra::download::OfflineFetcher;
use crate::infra::process::{require_tool, SystemRunner};

/// Toolchainbot - cross-compilation toolchain builder
///
/// Build binutils, gcc, kernel headers and glibc for a target triple.
#[derive(Parser, Debug)]
#[command(name = "toolchainbot")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// List the built-in targets and exit
    #[arg(long)]
    pub list_builtins: bool,

    /// Config file with a [default] table
    #[arg(short, long, value_name = "FILE", env = "TOOLCHAINBOT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Install prefix (overrides the config file)
    #[arg(long, value_name = "DIR")]
    pub prefix: Option<PathBuf>,

    /// Built-in target to build (overrides the config file)
    #[arg(long, value_name = "TARGET")]
    pub builtin: Option<String>,

    /// Install the C library into <prefix>/fakeroot (yes/no/on/off)
    #[arg(long, value_name = "SWITCH", default_value = "yes")]
    pub sysroot: String,

    /// Skip a stage: binutils, gcc1, header, glibc, gcc2 or all
    #[arg(long, value_name = "STAGE")]
    pub skip: Vec<String>,

    /// Parallel make jobs; values below 2 are ignored
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<i64>,
}

impl Cli {
    /// Execute the build
    ///
    /// Returns the pipeline summary, or `None` when there was nothing to
    /// build.
    pub fn run(&self) -> Result<Option<PipelineSummary>, ToolchainError> {
        if self.list_builtins {
            println!("{}", output::format_builtins());
            return Ok(None);
        }

        let Some((mut config, options)) = self.prepare()? else {
            tracing::info!("No config file or built-in target given, nothing to do");
            return Ok(None);
        };

        for tool in defaults::REQUIRED_TOOLS {
            require_tool(tool)?;
        }

        let runner = SystemRunner;
        SourceResolver::new(&runner, &OfflineFetcher).acquire_all(&mut config)?;

        let skip = SkipSet::from_names(&self.skip);
        let summary = Pipeline::new(&config, &options, &runner)?.run(&skip)?;
        Ok(Some(summary))
    }

    /// Resolve the configuration and flag set without touching sources
    ///
    /// Command-line values take precedence over the config file.
    pub fn prepare(&self) -> Result<Option<(BuildConfig, BuildOptions)>, ToolchainError> {
        if self.config.is_none() && self.builtin.is_none() {
            return Ok(None);
        }

        let mut section = match &self.config {
            Some(path) => ConfigSection::load(path)?,
            None => ConfigSection::default(),
        };

        if let Some(builtin) = &self.builtin {
            section.target = builtin.clone();
            if self.prefix.is_none() && section.prefix.is_empty() {
                return Err(UsageError::MissingPrefix {
                    target: builtin.clone(),
                }
                .into());
            }
        }
        if let Some(prefix) = &self.prefix {
            section.prefix = prefix.display().to_string();
        }

        let mut config = BuildConfig::from_section(section)?;
        config.resolve_target()?;
        let options = config.compose_options(self.jobs, parse_switch(&self.sysroot));
        tracing::debug!("Build options: {options:?}");
        Ok(Some((config, options)))
    }
}

/// Interpret a yes/no/on/off switch; anything else means yes
pub fn parse_switch(value: &str) -> bool {
    match value.to_ascii_lowercase().as_str() {
        "yes" | "on" => true,
        "no" | "off" => false,
        other => {
            tracing::warn!("Unrecognized --sysroot value '{other}', using 'yes'");
            true
        }
    }
}
