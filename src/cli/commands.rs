//! # CLI Flows / 命令流程
//!
//! One module per subcommand, plus the project loading they share.

pub mod build;
pub mod deps;
pub mod init;

use anyhow::Result;
use colored::*;
use std::path::PathBuf;
use tracing::debug;

use crate::cli::GlobalArgs;
use crate::core::config::PipelineConfig;
use crate::core::models::BuildPaths;
use crate::infra::{fs, t};

/// A resolved project: its root, configuration and derived paths.
pub struct Project {
    pub root: PathBuf,
    pub config: PipelineConfig,
    pub paths: BuildPaths,
}

/// Resolves the project root directory from `--project-dir`.
pub fn resolve_root(globals: &GlobalArgs) -> Result<PathBuf> {
    let expanded = fs::expand_path(&globals.project_dir)?;
    fs::absolute_path(&expanded)
}

impl Project {
    /// Resolves the root, reads the configuration and applies its language
    /// unless `--lang` was given.
    pub fn load(globals: &GlobalArgs) -> Result<Self> {
        let root = resolve_root(globals)?;
        let (config, source) = PipelineConfig::discover(&root, globals.config.as_deref())?;

        if !globals.lang_pinned {
            if let Some(language) = &config.language {
                crate::set_language(language);
            }
        }

        match &source {
            Some(path) => println!(
                "{}",
                t!("config.using", path = path.display()).dimmed()
            ),
            None => debug!("no configuration file, using defaults"),
        }
        debug!(root = %root.display(), "project root resolved");

        let paths = BuildPaths::resolve(&root, &config.layout);
        Ok(Self {
            root,
            config,
            paths,
        })
    }
}
