//! # Init Command Module / 初始化命令模块
//!
//! This module implements the `init` command, which writes a `Pipeline.toml`
//! holding every default so it can be edited in place.
//!
//! 此模块实现 `init` 命令，写出包含全部默认值的 `Pipeline.toml`，便于直接修改。

use anyhow::{Context, Result};
use colored::*;
use dialoguer::{Confirm, theme::ColorfulTheme};
use std::fs;
use std::path::Path;
use std::process::ExitCode;

use crate::cli::GlobalArgs;
use crate::cli::commands::resolve_root;
use crate::core::config::{CONFIG_FILE_NAME, PipelineConfig};
use crate::infra::t;

const HEADER: &str = "\
# Cxml pipeline configuration / Cxml 流水线配置
# Every key is optional; removed keys fall back to the values below.
# 所有键都是可选的；删除的键会回退到下面的值。

";

/// Renders the default configuration with its comment header.
pub fn default_config_text() -> Result<String> {
    Ok(format!("{HEADER}{}", PipelineConfig::default().to_toml()?))
}

/// Writes the default configuration to `--config`, or to `Pipeline.toml` in
/// the project root.
///
/// An existing file is only replaced with `--force` or after the operator
/// confirms.
pub fn execute(globals: &GlobalArgs, force: bool) -> Result<ExitCode> {
    let output = match &globals.config {
        Some(path) => path.clone(),
        None => resolve_root(globals)?.join(CONFIG_FILE_NAME),
    };

    if output.exists() && !force && !confirm_overwrite(&output) {
        println!(
            "{}",
            t!("init.file_exists", path = output.display()).red()
        );
        println!("{}", t!("init.use_force").yellow());
        return Ok(ExitCode::SUCCESS);
    }

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| {
            t!("init.create_parent_dir_failed", path = parent.display()).to_string()
        })?;
    }

    fs::write(&output, default_config_text()?)
        .with_context(|| t!("init.write_failed", path = output.display()).to_string())?;

    println!("{}", t!("init.success", path = output.display()).green());
    println!("{}", t!("init.next_steps"));

    Ok(ExitCode::SUCCESS)
}

fn confirm_overwrite(path: &Path) -> bool {
    Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("init.confirm_overwrite", path = path.display()).to_string())
        .default(false)
        .interact()
        .unwrap_or(false)
}
