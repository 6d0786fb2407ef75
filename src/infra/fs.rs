//! # File System Operations Module / 文件系统操作模块
//!
//! This module provides the small file system helpers the flows share:
//! resolving user-supplied paths, creating the build directory and checking
//! which expected files are present.
//!
//! 此模块提供各流程共享的文件系统辅助函数。

use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Expands `~` and environment variables in a user-supplied path.
pub fn expand_path(raw: &str) -> Result<PathBuf> {
    let expanded =
        shellexpand::full(raw).with_context(|| format!("Failed to expand path: {raw}"))?;
    Ok(PathBuf::from(expanded.as_ref()))
}

/// Gets the absolute path from a potentially relative path.
///
/// # Arguments
/// * `path` - Path to canonicalize
///
/// # Returns
/// Canonicalized absolute path, or an error if the path doesn't exist
pub fn absolute_path(path: &Path) -> Result<PathBuf> {
    fs::canonicalize(path).with_context(|| format!("Failed to resolve path: {}", path.display()))
}

/// Creates `path` and its parents if needed.
///
/// # Returns
/// `true` when the directory was created, `false` when it already existed.
pub fn ensure_dir(path: &Path) -> io::Result<bool> {
    if path.is_dir() {
        return Ok(false);
    }
    fs::create_dir_all(path)?;
    Ok(true)
}

/// Splits `paths` into those that exist and those that don't, keeping order.
pub fn partition_existing<'a, I>(paths: I) -> (Vec<&'a Path>, Vec<&'a Path>)
where
    I: IntoIterator<Item = &'a Path>,
{
    paths.into_iter().partition(|p| p.exists())
}
