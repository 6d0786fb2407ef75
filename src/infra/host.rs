//! # Host Detection / 宿主机检测
//!
//! Works out which platform and distribution the pipeline runs on, and whether
//! it runs with superuser privileges.
//!
//! 检测流水线所在的平台和发行版，以及是否以超级用户权限运行。

use once_cell::sync::OnceCell;
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::core::models::{HostProfile, InstallerKey};

/// Release metadata file read on Linux hosts.
pub const OS_RELEASE_PATH: &str = "/etc/os-release";

static HOST: OnceCell<HostProfile> = OnceCell::new();

/// Returns the profile of the current host, detecting it on first use.
pub fn current() -> &'static HostProfile {
    HOST.get_or_init(detect_host)
}

/// Detects the current host from `std::env::consts::OS` and, on Linux,
/// `/etc/os-release`.
pub fn detect_host() -> HostProfile {
    detect_host_from(env::consts::OS, Path::new(OS_RELEASE_PATH))
}

/// Detection with the platform family and release file supplied by the caller.
///
/// Non-Linux families use the family name itself as the identifier. On Linux
/// an unreadable release file yields `unknown`.
pub fn detect_host_from(os_family: &str, release_file: &Path) -> HostProfile {
    let family = os_family.to_lowercase();
    if family != "linux" {
        return HostProfile::new(&family, &family);
    }

    match fs::read_to_string(release_file) {
        Ok(content) => {
            let fields = parse_os_release(&content);
            let identifier = distribution_identifier(&fields);
            debug!(?fields, %identifier, "parsed release metadata");
            HostProfile::new(family, identifier)
        }
        Err(e) => {
            debug!(path = %release_file.display(), error = %e, "release metadata unreadable");
            HostProfile::unknown(family)
        }
    }
}

/// Parses `KEY=value` lines. Keys are lower-cased and surrounding quotes are
/// stripped from values; comments and lines without `=` are skipped.
pub fn parse_os_release(content: &str) -> BTreeMap<String, String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| {
            let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
            (key.trim().to_lowercase(), value.to_string())
        })
        .collect()
}

/// Picks the identifier to match installers against.
///
/// `id` is preferred when it is recognised; `name` covers releases whose `id`
/// is unfamiliar but whose display name is (e.g. "Red Hat Enterprise Linux").
fn distribution_identifier(fields: &BTreeMap<String, String>) -> String {
    let id = fields.get("id").filter(|v| !v.is_empty());
    let name = fields.get("name").filter(|v| !v.is_empty());

    id.filter(|v| InstallerKey::from_identifier(v).is_some())
        .or_else(|| name.filter(|v| InstallerKey::from_identifier(v).is_some()))
        .or(id)
        .or(name)
        .cloned()
        .unwrap_or_else(|| "unknown".to_string())
}

/// `true` when the effective user is root.
#[cfg(unix)]
pub fn is_elevated() -> bool {
    nix::unistd::geteuid().is_root()
}

#[cfg(not(unix))]
pub fn is_elevated() -> bool {
    false
}
