//! # Host Detection Tests / 宿主机检测测试

use cxml_pipeline::infra::host::{detect_host_from, parse_os_release};
use cxml_pipeline::models::{HostProfile, InstallerKey};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn detect_with_release(content: &str) -> HostProfile {
    let dir = tempdir().unwrap();
    let release = dir.path().join("os-release");
    fs::write(&release, content).unwrap();
    detect_host_from("linux", &release)
}

#[test]
fn test_parse_os_release_strips_quotes_and_comments() {
    let fields = parse_os_release(
        "# generated\nNAME=\"Ubuntu\"\nID=ubuntu\nVERSION_ID='22.04'\n\nnot a pair\n",
    );

    assert_eq!(fields.get("name").map(String::as_str), Some("Ubuntu"));
    assert_eq!(fields.get("id").map(String::as_str), Some("ubuntu"));
    assert_eq!(fields.get("version_id").map(String::as_str), Some("22.04"));
    assert_eq!(fields.len(), 3);
}

#[test]
fn test_known_linux_distributions_map_to_installers() {
    let cases = [
        ("ID=ubuntu\nNAME=\"Ubuntu\"\n", InstallerKey::Apt),
        ("ID=debian\nNAME=\"Debian GNU/Linux\"\n", InstallerKey::Apt),
        ("ID=\"centos\"\nNAME=\"CentOS Stream\"\n", InstallerKey::Yum),
        ("ID=\"rhel\"\nNAME=\"Red Hat Enterprise Linux\"\n", InstallerKey::Yum),
        ("ID=fedora\nNAME=\"Fedora Linux\"\n", InstallerKey::Dnf),
        ("ID=arch\nNAME=\"Arch Linux\"\n", InstallerKey::Pacman),
    ];

    for (content, expected) in cases {
        let profile = detect_with_release(content);
        assert_eq!(profile.os_family, "linux");
        assert_eq!(profile.installer, Some(expected), "for {content:?}");
    }
}

#[test]
fn test_name_is_used_when_id_is_unfamiliar() {
    let profile = detect_with_release("ID=acme\nNAME=\"Red Hat Enterprise Linux\"\n");

    assert_eq!(profile.distribution, "Red Hat Enterprise Linux");
    assert_eq!(profile.installer, Some(InstallerKey::Yum));
}

#[test]
fn test_unfamiliar_distribution_has_no_installer() {
    let profile = detect_with_release("ID=gentoo\nNAME=Gentoo\n");

    assert_eq!(profile.distribution, "gentoo");
    assert_eq!(profile.installer, None);
}

#[test]
fn test_unreadable_release_file_is_unknown() {
    let dir = tempdir().unwrap();
    let profile = detect_host_from("linux", &dir.path().join("missing"));

    assert_eq!(profile.distribution, "unknown");
    assert_eq!(profile.installer, None);
}

#[test]
fn test_macos_uses_homebrew() {
    let profile = detect_host_from("macos", Path::new("/nonexistent"));

    assert_eq!(profile.os_family, "macos");
    assert_eq!(profile.installer, Some(InstallerKey::Brew));
}

#[test]
fn test_windows_is_unsupported() {
    let profile = detect_host_from("windows", Path::new("/nonexistent"));

    assert_eq!(profile.distribution, "windows");
    assert_eq!(profile.installer, None);
}

#[test]
fn test_identifier_matching_ignores_case_and_blank_input() {
    assert_eq!(InstallerKey::from_identifier("  Ubuntu "), Some(InstallerKey::Apt));
    assert_eq!(InstallerKey::from_identifier("Darwin"), Some(InstallerKey::Brew));
    assert_eq!(InstallerKey::from_identifier(""), None);
    assert_eq!(InstallerKey::from_identifier("unknown"), None);
}
