//! End-to-end checks of the `appship` binary that need no Apple tooling.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const PBXPROJ: &str = "\t\t\t\tbuildSettings = {\n\t\t\t\tPRODUCT_BUNDLE_IDENTIFIER = com.example.demo;\n\t\t\t\tGENERATE_INFOPLIST_FILE = YES;\n\t\t\t};\n";

fn project() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let pbxproj = dir.path().join("Demo.xcodeproj/project.pbxproj");
    fs::create_dir_all(pbxproj.parent().unwrap()).unwrap();
    fs::write(&pbxproj, PBXPROJ).unwrap();
    dir
}

/// The binary with credentials and tunables cleared, pointed at an empty
/// updater directory.
fn appship(updater_bin: &Path) -> Command {
    let mut cmd = Command::cargo_bin("appship").unwrap();
    for var in [
        "DEVELOPER_ID_APPLICATION",
        "APP_STORE_CONNECT_KEY_ID",
        "APP_STORE_CONNECT_PRIVATE_KEY",
        "APP_STORE_CONNECT_ISSUER_ID",
        "SPARKLE_PRIVATE_KEY",
        "APPLE_TEAM_ID",
        "APPSHIP_NOTARY_TIMEOUT",
        "APPSHIP_NOTARY_POLL",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd.env("SPARKLE_BIN", updater_bin);
    cmd
}

fn empty_bin(dir: &TempDir) -> std::path::PathBuf {
    let bin = dir.path().join("no-tools");
    fs::create_dir_all(&bin).unwrap();
    bin
}

#[test]
fn help_lists_commands() {
    let scratch = tempfile::tempdir().unwrap();
    appship(&empty_bin(&scratch))
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("release"))
        .stdout(predicate::str::contains("doctor"));
}

#[test]
fn doctor_reports_and_succeeds() {
    let dir = project();
    appship(&empty_bin(&dir))
        .args(["doctor", "--root"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Project:"))
        .stdout(predicate::str::contains("Demo.xcodeproj"));
}

#[test]
fn doctor_fix_scaffolds_missing_files() {
    let dir = project();
    appship(&empty_bin(&dir))
        .args(["doctor", "--fix", "--root"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Created"));

    let resources = dir.path().join("Resources");
    assert!(resources.join("Demo.entitlements").is_file());
    assert!(resources.join("sparkle.entitlements").is_file());
    assert!(resources.join("Info.plist").is_file());

    let pbxproj = fs::read_to_string(dir.path().join("Demo.xcodeproj/project.pbxproj")).unwrap();
    assert!(pbxproj.contains("CODE_SIGN_ENTITLEMENTS = Resources/Demo.entitlements;"));
    assert!(pbxproj.contains("INFOPLIST_FILE = Resources/Info.plist;"));
    assert!(pbxproj.contains("GENERATE_INFOPLIST_FILE = NO;"));

    // A second run leaves existing files alone.
    let before = fs::read_to_string(resources.join("Demo.entitlements")).unwrap();
    appship(&empty_bin(&dir))
        .args(["doctor", "--fix", "--root"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Created").not());
    assert_eq!(fs::read_to_string(resources.join("Demo.entitlements")).unwrap(), before);
}

#[test]
fn dry_run_prints_pipeline_without_credentials() {
    let dir = project();
    let output = appship(&empty_bin(&dir))
        .args(["release", "--dry-run", "--json", "--root"])
        .arg(dir.path())
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let value: serde_json::Value = serde_json::from_slice(&output).unwrap();
    let pipeline = &value["pipeline"];
    assert_eq!(pipeline["buildApp"], true);
    assert_eq!(pipeline["feedEnabled"], false);
    assert_eq!(pipeline["missingEntitlements"], true);
    assert_eq!(value["project"]["name"], "Demo");
}

#[test]
fn dry_run_applies_skip_flags_and_config_file() {
    let dir = project();
    fs::write(dir.path().join("appship.toml"), "scheme = \"Demo Release\"\n").unwrap();

    appship(&empty_bin(&dir))
        .args(["release", "-n", "--no-notarize", "--root"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Scheme: Demo Release"))
        .stdout(predicate::str::contains("notarize-app=false"))
        .stdout(predicate::str::contains("notarize-dmg=false"))
        .stdout(predicate::str::contains("dmg=true"));
}

#[test]
fn unknown_config_keys_are_usage_errors() {
    let dir = project();
    fs::write(dir.path().join("appship.toml"), "sheme = \"Typo\"\n").unwrap();

    appship(&empty_bin(&dir))
        .args(["release", "--dry-run", "--root"])
        .arg(dir.path())
        .assert()
        .code(2);
}

#[test]
fn missing_project_is_a_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    appship(&empty_bin(&dir))
        .args(["release", "--dry-run", "--root"])
        .arg(dir.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("xcodeproj"));
}

#[test]
fn invalid_notary_timeout_is_a_usage_error() {
    let dir = project();
    appship(&empty_bin(&dir))
        .args(["release", "--dry-run", "--notary-timeout", "soon", "--root"])
        .arg(dir.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("soon"));
}

#[test]
fn out_of_range_notary_timeout_is_a_usage_error() {
    let dir = project();
    appship(&empty_bin(&dir))
        .args(["release", "--dry-run", "--root"])
        .arg(dir.path())
        .env("APPSHIP_NOTARY_TIMEOUT", "10000000000000000000s")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("exceeds the maximum"));
}

#[test]
fn notarize_requires_an_artifact() {
    let scratch = tempfile::tempdir().unwrap();
    appship(&empty_bin(&scratch))
        .arg("notarize")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--zip-path or --dmg-path"));
}

#[test]
fn notarize_rejects_both_artifacts() {
    let scratch = tempfile::tempdir().unwrap();
    appship(&empty_bin(&scratch))
        .args(["notarize", "--zip-path", "a.zip", "--dmg-path", "a.dmg"])
        .assert()
        .code(2);
}

#[test]
fn appcast_requires_a_disk_image() {
    let scratch = tempfile::tempdir().unwrap();
    appship(&empty_bin(&scratch))
        .arg("appcast")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--dmg-path"));
}
