//! Entitlements, team id and export options.

use std::fs;

use appship::release::{
    ErrorKind,
    templater::{export_options, prepare_entitlements, resolve_team_id, write_export_options},
};

#[test]
fn replaces_both_placeholder_spellings() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("Demo.entitlements");
    let original = "<string>$(PRODUCT_BUNDLE_IDENTIFIER)-x</string>\n<string>${PRODUCT_BUNDLE_IDENTIFIER}-y</string>\n";
    fs::write(&source, original).unwrap();
    let out_dir = dir.path().join("run");
    fs::create_dir(&out_dir).unwrap();

    let prepared = prepare_entitlements(Some(&source), Some("com.example.app"), &out_dir, "app")
        .unwrap()
        .unwrap();

    assert_eq!(prepared, out_dir.join("app.entitlements"));
    let content = fs::read_to_string(&prepared).unwrap();
    assert!(content.contains("com.example.app-x"));
    assert!(content.contains("com.example.app-y"));
    assert!(!content.contains("PRODUCT_BUNDLE_IDENTIFIER"));
    assert_eq!(fs::read_to_string(&source).unwrap(), original);
}

#[test]
fn file_without_placeholder_is_used_in_place() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("Demo.entitlements");
    fs::write(&source, "<key>com.apple.security.app-sandbox</key><true/>").unwrap();

    let prepared =
        prepare_entitlements(Some(&source), Some("com.example.app"), dir.path(), "app").unwrap();
    assert_eq!(prepared, Some(source));
    assert!(!dir.path().join("app.entitlements").exists());
}

#[test]
fn absent_source_yields_none() {
    let dir = tempfile::tempdir().unwrap();
    assert_eq!(
        prepare_entitlements(None, Some("com.example.app"), dir.path(), "updater").unwrap(),
        None
    );
}

#[test]
fn team_id_comes_from_identity() {
    assert_eq!(
        resolve_team_id("Developer ID Application: Example (ABCDEFGH12)", None).unwrap(),
        "ABCDEFGH12"
    );
    // The last parenthesized token wins.
    assert_eq!(
        resolve_team_id("Developer ID Application: Acme (Europe) Ltd (ZYXWVUTS98)", None).unwrap(),
        "ZYXWVUTS98"
    );
}

#[test]
fn explicit_team_id_takes_precedence() {
    assert_eq!(
        resolve_team_id("Developer ID Application: Example (ABCDEFGH12)", Some("OVERRIDE01")).unwrap(),
        "OVERRIDE01"
    );
    assert_eq!(
        resolve_team_id("Developer ID Application: Example (ABCDEFGH12)", Some("  ")).unwrap(),
        "ABCDEFGH12"
    );
}

#[test]
fn unresolvable_team_id_is_configuration_error() {
    let err = resolve_team_id("Developer ID Application: Example", None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);

    let err = resolve_team_id("Developer ID Application: Example (SHORT)", None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn export_options_round_trip_through_plist() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ExportOptions.plist");
    write_export_options(&path, "ABCDEFGH12").unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("<?xml"));

    let read: plist::Dictionary = plist::from_file(&path).unwrap();
    assert_eq!(read, export_options("ABCDEFGH12"));
    let get = |key: &str| read.get(key).and_then(|v| v.as_string()).unwrap().to_string();
    assert_eq!(get("method"), "developer-id");
    assert_eq!(get("teamID"), "ABCDEFGH12");
    assert_eq!(get("signingStyle"), "manual");
    assert_eq!(get("destination"), "export");
}
