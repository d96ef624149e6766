// SPDX-License-Identifier: MPL-2.0
use std::path::PathBuf;
use ts_catalog::catalog::{self, DuplicatePolicy};
use ts_catalog::config::{self, Config};
use ts_catalog::i18n::I18n;
use ts_catalog::lint::{self, LintOptions, Rule};
use ts_catalog::{diff, export, Error, Translator};
use tempfile::tempdir;

fn bundled_catalog_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/i18n/zh_CN.ts")
}

fn model_catalog_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data/zh_CN_model.ts")
}

#[test]
fn every_entry_has_a_non_empty_source() {
    for path in [bundled_catalog_path(), model_catalog_path()] {
        let catalog = catalog::read_file(&path).expect("catalog loads");
        assert!(!catalog.is_empty());
        assert!(catalog.messages().all(|(_, m)| !m.source.is_empty()));
    }
}

#[test]
fn size_dialog_width_keeps_trailing_space() {
    let catalog = catalog::read_file(bundled_catalog_path()).expect("catalog loads");
    let translator = Translator::from_catalog(&catalog, DuplicatePolicy::LastWins);

    assert_eq!(translator.translate("SizeDialog", "Width: "), "宽度: ");
    assert_eq!(translator.translate("NoteWindow", "Font: "), "字体: ");
    assert_eq!(translator.translate("SizeDialog", "Nonexistent Key"), "Nonexistent Key");
}

#[test]
fn loading_twice_gives_identical_lookups() {
    let first = catalog::read_file(bundled_catalog_path()).expect("first load");
    let second = catalog::read_file(bundled_catalog_path()).expect("second load");
    assert_eq!(first, second);

    let a = Translator::from_catalog(&first, DuplicatePolicy::LastWins);
    let b = Translator::from_catalog(&second, DuplicatePolicy::LastWins);
    for (context, message) in first.messages() {
        assert_eq!(
            a.translate(context, &message.source),
            b.translate(context, &message.source)
        );
    }
}

#[test]
fn export_round_trip_preserves_entry_set() {
    let original = catalog::read_file(bundled_catalog_path()).expect("catalog loads");
    let dir = tempdir().expect("temp dir");
    let exported = dir.path().join("zh_CN.ts");

    catalog::write_file(&original, &exported).expect("export");
    let reloaded = catalog::read_file(&exported).expect("reload");

    assert_eq!(reloaded.entry_set(), original.entry_set());
    assert_eq!(reloaded.language, original.language);
    assert_eq!(reloaded.version, original.version);
}

#[test]
fn older_copy_differs_only_by_new_strings_and_line_drift() {
    let bundled = catalog::read_file(bundled_catalog_path()).expect("bundled loads");
    let older = catalog::read_file(model_catalog_path()).expect("older copy loads");

    let result = diff::diff(&older, &bundled);

    assert!(result.removed.is_empty(), "{result}");
    assert!(result.changed.is_empty(), "{result}");
    assert_eq!(result.added.len(), 8, "{result}");
    assert!(result.added.iter().any(|(key, _)| key.context == "FileView"));
    assert_eq!(result.moved_locations, 64);

    let same = diff::diff(&bundled, &bundled.clone());
    assert!(same.is_empty());
    assert_eq!(same.moved_locations, 0);
}

#[test]
fn shipped_catalog_passes_lint_without_errors() {
    let catalog = catalog::read_file(bundled_catalog_path()).expect("catalog loads");
    let findings = lint::lint(&catalog, LintOptions::default());
    assert!(!lint::has_errors(&findings), "{findings:?}");
    assert!(findings.iter().all(|f| f.rule != Rule::WhitespaceMismatch));
}

#[test]
fn malformed_file_fails_naming_the_file() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("broken.ts");
    std::fs::write(
        &path,
        "<TS><context><name>View</name><message><translation>x</translation></message></context></TS>",
    )
    .expect("write");

    match catalog::read_file(&path) {
        Err(Error::Parse { file, .. }) => assert_eq!(file, path),
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn user_catalog_dirs_extend_bundled_catalogs() {
    let dir = tempdir().expect("temp dir");
    std::fs::write(
        dir.path().join("fr.ts"),
        r#"<TS version="2.1" language="fr">
<context><name>SizeDialog</name>
<message><source>Width: </source><translation>Largeur : </translation></message>
</context></TS>"#,
    )
    .expect("write");

    let config = Config {
        language: Some("fr".to_string()),
        catalog_dirs: vec![dir.path().to_path_buf()],
        ..Config::default()
    };
    let i18n = I18n::with_catalog_dirs(None, &config).expect("loads");

    assert_eq!(i18n.current_locale().to_string(), "fr");
    assert_eq!(i18n.tr("SizeDialog", "Width: "), "Largeur : ");
    assert!(i18n.available_locales.contains(&"zh-CN".parse().unwrap()));
}

#[test]
fn broken_user_catalog_is_reported_strictly_and_skipped_leniently() {
    let dir = tempdir().expect("temp dir");
    std::fs::write(dir.path().join("de.ts"), "<TS><context>").expect("write");
    let config = Config {
        catalog_dirs: vec![dir.path().to_path_buf()],
        ..Config::default()
    };

    assert!(I18n::with_catalog_dirs(None, &config).is_err());

    let lenient = I18n::new(Some("zh-CN".to_string()), &config);
    assert_eq!(lenient.tr("SizeDialog", "Height: "), "高度: ");
}

#[test]
fn language_setting_persists_through_config_file() {
    let dir = tempdir().expect("Failed to create temporary directory");
    let config_path = dir.path().join("settings.toml");

    let chinese = Config {
        language: Some("zh-CN".to_string()),
        ..Config::default()
    };
    config::save_to_path(&chinese, &config_path).expect("Failed to write config file");
    let loaded = config::load_from_path(&config_path).expect("Failed to load config");

    let i18n = I18n::new(None, &loaded);
    assert_eq!(i18n.current_locale().to_string(), "zh-CN");
    assert_eq!(i18n.tr("View", "create canvas widget"), "创建画布控件");
}

#[test]
fn fluent_export_of_shipped_catalog_is_valid() {
    let catalog = catalog::read_file(bundled_catalog_path()).expect("catalog loads");
    let ftl = export::to_fluent(&catalog).expect("valid fluent");
    assert!(ftl.contains("sizedialog-width = {\"宽度: \"}"));
    assert!(ftl.contains("## NoteWindow"));
}
