use crate::config::*;
use crate::error::{ImportReplaceError, ImportReplaceExpectedError};
use tempfile::TempDir;

fn pairs(map: &ReplaceMap) -> Vec<(&str, &str)> {
    map.iter().collect()
}

#[test]
fn test_config_minimal() {
    let config = Config::from_toml_str("").unwrap();
    assert!(config.replacements.is_empty());
}

#[test]
fn test_config_full() {
    let config = Config::from_toml_str(
        r#"
        [[replacements]]
        item_fields = ["title"]
        album_fields = ["album"]
        replace = { "The" = "A" }

        [[replacements]]
        item_fields = "artist artist_sort"
        replace."^(\\w+), (\\w+)$" = "\\2 \\1"
        replace."Zebra" = "Aardvark"
        replace."Mango" = "Banana"
        "#,
    )
    .unwrap();

    assert_eq!(config.replacements.len(), 2);
    let first = &config.replacements[0];
    assert_eq!(first.item_fields, Some(FieldList(vec!["title".to_string()])));
    assert_eq!(first.album_fields, Some(FieldList(vec!["album".to_string()])));
    assert_eq!(pairs(first.replace.as_ref().unwrap()), vec![("The", "A")]);

    let second = &config.replacements[1];
    assert_eq!(second.item_fields, Some(FieldList(vec!["artist".to_string(), "artist_sort".to_string()])));
    assert_eq!(second.album_fields, None);
    // Declaration order, not alphabetical order.
    assert_eq!(
        pairs(second.replace.as_ref().unwrap()),
        vec![(r"^(\w+), (\w+)$", r"\2 \1"), ("Zebra", "Aardvark"), ("Mango", "Banana")]
    );
}

#[test]
fn test_config_nested_under_plugin_section() {
    let config = Config::from_toml_str(
        r#"
        plugins = ["importreplace", "fetchart"]

        [importreplace]
        [[importreplace.replacements]]
        album_fields = ["album"]
        replace = { "Vol\\." = "Volume" }
        "#,
    )
    .unwrap();
    assert_eq!(config.replacements.len(), 1);
    assert_eq!(pairs(config.replacements[0].replace.as_ref().unwrap()), vec![(r"Vol\.", "Volume")]);
}

#[test]
fn test_config_group_without_replace() {
    let config = Config::from_toml_str(
        r#"
        [[replacements]]
        item_fields = ["title"]
        "#,
    )
    .unwrap();
    assert_eq!(config.replacements[0].replace, None);
}

#[test]
fn test_config_unknown_keys_are_not_errors() {
    let config = Config::from_toml_str(
        r#"
        verbose = true

        [[replacements]]
        item_fields = ["title"]
        fields = ["typo"]
        replace = { "a" = "b" }
        "#,
    )
    .unwrap();
    assert_eq!(config.replacements.len(), 1);
}

#[test]
fn test_config_unrecognized_keys() {
    fn keys(text: &str, explicit: bool) -> Vec<String> {
        unrecognized_keys(&text.parse::<toml::Table>().unwrap(), explicit)
    }

    // A host document without the plugin section is the host's business.
    assert!(keys("directory = \"~/Music\"\nplugins = [\"fetchart\"]", false).is_empty());
    // A bare plugin section with a stray key.
    assert_eq!(keys("verbose = true\nreplacements = []", false), vec!["verbose"]);
    // An explicit [importreplace] table is always checked.
    assert_eq!(keys("verbose = true", true), vec!["verbose"]);
    assert!(keys("replacements = []", true).is_empty());
}

#[test]
fn test_config_host_document_without_plugin_section() {
    let config = Config::from_toml_str(
        r#"
        directory = "~/Music"
        plugins = ["fetchart"]
        "#,
    )
    .unwrap();
    assert!(config.replacements.is_empty());
}

#[test]
fn test_config_invalid_values() {
    fn test_err(text: &str, expected_key: &str) {
        match Config::from_toml_str(text) {
            Err(ImportReplaceError::Expected(ImportReplaceExpectedError::InvalidConfigValue { key, .. })) => {
                assert_eq!(key, expected_key)
            }
            other => panic!("expected InvalidConfigValue for {expected_key}, got {other:?}"),
        }
    }

    test_err("replacements = 3", "replacements");
    test_err("replacements = [1]", "replacements[0]");
    test_err(
        r#"
        [[replacements]]
        item_fields = [1, 2]
        "#,
        "replacements[0].item_fields",
    );
    test_err(
        r#"
        [[replacements]]
        replace = { "a" = "b" }
        [[replacements]]
        album_fields = ["album"]
        replace = ["not", "a", "table"]
        "#,
        "replacements[1].replace",
    );
    test_err(
        r#"
        [[replacements]]
        replace = { "a" = 1 }
        "#,
        "replacements[0].replace",
    );
    test_err("importreplace = 5", "importreplace");
}

#[test]
fn test_config_decode_error() {
    let err = Config::from_toml_str("replacements = [").unwrap_err();
    assert!(matches!(
        err,
        ImportReplaceError::Expected(ImportReplaceExpectedError::ConfigDecode { .. })
    ));
}

#[test]
fn test_config_parse_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    std::fs::write(
        &config_path,
        r#"
        [[replacements]]
        item_fields = ["title"]
        replace = { "feat\\." = "ft." }
        "#,
    )
    .unwrap();

    let config = Config::parse(Some(&config_path)).unwrap();
    assert_eq!(config.replacements.len(), 1);
}

#[test]
fn test_config_not_found() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("missing.toml");
    let err = Config::parse(Some(&config_path)).unwrap_err();
    match err {
        ImportReplaceError::Expected(ImportReplaceExpectedError::ConfigNotFound { path }) => assert_eq!(path, config_path),
        other => panic!("expected ConfigNotFound, got {other:?}"),
    }
}

#[test]
fn test_group_config_from_json() {
    // Hosts may hand over their configuration as JSON rather than TOML.
    let group: ReplacementGroupConfig = serde_json::from_str(
        r#"{"item_fields": "title", "replace": {"Zz": "Y", "Aa": "B"}}"#,
    )
    .unwrap();
    assert_eq!(group.item_fields, Some(FieldList(vec!["title".to_string()])));
    assert_eq!(pairs(group.replace.as_ref().unwrap()), vec![("Zz", "Y"), ("Aa", "B")]);
}
