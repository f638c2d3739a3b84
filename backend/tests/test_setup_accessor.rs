mod helpers;
use helpers as h;

use serde_json::Value;

use settingsconfig_backend::accessor::{
    JsonSettingsAccessor, SettingsAccessor, apply_defaults, reset_to_defaults,
};
use settingsconfig_backend::SettingsConfigLoader;

const SCHEMA: &str = r#"<settingsConfig allowRestore="false">
    <category title="General">
        <group title="Appearance">
            <entry key="ui/dark" type="bool" defaultValue="true"/>
            <entry key="ui/scale" type="number" defaultValue="1.25"/>
        </group>
        <group title="Network">
            <entry key="net/port" type="int" defaultValue="8080"/>
            <entry key="net/host" type="string" defaultValue="localhost"/>
        </group>
    </category>
</settingsConfig>"#;

#[test]
fn test_load_setup_end_to_end() {
    let dir = h::fixture_dir();
    h::write_file(dir.path(), "schema.xml", SCHEMA);

    let loader = SettingsConfigLoader::new();
    let setup = loader.load_setup(dir.path().join("schema.xml")).unwrap();

    assert!(setup.allow_search);
    assert!(!setup.allow_restore);
    assert_eq!(setup.categories.len(), 1);
    assert_eq!(setup.categories[0].sections.len(), 1);
    assert_eq!(setup.categories[0].sections[0].groups.len(), 2);
    assert_eq!(setup.entries().count(), 4);
}

#[test]
fn test_json_accessor_persists_defaults() {
    let dir = h::fixture_dir();
    h::write_file(dir.path(), "schema.xml", SCHEMA);
    let settings_file = dir.path().join("settings.json");

    let loader = SettingsConfigLoader::new();
    let setup = loader.load_setup(dir.path().join("schema.xml")).unwrap();

    let mut accessor = JsonSettingsAccessor::open(&settings_file).unwrap();
    let written = apply_defaults(&setup, &mut accessor, false);
    assert_eq!(written, 4);
    accessor.sync().unwrap();

    // reopen and verify typed values survived the round trip
    let accessor = JsonSettingsAccessor::open(&settings_file).unwrap();
    assert_eq!(accessor.load("ui/dark"), Some(Value::Bool(true)));
    assert_eq!(accessor.load("ui/scale"), Some(Value::from(1.25)));
    assert_eq!(accessor.load("net/port"), Some(Value::from(8080)));
    assert_eq!(
        accessor.load("net/host"),
        Some(Value::from("localhost"))
    );
}

#[test]
fn test_json_accessor_keeps_existing_values_without_overwrite() {
    let dir = h::fixture_dir();
    h::write_file(dir.path(), "schema.xml", SCHEMA);
    let settings_file = h::write_file(
        dir.path(),
        "settings.json",
        r#"{ "net/port": 9999, "custom/key": "kept" }"#,
    );

    let loader = SettingsConfigLoader::new();
    let setup = loader.load_setup(dir.path().join("schema.xml")).unwrap();

    let mut accessor = JsonSettingsAccessor::open(&settings_file).unwrap();
    let written = apply_defaults(&setup, &mut accessor, false);
    assert_eq!(written, 3);
    assert_eq!(accessor.load("net/port"), Some(Value::from(9999)));
    assert_eq!(accessor.load("custom/key"), Some(Value::from("kept")));

    let written = apply_defaults(&setup, &mut accessor, true);
    assert_eq!(written, 4);
    assert_eq!(accessor.load("net/port"), Some(Value::from(8080)));
}

#[test]
fn test_reset_to_defaults_clears_schema_keys_only() {
    let dir = h::fixture_dir();
    h::write_file(dir.path(), "schema.xml", SCHEMA);
    let settings_file = dir.path().join("settings.json");

    let loader = SettingsConfigLoader::new();
    let setup = loader.load_setup(dir.path().join("schema.xml")).unwrap();

    let mut accessor = JsonSettingsAccessor::open(&settings_file).unwrap();
    apply_defaults(&setup, &mut accessor, false);
    accessor.save("custom/key", Value::from(1));
    accessor.sync().unwrap();

    let mut accessor = JsonSettingsAccessor::open(&settings_file).unwrap();
    let removed = reset_to_defaults(&setup, &mut accessor);
    assert_eq!(removed, 4);
    accessor.sync().unwrap();

    let accessor = JsonSettingsAccessor::open(&settings_file).unwrap();
    assert!(!accessor.contains("ui/dark"));
    assert_eq!(accessor.load("custom/key"), Some(Value::from(1)));
}

#[test]
fn test_invalid_settings_file_is_an_error() {
    let dir = h::fixture_dir();
    let settings_file = h::write_file(dir.path(), "settings.json", "not json");

    let err = JsonSettingsAccessor::open(&settings_file).unwrap_err();
    assert!(
        err.to_string().contains("not valid JSON"),
        "unexpected error: {:#}",
        err
    );
}
