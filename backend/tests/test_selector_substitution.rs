mod helpers;
use helpers as h;

use settingsconfig_backend::settings_xml::types::ConfigContent;
use settingsconfig_backend::{PlatformSelector, SelectorProvider, SettingsConfigLoader};

#[test]
fn test_select_probes_file_variants() {
    let dir = h::fixture_dir();
    let base = h::write_file(dir.path(), "settings.xml", "<settingsConfig/>");
    let variant = h::write_file(dir.path(), "settings+embedded.xml", "<settingsConfig/>");

    let selector = PlatformSelector::with_extra_selectors(vec!["embedded".to_string()]);
    let selected = selector.select(&base.to_string_lossy());
    assert_eq!(selected, variant.to_string_lossy());
}

#[test]
fn test_select_without_matching_variant_keeps_path() {
    let dir = h::fixture_dir();
    let base = h::write_file(dir.path(), "settings.xml", "<settingsConfig/>");

    let selector = PlatformSelector::with_extra_selectors(vec!["embedded".to_string()]);
    let selected = selector.select(&base.to_string_lossy());
    assert_eq!(selected, base.to_string_lossy());
}

#[test]
fn test_include_loads_selector_variant() {
    let dir = h::fixture_dir();
    // paths written into the schema are relative; the selector probes them
    // before relative resolution, so run the loader against absolute ones
    h::write_file(
        dir.path(),
        "root.xml",
        &format!(
            r#"<settingsConfig>
                <include path="{}"/>
            </settingsConfig>"#,
            dir.path().join("extra.xml").display()
        ),
    );
    h::write_file(dir.path(), "extra.xml", r#"<category title="Base"/>"#);
    h::write_file(
        dir.path(),
        "extra+embedded.xml",
        r#"<category title="Embedded"/>"#,
    );

    let selector = PlatformSelector::with_extra_selectors(vec!["embedded".to_string()]);
    let mut loader = SettingsConfigLoader::new();
    loader.set_filters(None, Some(&selector));
    let config = loader.load_config(dir.path().join("root.xml")).unwrap();

    let ConfigContent::Category(category) = &config.content[0] else {
        panic!("expected category");
    };
    assert_eq!(category.title.as_deref(), Some("Embedded"));
}

#[test]
fn test_add_selector_takes_probe_precedence() {
    let dir = h::fixture_dir();
    let base = h::write_file(dir.path(), "conf.xml", "<settingsConfig/>");
    h::write_file(dir.path(), "conf+first.xml", "<settingsConfig/>");
    h::write_file(dir.path(), "conf+second.xml", "<settingsConfig/>");

    let mut selector = PlatformSelector::with_extra_selectors(vec!["second".to_string()]);
    selector.add_selector("first");
    let selected = selector.select(&base.to_string_lossy());
    assert!(
        selected.ends_with("conf+first.xml"),
        "unexpected selection: {}",
        selected
    );
}
