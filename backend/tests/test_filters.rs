mod helpers;
use helpers as h;

use std::collections::HashSet;

use settingsconfig_backend::settings_xml::types::{CategoryContent, ConfigContent};
use settingsconfig_backend::{SelectorProvider, SettingsConfigLoader};

struct StubSelector {
    active: HashSet<String>,
}

impl StubSelector {
    fn new(names: &[&str]) -> Self {
        Self {
            active: names.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl SelectorProvider for StubSelector {
    fn select(&self, path: &str) -> String {
        path.to_string()
    }

    fn all_selectors(&self) -> HashSet<String> {
        self.active.clone()
    }
}

#[test]
fn test_non_matching_include_is_dropped_unread() {
    let dir = h::fixture_dir();
    // the include target does not exist and the include is mandatory, but
    // its own selectors do not match, so it is dropped before any file I/O
    h::write_file(
        dir.path(),
        "root.xml",
        r#"<settingsConfig>
            <category title="Kept"/>
            <include path="no-such-file.xml" selectors="ios"/>
        </settingsConfig>"#,
    );

    let selector = StubSelector::new(&["android"]);
    let mut loader = SettingsConfigLoader::new();
    loader.set_filters(None, Some(&selector));
    let config = loader.load_config(dir.path().join("root.xml")).unwrap();
    assert_eq!(config.content.len(), 1);
}

#[test]
fn test_frontend_filter_applies_across_included_documents() {
    let dir = h::fixture_dir();
    h::write_file(
        dir.path(),
        "root.xml",
        r#"<settingsConfig>
            <include path="cat.xml"/>
        </settingsConfig>"#,
    );
    h::write_file(
        dir.path(),
        "cat.xml",
        r#"<category title="Mixed">
            <section title="Quick only" frontends="quick"/>
            <section title="Everywhere"/>
        </category>"#,
    );

    let mut loader = SettingsConfigLoader::new();
    loader.set_filters(Some("widgets"), None);
    let config = loader.load_config(dir.path().join("root.xml")).unwrap();

    let ConfigContent::Category(category) = &config.content[0] else {
        panic!("expected category");
    };
    assert_eq!(category.content.len(), 1);
    let CategoryContent::Section(section) = &category.content[0] else {
        panic!("expected section");
    };
    assert_eq!(section.title.as_deref(), Some("Everywhere"));
}

#[test]
fn test_included_root_filter_attributes_are_evaluated() {
    let dir = h::fixture_dir();
    h::write_file(
        dir.path(),
        "root.xml",
        r#"<settingsConfig>
            <category title="Kept"/>
            <include path="cat.xml"/>
        </settingsConfig>"#,
    );
    // the resolved category declares its own frontends filter
    h::write_file(
        dir.path(),
        "cat.xml",
        r#"<category title="Quick only" frontends="quick"/>"#,
    );

    let mut loader = SettingsConfigLoader::new();
    loader.set_filters(Some("widgets"), None);
    let config = loader.load_config(dir.path().join("root.xml")).unwrap();
    assert_eq!(config.content.len(), 1);

    loader.set_filters(Some("quick"), None);
    let config = loader.load_config(dir.path().join("root.xml")).unwrap();
    assert_eq!(config.content.len(), 2);
}

#[test]
fn test_reset_filters_restores_unfiltered_loading() {
    let dir = h::fixture_dir();
    h::write_file(
        dir.path(),
        "root.xml",
        r#"<settingsConfig>
            <category title="A" frontends="quick"/>
            <category title="B" selectors="ios"/>
        </settingsConfig>"#,
    );

    let selector = StubSelector::new(&["android"]);
    let mut loader = SettingsConfigLoader::new();
    loader.set_filters(Some("widgets"), Some(&selector));
    let config = loader.load_config(dir.path().join("root.xml")).unwrap();
    assert!(config.content.is_empty());

    loader.reset_filters();
    let config = loader.load_config(dir.path().join("root.xml")).unwrap();
    assert_eq!(config.content.len(), 2);
}
