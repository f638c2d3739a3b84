//! Loader configuration surface, include resolution and the generic
//! resolve-and-filter pass over container content.

use std::fs;
use std::path::{Path, PathBuf};

use crate::logger;
use crate::settings_xml::error::{Result, SettingsXmlError, XmlPosition};
use crate::settings_xml::parser::{Finisher, read_document};
use crate::settings_xml::reader::SettingsXmlReader;
use crate::settings_xml::selector::SelectorProvider;
use crate::settings_xml::types::{ContentSlot, FilterInfo, Include, RootElement, SettingsConfig};
use crate::setup::Setup;

/// Loads settings schemas: parses documents, resolves `<include>`
/// directives recursively and filters elements by the configured frontend
/// and selector provider.
///
/// Configuration is set before a load and read-only during it. A loader
/// instance is not meant for concurrent loads from multiple threads.
pub struct SettingsConfigLoader<'s> {
    frontend: Option<String>,
    selector: Option<&'s dyn SelectorProvider>,
    always_optional: bool,
}

impl<'s> SettingsConfigLoader<'s> {
    pub fn new() -> Self {
        Self {
            frontend: None,
            selector: None,
            always_optional: false,
        }
    }

    /// Configure the frontend name and the selector provider used for
    /// filtering and include-path substitution. Either side may be absent.
    pub fn set_filters(
        &mut self,
        frontend: Option<&str>,
        selector: Option<&'s dyn SelectorProvider>,
    ) {
        self.frontend = frontend.map(str::to_string);
        self.selector = selector;
    }

    pub fn reset_filters(&mut self) {
        self.frontend = None;
        self.selector = None;
    }

    /// When set, a missing include file is never fatal, regardless of the
    /// per-include `optional` flag.
    pub fn set_includes_optional(&mut self, always_optional: bool) {
        self.always_optional = always_optional;
    }

    /// Load a document whose root may be any of the five grammar elements.
    pub fn load_document(&self, path: impl AsRef<Path>) -> Result<RootElement> {
        self.session().load_path(path.as_ref())
    }

    /// Load a full settings schema; the root must be `<settingsConfig>`.
    pub fn load_config(&self, path: impl AsRef<Path>) -> Result<SettingsConfig> {
        let path = path.as_ref();
        match self.load_document(path)? {
            RootElement::SettingsConfig(config) => Ok(config),
            other => Err(unexpected_config_root(Some(path), &other)),
        }
    }

    /// Load a document from a string. Include paths resolve as given,
    /// there is no declaring document to resolve them against.
    pub fn load_document_str(&self, content: &str) -> Result<RootElement> {
        let mut reader = SettingsXmlReader::new(content, None);
        read_document(&mut reader, &mut self.session())
    }

    /// Load a settings schema from a string; the root must be
    /// `<settingsConfig>`.
    pub fn load_config_str(&self, content: &str) -> Result<SettingsConfig> {
        match self.load_document_str(content)? {
            RootElement::SettingsConfig(config) => Ok(config),
            other => Err(unexpected_config_root(None, &other)),
        }
    }

    /// Load a schema and convert it into the UI-ready setup model.
    pub fn load_setup(&self, path: impl AsRef<Path>) -> Result<Setup> {
        Ok(Setup::from_config(&self.load_config(path)?))
    }

    fn session(&self) -> LoadSession<'_, 's> {
        LoadSession {
            loader: self,
            stack: Vec::new(),
        }
    }
}

impl Default for SettingsConfigLoader<'_> {
    fn default() -> Self {
        Self::new()
    }
}

fn unexpected_config_root(path: Option<&Path>, root: &RootElement) -> SettingsXmlError {
    SettingsXmlError::Xml {
        position: XmlPosition {
            path: path.map(Path::to_path_buf),
            line: 1,
            column: 0,
        },
        message: format!(
            "Unexpected root element <{}>, expected <settingsConfig>",
            root.element_name()
        ),
    }
}

/// One load operation: tracks the documents currently being loaded so a
/// cyclic include chain fails instead of recursing without bound.
struct LoadSession<'l, 's> {
    loader: &'l SettingsConfigLoader<'s>,
    stack: Vec<PathBuf>,
}

impl LoadSession<'_, '_> {
    fn load_path(&mut self, path: &Path) -> Result<RootElement> {
        let content = fs::read_to_string(path).map_err(|source| SettingsXmlError::File {
            path: path.to_path_buf(),
            source,
        })?;

        let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        if self.stack.contains(&canonical) {
            return Err(SettingsXmlError::CyclicInclude {
                path: canonical,
                chain: self.stack.clone(),
            });
        }

        self.stack.push(canonical);
        let mut reader = SettingsXmlReader::new(&content, Some(path));
        let result = read_document(&mut reader, self);
        self.stack.pop();
        result
    }

    /// Resolve one include into its slot type, or `None` when a missing
    /// file is tolerated and the entry dropped.
    fn resolve_include<C: ContentSlot>(
        &mut self,
        reader: &SettingsXmlReader<'_>,
        include: Include,
    ) -> Result<Option<C>> {
        let mut include_path = include.path;
        if let Some(selector) = self.loader.selector {
            include_path = selector.select(&include_path);
        }

        // resolve relative to the directory of the declaring document
        let resolved = match reader.source_path().and_then(Path::parent) {
            Some(dir) => dir.join(&include_path),
            None => PathBuf::from(&include_path),
        };

        match self.load_path(&resolved) {
            Ok(root) => match C::from_root(root) {
                Some(element) => Ok(Some(element)),
                None => Err(reader.error("Unexpected root element in included file")),
            },
            Err(e @ SettingsXmlError::File { .. }) => {
                if include.optional || self.loader.always_optional {
                    logger::warn(&format!("Skipping optional include: {}", e));
                    Ok(None)
                } else {
                    Err(e)
                }
            }
            // structural errors and cyclic includes always propagate
            Err(e) => Err(e),
        }
    }

    fn is_usable(&self, element: &FilterInfo) -> bool {
        if let (Some(frontend), Some(frontends)) = (&self.loader.frontend, &element.frontends) {
            if !split_list(frontends, '|').any(|f| f == frontend) {
                return false;
            }
        }

        if let (Some(selector), Some(selectors)) = (self.loader.selector, &element.selectors) {
            let active = selector.all_selectors();
            for term in split_list(selectors, '|') {
                if split_list(term, '&').all(|s| active.contains(s)) {
                    return true;
                }
            }
            return false;
        }

        true
    }
}

impl Finisher for LoadSession<'_, '_> {
    /// The combined resolve-and-filter pass, run once per container.
    ///
    /// Builds a new sequence: includes are dropped unread when their own
    /// filter attributes do not match, otherwise resolved in place. The
    /// variant-case index of each element reaching the homogeneity check is
    /// recorded before the usability check, so a mixture is rejected even
    /// when one of the clashing elements would be filtered out afterwards.
    fn finish<C: ContentSlot>(
        &mut self,
        reader: &SettingsXmlReader<'_>,
        content: &mut Vec<C>,
    ) -> Result<()> {
        let mut finished: Vec<C> = Vec::with_capacity(content.len());
        let mut first_kind: Option<usize> = None;

        for element in content.drain(..) {
            let element = match element.into_include() {
                Ok(include) => {
                    if !self.is_usable(&include.filter) {
                        continue;
                    }
                    match self.resolve_include::<C>(reader, include)? {
                        Some(element) => element,
                        None => continue,
                    }
                }
                Err(element) => element,
            };

            match first_kind {
                None => first_kind = Some(element.kind_index()),
                Some(kind) if kind != element.kind_index() => {
                    return Err(reader.error(
                        "Detected mixture of different child elements. \
                         Only includes and a single other type are allowed",
                    ));
                }
                Some(_) => {}
            }

            if self.is_usable(element.filter_info()) {
                finished.push(element);
            }
        }

        *content = finished;
        Ok(())
    }
}

/// Split a filter list on a separator, skipping empty parts. Whitespace is
/// not trimmed.
fn split_list(list: &str, separator: char) -> impl Iterator<Item = &str> {
    list.split(separator).filter(|part| !part.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings_xml::types::{ConfigContent, GroupContent};
    use std::collections::HashSet;

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
    fn test_frontend_filtering() {
        let xml = r#"
            <settingsConfig>
                <entry key="a" type="string" frontends="desktop|mobile"/>
                <entry key="b" type="string"/>
            </settingsConfig>"#;

        // matching frontend: both survive
        let mut loader = SettingsConfigLoader::new();
        loader.set_filters(Some("desktop"), None);
        let config = loader.load_config_str(xml).unwrap();
        assert_eq!(config.content.len(), 2);

        // non-matching frontend: the declaring entry is erased
        loader.set_filters(Some("web"), None);
        let config = loader.load_config_str(xml).unwrap();
        assert_eq!(config.content.len(), 1);
        let ConfigContent::Entry(entry) = &config.content[0] else {
            panic!("expected entry");
        };
        assert_eq!(entry.key, "b");

        // no frontend configured: the attribute is not evaluated
        loader.reset_filters();
        let config = loader.load_config_str(xml).unwrap();
        assert_eq!(config.content.len(), 2);
    }

    #[test]
    fn test_selector_expression_filtering() {
        let xml = r#"
            <settingsConfig>
                <entry key="a" type="string" selectors="ios&amp;phone|android"/>
            </settingsConfig>"#;

        // neither OR-term fully satisfied
        let selector = StubSelector::new(&["ios", "tablet"]);
        let mut loader = SettingsConfigLoader::new();
        loader.set_filters(None, Some(&selector));
        let config = loader.load_config_str(xml).unwrap();
        assert!(config.content.is_empty());

        // ios&phone satisfied
        let selector = StubSelector::new(&["ios", "phone"]);
        let mut loader = SettingsConfigLoader::new();
        loader.set_filters(None, Some(&selector));
        let config = loader.load_config_str(xml).unwrap();
        assert_eq!(config.content.len(), 1);

        // android alone satisfies the second OR-term
        let selector = StubSelector::new(&["android"]);
        let mut loader = SettingsConfigLoader::new();
        loader.set_filters(None, Some(&selector));
        let config = loader.load_config_str(xml).unwrap();
        assert_eq!(config.content.len(), 1);

        // no provider configured: the attribute is not evaluated
        let loader = SettingsConfigLoader::new();
        let config = loader.load_config_str(xml).unwrap();
        assert_eq!(config.content.len(), 1);
    }

    #[test]
    fn test_empty_selector_expression_rejects() {
        let xml = r#"
            <settingsConfig>
                <entry key="a" type="string" selectors=""/>
            </settingsConfig>"#;

        let selector = StubSelector::new(&["ios"]);
        let mut loader = SettingsConfigLoader::new();
        loader.set_filters(None, Some(&selector));
        let config = loader.load_config_str(xml).unwrap();
        assert!(config.content.is_empty());
    }

    #[test]
    fn test_mixed_sibling_types_rejected() {
        let xml = r#"
            <settingsConfig>
                <category title="A"/>
                <entry key="a" type="string"/>
            </settingsConfig>"#;

        let loader = SettingsConfigLoader::new();
        let err = loader.load_config_str(xml).unwrap_err();
        assert!(
            err.to_string().contains("mixture of different child elements"),
            "unexpected error: {}",
            err
        );
    }

    #[test]
    fn test_mixture_detected_before_filtering() {
        // the category would be erased by the frontend filter, but its
        // variant-case index is recorded first
        let xml = r#"
            <settingsConfig>
                <category title="A" frontends="desktop"/>
                <entry key="a" type="string"/>
            </settingsConfig>"#;

        let mut loader = SettingsConfigLoader::new();
        loader.set_filters(Some("web"), None);
        let err = loader.load_config_str(xml).unwrap_err();
        assert!(
            err.to_string().contains("mixture of different child elements"),
            "unexpected error: {}",
            err
        );
    }

    #[test]
    fn test_homogeneous_siblings_accepted() {
        let xml = r#"
            <settingsConfig>
                <group title="A">
                    <entry key="a" type="string"/>
                    <entry key="b" type="int"/>
                </group>
                <group title="B"/>
            </settingsConfig>"#;

        let loader = SettingsConfigLoader::new();
        let config = loader.load_config_str(xml).unwrap();
        assert_eq!(config.content.len(), 2);
        let ConfigContent::Group(group) = &config.content[0] else {
            panic!("expected group");
        };
        assert!(matches!(group.content[0], GroupContent::Entry(_)));
    }

    #[test]
    fn test_missing_include_from_string_document() {
        // no declaring path, the include path is used as given
        let xml = r#"<settingsConfig><include path="does-not-exist.xml"/></settingsConfig>"#;

        let loader = SettingsConfigLoader::new();
        let err = loader.load_config_str(xml).unwrap_err();
        assert!(matches!(err, SettingsXmlError::File { .. }));

        let mut loader = SettingsConfigLoader::new();
        loader.set_includes_optional(true);
        let config = loader.load_config_str(xml).unwrap();
        assert!(config.content.is_empty());
    }

    #[test]
    fn test_config_root_is_required_for_load_config_str() {
        let loader = SettingsConfigLoader::new();
        let err = loader.load_config_str("<category/>").unwrap_err();
        assert!(
            err.to_string().contains("expected <settingsConfig>"),
            "unexpected error: {}",
            err
        );

        // the same document is fine as a generic document root
        let root = loader.load_document_str("<category/>").unwrap();
        assert_eq!(root.element_name(), "category");
    }

    #[test]
    fn test_split_list_skips_empty_parts() {
        let parts: Vec<&str> = split_list("a||b|", '|').collect();
        assert_eq!(parts, vec!["a", "b"]);
        assert_eq!(split_list("", '|').count(), 0);
    }
}
