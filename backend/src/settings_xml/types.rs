//! Grammar node types for the settings schema.
//!
//! The grammar is closed: each container holds an ordered content sequence
//! whose type is one enum per nesting slot. Nesting levels may be skipped,
//! e.g. a `<settingsConfig>` can hold `<entry>` elements directly, but after
//! loading a content sequence holds at most one non-include element type.

use serde::{Deserialize, Serialize};

/// Filter attributes carried by every schema node.
///
/// `frontends` is a pipe-separated allow-list of UI frontend names.
/// `selectors` is a pipe-separated list of OR-terms, each term an
/// ampersand-separated AND of selector names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frontends: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selectors: Option<String>,
}

/// An `<include>` directive deferring to an external document.
///
/// Ephemeral: exists only until the loader resolves it into the included
/// document's root node, or drops it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Include {
    pub filter: FilterInfo,
    pub path: String,
    pub optional: bool,
}

/// A single settings value declaration, the leaf of the grammar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub filter: FilterInfo,
    pub key: String,
    #[serde(rename = "type")]
    pub input_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    pub search_keys: Vec<String>,
    pub properties: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub filter: FilterInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
    pub content: Vec<GroupContent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub filter: FilterInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
    pub content: Vec<SectionContent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub filter: FilterInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
    pub content: Vec<CategoryContent>,
}

/// The `<settingsConfig>` document root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsConfig {
    pub filter: FilterInfo,
    pub allow_search: bool,
    pub allow_restore: bool,
    pub content: Vec<ConfigContent>,
}

/// Content of a `<group>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GroupContent {
    Include(Include),
    Entry(Entry),
}

/// Content of a `<section>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SectionContent {
    Include(Include),
    Group(Group),
    Entry(Entry),
}

/// Content of a `<category>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CategoryContent {
    Include(Include),
    Section(Section),
    Group(Group),
    Entry(Entry),
}

/// Content of a `<settingsConfig>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConfigContent {
    Include(Include),
    Category(Category),
    Section(Section),
    Group(Group),
    Entry(Entry),
}

/// Root element of a document, top-level or included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RootElement {
    SettingsConfig(SettingsConfig),
    Category(Category),
    Section(Section),
    Group(Group),
    Entry(Entry),
}

impl RootElement {
    pub fn element_name(&self) -> &'static str {
        match self {
            RootElement::SettingsConfig(_) => "settingsConfig",
            RootElement::Category(_) => "category",
            RootElement::Section(_) => "section",
            RootElement::Group(_) => "group",
            RootElement::Entry(_) => "entry",
        }
    }
}

/// Dispatch over one content slot's closed set of cases.
///
/// Gives the loader a single generic resolve-and-filter pass over all four
/// container types: include extraction, the variant-case index used by the
/// homogeneity check, filter attribute access, and the conversion of an
/// included document's root into the slot (`None` when the root type is not
/// permitted in this slot).
pub(crate) trait ContentSlot: Sized {
    fn into_include(self) -> Result<Include, Self>;
    fn kind_index(&self) -> usize;
    fn filter_info(&self) -> &FilterInfo;
    fn from_root(root: RootElement) -> Option<Self>;
}

impl ContentSlot for GroupContent {
    fn into_include(self) -> Result<Include, Self> {
        match self {
            GroupContent::Include(include) => Ok(include),
            other => Err(other),
        }
    }

    fn kind_index(&self) -> usize {
        match self {
            GroupContent::Include(_) => 0,
            GroupContent::Entry(_) => 1,
        }
    }

    fn filter_info(&self) -> &FilterInfo {
        match self {
            GroupContent::Include(include) => &include.filter,
            GroupContent::Entry(entry) => &entry.filter,
        }
    }

    fn from_root(root: RootElement) -> Option<Self> {
        match root {
            RootElement::Entry(entry) => Some(GroupContent::Entry(entry)),
            _ => None,
        }
    }
}

impl ContentSlot for SectionContent {
    fn into_include(self) -> Result<Include, Self> {
        match self {
            SectionContent::Include(include) => Ok(include),
            other => Err(other),
        }
    }

    fn kind_index(&self) -> usize {
        match self {
            SectionContent::Include(_) => 0,
            SectionContent::Group(_) => 1,
            SectionContent::Entry(_) => 2,
        }
    }

    fn filter_info(&self) -> &FilterInfo {
        match self {
            SectionContent::Include(include) => &include.filter,
            SectionContent::Group(group) => &group.filter,
            SectionContent::Entry(entry) => &entry.filter,
        }
    }

    fn from_root(root: RootElement) -> Option<Self> {
        match root {
            RootElement::Group(group) => Some(SectionContent::Group(group)),
            RootElement::Entry(entry) => Some(SectionContent::Entry(entry)),
            _ => None,
        }
    }
}

impl ContentSlot for CategoryContent {
    fn into_include(self) -> Result<Include, Self> {
        match self {
            CategoryContent::Include(include) => Ok(include),
            other => Err(other),
        }
    }

    fn kind_index(&self) -> usize {
        match self {
            CategoryContent::Include(_) => 0,
            CategoryContent::Section(_) => 1,
            CategoryContent::Group(_) => 2,
            CategoryContent::Entry(_) => 3,
        }
    }

    fn filter_info(&self) -> &FilterInfo {
        match self {
            CategoryContent::Include(include) => &include.filter,
            CategoryContent::Section(section) => &section.filter,
            CategoryContent::Group(group) => &group.filter,
            CategoryContent::Entry(entry) => &entry.filter,
        }
    }

    fn from_root(root: RootElement) -> Option<Self> {
        match root {
            RootElement::Section(section) => Some(CategoryContent::Section(section)),
            RootElement::Group(group) => Some(CategoryContent::Group(group)),
            RootElement::Entry(entry) => Some(CategoryContent::Entry(entry)),
            _ => None,
        }
    }
}

impl ContentSlot for ConfigContent {
    fn into_include(self) -> Result<Include, Self> {
        match self {
            ConfigContent::Include(include) => Ok(include),
            other => Err(other),
        }
    }

    fn kind_index(&self) -> usize {
        match self {
            ConfigContent::Include(_) => 0,
            ConfigContent::Category(_) => 1,
            ConfigContent::Section(_) => 2,
            ConfigContent::Group(_) => 3,
            ConfigContent::Entry(_) => 4,
        }
    }

    fn filter_info(&self) -> &FilterInfo {
        match self {
            ConfigContent::Include(include) => &include.filter,
            ConfigContent::Category(category) => &category.filter,
            ConfigContent::Section(section) => &section.filter,
            ConfigContent::Group(group) => &group.filter,
            ConfigContent::Entry(entry) => &entry.filter,
        }
    }

    fn from_root(root: RootElement) -> Option<Self> {
        match root {
            RootElement::Category(category) => Some(ConfigContent::Category(category)),
            RootElement::Section(section) => Some(ConfigContent::Section(section)),
            RootElement::Group(group) => Some(ConfigContent::Group(group)),
            RootElement::Entry(entry) => Some(ConfigContent::Entry(entry)),
            RootElement::SettingsConfig(_) => None,
        }
    }
}
