//! UI-ready setup model produced from a loaded settings schema.
//!
//! The schema allows skipping nesting levels, so the conversion
//! synthesizes the missing containers: loose sections, groups and entries
//! are wrapped in default levels down to `Category → Section → Group →
//! Entry`, which is the shape the UI-building collaborator consumes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::logger;
use crate::settings_xml::types::{
    Category, CategoryContent, ConfigContent, Entry, Group, GroupContent, Section, SectionContent,
    SettingsConfig,
};

/// Title of the category synthesized for loose top-level content.
pub const DEFAULT_CATEGORY_TITLE: &str = "General Settings";
/// Title of the section synthesized for loose category content.
pub const DEFAULT_SECTION_TITLE: &str = "General";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Setup {
    pub allow_search: bool,
    pub allow_restore: bool,
    pub categories: Vec<SetupCategory>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetupCategory {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
    pub sections: Vec<SetupSection>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetupSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
    pub groups: Vec<SetupGroup>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetupGroup {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
    pub entries: Vec<SetupEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupEntry {
    pub key: String,
    #[serde(rename = "type")]
    pub input_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    pub search_keys: Vec<String>,
    pub properties: Vec<(String, String)>,
}

impl Setup {
    /// Convert a loaded, resolved schema into the setup model.
    pub fn from_config(config: &SettingsConfig) -> Self {
        let mut categories = Vec::new();
        let mut loose_sections = Vec::new();
        let mut loose_groups = Vec::new();
        let mut loose_entries = Vec::new();

        for content in &config.content {
            match content {
                ConfigContent::Category(category) => {
                    categories.push(SetupCategory::from_category(category));
                }
                ConfigContent::Section(section) => {
                    loose_sections.push(SetupSection::from_section(section));
                }
                ConfigContent::Group(group) => loose_groups.push(SetupGroup::from_group(group)),
                ConfigContent::Entry(entry) => loose_entries.push(SetupEntry::from_entry(entry)),
                // includes are resolved or dropped during loading
                ConfigContent::Include(_) => {}
            }
        }

        if !loose_entries.is_empty() {
            loose_groups.push(SetupGroup {
                title: None,
                tooltip: None,
                entries: loose_entries,
            });
        }
        if !loose_groups.is_empty() {
            loose_sections.push(SetupSection {
                title: Some(DEFAULT_SECTION_TITLE.to_string()),
                icon: None,
                tooltip: None,
                groups: loose_groups,
            });
        }
        if !loose_sections.is_empty() {
            categories.push(SetupCategory {
                title: Some(DEFAULT_CATEGORY_TITLE.to_string()),
                icon: None,
                tooltip: None,
                sections: loose_sections,
            });
        }

        Setup {
            allow_search: config.allow_search,
            allow_restore: config.allow_restore,
            categories,
        }
    }

    /// Iterate over every entry in the setup, in document order.
    pub fn entries(&self) -> impl Iterator<Item = &SetupEntry> {
        self.categories
            .iter()
            .flat_map(|category| category.sections.iter())
            .flat_map(|section| section.groups.iter())
            .flat_map(|group| group.entries.iter())
    }
}

impl SetupCategory {
    fn from_category(category: &Category) -> Self {
        let mut sections = Vec::new();
        let mut loose_groups = Vec::new();
        let mut loose_entries = Vec::new();

        for content in &category.content {
            match content {
                CategoryContent::Section(section) => {
                    sections.push(SetupSection::from_section(section));
                }
                CategoryContent::Group(group) => loose_groups.push(SetupGroup::from_group(group)),
                CategoryContent::Entry(entry) => loose_entries.push(SetupEntry::from_entry(entry)),
                CategoryContent::Include(_) => {}
            }
        }

        if !loose_entries.is_empty() {
            loose_groups.push(SetupGroup {
                title: None,
                tooltip: None,
                entries: loose_entries,
            });
        }
        if !loose_groups.is_empty() {
            sections.push(SetupSection {
                title: Some(DEFAULT_SECTION_TITLE.to_string()),
                icon: None,
                tooltip: None,
                groups: loose_groups,
            });
        }

        SetupCategory {
            title: category.title.clone(),
            icon: category.icon.clone(),
            tooltip: category.tooltip.clone(),
            sections,
        }
    }
}

impl SetupSection {
    fn from_section(section: &Section) -> Self {
        let mut groups = Vec::new();
        let mut loose_entries = Vec::new();

        for content in &section.content {
            match content {
                SectionContent::Group(group) => groups.push(SetupGroup::from_group(group)),
                SectionContent::Entry(entry) => loose_entries.push(SetupEntry::from_entry(entry)),
                SectionContent::Include(_) => {}
            }
        }

        if !loose_entries.is_empty() {
            groups.push(SetupGroup {
                title: None,
                tooltip: None,
                entries: loose_entries,
            });
        }

        SetupSection {
            title: section.title.clone(),
            icon: section.icon.clone(),
            tooltip: section.tooltip.clone(),
            groups,
        }
    }
}

impl SetupGroup {
    fn from_group(group: &Group) -> Self {
        let entries = group
            .content
            .iter()
            .filter_map(|content| match content {
                GroupContent::Entry(entry) => Some(SetupEntry::from_entry(entry)),
                GroupContent::Include(_) => None,
            })
            .collect();

        SetupGroup {
            title: group.title.clone(),
            tooltip: group.tooltip.clone(),
            entries,
        }
    }
}

impl SetupEntry {
    fn from_entry(entry: &Entry) -> Self {
        SetupEntry {
            key: entry.key.clone(),
            input_type: entry.input_type.clone(),
            title: entry.title.clone(),
            tooltip: entry.tooltip.clone(),
            default_value: entry
                .default_value
                .as_ref()
                .map(|raw| coerce_default_value(&entry.key, &entry.input_type, raw)),
            search_keys: entry.search_keys.clone(),
            properties: entry.properties.clone(),
        }
    }
}

/// Coerce a `defaultValue` string by the declared entry type. A failed
/// coercion logs a warning and falls back to the string value.
fn coerce_default_value(key: &str, input_type: &str, raw: &str) -> Value {
    match input_type {
        "bool" | "switch" => match raw {
            "true" | "1" => Value::Bool(true),
            "false" | "0" => Value::Bool(false),
            _ => fallback(key, input_type, raw),
        },
        "int" | "uint" => match raw.parse::<i64>() {
            Ok(n) => Value::from(n),
            Err(_) => fallback(key, input_type, raw),
        },
        "number" | "double" => match raw.parse::<f64>() {
            Ok(n) if n.is_finite() => Value::from(n),
            _ => fallback(key, input_type, raw),
        },
        _ => Value::String(raw.to_string()),
    }
}

fn fallback(key: &str, input_type: &str, raw: &str) -> Value {
    logger::warn(&format!(
        "Default value \"{}\" of entry \"{}\" is not a valid {}, keeping it as a string",
        raw, key, input_type
    ));
    Value::String(raw.to_string())
}
