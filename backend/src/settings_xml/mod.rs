//! XML settings-schema loading engine.
//!
//! Loads a schema of nested categories, sections, groups and entries from
//! XML documents, resolves `<include>` directives into sub-documents and
//! filters elements by the active UI frontend and platform selectors.

pub mod error;
pub mod loader;
pub mod reader;
pub mod selector;
pub mod types;

pub(crate) mod parser;

pub use error::{SettingsXmlError, XmlPosition};
pub use loader::SettingsConfigLoader;
pub use selector::{PlatformSelector, SelectorProvider};
pub use types::{
    Category, CategoryContent, ConfigContent, Entry, FilterInfo, Group, GroupContent, Include,
    RootElement, Section, SectionContent, SettingsConfig,
};
