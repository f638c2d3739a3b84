pub mod accessor;
pub mod logger;
pub mod settings_xml;
pub mod setup;

pub use settings_xml::error::SettingsXmlError;
pub use settings_xml::loader::SettingsConfigLoader;
pub use settings_xml::selector::{PlatformSelector, SelectorProvider};
pub use setup::Setup;
