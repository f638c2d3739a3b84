//! Platform selector collaborator for schema filtering and include-path
//! variant substitution.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use cfg_if::cfg_if;

/// Resolves platform-specific file variants and exposes the active
/// selector set used by `selectors="..."` filter expressions.
///
/// The loader never constructs a provider itself, it borrows one per
/// configuration.
pub trait SelectorProvider {
    /// Rewrite a path to its platform-specific variant, or return it
    /// unchanged when no variant applies.
    fn select(&self, path: &str) -> String;

    /// The set of currently active selector names.
    fn all_selectors(&self) -> HashSet<String>;
}

cfg_if! {
    if #[cfg(target_os = "android")] {
        const PLATFORM_SELECTORS: &[&str] = &["android", "mobile", "unix"];
    } else if #[cfg(target_os = "ios")] {
        const PLATFORM_SELECTORS: &[&str] = &["ios", "mobile", "unix"];
    } else if #[cfg(target_os = "macos")] {
        const PLATFORM_SELECTORS: &[&str] = &["macos", "mac", "desktop", "unix"];
    } else if #[cfg(target_os = "windows")] {
        const PLATFORM_SELECTORS: &[&str] = &["windows", "desktop"];
    } else if #[cfg(target_os = "linux")] {
        const PLATFORM_SELECTORS: &[&str] = &["linux", "desktop", "unix"];
    } else {
        const PLATFORM_SELECTORS: &[&str] = &[];
    }
}

/// Default [`SelectorProvider`]: the compile-time platform selectors plus
/// any caller-added extra selectors.
///
/// `select` probes the filesystem for `name+selector.ext` variants next to
/// the given file, in selector order (extra selectors first), and returns
/// the first variant that exists.
#[derive(Debug, Clone)]
pub struct PlatformSelector {
    selectors: Vec<String>,
}

impl PlatformSelector {
    pub fn new() -> Self {
        Self {
            selectors: PLATFORM_SELECTORS.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn with_extra_selectors(extra: impl IntoIterator<Item = String>) -> Self {
        let mut selector = Self::new();
        let mut selectors: Vec<String> = extra.into_iter().collect();
        selectors.append(&mut selector.selectors);
        selector.selectors = selectors;
        selector
    }

    /// Activate an extra selector, probed before the existing ones.
    pub fn add_selector(&mut self, name: impl Into<String>) {
        self.selectors.insert(0, name.into());
    }

    fn variant_path(&self, path: &Path, selector: &str) -> Option<PathBuf> {
        let stem = path.file_stem()?.to_str()?;
        let file = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => format!("{}+{}.{}", stem, selector, ext),
            None => format!("{}+{}", stem, selector),
        };
        match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => Some(dir.join(file)),
            _ => Some(PathBuf::from(file)),
        }
    }
}

impl Default for PlatformSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectorProvider for PlatformSelector {
    fn select(&self, path: &str) -> String {
        let base = Path::new(path);
        for selector in &self.selectors {
            if let Some(variant) = self.variant_path(base, selector) {
                if variant.is_file() {
                    return variant.to_string_lossy().into_owned();
                }
            }
        }
        path.to_string()
    }

    fn all_selectors(&self) -> HashSet<String> {
        self.selectors.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extra_selectors_are_active() {
        let selector = PlatformSelector::with_extra_selectors(vec!["phone".to_string()]);
        let all = selector.all_selectors();
        assert!(all.contains("phone"));
        for name in PLATFORM_SELECTORS {
            assert!(all.contains(*name), "missing platform selector {}", name);
        }
    }

    #[test]
    fn test_select_returns_input_when_no_variant_exists() {
        let selector = PlatformSelector::new();
        assert_eq!(
            selector.select("no/such/dir/settings.xml"),
            "no/such/dir/settings.xml"
        );
    }
}
