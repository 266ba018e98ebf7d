use alloc::borrow::Cow;
use core::fmt;

use serde::{Deserialize, Serialize};

// -----------------------------------------------------------------------------
// ModuleId

/// Identifies the module, a library or plugin, that registered a class.
///
/// [`ModuleId::MAIN`] stands for the executable itself. Other ids are handed
/// out by [`ClassManager::unique_module_id`](crate::registry::ClassManager::unique_module_id).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleId(u64);

impl ModuleId {
    /// The main module.
    pub const MAIN: ModuleId = ModuleId(0);

    #[inline]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn to_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ModuleId({})", self.0)
    }
}

impl fmt::Display for ModuleId {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

// -----------------------------------------------------------------------------
// ModuleInfo

/// Metadata of a module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleInfo {
    pub name: Cow<'static, str>,
    pub vendor: Cow<'static, str>,
    pub license: Cow<'static, str>,
    pub description: Cow<'static, str>,
    /// Path of the shared library, empty for statically linked modules.
    pub filename: Cow<'static, str>,
    /// Returns `true` for modules loaded at runtime.
    pub plugin: bool,
}

impl ModuleInfo {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_vendor(mut self, vendor: impl Into<Cow<'static, str>>) -> Self {
        self.vendor = vendor.into();
        self
    }

    pub fn with_license(mut self, license: impl Into<Cow<'static, str>>) -> Self {
        self.license = license.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<Cow<'static, str>>) -> Self {
        self.description = description.into();
        self
    }

    /// Marks the module as a plugin loaded from `filename`.
    pub fn plugin(mut self, filename: impl Into<Cow<'static, str>>) -> Self {
        self.filename = filename.into();
        self.plugin = true;
        self
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{ModuleId, ModuleInfo};

    #[test]
    fn ids() {
        assert_eq!(ModuleId::MAIN.to_raw(), 0);
        assert_eq!(ModuleId::from_raw(7).to_string(), "7");
        assert!(ModuleId::MAIN < ModuleId::from_raw(1));
    }

    #[test]
    fn info_serde() {
        let info = ModuleInfo::new("Gui")
            .with_vendor("PixelLight")
            .plugin("libGui.so");
        let document = serde_json::to_value(&info).unwrap();
        assert_eq!(document["name"], json!("Gui"));
        assert_eq!(document["plugin"], json!(true));

        let back: ModuleInfo = serde_json::from_value(json!({"name": "Gui"})).unwrap();
        assert_eq!(back, ModuleInfo::new("Gui"));
    }
}
