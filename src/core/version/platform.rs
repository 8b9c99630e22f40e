use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Operating system names as they appear in manifest rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OsName {
    Windows,
    Osx,
    Linux,
}

impl OsName {
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            OsName::Windows
        } else if cfg!(target_os = "macos") {
            OsName::Osx
        } else {
            OsName::Linux
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OsName::Windows => "windows",
            OsName::Osx => "osx",
            OsName::Linux => "linux",
        }
    }

    /// Match a rule's OS name. `macos` is accepted as an alias of `osx`.
    pub fn matches(&self, name: &str) -> bool {
        name == self.as_str() || (*self == OsName::Osx && name == "macos")
    }
}

impl fmt::Display for OsName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The platform a resolution is evaluated for.
///
/// Rules never consult process-global state; everything they look at is
/// carried here, so any platform can be simulated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Platform {
    pub os: OsName,
    /// Architecture in manifest vocabulary (`x86`, `x86_64`, `arm64`, ...).
    pub arch: String,
    /// OS version string matched by `os.version` rule patterns.
    pub os_version: String,
    /// Feature flags consulted by feature rules (`is_demo_user`, ...).
    #[serde(default)]
    pub features: HashMap<String, bool>,
}

impl Platform {
    pub fn new(os: OsName, arch: impl Into<String>, os_version: impl Into<String>) -> Self {
        Self {
            os,
            arch: arch.into(),
            os_version: os_version.into(),
            features: HashMap::new(),
        }
    }

    /// Describe the machine we are running on.
    pub fn current() -> Self {
        let arch = match std::env::consts::ARCH {
            "aarch64" => "arm64",
            other => other,
        };
        Self::new(
            OsName::current(),
            arch,
            sysinfo::System::os_version().unwrap_or_default(),
        )
    }

    pub fn with_feature(mut self, name: impl Into<String>, enabled: bool) -> Self {
        self.features.insert(name.into(), enabled);
        self
    }

    pub fn feature(&self, name: &str) -> bool {
        self.features.get(name).copied().unwrap_or(false)
    }

    /// Pointer width substituted for `${arch}` in native classifiers.
    pub fn arch_bits(&self) -> &'static str {
        match self.arch.as_str() {
            "x86" | "i386" | "i686" | "arm" => "32",
            _ => "64",
        }
    }

    pub fn matches_arch(&self, arch: &str) -> bool {
        self.arch.eq_ignore_ascii_case(arch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn osx_alias() {
        assert!(OsName::Osx.matches("osx"));
        assert!(OsName::Osx.matches("macos"));
        assert!(!OsName::Linux.matches("macos"));
    }

    #[test]
    fn arch_bits() {
        assert_eq!(Platform::new(OsName::Windows, "x86", "10.0").arch_bits(), "32");
        assert_eq!(Platform::new(OsName::Windows, "x86_64", "10.0").arch_bits(), "64");
        assert_eq!(Platform::new(OsName::Osx, "arm64", "14.1").arch_bits(), "64");
    }

    #[test]
    fn features_default_to_disabled() {
        let platform = Platform::new(OsName::Linux, "x86_64", "6.1").with_feature("is_demo_user", true);
        assert!(platform.feature("is_demo_user"));
        assert!(!platform.feature("has_custom_resolution"));
    }

    #[test]
    fn current_platform_is_consistent() {
        let platform = Platform::current();
        assert_eq!(platform.os, OsName::current());
        assert!(!platform.arch.is_empty());
    }
}
