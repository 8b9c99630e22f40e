// ─── Version Manifest ───
// Parses a version JSON and evaluates platform rules.

use std::collections::BTreeMap;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::platform::Platform;
use crate::core::error::{LauncherError, LauncherResult};

/// A deserialized version JSON, exactly as found on disk.
///
/// Libraries and arguments are kept as raw JSON values so that a single
/// malformed entry can be skipped without rejecting the whole manifest.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawVersionManifest {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub main_class: Option<String>,
    #[serde(default)]
    pub inherits_from: Option<String>,
    /// Legacy `minecraftArguments` field (pre-1.13).
    #[serde(default)]
    pub minecraft_arguments: Option<String>,
    #[serde(default)]
    pub arguments: Option<Arguments>,
    #[serde(default)]
    pub libraries: Vec<serde_json::Value>,
    #[serde(default)]
    pub asset_index: Option<AssetIndexInfo>,
    #[serde(default)]
    pub assets: Option<String>,
    #[serde(default)]
    pub java_version: Option<JavaVersionInfo>,
    #[serde(default, rename = "type")]
    pub version_type: Option<String>,
    #[serde(default)]
    pub release_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JavaVersionInfo {
    #[serde(default)]
    pub component: Option<String>,
    pub major_version: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetIndexInfo {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub sha1: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub total_size: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Arguments {
    #[serde(default)]
    pub game: Vec<serde_json::Value>,
    #[serde(default)]
    pub jvm: Vec<serde_json::Value>,
}

// ─── Library Entry with Rules ───

#[derive(Debug, Clone, Deserialize)]
pub struct LibraryEntry {
    pub name: String,
    /// Repository base overriding the organisation default.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub downloads: Option<LibraryDownloads>,
    #[serde(default)]
    pub rules: Option<Vec<Rule>>,
    /// OS name → native classifier (may contain `${arch}`).
    #[serde(default)]
    pub natives: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub extract: Option<ExtractRule>,
    #[serde(default, rename = "clientreq")]
    pub client_required: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LibraryDownloads {
    #[serde(default)]
    pub artifact: Option<DownloadArtifact>,
    #[serde(default)]
    pub classifiers: Option<BTreeMap<String, DownloadArtifact>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DownloadArtifact {
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub sha1: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractRule {
    #[serde(default)]
    pub exclude: Vec<String>,
}

// ─── Rule Evaluation ───

#[derive(Debug, Clone, Deserialize)]
pub struct Rule {
    pub action: RuleAction,
    #[serde(default)]
    pub os: Option<OsRule>,
    #[serde(default)]
    pub features: Option<BTreeMap<String, bool>>,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RuleAction {
    Allow,
    Disallow,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OsRule {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub arch: Option<String>,
    /// Regular expression over the OS version (e.g. `^10\.`).
    #[serde(default)]
    pub version: Option<String>,
}

impl OsRule {
    pub fn matches(&self, platform: &Platform) -> bool {
        let name_matches = self
            .name
            .as_deref()
            .map_or(true, |name| platform.os.matches(name));
        let arch_matches = self
            .arch
            .as_deref()
            .map_or(true, |arch| platform.matches_arch(arch));
        let version_matches = self
            .version
            .as_deref()
            .map_or(true, |pattern| os_version_matches(pattern, &platform.os_version));

        name_matches && arch_matches && version_matches
    }
}

fn os_version_matches(pattern: &str, os_version: &str) -> bool {
    match Regex::new(pattern) {
        Ok(re) => re.is_match(os_version),
        Err(e) => {
            debug!("Invalid os.version pattern {:?} ({}), using prefix match", pattern, e);
            os_version.starts_with(pattern.trim_start_matches('^'))
        }
    }
}

impl Rule {
    /// Whether this rule's predicates hold on `platform`.
    pub fn applies_to(&self, platform: &Platform) -> bool {
        let os_matches = self.os.as_ref().map_or(true, |os| os.matches(platform));
        let features_match = self.features.as_ref().map_or(true, |features| {
            features
                .iter()
                .all(|(name, expected)| platform.feature(name) == *expected)
        });
        os_matches && features_match
    }

    /// The feature flag this rule is gated on, when it is an allow rule
    /// requiring a feature to be enabled. With several required features the
    /// lexically smallest name is reported.
    pub fn gating_feature(&self) -> Option<&str> {
        if self.action != RuleAction::Allow {
            return None;
        }
        self.features
            .as_ref()?
            .iter()
            .find(|(_, enabled)| **enabled)
            .map(|(name, _)| name.as_str())
    }
}

/// Evaluate a rule list for `platform`.
///
/// - No rules → allowed.
/// - Otherwise start "disallowed" and walk the rules in order; every rule whose
///   predicates hold sets the state to its action.
/// - The last applicable rule decides.
pub fn rules_allow(rules: &[Rule], platform: &Platform) -> bool {
    if rules.is_empty() {
        return true;
    }

    let mut allowed = false;
    for rule in rules {
        if rule.applies_to(platform) {
            allowed = rule.action == RuleAction::Allow;
        }
    }
    allowed
}

impl LibraryEntry {
    /// Evaluate whether this library should be included on `platform`.
    pub fn is_allowed_on(&self, platform: &Platform) -> bool {
        self.rules
            .as_deref()
            .map_or(true, |rules| rules_allow(rules, platform))
    }

    /// Native classifier for `platform`, if this library ships natives.
    ///
    /// The exact OS key wins over an alias (`osx` over `macos`). A natives
    /// map without an entry for the OS falls back to `natives-<os>`.
    pub fn native_classifier(&self, platform: &Platform) -> Option<String> {
        let natives = self.natives.as_ref().filter(|n| !n.is_empty())?;
        let classifier = natives
            .get(platform.os.as_str())
            .or_else(|| {
                natives
                    .iter()
                    .find(|(os, _)| platform.os.matches(os))
                    .map(|(_, classifier)| classifier)
            })
            .map(|classifier| classifier.replace("${arch}", platform.arch_bits()))
            .unwrap_or_else(|| format!("natives-{}", platform.os));
        Some(classifier)
    }

    pub fn is_native(&self) -> bool {
        self.natives.as_ref().is_some_and(|n| !n.is_empty())
    }
}

impl RawVersionManifest {
    /// Parse and validate a manifest. A manifest needs a main class and at
    /// least one form of argument specification.
    pub fn parse(id: &str, raw: &str) -> LauncherResult<Self> {
        let manifest: RawVersionManifest =
            serde_json::from_str(raw).map_err(|e| LauncherError::InvalidManifest {
                id: id.to_string(),
                reason: e.to_string(),
            })?;
        manifest.validate(id)?;
        Ok(manifest)
    }

    fn validate(&self, id: &str) -> LauncherResult<()> {
        if self.main_class.as_deref().map_or(true, str::is_empty) {
            return Err(LauncherError::InvalidManifest {
                id: id.to_string(),
                reason: "missing mainClass".into(),
            });
        }

        if self.legacy_arguments().is_none() && self.arguments.is_none() {
            return Err(LauncherError::InvalidManifest {
                id: id.to_string(),
                reason: "no minecraftArguments or arguments".into(),
            });
        }

        Ok(())
    }

    pub fn inherits_from(&self) -> Option<&str> {
        self.inherits_from.as_deref().filter(|s| !s.is_empty())
    }

    /// Legacy argument template split on whitespace, if present.
    pub fn legacy_arguments(&self) -> Option<Vec<String>> {
        self.minecraft_arguments
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.split_whitespace().map(ToString::to_string).collect())
    }

    /// Parse each library entry, skipping the ones that cannot be read.
    pub fn library_entries(&self) -> Vec<LibraryEntry> {
        self.libraries
            .iter()
            .filter_map(|value| match serde_json::from_value::<LibraryEntry>(value.clone()) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    let err = LauncherError::MalformedLibraryEntry {
                        name: value
                            .get("name")
                            .and_then(|n| n.as_str())
                            .unwrap_or("<unnamed>")
                            .to_string(),
                        reason: e.to_string(),
                    };
                    warn!("Skipping library: {}", err);
                    None
                }
            })
            .collect()
    }

    /// Whether any library belongs to Forge. Forge manifests mark libraries
    /// `clientreq: false` that the client still needs.
    pub fn mentions_forge(&self) -> bool {
        self.libraries.iter().any(|lib| {
            lib.get("name")
                .and_then(|n| n.as_str())
                .is_some_and(|name| name.to_ascii_lowercase().contains("minecraftforge"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::version::platform::OsName;

    fn linux() -> Platform {
        Platform::new(OsName::Linux, "x86_64", "6.5.0")
    }

    fn windows10() -> Platform {
        Platform::new(OsName::Windows, "x86_64", "10.0.19045")
    }

    fn rule(action: RuleAction, name: Option<&str>) -> Rule {
        Rule {
            action,
            os: name.map(|n| OsRule {
                name: Some(n.to_string()),
                ..OsRule::default()
            }),
            features: None,
        }
    }

    fn library(rules: Option<Vec<Rule>>) -> LibraryEntry {
        LibraryEntry {
            name: "test:lib:1.0".into(),
            url: None,
            downloads: None,
            rules,
            natives: None,
            extract: None,
            client_required: None,
        }
    }

    #[test]
    fn no_rules_means_allowed() {
        assert!(library(None).is_allowed_on(&linux()));
        assert!(library(Some(vec![])).is_allowed_on(&linux()));
    }

    #[test]
    fn allow_only_matching_os() {
        let lib = library(Some(vec![rule(RuleAction::Allow, Some("linux"))]));
        assert!(lib.is_allowed_on(&linux()));
        assert!(!lib.is_allowed_on(&windows10()));
    }

    #[test]
    fn last_applicable_rule_wins() {
        let lib = library(Some(vec![
            rule(RuleAction::Allow, None),
            rule(RuleAction::Disallow, Some("osx")),
        ]));
        assert!(lib.is_allowed_on(&linux()));
        assert!(!lib.is_allowed_on(&Platform::new(OsName::Osx, "arm64", "14.0")));

        // Contradictory rules are order dependent.
        let flipped = library(Some(vec![
            rule(RuleAction::Disallow, Some("linux")),
            rule(RuleAction::Allow, None),
        ]));
        assert!(flipped.is_allowed_on(&linux()));
    }

    #[test]
    fn os_version_is_a_pattern() {
        let rules: Vec<Rule> = serde_json::from_value(serde_json::json!([
            {"action": "allow", "os": {"name": "windows", "version": "^10\\."}}
        ]))
        .unwrap();
        assert!(rules_allow(&rules, &windows10()));
        assert!(!rules_allow(
            &rules,
            &Platform::new(OsName::Windows, "x86_64", "6.1.7601")
        ));
    }

    #[test]
    fn arch_rule() {
        let rules: Vec<Rule> = serde_json::from_value(serde_json::json!([
            {"action": "allow", "os": {"arch": "x86"}}
        ]))
        .unwrap();
        assert!(rules_allow(&rules, &Platform::new(OsName::Windows, "x86", "10.0")));
        assert!(!rules_allow(&rules, &windows10()));
    }

    #[test]
    fn feature_rules_consult_platform_flags() {
        let rules: Vec<Rule> = serde_json::from_value(serde_json::json!([
            {"action": "allow", "features": {"is_demo_user": true}}
        ]))
        .unwrap();
        assert!(!rules_allow(&rules, &linux()));
        assert!(rules_allow(&rules, &linux().with_feature("is_demo_user", true)));
        assert_eq!(rules[0].gating_feature(), Some("is_demo_user"));
    }

    #[test]
    fn native_classifier_substitutes_arch() {
        let mut lib = library(None);
        lib.natives = Some(BTreeMap::from([
            ("windows".to_string(), "natives-windows-${arch}".to_string()),
            ("linux".to_string(), "natives-linux".to_string()),
        ]));
        assert_eq!(
            lib.native_classifier(&Platform::new(OsName::Windows, "x86", "10.0")),
            Some("natives-windows-32".into())
        );
        assert_eq!(lib.native_classifier(&linux()), Some("natives-linux".into()));
        assert_eq!(
            lib.native_classifier(&Platform::new(OsName::Osx, "x86_64", "13.0")),
            Some("natives-osx".into())
        );
    }

    #[test]
    fn exact_os_key_wins_over_alias() {
        let mut lib = library(None);
        lib.natives = Some(BTreeMap::from([
            ("macos".to_string(), "natives-macos-arm64".to_string()),
            ("osx".to_string(), "natives-osx".to_string()),
        ]));
        let mac = Platform::new(OsName::Osx, "aarch64", "14.0");
        for _ in 0..8 {
            assert_eq!(lib.native_classifier(&mac), Some("natives-osx".into()));
        }

        lib.natives = Some(BTreeMap::from([(
            "macos".to_string(),
            "natives-macos".to_string(),
        )]));
        assert_eq!(lib.native_classifier(&mac), Some("natives-macos".into()));
    }

    #[test]
    fn gating_feature_is_stable_with_several_features() {
        let rules: Vec<Rule> = serde_json::from_value(serde_json::json!([
            {"action": "allow", "features": {"has_custom_resolution": true, "is_demo_user": true}},
            {"action": "allow", "features": {"is_quick_play_multiplayer": false, "has_quick_plays_support": true}},
            {"action": "allow", "features": {"is_demo_user": false}}
        ]))
        .unwrap();
        assert_eq!(rules[0].gating_feature(), Some("has_custom_resolution"));
        assert_eq!(rules[1].gating_feature(), Some("has_quick_plays_support"));
        assert_eq!(rules[2].gating_feature(), None);
    }

    #[test]
    fn manifest_requires_main_class_and_arguments() {
        let missing_main = RawVersionManifest::parse("x", r#"{"id": "x", "minecraftArguments": "--a b"}"#);
        assert!(matches!(missing_main, Err(LauncherError::InvalidManifest { .. })));

        let missing_args = RawVersionManifest::parse("x", r#"{"id": "x", "mainClass": "a.Main"}"#);
        assert!(matches!(missing_args, Err(LauncherError::InvalidManifest { .. })));

        let garbage = RawVersionManifest::parse("x", "not json");
        assert!(matches!(garbage, Err(LauncherError::InvalidManifest { .. })));

        let ok = RawVersionManifest::parse(
            "x",
            r#"{"id": "x", "mainClass": "a.Main", "arguments": {"game": []}}"#,
        );
        assert!(ok.is_ok());
    }

    #[test]
    fn malformed_library_entries_are_skipped() {
        let manifest = RawVersionManifest::parse(
            "x",
            r#"{
                "id": "x",
                "mainClass": "a.Main",
                "minecraftArguments": "--username ${auth_player_name}",
                "libraries": [
                    {"name": "good:lib:1.0"},
                    {"name": 42},
                    {"rules": []},
                    {"name": "other:lib:2.0", "clientreq": false}
                ]
            }"#,
        )
        .unwrap();

        let entries = manifest.library_entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "good:lib:1.0");
        assert_eq!(entries[1].client_required, Some(false));
        assert_eq!(
            manifest.legacy_arguments().unwrap(),
            vec!["--username", "${auth_player_name}"]
        );
    }
}
