use std::collections::HashMap;

use serde::Deserialize;
use tracing::warn;

use super::manifest::{rules_allow, Rule};
use super::platform::Platform;
use crate::core::error::LauncherError;

/// A rule-gated argument object from the modern `arguments` block.
#[derive(Debug, Clone, Deserialize)]
pub struct ConditionalArgument {
    #[serde(default)]
    pub rules: Vec<Rule>,
    pub value: ArgumentValue,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ArgumentValue {
    Single(String),
    Multiple(Vec<String>),
}

impl ArgumentValue {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            ArgumentValue::Single(s) => vec![s],
            ArgumentValue::Multiple(v) => v,
        }
    }

    /// Space-joined form used when the argument is exposed as an optional
    /// game argument.
    pub fn joined(&self) -> String {
        match self {
            ArgumentValue::Single(s) => s.clone(),
            ArgumentValue::Multiple(v) => v.join(" "),
        }
    }
}

/// Game arguments selected for a platform, plus the feature-gated ones the
/// caller may opt into.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameArguments {
    pub arguments: Vec<String>,
    /// Feature name → argument value.
    pub available: HashMap<String, String>,
}

fn parse_conditional(value: &serde_json::Value) -> Option<ConditionalArgument> {
    match serde_json::from_value::<ConditionalArgument>(value.clone()) {
        Ok(arg) => Some(arg),
        Err(e) => {
            let err = LauncherError::MalformedArgumentRule(format!("{}: {}", value, e));
            warn!("Skipping argument: {}", err);
            None
        }
    }
}

/// Select JVM arguments: plain strings always, rule objects when their rules
/// allow the platform.
pub fn select_jvm_arguments(values: &[serde_json::Value], platform: &Platform) -> Vec<String> {
    let mut out = Vec::new();

    for value in values {
        match value {
            serde_json::Value::String(s) => out.push(s.clone()),
            serde_json::Value::Object(_) => {
                if let Some(arg) = parse_conditional(value) {
                    if rules_allow(&arg.rules, platform) {
                        out.extend(arg.value.into_vec());
                    }
                }
            }
            other => {
                warn!("Skipping argument: {}", LauncherError::MalformedArgumentRule(other.to_string()));
            }
        }
    }

    out
}

/// Select game arguments.
///
/// Rule objects gated on a feature flag (`has_custom_resolution`,
/// `is_demo_user`, ...) are not applied; they are collected into
/// [`GameArguments::available`] keyed by the feature name.
pub fn select_game_arguments(values: &[serde_json::Value], platform: &Platform) -> GameArguments {
    let mut out = GameArguments::default();

    for value in values {
        match value {
            serde_json::Value::String(s) => out.arguments.push(s.clone()),
            serde_json::Value::Object(_) => {
                let Some(arg) = parse_conditional(value) else {
                    continue;
                };

                if let Some(feature) = arg.rules.iter().find_map(Rule::gating_feature) {
                    out.available.insert(feature.to_string(), arg.value.joined());
                    continue;
                }

                if rules_allow(&arg.rules, platform) {
                    out.arguments.extend(arg.value.into_vec());
                }
            }
            other => {
                warn!("Skipping argument: {}", LauncherError::MalformedArgumentRule(other.to_string()));
            }
        }
    }

    out
}
