//! Settings profiles: the baseline tree and every override the layer
//! selector can choose from.
//!
//! Cache, parallelism and memory switches live under the `performance`
//! section of the tree, alongside the defaults for the same keys.

use autotune_core::ConfigTree;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;

/// Keys copied verbatim from the user's existing settings.
pub const PRESERVED_KEYS: &[&str] = &["customInstructions", "preferredLanguage", "autoApprove"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsCatalog {
    /// Baseline `cline_settings` tree.
    pub defaults: ConfigTree,

    /// Language and project-type profiles keyed by name (`python`, `web`, ...).
    pub profiles: BTreeMap<String, ConfigTree>,

    pub tiers: TierProfiles,

    pub remediation: RemediationProfiles,

    pub scale: ScaleProfiles,

    /// Added to the scale layer's context window for polyglot projects.
    pub polyglot_context_bonus: i64,

    /// Absolute response token budget for polyglot projects.
    pub polyglot_response_tokens: i64,

    pub usage: UsageProfiles,

    pub preserved_keys: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierProfiles {
    pub low_memory: ConfigTree,
    pub high_memory: ConfigTree,
    pub low_cpu: ConfigTree,
    pub high_cpu: ConfigTree,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemediationProfiles {
    pub memory: ConfigTree,
    pub cpu: ConfigTree,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScaleProfiles {
    pub large: ConfigTree,
    pub medium: ConfigTree,
    pub small: ConfigTree,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageProfiles {
    pub experienced: ConfigTree,
    pub novice: ConfigTree,
    pub determinism: ConfigTree,
}

impl SettingsCatalog {
    /// The built-in settings catalog.
    pub fn builtin() -> Self {
        Self {
            defaults: default_settings(),
            profiles: project_profiles(),
            tiers: TierProfiles {
                low_memory: ConfigTree::from_json(json!({
                    "contextWindow": 100000,
                    "maxResponseTokens": 4096,
                    "performance": {
                        "enableCaching": false,
                        "maxCacheSize": 50,
                        "parallelProcessing": false,
                        "memoryOptimization": true
                    }
                })),
                high_memory: ConfigTree::from_json(json!({
                    "contextWindow": 300000,
                    "maxResponseTokens": 12288,
                    "performance": {
                        "enableCaching": true,
                        "maxCacheSize": 200,
                        "parallelProcessing": true
                    }
                })),
                low_cpu: ConfigTree::from_json(json!({
                    "performance": {
                        "parallelProcessing": false,
                        "backgroundProcessing": false,
                        "simpleAlgorithms": true
                    }
                })),
                high_cpu: ConfigTree::from_json(json!({
                    "performance": {
                        "parallelProcessing": true,
                        "backgroundProcessing": true,
                        "optimizeAlgorithms": true
                    }
                })),
            },
            remediation: RemediationProfiles {
                memory: ConfigTree::from_json(json!({
                    "performance": {
                        "memoryOptimization": true,
                        "enableCaching": false
                    }
                })),
                cpu: ConfigTree::from_json(json!({
                    "maxResponseTokens": 4096,
                    "performance": {
                        "parallelProcessing": false
                    }
                })),
            },
            scale: ScaleProfiles {
                large: ConfigTree::from_json(json!({
                    "requestLimit": 50,
                    "contextWindow": 250000,
                    "performance": {
                        "enableCaching": true,
                        "maxCacheSize": 150
                    }
                })),
                medium: ConfigTree::from_json(json!({
                    "requestLimit": 35,
                    "contextWindow": 200000,
                    "performance": {
                        "enableCaching": true
                    }
                })),
                small: ConfigTree::from_json(json!({
                    "requestLimit": 20,
                    "contextWindow": 150000
                })),
            },
            polyglot_context_bonus: 50_000,
            polyglot_response_tokens: 10_240,
            usage: UsageProfiles {
                experienced: ConfigTree::from_json(json!({
                    "autoApprove": true,
                    "experimentalFeatures": true,
                    "debugMode": false
                })),
                novice: ConfigTree::from_json(json!({
                    "autoApprove": false,
                    "experimentalFeatures": false,
                    "debugMode": true
                })),
                determinism: ConfigTree::from_json(json!({
                    "temperature": 0.05,
                    "security": {
                        "restrictFileAccess": true,
                        "sanitizeInputs": true
                    }
                })),
            },
            preserved_keys: PRESERVED_KEYS.iter().map(|k| k.to_string()).collect(),
        }
    }

    pub fn profile(&self, name: &str) -> Option<&ConfigTree> {
        self.profiles.get(name)
    }
}

fn default_settings() -> ConfigTree {
    ConfigTree::from_json(json!({
        "autoApprove": false,
        "alwaysAllowReadOnly": true,
        "alwaysAllowWriteOnly": false,
        "requestLimit": 25,
        "contextWindow": 200000,
        "maxResponseTokens": 8192,
        "temperature": 0.1,
        "debugMode": false,
        "experimentalFeatures": false,
        "customInstructions": "",
        "preferredLanguage": "en",
        "codeStyle": {
            "indentation": 4,
            "quotes": "double",
            "semicolons": true,
            "trailingCommas": true
        },
        "performance": {
            "enableCaching": true,
            "maxCacheSize": 100,
            "parallelProcessing": false,
            "memoryOptimization": false
        },
        "security": {
            "restrictFileAccess": true,
            "sanitizeInputs": true,
            "logSecurityEvents": true
        }
    }))
}

fn project_profiles() -> BTreeMap<String, ConfigTree> {
    let mut profiles = BTreeMap::new();

    profiles.insert(
        "python".into(),
        ConfigTree::from_json(json!({
            "codeStyle": {
                "indentation": 4,
                "quotes": "double",
                "lineLength": 88
            },
            "linting": {
                "enableFlake8": true,
                "enableBlack": true,
                "enableMypy": true
            },
            "testing": {
                "framework": "pytest",
                "coverage": true,
                "autoDiscovery": true
            }
        })),
    );

    profiles.insert(
        "javascript".into(),
        ConfigTree::from_json(json!({
            "codeStyle": {
                "indentation": 2,
                "quotes": "single",
                "semicolons": false,
                "trailingCommas": true
            },
            "linting": {
                "enableESLint": true,
                "enablePrettier": true
            },
            "build": {
                "enableSourceMaps": true,
                "minification": true
            }
        })),
    );

    profiles.insert(
        "typescript".into(),
        ConfigTree::from_json(json!({
            "codeStyle": {
                "indentation": 2,
                "quotes": "single",
                "semicolons": false,
                "strictMode": true
            },
            "typeChecking": {
                "strict": true,
                "noImplicitAny": true,
                "strictNullChecks": true
            }
        })),
    );

    profiles.insert(
        "web".into(),
        ConfigTree::from_json(json!({
            "features": {
                "autoReload": true,
                "livePreview": true,
                "responsiveDesign": true
            },
            "optimization": {
                "imageOptimization": true,
                "cssMinification": true,
                "jsMinification": true
            }
        })),
    );

    profiles
}
