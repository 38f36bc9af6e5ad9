//! Layered configuration (§6, §10): built-in defaults → optional `abx.toml`
//! → `ABX_*` environment variables, using the same `config`-crate layering
//! convention this codebase's sibling services use.

use std::path::Path;

use serde::{Deserialize, Serialize};

use abx_contracts::error::{AbxError, AbxResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CockcroftGaultWeightPolicy {
    Actual,
    IbwAdjbw,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub kb_path: String,
    pub audit_path: String,
    pub error_reports_path: String,
    pub conservative_allergy_default: bool,
    pub refuse_on_no_regimen: bool,
    pub cockcroft_gault_weight_policy: CockcroftGaultWeightPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            kb_path: "guidelines".to_string(),
            audit_path: "logs".to_string(),
            error_reports_path: "logs/error_reports".to_string(),
            conservative_allergy_default: true,
            refuse_on_no_regimen: true,
            cockcroft_gault_weight_policy: CockcroftGaultWeightPolicy::IbwAdjbw,
        }
    }
}

impl EngineConfig {
    /// Build configuration from defaults, an optional TOML file, and
    /// `ABX_`-prefixed environment variables (highest priority last).
    pub fn load(toml_path: Option<&Path>) -> AbxResult<Self> {
        let defaults = EngineConfig::default();
        let mut builder = config::Config::builder()
            .set_default("kb_path", defaults.kb_path.clone())
            .map_err(config_err)?
            .set_default("audit_path", defaults.audit_path.clone())
            .map_err(config_err)?
            .set_default("error_reports_path", defaults.error_reports_path.clone())
            .map_err(config_err)?
            .set_default("conservative_allergy_default", defaults.conservative_allergy_default)
            .map_err(config_err)?
            .set_default("refuse_on_no_regimen", defaults.refuse_on_no_regimen)
            .map_err(config_err)?
            .set_default("cockcroft_gault_weight_policy", "ibw_adjbw")
            .map_err(config_err)?;

        if let Some(path) = toml_path {
            if path.exists() {
                builder = builder.add_source(config::File::from(path));
            }
        }

        builder = builder.add_source(config::Environment::with_prefix("ABX"));

        let built = builder.build().map_err(config_err)?;
        built.try_deserialize().map_err(config_err)
    }
}

fn config_err(e: config::ConfigError) -> AbxError {
    AbxError::ConfigError {
        reason: e.to_string(),
    }
}
