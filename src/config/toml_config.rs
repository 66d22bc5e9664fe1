use crate::adapters::discord::{parse_discord_color, DEFAULT_FAILURE_COLOR, DEFAULT_SUCCESS_COLOR};
use crate::core::{DeployTarget, PrivilegeContext, StatusPolicy};
use crate::utils::error::{DeployError, Result};
use crate::utils::validation::{
    validate_absolute_path, validate_non_empty_string, validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Picked up from the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "otternel-deploy.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub target: TargetConfig,
    pub source: SourceConfig,
    pub privilege: PrivilegeConfig,
    pub report: ReportConfig,
    pub notify: NotifyConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    pub service: String,
    pub artifact: String,
    pub project_dir: PathBuf,
    pub install_path: PathBuf,
}

impl Default for TargetConfig {
    fn default() -> Self {
        let target = DeployTarget::default();
        Self {
            service: target.service,
            artifact: target.artifact,
            project_dir: target.project_dir,
            install_path: target.install_path,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub remote: String,
    pub branch: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            remote: "origin".to_string(),
            branch: "main".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrivilegeConfig {
    /// Empty means privileged steps run as the current user.
    pub command: String,
    pub args: Vec<String>,
}

impl Default for PrivilegeConfig {
    fn default() -> Self {
        Self {
            command: "sudo".to_string(),
            args: vec!["-n".to_string()],
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub require_running: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    pub enabled: bool,
    pub url: String,
    pub username: Option<String>,
    pub success_color: Option<String>,
    pub failure_color: Option<String>,
}

impl NotifyConfig {
    pub fn success_color(&self) -> Result<u32> {
        Self::color("notify.success_color", &self.success_color, DEFAULT_SUCCESS_COLOR)
    }

    pub fn failure_color(&self) -> Result<u32> {
        Self::color("notify.failure_color", &self.failure_color, DEFAULT_FAILURE_COLOR)
    }

    fn color(field: &str, value: &Option<String>, default: u32) -> Result<u32> {
        match value {
            None => Ok(default),
            Some(raw) => parse_discord_color(raw).ok_or_else(|| DeployError::InvalidConfigValueError {
                field: field.to_string(),
                value: raw.clone(),
                reason: "expected #RRGGBB, 0xRRGGBB, RRGGBB or a decimal number".to_string(),
            }),
        }
    }
}

impl TomlConfig {
    /// Explicit path, else `otternel-deploy.toml` in the working directory, else built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => Self::from_file(DEFAULT_CONFIG_FILE),
            None => Ok(Self::default()),
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            DeployError::config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content)
            .map_err(|e| DeployError::config(format!("TOML parsing error: {}", e)))
    }

    /// Replaces `${VAR}` with the environment value; unset variables stay verbatim.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}")
            .map_err(|e| DeployError::config(format!("env substitution pattern: {}", e)))?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn target(&self) -> DeployTarget {
        DeployTarget::new(
            self.target.service.clone(),
            self.target.artifact.clone(),
            self.target.project_dir.clone(),
            self.target.install_path.clone(),
        )
        .with_source(self.source.remote.clone(), self.source.branch.clone())
    }

    pub fn status_policy(&self) -> StatusPolicy {
        if self.report.require_running {
            StatusPolicy::RequireRunning
        } else {
            StatusPolicy::Informational
        }
    }

    /// How privileged commands would be run, without probing the escalation command.
    /// Used to render the dry-run plan.
    pub fn privilege_preview(&self) -> PrivilegeContext {
        if self.privilege.command.trim().is_empty() {
            PrivilegeContext::already_elevated()
        } else {
            PrivilegeContext::escalated(
                self.privilege.command.clone(),
                self.privilege.args.clone(),
            )
        }
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_non_empty_string("target.service", &self.target.service)?;
        validate_non_empty_string("target.artifact", &self.target.artifact)?;
        validate_absolute_path("target.project_dir", &self.target.project_dir)?;
        validate_absolute_path("target.install_path", &self.target.install_path)?;
        validate_non_empty_string("source.remote", &self.source.remote)?;
        validate_non_empty_string("source.branch", &self.source.branch)?;

        if self.notify.enabled {
            validate_url("notify.url", &self.notify.url)?;
        }
        self.notify.success_color()?;
        self.notify.failure_color()?;

        Ok(())
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
