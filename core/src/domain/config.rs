// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Import Configuration
//
// Explicit configuration value built once at startup and passed by reference
// into every component:
// - OpenBao address, bearer token, KV mount and prefix, timeouts
// - Encrypted bundle and key file locations
// - Project directory holding `.env` and the init/unseal scripts
//
// Precedence: defaults < YAML file (--config) < environment < CLI flags.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportConfig {
    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub credentials: CredentialsConfig,

    #[serde(default)]
    pub project: ProjectConfig,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// OpenBao API address (VAULT_ADDR)
    #[serde(default = "default_address")]
    pub address: String,

    /// Bearer token (VAULT_TOKEN); never read from or written to YAML
    #[serde(skip)]
    pub token: Option<String>,

    /// KV v2 mount
    #[serde(default = "default_mount")]
    pub mount: String,

    /// Logical namespace for CSP secrets below the mount
    #[serde(default = "default_prefix")]
    pub prefix: String,

    #[serde(default = "default_status_timeout")]
    pub status_timeout_secs: u64,

    #[serde(default = "default_write_timeout")]
    pub write_timeout_secs: u64,
}

impl StoreConfig {
    pub fn status_timeout(&self) -> Duration {
        Duration::from_secs(self.status_timeout_secs)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_secs(self.write_timeout_secs)
    }

    pub fn has_token(&self) -> bool {
        self.token.as_deref().is_some_and(|t| !t.is_empty())
    }
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("address", &self.address)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("mount", &self.mount)
            .field("prefix", &self.prefix)
            .field("status_timeout_secs", &self.status_timeout_secs)
            .field("write_timeout_secs", &self.write_timeout_secs)
            .finish()
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            token: None,
            mount: default_mount(),
            prefix: default_prefix(),
            status_timeout_secs: default_status_timeout(),
            write_timeout_secs: default_write_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialsConfig {
    /// cb-tumblebug encrypted bundle
    #[serde(default = "default_bundle_path")]
    pub bundle_path: PathBuf,

    /// Conventional key file, tried after `key_file`
    #[serde(default = "default_key_file")]
    pub default_key_file: PathBuf,

    /// Explicit key file (--key-file)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_file: Option<PathBuf>,

    #[serde(default = "default_max_prompt_attempts")]
    pub max_prompt_attempts: u32,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            bundle_path: default_bundle_path(),
            default_key_file: default_key_file(),
            key_file: None,
            max_prompt_attempts: default_max_prompt_attempts(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Working directory for lifecycle scripts; relative paths below resolve
    /// against it
    #[serde(default = "default_project_dir")]
    pub dir: PathBuf,

    #[serde(default = "default_env_file")]
    pub env_file: PathBuf,

    #[serde(default = "default_init_script")]
    pub init_script: PathBuf,

    #[serde(default = "default_unseal_script")]
    pub unseal_script: PathBuf,
}

impl ProjectConfig {
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.dir.join(path)
        }
    }

    pub fn env_file_path(&self) -> PathBuf {
        self.resolve(&self.env_file)
    }

    pub fn init_script_path(&self) -> PathBuf {
        self.resolve(&self.init_script)
    }

    pub fn unseal_script_path(&self) -> PathBuf {
        self.resolve(&self.unseal_script)
    }
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            dir: default_project_dir(),
            env_file: default_env_file(),
            init_script: default_init_script(),
            unseal_script: default_unseal_script(),
        }
    }
}

impl ImportConfig {
    /// Parse configuration from YAML string
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let mut config: Self = serde_yaml::from_str(yaml)?;
        config.expand_paths();
        Ok(config)
    }

    /// Load configuration from YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config at {:?}", path))?;
        Self::from_yaml_str(&content)
            .with_context(|| format!("Failed to parse config at {:?}", path))
    }

    /// Explicit file if given (fail if missing/invalid), defaults otherwise
    pub fn load_or_default(cli_path: Option<&Path>) -> anyhow::Result<Self> {
        match cli_path {
            Some(path) => {
                tracing::info!("Loading configuration from explicit path: {:?}", path);
                Self::from_yaml_file(path)
            }
            None => {
                tracing::debug!("No configuration file given, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Apply VAULT_ADDR / VAULT_TOKEN from an environment snapshot.
    ///
    /// Takes a lookup function instead of reading `std::env` so the CLI
    /// bootstrap stays the only place that touches the process environment.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(address) = lookup("VAULT_ADDR").filter(|v| !v.is_empty()) {
            tracing::debug!("Environment override: VAULT_ADDR={}", address);
            self.store.address = address;
        }
        if let Some(token) = lookup("VAULT_TOKEN").filter(|v| !v.is_empty()) {
            tracing::debug!("Environment override: VAULT_TOKEN=<redacted>");
            self.store.token = Some(token);
        }
    }

    /// Replace a leading `~` in every configured path
    pub fn expand_paths(&mut self) {
        for path in [
            &mut self.credentials.bundle_path,
            &mut self.credentials.default_key_file,
            &mut self.project.dir,
            &mut self.project.env_file,
            &mut self.project.init_script,
            &mut self.project.unseal_script,
        ] {
            *path = expand_home(path);
        }
        if let Some(key_file) = self.credentials.key_file.as_mut() {
            *key_file = expand_home(key_file);
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.store.address.is_empty() {
            anyhow::bail!("store.address cannot be empty");
        }
        if !self.store.address.starts_with("http://") && !self.store.address.starts_with("https://") {
            anyhow::bail!(
                "Invalid store.address: '{}'. Must start with http:// or https://",
                self.store.address
            );
        }
        if self.store.mount.trim_matches('/').is_empty() {
            anyhow::bail!("store.mount cannot be empty");
        }
        if self.credentials.max_prompt_attempts == 0 {
            anyhow::bail!("credentials.max_prompt_attempts must be at least 1");
        }
        Ok(())
    }
}

/// `~` / `~/rest` → home directory based path
pub fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match dirs::home_dir() {
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}

/// `~/.cloud-barista`
pub fn cloud_barista_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("~"))
        .join(".cloud-barista")
}

fn default_address() -> String {
    "http://localhost:8200".to_string()
}

fn default_mount() -> String {
    "secret".to_string()
}

fn default_prefix() -> String {
    "csp".to_string()
}

fn default_status_timeout() -> u64 {
    5
}

fn default_write_timeout() -> u64 {
    10
}

fn default_bundle_path() -> PathBuf {
    cloud_barista_dir().join("credentials.yaml.enc")
}

fn default_key_file() -> PathBuf {
    cloud_barista_dir().join(".tmp_enc_key")
}

fn default_max_prompt_attempts() -> u32 {
    3
}

fn default_project_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_env_file() -> PathBuf {
    PathBuf::from(".env")
}

fn default_init_script() -> PathBuf {
    PathBuf::from("init/init-openbao.sh")
}

fn default_unseal_script() -> PathBuf {
    PathBuf::from("init/unseal-openbao.sh")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = ImportConfig::default();
        assert_eq!(config.store.address, "http://localhost:8200");
        assert_eq!(config.store.mount, "secret");
        assert_eq!(config.store.prefix, "csp");
        assert_eq!(config.store.status_timeout(), Duration::from_secs(5));
        assert_eq!(config.store.write_timeout(), Duration::from_secs(10));
        assert_eq!(config.credentials.max_prompt_attempts, 3);
        assert!(config.credentials.bundle_path.ends_with(".cloud-barista/credentials.yaml.enc"));
        assert!(config.credentials.default_key_file.ends_with(".cloud-barista/.tmp_enc_key"));
        assert!(!config.store.has_token());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_yaml_partial_override() {
        let yaml = r#"
store:
  address: https://bao.internal:8200
  prefix: clouds
credentials:
  max_prompt_attempts: 5
project:
  dir: /opt/terrarium
"#;
        let config = ImportConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.store.address, "https://bao.internal:8200");
        assert_eq!(config.store.mount, "secret");
        assert_eq!(config.store.prefix, "clouds");
        assert_eq!(config.credentials.max_prompt_attempts, 5);
        assert_eq!(
            config.project.init_script_path(),
            PathBuf::from("/opt/terrarium/init/init-openbao.sh")
        );
        assert_eq!(config.project.env_file_path(), PathBuf::from("/opt/terrarium/.env"));
    }

    #[test]
    fn test_token_is_never_serialized() {
        let mut config = ImportConfig::default();
        config.store.token = Some("s.super-secret".to_string());

        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(!yaml.contains("super-secret"));
        assert!(!format!("{:?}", config).contains("super-secret"));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("VAULT_ADDR", "http://10.0.0.5:8200"),
            ("VAULT_TOKEN", "s.token"),
        ]);
        let mut config = ImportConfig::default();
        config.apply_env_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.store.address, "http://10.0.0.5:8200");
        assert_eq!(config.store.token.as_deref(), Some("s.token"));
        assert!(config.store.has_token());
    }

    #[test]
    fn test_empty_env_values_are_ignored() {
        let mut config = ImportConfig::default();
        config.apply_env_overrides(|_| Some(String::new()));

        assert_eq!(config.store.address, "http://localhost:8200");
        assert!(config.store.token.is_none());
    }

    #[test]
    fn test_expand_home() {
        let expanded = expand_home(Path::new("~/.cloud-barista/key"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expanded, home.join(".cloud-barista/key"));
        }
        assert_eq!(expand_home(Path::new("/etc/key")), PathBuf::from("/etc/key"));
    }

    #[test]
    fn test_project_paths_expand_home() {
        let yaml = r#"
project:
  dir: /srv/terrarium
  env_file: ~/terrarium.env
  init_script: ~/bin/init-openbao.sh
  unseal_script: ~/bin/unseal-openbao.sh
"#;
        let config = ImportConfig::from_yaml_str(yaml).unwrap();
        if let Some(home) = dirs::home_dir() {
            assert_eq!(config.project.env_file_path(), home.join("terrarium.env"));
            assert_eq!(config.project.init_script_path(), home.join("bin/init-openbao.sh"));
            assert_eq!(config.project.unseal_script_path(), home.join("bin/unseal-openbao.sh"));
        }
    }

    #[test]
    fn test_validation() {
        let mut config = ImportConfig::default();
        config.store.address = "localhost:8200".to_string();
        assert!(config.validate().is_err());
        config.store.address = "http://localhost:8200".to_string();

        config.store.mount = "/".to_string();
        assert!(config.validate().is_err());
        config.store.mount = "secret".to_string();

        config.credentials.max_prompt_attempts = 0;
        assert!(config.validate().is_err());
    }
}
