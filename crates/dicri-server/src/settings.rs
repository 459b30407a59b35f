//! Runtime server configuration, deserialised from `config.toml` and
//! `DICRI_*` environment variables.

use std::path::{Path, PathBuf};

use dicri_core::{lifecycle::CaseState, policy::WorkflowConfig};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                          String,
  #[serde(default = "default_port")]
  pub port:                          u16,
  #[serde(default = "default_store_path")]
  pub store_path:                    PathBuf,
  /// When all three are set, this administrator is created at startup
  /// unless a user with the email already exists.
  pub bootstrap_admin_email:         Option<String>,
  pub bootstrap_admin_name:          Option<String>,
  /// argon2 PHC string, see `--hash-password`.
  pub bootstrap_admin_password_hash: Option<String>,
  /// States in which a technician may still edit their own case.
  #[serde(default = "default_editable_states")]
  pub technician_editable_states:    Vec<CaseState>,
}

fn default_host() -> String { "127.0.0.1".to_owned() }

fn default_port() -> u16 { 8080 }

fn default_store_path() -> PathBuf { PathBuf::from("dicri.db") }

fn default_editable_states() -> Vec<CaseState> { WorkflowConfig::default().technician_editable_states }

/// The bootstrap administrator, if fully configured.
pub struct BootstrapAdmin {
  pub email:         String,
  pub name:          String,
  pub password_hash: String,
}

impl ServerConfig {
  pub fn workflow(&self) -> WorkflowConfig {
    WorkflowConfig { technician_editable_states: self.technician_editable_states.clone() }
  }

  pub fn bootstrap_admin(&self) -> Option<BootstrapAdmin> {
    Some(BootstrapAdmin {
      email:         self.bootstrap_admin_email.clone()?,
      name:          self.bootstrap_admin_name.clone()?,
      password_hash: self.bootstrap_admin_password_hash.clone()?,
    })
  }

  /// Build the configuration from an optional TOML file plus `DICRI_*`
  /// environment overrides.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("DICRI"))
      .build()?
      .try_deserialize()
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn from_toml(src: &str) -> ServerConfig {
    config::Config::builder()
      .add_source(config::File::from_str(src, config::FileFormat::Toml))
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap()
  }

  #[test]
  fn defaults_apply() {
    let cfg = from_toml("");
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.store_path, PathBuf::from("dicri.db"));
    assert_eq!(cfg.workflow(), WorkflowConfig::default());
    assert!(cfg.bootstrap_admin().is_none());
  }

  #[test]
  fn editable_states_and_admin_are_read() {
    let cfg = from_toml(
      r#"
        port = 9000
        technician_editable_states = ["open", "in_process"]
        bootstrap_admin_email = "admin@mp.gob.gt"
        bootstrap_admin_name = "Admin"
        bootstrap_admin_password_hash = "$argon2id$v=19$stub"
      "#,
    );
    assert_eq!(cfg.port, 9000);
    assert_eq!(cfg.technician_editable_states, vec![
      CaseState::Open,
      CaseState::InProcess
    ]);
    let admin = cfg.bootstrap_admin().unwrap();
    assert_eq!(admin.email, "admin@mp.gob.gt");
  }

  #[test]
  fn partial_bootstrap_is_ignored() {
    let cfg = from_toml(r#"bootstrap_admin_email = "admin@mp.gob.gt""#);
    assert!(cfg.bootstrap_admin().is_none());
  }

  #[test]
  fn absolute_paths_are_untouched() {
    let expanded = expand_tilde(Path::new("/var/lib/dicri.db"));
    assert_eq!(expanded, PathBuf::from("/var/lib/dicri.db"));
  }
}
