//! dicri-server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), opens the SQLite
//! store, seeds the bootstrap administrator and serves the JSON API over HTTP.
//!
//! # Password hash generation
//!
//! To generate the argon2 PHC string for `bootstrap_admin_password_hash`:
//!
//! ```text
//! cargo run -p dicri-server -- --hash-password
//! ```

mod settings;

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use dicri_api::{AppState, auth::hash_password};
use dicri_core::{CaseService, lookup::Role, user::NewUser};
use dicri_store_sqlite::SqliteStore;
use settings::{ServerConfig, expand_tilde};
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "DICRI case workflow server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Print the argon2 hash for a password entered on stdin and exit.
  #[arg(long)]
  hash_password: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  if cli.hash_password {
    let password = read_password()?;
    println!("{}", hash_password(&password)?);
    return Ok(());
  }

  let server_cfg = ServerConfig::load(&cli.config).context("failed to read configuration")?;

  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let service = CaseService::load(Arc::new(store), server_cfg.workflow())
    .await
    .context("failed to load lookup catalogs")?;

  match server_cfg.bootstrap_admin() {
    Some(admin) => {
      let role_id = service
        .registry()
        .roles()
        .iter()
        .find(|row| Role::from_name(&row.name) == Some(Role::Admin))
        .map(|row| row.id)
        .context("no role row resolves to admin")?;
      let user = service
        .bootstrap_user(NewUser {
          email: admin.email,
          name: admin.name,
          role_id: Some(role_id),
          password_hash: admin.password_hash,
        })
        .await
        .context("failed to seed bootstrap administrator")?;
      tracing::info!(user = user.id, email = %user.email, "bootstrap administrator ready");
    }
    None => tracing::warn!("no bootstrap administrator configured"),
  }

  let app = dicri_api::router(AppState::new(service));
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Read a password line from stdin.
fn read_password() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  let password = line.trim_end_matches(['\n', '\r']).to_owned();
  anyhow::ensure!(!password.is_empty(), "password must not be empty");
  Ok(password)
}
