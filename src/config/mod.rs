//! Runtime settings: `.env` loading and the resolved server configuration.
//!
//! Precedence is CLI flag > environment (including `.env`) > built-in
//! default. clap handles the first two; this module supplies the rest.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};

use crate::consts::home_env_path;
use crate::engine::collage::CollageConfig;
use crate::history::HistoryScope;
use crate::painter::ImageParams;

/// What happened while looking for `.env` files.
///
/// Built before logging is up, so the caller reports it afterwards.
#[derive(Debug, Default)]
pub struct DotenvReport {
    pub loaded: Option<PathBuf>,
    pub errors: Vec<anyhow::Error>,
}

/// Load a `.env` file into the process environment.
///
/// Tries `~/.imagist/.env` first, then `./.env`. Variables already set in
/// the environment win.
pub fn load_dotenv() -> DotenvReport {
    load_dotenv_from(home_env_path().as_deref(), Path::new(".env"))
}

/// Load the first candidate that exists and parses. A broken file is
/// recorded and the next candidate is still tried.
pub fn load_dotenv_from(home: Option<&Path>, local: &Path) -> DotenvReport {
    let mut report = DotenvReport::default();
    for path in home.into_iter().chain([local]) {
        if !path.exists() {
            continue;
        }
        match load_env_file(path) {
            Ok(()) => {
                report.loaded = Some(path.to_path_buf());
                break;
            }
            Err(e) => report.errors.push(e),
        }
    }
    report
}

/// Load one specific `.env` file.
pub fn load_env_file(path: &Path) -> Result<()> {
    dotenvy::from_path(path)
        .with_context(|| format!("failed to load env file {}", path.display()))
}

/// Everything the binary needs to build an engine and a server.
#[derive(Debug, Clone)]
pub struct Settings {
    pub addr: SocketAddr,
    pub params: ImageParams,
    pub api_base: Option<String>,
    pub timeout: Option<Duration>,
    pub sequential: bool,
    pub scope: HistoryScope,
}

impl Settings {
    pub fn collage_config(&self) -> CollageConfig {
        CollageConfig {
            params: self.params.clone(),
            sequential: self.sequential,
        }
    }

    pub fn scope_label(&self) -> &'static str {
        match self.scope {
            HistoryScope::Shared => "shared",
            HistoryScope::PerSession => "per-session",
        }
    }

    pub fn ordering_label(&self) -> &'static str {
        if self.sequential {
            "sequential"
        } else {
            "concurrent"
        }
    }
}

/// Parse a `host:port` pair into a socket address.
pub fn bind_addr(host: &str, port: u16) -> Result<SocketAddr> {
    format!("{host}:{port}")
        .parse()
        .with_context(|| format!("invalid listen address {host}:{port}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn settings(sequential: bool, scope: HistoryScope) -> Settings {
        Settings {
            addr: bind_addr("127.0.0.1", 7860).unwrap(),
            params: ImageParams::default(),
            api_base: None,
            timeout: None,
            sequential,
            scope,
        }
    }

    #[test]
    fn bind_addr_parses_ipv4() {
        let addr = bind_addr("0.0.0.0", 8080).unwrap();
        assert_eq!(addr.port(), 8080);
        assert!(addr.ip().is_unspecified());
    }

    #[test]
    fn bind_addr_rejects_hostname_garbage() {
        assert!(bind_addr("not a host", 80).is_err());
    }

    #[test]
    fn collage_config_carries_params_and_ordering() {
        let config = settings(true, HistoryScope::Shared).collage_config();
        assert!(config.sequential);
        assert_eq!(config.params, ImageParams::default());
    }

    #[test]
    fn labels() {
        let s = settings(false, HistoryScope::PerSession);
        assert_eq!(s.scope_label(), "per-session");
        assert_eq!(s.ordering_label(), "concurrent");
        let s = settings(true, HistoryScope::Shared);
        assert_eq!(s.scope_label(), "shared");
        assert_eq!(s.ordering_label(), "sequential");
    }

    #[test]
    fn load_env_file_sets_variables() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "IMAGIST_TEST_DOTENV_VALUE=from-file").unwrap();

        load_env_file(&path).unwrap();
        assert_eq!(
            std::env::var("IMAGIST_TEST_DOTENV_VALUE").unwrap(),
            "from-file"
        );
    }

    #[test]
    fn malformed_home_file_falls_back_to_local() {
        let dir = tempfile::tempdir().unwrap();
        let home = dir.path().join("home.env");
        std::fs::write(&home, "this line has no equals sign\n").unwrap();
        let local = dir.path().join("local.env");
        std::fs::write(&local, "IMAGIST_TEST_DOTENV_FALLBACK=from-local\n").unwrap();

        let report = load_dotenv_from(Some(&home), &local);
        assert_eq!(report.loaded.as_deref(), Some(local.as_path()));
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].to_string().contains("home.env"));
        assert_eq!(
            std::env::var("IMAGIST_TEST_DOTENV_FALLBACK").unwrap(),
            "from-local"
        );
    }

    #[test]
    fn home_file_wins_over_local() {
        let dir = tempfile::tempdir().unwrap();
        let home = dir.path().join("home.env");
        std::fs::write(&home, "IMAGIST_TEST_DOTENV_HOME=from-home\n").unwrap();
        let local = dir.path().join("local.env");
        std::fs::write(&local, "IMAGIST_TEST_DOTENV_HOME_LOCAL=from-local\n").unwrap();

        let report = load_dotenv_from(Some(&home), &local);
        assert_eq!(report.loaded.as_deref(), Some(home.as_path()));
        assert!(report.errors.is_empty());
        assert!(std::env::var("IMAGIST_TEST_DOTENV_HOME_LOCAL").is_err());
    }

    #[test]
    fn no_env_files_is_quiet() {
        let dir = tempfile::tempdir().unwrap();
        let report = load_dotenv_from(None, &dir.path().join(".env"));
        assert!(report.loaded.is_none());
        assert!(report.errors.is_empty());
    }

    #[test]
    fn load_env_file_missing_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_env_file(&dir.path().join("nope.env")).unwrap_err();
        assert!(err.to_string().contains("nope.env"));
    }
}
