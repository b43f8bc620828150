use serde::Serialize;
use std::path::{Path, PathBuf};

/// Env var naming an explicit env file. Values from it override the process env.
pub const ENV_FILE_VAR: &str = "ENV_FILE";

/// Provider credentials the engine knows how to use.
pub const CREDENTIAL_KEYS: [&str; 6] = [
    "BRAVE_API_KEY",
    "ANTHROPIC_API_KEY",
    "OPENAI_API_KEY",
    "GOOGLE_API_KEY",
    "OPENROUTER_API_KEY",
    "XAI_API_KEY",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EnvSource {
    /// `ENV_FILE` pointed at this file.
    File { path: PathBuf },
    /// `.env` in the working directory.
    Default { path: PathBuf },
    /// No env file was found.
    None,
}

/// What happened while loading the environment. Never contains secret values.
#[derive(Debug, Clone, Serialize)]
pub struct EnvReport {
    pub source: EnvSource,
    pub error: Option<String>,
    pub credentials: Vec<&'static str>,
}

impl EnvReport {
    pub fn has_credentials(&self) -> bool {
        !self.credentials.is_empty()
    }

    /// Emit the report as log events (warnings for failures and missing keys).
    pub fn log(&self) {
        match (&self.source, &self.error) {
            (EnvSource::File { path }, None) => {
                tracing::info!(path = %path.display(), "loaded environment from ENV_FILE")
            }
            (EnvSource::File { path }, Some(e)) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to load ENV_FILE");
                tracing::warn!("ENV_FILE should point to a readable .env file with your API keys");
            }
            (EnvSource::Default { path }, _) => {
                tracing::debug!(path = %path.display(), "loaded default .env")
            }
            (EnvSource::None, Some(e)) => tracing::warn!(error = %e, "failed to load .env"),
            (EnvSource::None, None) => {
                tracing::debug!("no ENV_FILE specified and no .env present")
            }
        }
        if !self.has_credentials() {
            tracing::warn!(
                keys = %CREDENTIAL_KEYS.join(","),
                "no API keys found in environment; set ENV_FILE to point at a .env file with your keys"
            );
        }
    }
}

/// Load `ENV_FILE` (overriding) or else `./.env` (non-overriding).
///
/// Never fails: problems are recorded in the report for the caller to log.
pub fn load_env() -> EnvReport {
    let explicit = std::env::var(ENV_FILE_VAR)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    let (source, error) = match explicit {
        Some(p) => {
            let path = absolute(Path::new(&p));
            let error = dotenvy::from_path_override(&path)
                .err()
                .map(|e| e.to_string());
            (EnvSource::File { path }, error)
        }
        // Only the working directory; dotenvy::dotenv() would also walk parent dirs.
        None => {
            let path = absolute(Path::new(".env"));
            match dotenvy::from_path(&path) {
                Ok(()) => (EnvSource::Default { path }, None),
                Err(e) if e.not_found() => (EnvSource::None, None),
                Err(e) => (EnvSource::None, Some(e.to_string())),
            }
        }
    };

    EnvReport {
        source,
        error,
        credentials: configured_credentials(),
    }
}

/// Names (not values) of the credential keys currently set to something non-blank.
pub fn configured_credentials() -> Vec<&'static str> {
    CREDENTIAL_KEYS
        .into_iter()
        .filter(|k| has_env(k))
        .collect()
}

pub(crate) fn has_env(k: &str) -> bool {
    std::env::var(k).ok().is_some_and(|v| !v.trim().is_empty())
}

pub(crate) fn env_nonempty(k: &str) -> Option<String> {
    std::env::var(k)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn absolute(p: &Path) -> PathBuf {
    if p.is_absolute() {
        return p.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(p))
        .unwrap_or_else(|_| p.to_path_buf())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;

    // Env vars are process-global; serialize tests that touch them.
    pub(crate) static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

    pub(crate) struct EnvGuard {
        _lock: std::sync::MutexGuard<'static, ()>,
        saved: Vec<(String, Option<String>)>,
    }

    impl EnvGuard {
        pub(crate) fn new(keys: &[&str]) -> Self {
            let lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
            let saved: Vec<(String, Option<String>)> = keys
                .iter()
                .map(|k| (k.to_string(), std::env::var(k).ok()))
                .collect();
            for (k, _) in &saved {
                std::env::remove_var(k);
            }
            Self { _lock: lock, saved }
        }

        pub(crate) fn set(&self, k: &str, v: &str) {
            std::env::set_var(k, v);
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for (k, v) in self.saved.drain(..) {
                match v {
                    Some(val) => std::env::set_var(k, val),
                    None => std::env::remove_var(k),
                }
            }
        }
    }

    fn all_keys() -> Vec<&'static str> {
        let mut keys = CREDENTIAL_KEYS.to_vec();
        keys.push(ENV_FILE_VAR);
        keys
    }

    #[test]
    fn blank_credentials_count_as_missing() {
        let g = EnvGuard::new(&all_keys());
        g.set("BRAVE_API_KEY", "   ");
        g.set("XAI_API_KEY", "x-123");
        assert_eq!(configured_credentials(), vec!["XAI_API_KEY"]);
    }

    #[test]
    fn env_file_overrides_process_env() {
        let g = EnvGuard::new(&all_keys());
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "# keys").unwrap();
        writeln!(f, "OPENAI_API_KEY=\"from-file\"").unwrap();
        g.set("OPENAI_API_KEY", "from-process");
        g.set(ENV_FILE_VAR, f.path().to_str().unwrap());

        let report = load_env();
        assert!(report.error.is_none(), "{:?}", report.error);
        assert_eq!(
            report.source,
            EnvSource::File {
                path: f.path().to_path_buf()
            }
        );
        assert_eq!(std::env::var("OPENAI_API_KEY").unwrap(), "from-file");
        assert!(report.credentials.contains(&"OPENAI_API_KEY"));
    }

    #[test]
    fn unreadable_env_file_is_reported_not_fatal() {
        let g = EnvGuard::new(&all_keys());
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.env");
        g.set(ENV_FILE_VAR, missing.to_str().unwrap());

        let report = load_env();
        assert!(report.error.is_some());
        assert!(!report.has_credentials());
        let v = serde_json::to_value(&report).unwrap();
        assert_eq!(v["source"]["kind"], "file");
    }
}
