use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use artconfig::ArtConfig;
use directories_next::ProjectDirs;

pub const ENV_CONFIG_DIR: &str = "POLLOCK_CONFIG_DIR";

const QUALIFIER: &str = "org";
const ORGANISATION: &str = "ProceduralPollock";
const APPLICATION: &str = "pollock";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone)]
pub struct AppPaths {
    config_dir: PathBuf,
}

impl AppPaths {
    pub fn discover() -> Result<Self> {
        if let Some(config_dir) = env_override(ENV_CONFIG_DIR) {
            return Ok(Self { config_dir });
        }

        let project_dirs = ProjectDirs::from(QUALIFIER, ORGANISATION, APPLICATION)
            .ok_or_else(|| anyhow!("failed to determine user directories"))?;
        Ok(Self {
            config_dir: project_dirs.config_dir().to_path_buf(),
        })
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE)
    }
}

fn env_override(key: &str) -> Option<PathBuf> {
    env::var_os(key)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

/// Loads `explicit` if given, else the discovered config file.
///
/// A missing discovered file yields defaults; a missing explicit file is an error.
pub fn load_config(explicit: Option<&Path>) -> Result<ArtConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let paths = AppPaths::discover()?;
            let path = paths.config_file();
            if !path.exists() {
                tracing::debug!(
                    dir = %paths.config_dir().display(),
                    "no config file; using defaults"
                );
                return Ok(ArtConfig::default());
            }
            path
        }
    };

    let raw = fs::read_to_string(&path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config = ArtConfig::from_toml_str(&raw)
        .with_context(|| format!("failed to load config {}", path.display()))?;
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, OnceLock};
    use tempfile::TempDir;

    fn env_lock() -> &'static Mutex<()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
    }

    struct EnvGuard {
        key: &'static str,
        previous: Option<std::ffi::OsString>,
    }

    impl EnvGuard {
        fn set(key: &'static str, value: &Path) -> Self {
            let previous = env::var_os(key);
            env::set_var(key, value);
            Self { key, previous }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            if let Some(value) = self.previous.take() {
                env::set_var(self.key, value);
            } else {
                env::remove_var(self.key);
            }
        }
    }

    #[test]
    fn env_override_takes_precedence() {
        let _guard = env_lock().lock().unwrap();
        let root = TempDir::new().unwrap();
        let _config = EnvGuard::set(ENV_CONFIG_DIR, root.path());

        let paths = AppPaths::discover().unwrap();
        assert_eq!(paths.config_dir(), root.path());
        assert_eq!(paths.config_file(), root.path().join("config.toml"));
    }

    #[test]
    fn missing_discovered_config_yields_defaults() {
        let _guard = env_lock().lock().unwrap();
        let root = TempDir::new().unwrap();
        let _config = EnvGuard::set(ENV_CONFIG_DIR, root.path());

        let config = load_config(None).unwrap();
        assert_eq!(config, ArtConfig::default());
    }

    #[test]
    fn discovered_config_is_parsed() {
        let _guard = env_lock().lock().unwrap();
        let root = TempDir::new().unwrap();
        fs::write(
            root.path().join("config.toml"),
            "version = 1\n[generator]\nseed = 99\n",
        )
        .unwrap();
        let _config = EnvGuard::set(ENV_CONFIG_DIR, root.path());

        let config = load_config(None).unwrap();
        assert_eq!(config.generator.seed, Some(99));
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let root = TempDir::new().unwrap();
        let err = load_config(Some(&root.path().join("absent.toml"))).unwrap_err();
        assert!(err.to_string().contains("failed to read config"));
    }
}
