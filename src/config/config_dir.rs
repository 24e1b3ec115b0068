use std::{
    fs::File,
    io::Read,
    path::{Path, PathBuf},
};

use tracing::debug;

use super::error::{ConfigError, ConfigResult};

/// Overrides every other lookup location when set.
pub static CONFIG_ENV: &str = "COURSEHUB_CONFIG";

pub fn find_config_file(use_local: bool) -> PathBuf {
    if let Some(explicit) = std::env::var_os(CONFIG_ENV) {
        return PathBuf::from(explicit);
    }

    if use_local {
        return PathBuf::from("./config.toml");
    }

    user_config_file().unwrap_or_else(|| PathBuf::from("./config.toml"))
}

fn user_config_file() -> Option<PathBuf> {
    #[cfg(unix)]
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")));
    #[cfg(windows)]
    let base = std::env::var_os("APPDATA").map(PathBuf::from);
    #[cfg(not(any(unix, windows)))]
    let base: Option<PathBuf> = None;

    let path = base?.join(crate::APPLICATION_NAME).join("config.toml");
    path.exists().then_some(path)
}

pub fn read_config(use_local: bool) -> ConfigResult<Vec<u8>> {
    let filename = find_config_file(use_local);
    tracing::trace!("looking for config at: {}", filename.display());
    read_config_from(&filename)
}

pub fn read_config_from(filename: &Path) -> ConfigResult<Vec<u8>> {
    if !filename.exists() {
        return Err(ConfigError::ConfigNotFound);
    }

    let filename = filename.canonicalize()?;
    debug!("using {} as configuration file", filename.display());

    let mut fd = File::open(filename)?;
    let mut buf = Vec::new();
    fd.read_to_end(&mut buf)?;

    Ok(buf)
}

#[cfg(test)]
mod test {
    use std::fs;
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn test_find_config_file_local() {
        if std::env::var_os(CONFIG_ENV).is_none() {
            let path = find_config_file(true);
            assert_eq!(path, PathBuf::from("./config.toml"));
        }
    }

    #[test]
    fn test_read_config_from_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("config.toml");
        fs::write(&file_path, b"foo = 'bar'").unwrap();

        let result = read_config_from(&file_path);
        assert_eq!(result.unwrap(), b"foo = 'bar'");
    }

    #[test]
    fn test_read_config_missing_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let result = read_config_from(&temp_dir.path().join("absent.toml"));
        assert!(matches!(result, Err(ConfigError::ConfigNotFound)));
    }
}
