use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_error_names_the_path() {
        let err = SettingsError::Write {
            path: "/var/lib/quirkd/state.toml".into(),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        let msg = err.to_string();
        assert!(msg.contains("state.toml"));
        assert!(msg.contains("Failed to write"));
    }

    #[test]
    fn parse_error_names_the_path() {
        let bad = "not = = toml".parse::<toml::Table>().unwrap_err();
        let err = SettingsError::Parse {
            path: "/tmp/state.toml".into(),
            source: bad,
        };
        assert!(err.to_string().contains("/tmp/state.toml"));
    }
}
