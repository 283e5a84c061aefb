//! Server configuration, loaded from a TOML file.
//!
//! The `-c` argument takes either a deployment name (resolved to
//! `/etc/pondok/<name>.toml`) or a direct path (anything containing `/`
//! or `.`).

use std::path::{Path, PathBuf};

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub storage: StorageConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub media: MediaConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Root directory for the embedded database and blob store.
    pub data_dir: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    /// HMAC secret shared with the identity provider that issues tokens.
    pub secret: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaConfig {
    /// External URL prefix the API is reachable under; stored image URLs
    /// are minted against this (e.g. "https://ponpes.example.org/api").
    pub base_url: String,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api".into(),
        }
    }
}

impl ServerConfig {
    pub fn resolve_path(name_or_path: &str) -> PathBuf {
        if name_or_path.contains('/') || name_or_path.contains('.') {
            PathBuf::from(name_or_path)
        } else {
            PathBuf::from(format!("/etc/pondok/{}.toml", name_or_path))
        }
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("cannot read {}: {}", path.display(), e))?;
        let config: ServerConfig = toml::from_str(&content)?;
        config.verify()?;
        Ok(config)
    }

    fn verify(&self) -> anyhow::Result<()> {
        if self.storage.data_dir.trim().is_empty() {
            anyhow::bail!("storage.data_dir must not be empty");
        }
        if self.jwt.secret.len() < 16 {
            anyhow::bail!("jwt.secret must be at least 16 bytes");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_names_and_paths() {
        assert_eq!(
            ServerConfig::resolve_path("prod"),
            PathBuf::from("/etc/pondok/prod.toml")
        );
        assert_eq!(
            ServerConfig::resolve_path("./local.toml"),
            PathBuf::from("./local.toml")
        );
    }

    #[test]
    fn loads_and_verifies() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pondok.toml");
        std::fs::write(
            &path,
            r#"
[storage]
data_dir = "/var/lib/pondok"

[jwt]
secret = "a-long-enough-test-secret"

[media]
base_url = "https://ponpes.example.org/api"
"#,
        )
        .unwrap();
        let config = ServerConfig::load(&path).unwrap();
        assert_eq!(config.storage.data_dir, "/var/lib/pondok");
        assert_eq!(config.media.base_url, "https://ponpes.example.org/api");
    }

    #[test]
    fn rejects_weak_secret() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pondok.toml");
        std::fs::write(
            &path,
            "[storage]\ndata_dir = \"/tmp/x\"\n\n[jwt]\nsecret = \"short\"\n",
        )
        .unwrap();
        assert!(ServerConfig::load(&path).is_err());
    }
}
