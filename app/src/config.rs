use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub backend_url: String,
    pub page_size: usize,
}

pub struct AppConfigOverrides {
    pub log_level: Option<String>,
    pub backend_url: Option<String>,
    pub page_size: Option<usize>,
}

fn default_config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".clipshelf")
        .join("config.toml")
}

impl AppConfig {
    pub fn load_from(path: Option<PathBuf>) -> Self {
        let mut builder = config::Config::builder();
        let path = path.unwrap_or_else(default_config_path);
        builder = builder.add_source(config::File::from(path).required(false));
        let cfg = builder.build().unwrap_or_default();

        let log_level = cfg
            .get_string("log_level")
            .unwrap_or_else(|_| "info".to_string());
        let backend_url = cfg
            .get_string("backend_url")
            .unwrap_or_else(|_| "ws://127.0.0.1:8877".to_string());
        let page_size = cfg.get_int("page_size").unwrap_or(40).max(1) as usize;

        Self {
            log_level,
            backend_url,
            page_size,
        }
    }

    pub fn apply_overrides(mut self, ov: &AppConfigOverrides) -> Self {
        if let Some(l) = &ov.log_level {
            self.log_level = l.clone();
        }
        if let Some(u) = &ov.backend_url {
            self.backend_url = u.clone();
        }
        if let Some(p) = ov.page_size {
            self.page_size = p.max(1);
        }
        self
    }

    pub fn save_to(&self, path: Option<PathBuf>) -> std::io::Result<()> {
        let path = path.unwrap_or_else(default_config_path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let data = toml::to_string(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        std::fs::write(path, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = AppConfig::load_from(Some(dir.path().join("config.toml")));
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.backend_url, "ws://127.0.0.1:8877");
        assert_eq!(cfg.page_size, 40);
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = AppConfig {
            log_level: "debug".into(),
            backend_url: "ws://127.0.0.1:9000".into(),
            page_size: 25,
        };
        cfg.save_to(Some(path.clone())).unwrap();

        let loaded = AppConfig::load_from(Some(path));
        assert_eq!(loaded.log_level, "debug");
        assert_eq!(loaded.backend_url, "ws://127.0.0.1:9000");
        assert_eq!(loaded.page_size, 25);
    }

    #[test]
    fn overrides_take_precedence() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = AppConfig::load_from(Some(dir.path().join("config.toml"))).apply_overrides(
            &AppConfigOverrides {
                log_level: Some("trace".into()),
                backend_url: None,
                page_size: Some(0),
            },
        );
        assert_eq!(cfg.log_level, "trace");
        assert_eq!(cfg.backend_url, "ws://127.0.0.1:8877");
        // A zero page size is clamped rather than accepted.
        assert_eq!(cfg.page_size, 1);
    }
}

