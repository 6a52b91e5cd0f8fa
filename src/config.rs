use std::path::PathBuf;

use anyhow::Context;

/// Connection settings read from the environment (and `.env`, when present).
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub database_url: Option<String>,
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub snapshot_dir: Option<PathBuf>,
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            database_url: value("DATABASE_URL"),
            api_url: value("DASHBOARD_API_URL"),
            api_key: value("DASHBOARD_API_KEY"),
            snapshot_dir: value("DASHBOARD_SNAPSHOT_DIR").map(PathBuf::from),
        }
    }

    pub fn database_url(&self) -> anyhow::Result<&str> {
        self.database_url
            .as_deref()
            .context("DATABASE_URL must be set to a Postgres instance")
    }

    pub fn api_url(&self) -> anyhow::Result<&str> {
        self.api_url
            .as_deref()
            .context("DASHBOARD_API_URL must be set to use the api source")
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn blank_values_count_as_unset() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("DATABASE_URL", "postgres://localhost/courses"),
            ("DASHBOARD_API_URL", "  "),
            ("DASHBOARD_SNAPSHOT_DIR", "data/snapshot"),
        ]);
        let settings = Settings::from_lookup(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(settings.database_url().unwrap(), "postgres://localhost/courses");
        assert!(settings.api_url().is_err());
        assert_eq!(settings.snapshot_dir, Some(PathBuf::from("data/snapshot")));
        assert_eq!(settings.api_key, None);
    }
}
