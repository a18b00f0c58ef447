//! Configuration handling for the rewrite CLI
//!
//! Manages the hql-rewrite.toml configuration file.
//!
//! ## Environment Variables
//!
//! The following environment variables can override config file settings:
//!
//! - `HQL_REWRITE_SORT` - Sort terms separated by `;`, each `property[,asc|desc][,ignorecase]`
//! - `HQL_REWRITE_COUNT` - Produce a count query (`true`/`false`/`1`/`0`)
//! - `HQL_REWRITE_COUNT_PROJECTION` - Expression counted instead of the primary alias
//!
//! These can be set in a `.env` file in the configuration directory.

use std::path::Path;

use hql_core::{HqlQueryTransformer, Order, Sort};
use serde::{Deserialize, Serialize};

use crate::error::{RewriteError, RewriteResult};

/// Configuration file name
pub const CONFIG_FILE_NAME: &str = "hql-rewrite.toml";

/// Environment variable names
pub const ENV_SORT: &str = "HQL_REWRITE_SORT";
pub const ENV_COUNT: &str = "HQL_REWRITE_COUNT";
pub const ENV_COUNT_PROJECTION: &str = "HQL_REWRITE_COUNT_PROJECTION";

/// How queries are rewritten
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RewriteConfig {
    /// Rewrite into a count query instead of sorting
    #[serde(default)]
    pub count: bool,
    /// Expression counted instead of the primary alias
    #[serde(default)]
    pub count_projection: Option<String>,
    /// Sort terms appended to the outer query
    #[serde(default)]
    pub sort: Vec<Order>,
}

impl RewriteConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> RewriteResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: RewriteConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a directory
    ///
    /// Loads `.env` from the directory when present, then `hql-rewrite.toml`
    /// (defaults when missing), then applies environment variable overrides.
    pub fn load_from_dir(dir: &Path) -> RewriteResult<Self> {
        // Load env file if present (ignore errors)
        let env_path = dir.join(".env");
        if env_path.exists() {
            let _ = dotenvy::from_path(&env_path);
        }

        let config_path = dir.join(CONFIG_FILE_NAME);
        let mut config = if config_path.exists() {
            Self::load(&config_path)?
        } else {
            tracing::debug!("No {} in {}, using defaults", CONFIG_FILE_NAME, dir.display());
            Self::default()
        };

        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply environment variable overrides to the configuration
    pub fn apply_env_overrides(&mut self) -> RewriteResult<()> {
        self.apply_overrides_from(|name| std::env::var(name).ok())
    }

    /// Apply overrides looked up by variable name. Empty values are ignored.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> RewriteResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(sort) = lookup(ENV_SORT) {
            self.sort = sort
                .split(';')
                .map(str::trim)
                .filter(|term| !term.is_empty())
                .map(|term| term.parse::<Order>())
                .collect::<Result<Vec<Order>, _>>()?;
        }

        if let Some(count) = lookup(ENV_COUNT) {
            self.count = match count.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => true,
                "false" | "0" => false,
                other => {
                    return Err(RewriteError::Config(format!(
                        "{} must be true, false, 1 or 0, got '{}'",
                        ENV_COUNT, other
                    )))
                }
            };
        }

        if let Some(projection) = lookup(ENV_COUNT_PROJECTION) {
            self.count_projection = Some(projection.trim().to_string());
        }

        Ok(())
    }

    fn validate(&self) -> RewriteResult<()> {
        for order in &self.sort {
            order.validate()?;
        }
        if matches!(&self.count_projection, Some(projection) if projection.trim().is_empty()) {
            return Err(RewriteError::Config(
                "count_projection must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn sort(&self) -> RewriteResult<Sort> {
        Ok(Sort::from_orders(self.sort.clone())?)
    }

    /// Build the transformer this configuration describes
    pub fn transformer(&self) -> RewriteResult<HqlQueryTransformer> {
        Ok(HqlQueryTransformer::new(
            self.sort()?,
            self.count,
            self.count_projection.clone(),
        ))
    }

    /// Save configuration to a directory
    pub fn save(&self, dir: &Path) -> RewriteResult<()> {
        let config_path = dir.join(CONFIG_FILE_NAME);
        let content = toml::to_string_pretty(self)
            .map_err(|e| RewriteError::Config(format!("Cannot serialize configuration: {}", e)))?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn test_config_deserialization() {
        let config: RewriteConfig = toml::from_str(
            r#"
            count = false

            [[sort]]
            property = "lastName"
            direction = "desc"

            [[sort]]
            property = "firstName"
            ignore_case = true
            "#,
        )
        .unwrap();

        assert_eq!(
            config.sort,
            vec![Order::desc("lastName"), Order::asc("firstName").ignore_case()]
        );
        assert!(!config.count);
        assert_eq!(config.count_projection, None);
    }

    #[test]
    fn test_empty_config_is_default() {
        let config: RewriteConfig = toml::from_str("").unwrap();
        assert_eq!(config, RewriteConfig::default());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = RewriteConfig::default();
        config
            .apply_overrides_from(lookup(&[
                (ENV_SORT, "lastName,desc; firstName,asc,ignorecase"),
                (ENV_COUNT, "1"),
                (ENV_COUNT_PROJECTION, "e.id"),
            ]))
            .unwrap();

        assert_eq!(
            config.sort,
            vec![Order::desc("lastName"), Order::asc("firstName").ignore_case()]
        );
        assert!(config.count);
        assert_eq!(config.count_projection.as_deref(), Some("e.id"));
    }

    #[test]
    fn test_empty_env_values_are_ignored() {
        let mut config = RewriteConfig {
            count: true,
            ..RewriteConfig::default()
        };
        config
            .apply_overrides_from(lookup(&[(ENV_COUNT, "  "), (ENV_SORT, "")]))
            .unwrap();
        assert!(config.count);
        assert!(config.sort.is_empty());
    }

    #[test]
    fn test_invalid_env_values() {
        let mut config = RewriteConfig::default();
        let err = config
            .apply_overrides_from(lookup(&[(ENV_COUNT, "maybe")]))
            .unwrap_err();
        assert!(matches!(err, RewriteError::Config(_)));

        let err = config
            .apply_overrides_from(lookup(&[(ENV_SORT, "name,sideways")]))
            .unwrap_err();
        assert!(matches!(err, RewriteError::Query(_)));
    }

    #[test]
    fn test_transformer_from_config() {
        let config = RewriteConfig {
            sort: vec![Order::asc("name")],
            ..RewriteConfig::default()
        };
        let tree = hql_core::parse("select e from Employee e").unwrap();
        assert_eq!(
            config.transformer().unwrap().transform(&tree).render(),
            "select e from Employee e order by e.name asc"
        );
    }
}
