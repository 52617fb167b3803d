use serde_derive::{Deserialize, Serialize};

/// Configuration for the database connection.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "apollo.db".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::database_config::DatabaseConfig;
    use insta::{assert_debug_snapshot, assert_toml_snapshot};

    #[test]
    fn serialization() {
        assert_toml_snapshot!(DatabaseConfig::default(), @r###"
        path = 'apollo.db'
        "###);
    }

    #[test]
    fn deserialization() {
        let config: DatabaseConfig = toml::from_str(r#"path = '/var/lib/apollo/apollo.db'"#).unwrap();
        assert_debug_snapshot!(config, @r###"
        DatabaseConfig {
            path: "/var/lib/apollo/apollo.db",
        }
        "###);
    }
}
