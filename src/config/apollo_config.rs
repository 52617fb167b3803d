use serde_derive::{Deserialize, Serialize};
use url::Url;

/// Configuration for the Apollo HR portal client.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct ApolloConfig {
    /// Base URL of the Apollo portal.
    pub base_url: Url,
    /// Timeout applied to every portal request, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ApolloConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse("https://apollo.mayohr.com")
                .expect("Cannot parse Apollo base URL parameter."),
            request_timeout_secs: 15,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::apollo_config::ApolloConfig;
    use insta::{assert_debug_snapshot, assert_toml_snapshot};

    #[test]
    fn serialization() {
        assert_toml_snapshot!(ApolloConfig::default(), @r###"
        base-url = 'https://apollo.mayohr.com/'
        request-timeout-secs = 15
        "###);
    }

    #[test]
    fn deserialization() {
        let config: ApolloConfig = toml::from_str(
            r#"
        base-url = 'https://apollo.example.com'
        request-timeout-secs = 5
    "#,
        )
        .unwrap();
        assert_debug_snapshot!(config, @r###"
        ApolloConfig {
            base_url: Url {
                scheme: "https",
                cannot_be_a_base: false,
                username: "",
                password: None,
                host: Some(
                    Domain(
                        "apollo.example.com",
                    ),
                ),
                port: None,
                path: "/",
                query: None,
                fragment: None,
            },
            request_timeout_secs: 5,
        }
        "###);
    }
}
