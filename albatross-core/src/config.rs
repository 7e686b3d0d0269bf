//! Gate configuration
//!
//! Raw settings are plain strings as read from TOML; [`GateSettings::compile`]
//! turns them into the immutable [`GateConfig`] used at request time.

use crate::error::{AlbatrossResult, PatternKind};
use crate::gate::GateConfig;
use crate::pattern::PatternSet;
use crate::config_error;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

pub const DEFAULT_LOGIN_URL: &str = "/login/";

/// Access gate settings. Missing pattern lists mean "no patterns".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateSettings {
    /// Regular expressions for paths that require authentication
    pub required_patterns: Vec<String>,
    /// Regular expressions for paths that never require authentication
    pub exempt_patterns: Vec<String>,
    /// Where challenged requests are sent
    pub login_url: String,
}

impl Default for GateSettings {
    fn default() -> Self {
        Self {
            required_patterns: Vec::new(),
            exempt_patterns: Vec::new(),
            login_url: DEFAULT_LOGIN_URL.to_string(),
        }
    }
}

impl GateSettings {
    /// Compile both pattern sets, failing on the first malformed pattern
    pub fn compile(&self) -> AlbatrossResult<GateConfig> {
        self.validate_login_url()?;
        let required = PatternSet::compile(&self.required_patterns, PatternKind::Required)?;
        let exempt = PatternSet::compile(&self.exempt_patterns, PatternKind::Exempt)?;

        info!(
            required = required.len(),
            exempt = exempt.len(),
            login_url = %self.login_url,
            "Access gate compiled"
        );
        if required.is_empty() {
            debug!("No required patterns configured; every path is allowed");
        }

        Ok(GateConfig::new(required, exempt))
    }

    /// The login URL is mounted as a route, so it must be a plain local path
    pub fn validate_login_url(&self) -> AlbatrossResult<()> {
        let url = self.login_url.as_str();
        if !url.starts_with('/') || url.starts_with("//") {
            return Err(config_error!(
                format!("login_url {:?} must be a local path starting with '/'", url),
                "config"
            ));
        }
        if url.contains(['?', '#', '{', '}']) {
            return Err(config_error!(
                format!("login_url {:?} must not carry a query, fragment or path parameter", url),
                "config"
            ));
        }
        Ok(())
    }

    /// Parse settings from a TOML document
    pub fn from_toml_str(content: &str) -> AlbatrossResult<Self> {
        toml::from_str(content)
            .map_err(|e| config_error!(format!("Failed to parse gate settings: {}", e), "config", e))
    }

    /// Load settings from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> AlbatrossResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            config_error!(
                format!("Failed to read config file {}: {}", path.display(), e),
                "config",
                e
            )
        })?;
        Self::from_toml_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AlbatrossError;
    use crate::gate::{GateDecision, RequestContext};
    use std::io::Write;

    #[test]
    fn test_missing_keys_mean_empty_sets() {
        let settings = GateSettings::from_toml_str("").unwrap();
        assert!(settings.required_patterns.is_empty());
        assert!(settings.exempt_patterns.is_empty());
        assert_eq!(settings.login_url, "/login/");

        let config = settings.compile().unwrap();
        assert_eq!(
            config.decide(&RequestContext::anonymous("/anything")),
            GateDecision::Allow
        );
    }

    #[test]
    fn test_compile_from_toml() {
        let settings = GateSettings::from_toml_str(
            r#"
            required_patterns = ['/topsecret/(.*)$']
            exempt_patterns = ['/topsecret/login(.*)$', '/topsecret/logout(.*)$']
            login_url = "/topsecret/login/"
            "#,
        )
        .unwrap();

        let config = settings.compile().unwrap();
        assert_eq!(config.required.len(), 1);
        assert_eq!(config.exempt.len(), 2);
        assert_eq!(
            config.decide(&RequestContext::anonymous("/topsecret/data")),
            GateDecision::Challenge
        );
    }

    #[test]
    fn test_malformed_pattern_aborts_compile() {
        let settings = GateSettings {
            exempt_patterns: vec!["/login(".to_string()],
            ..GateSettings::default()
        };

        match settings.compile() {
            Err(AlbatrossError::InvalidPattern { kind, pattern, .. }) => {
                assert_eq!(kind, PatternKind::Exempt);
                assert_eq!(pattern, "/login(");
            }
            other => panic!("expected InvalidPattern, got {other:?}"),
        }
    }

    #[test]
    fn test_login_url_must_be_plain_local_path() {
        for bad in ["login/", "//evil.example/login", "/login/?x=1", "/login/{id}"] {
            let settings = GateSettings {
                login_url: bad.to_string(),
                ..GateSettings::default()
            };
            assert!(
                matches!(settings.compile(), Err(AlbatrossError::Config { .. })),
                "{bad} should be refused"
            );
        }

        let settings = GateSettings {
            login_url: "/accounts/login/".to_string(),
            ..GateSettings::default()
        };
        assert!(settings.compile().is_ok());
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let result = GateSettings::from_toml_str("required_patterns = 5");
        assert!(matches!(result, Err(AlbatrossError::Config { .. })));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "required_patterns = ['/(.*)$']").unwrap();

        let settings = GateSettings::from_file(file.path()).unwrap();
        assert_eq!(settings.required_patterns, vec!["/(.*)$".to_string()]);

        let missing = GateSettings::from_file("/nonexistent/albatross.toml");
        assert!(matches!(missing, Err(AlbatrossError::Config { .. })));
    }
}
