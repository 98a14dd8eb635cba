//! Bundler configuration.

use clinicvid_models::default_languages;

/// Bundler configuration.
#[derive(Debug, Clone)]
pub struct BundlerConfig {
    /// Languages provisioned for every newly observed video, in order
    pub languages: Vec<String>,
}

impl Default for BundlerConfig {
    fn default() -> Self {
        Self {
            languages: default_languages(),
        }
    }
}

impl BundlerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            languages: std::env::var("BUNDLE_LANGUAGES")
                .ok()
                .map(|s| parse_language_list(&s))
                .filter(|langs| !langs.is_empty())
                .unwrap_or_else(default_languages),
        }
    }
}

/// Split a comma-separated language list, dropping blanks.
fn parse_language_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_language_list() {
        assert_eq!(parse_language_list(" en, fr ,,es "), vec!["en", "fr", "es"]);
        assert!(parse_language_list(" , ").is_empty());
    }

    #[test]
    fn test_default_uses_sixteen_languages() {
        let config = BundlerConfig::default();
        assert_eq!(config.languages.len(), 16);
        assert_eq!(config.languages[0], "en");
    }
}
