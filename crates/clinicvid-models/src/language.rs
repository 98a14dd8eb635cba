//! Default language list for folder provisioning.

/// ISO 639-1 codes provisioned for every newly observed video.
pub const DEFAULT_LANGUAGES: [&str; 16] = [
    "en", "es", "fr", "de", "it", "pt", "zh", "ja", "ko", "ar", "ru", "hi", "vi", "tl", "pl", "ht",
];

/// Owned copy of [`DEFAULT_LANGUAGES`].
pub fn default_languages() -> Vec<String> {
    DEFAULT_LANGUAGES.iter().map(|s| s.to_string()).collect()
}
