//! Bundle snapshot models.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::asset_path::AssetKind;

/// Snapshot schema version.
pub const BUNDLE_VERSION: &str = "1.0";

/// Storage locations of one language of one video.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageAsset {
    /// Key of the `.mp4`, empty when absent
    #[serde(default)]
    pub video_path: String,
    /// Key of the `.vtt`, empty when absent
    #[serde(default)]
    pub subtitle_path: String,
}

impl LanguageAsset {
    /// Overwrite the slot for `kind`. The last call wins.
    pub fn set(&mut self, kind: AssetKind, key: impl Into<String>) {
        match kind {
            AssetKind::Video => self.video_path = key.into(),
            AssetKind::Subtitle => self.subtitle_path = key.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.video_path.is_empty() && self.subtitle_path.is_empty()
    }
}

/// Language code to asset map that keeps insertion order.
///
/// Serialized as a plain JSON object whose keys appear in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LanguageMap {
    entries: Vec<(String, LanguageAsset)>,
}

impl LanguageMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, lang: &str) -> Option<&LanguageAsset> {
        self.entries.iter().find(|(l, _)| l == lang).map(|(_, a)| a)
    }

    /// Get the entry for `lang`, appending an empty one if it is new.
    pub fn entry(&mut self, lang: &str) -> &mut LanguageAsset {
        let idx = match self.entries.iter().position(|(l, _)| l == lang) {
            Some(idx) => idx,
            None => {
                self.entries.push((lang.to_string(), LanguageAsset::default()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[idx].1
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &LanguageAsset)> {
        self.entries.iter().map(|(l, a)| (l.as_str(), a))
    }

    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(l, _)| l.as_str())
    }
}

impl Serialize for LanguageMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (lang, asset) in &self.entries {
            map.serialize_entry(lang, asset)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for LanguageMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct LanguageMapVisitor;

        impl<'de> Visitor<'de> for LanguageMapVisitor {
            type Value = LanguageMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of language codes to asset paths")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut map = LanguageMap::new();
                while let Some((lang, asset)) = access.next_entry::<String, LanguageAsset>()? {
                    *map.entry(&lang) = asset;
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(LanguageMapVisitor)
    }
}

/// One video of a namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoEntry {
    pub id: String,
    /// Defaults to the id; there is no separate title source.
    pub title: String,
    pub languages: LanguageMap,
}

impl VideoEntry {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            title: id.clone(),
            id,
            languages: LanguageMap::new(),
        }
    }
}

/// Derived index of the assets of one clinic/department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bundle {
    pub version: String,
    pub clinic: String,
    pub department: String,
    /// First-encounter order of the listing scan, not sorted.
    pub videos: Vec<VideoEntry>,
}

impl Bundle {
    pub fn new(clinic: impl Into<String>, department: impl Into<String>) -> Self {
        Self {
            version: BUNDLE_VERSION.to_string(),
            clinic: clinic.into(),
            department: department.into(),
            videos: Vec::new(),
        }
    }

    pub fn video(&self, id: &str) -> Option<&VideoEntry> {
        self.videos.iter().find(|v| v.id == id)
    }

    /// Every non-empty asset path in the bundle.
    pub fn asset_paths(&self) -> impl Iterator<Item = &str> {
        self.videos
            .iter()
            .flat_map(|v| v.languages.iter())
            .flat_map(|(_, a)| [a.video_path.as_str(), a.subtitle_path.as_str()])
            .filter(|p| !p.is_empty())
    }

    /// Canonical snapshot encoding: pretty JSON with a trailing newline.
    pub fn to_snapshot_bytes(&self) -> serde_json::Result<Vec<u8>> {
        let mut bytes = serde_json::to_vec_pretty(self)?;
        bytes.push(b'\n');
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_map_keeps_insertion_order() {
        let mut map = LanguageMap::new();
        map.entry("fr").set(AssetKind::Video, "f.mp4");
        map.entry("en").set(AssetKind::Video, "e.mp4");
        map.entry("fr").set(AssetKind::Subtitle, "f.vtt");

        assert_eq!(map.len(), 2);
        assert_eq!(map.languages().collect::<Vec<_>>(), vec!["fr", "en"]);
        assert_eq!(map.get("fr").unwrap().subtitle_path, "f.vtt");
    }

    #[test]
    fn test_wire_field_order() {
        let mut video = VideoEntry::new("v1");
        video.languages.entry("zh").set(AssetKind::Subtitle, "z.vtt");
        video.languages.entry("ar").set(AssetKind::Video, "a.mp4");
        let mut bundle = Bundle::new("c1", "d1");
        bundle.videos.push(video);

        let json = serde_json::to_string(&bundle).unwrap();
        assert_eq!(
            json,
            r#"{"version":"1.0","clinic":"c1","department":"d1","videos":[{"id":"v1","title":"v1","languages":{"zh":{"videoPath":"","subtitlePath":"z.vtt"},"ar":{"videoPath":"a.mp4","subtitlePath":""}}}]}"#
        );

        let back: Bundle = serde_json::from_str(&json).unwrap();
        assert_eq!(back, bundle);
    }

    #[test]
    fn test_snapshot_bytes_end_with_newline() {
        let bytes = Bundle::new("c1", "d1").to_snapshot_bytes().unwrap();
        assert_eq!(bytes.last(), Some(&b'\n'));
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["videos"], serde_json::json!([]));
    }
}
