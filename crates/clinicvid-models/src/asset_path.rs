//! Asset path grammar.
//!
//! Assets are stored as
//!
//! ```text
//! videos/<clinic>/<department>/<videoId>/<langCode>/<fileName>.<ext>
//! ```
//!
//! where `ext` is `mp4` or `vtt`. Parsing is structural (split on `/`,
//! count segments, check the extension) so there is no regex to audit.

use std::fmt;

use crate::namespace::VIDEOS_ROOT;

/// Kind of asset, decided by the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    /// `.mp4`
    Video,
    /// `.vtt`
    Subtitle,
}

impl AssetKind {
    /// Map a file extension to an asset kind. Extensions are case-sensitive.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "mp4" => Some(Self::Video),
            "vtt" => Some(Self::Subtitle),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Video => "mp4",
            Self::Subtitle => "vtt",
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// A storage key that matched the asset grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetPath<'a> {
    pub key: &'a str,
    pub clinic: &'a str,
    pub department: &'a str,
    pub video_id: &'a str,
    pub lang: &'a str,
    pub file_name: &'a str,
    pub kind: AssetKind,
}

impl<'a> AssetPath<'a> {
    /// Parse a key, returning `None` when it does not match the grammar.
    pub fn parse(key: &'a str) -> Option<Self> {
        let mut parts = key.split('/');
        let root = parts.next()?;
        let clinic = parts.next()?;
        let department = parts.next()?;
        let video_id = parts.next()?;
        let lang = parts.next()?;
        let file = parts.next()?;
        if parts.next().is_some() || root != VIDEOS_ROOT {
            return None;
        }

        if [clinic, department, video_id, lang].iter().any(|s| s.is_empty()) {
            return None;
        }

        let (file_name, ext) = file.rsplit_once('.')?;
        if file_name.is_empty() {
            return None;
        }
        let kind = AssetKind::from_extension(ext)?;

        Some(Self {
            key,
            clinic,
            department,
            video_id,
            lang,
            file_name,
            kind,
        })
    }
}

/// The looser shape used to route storage notifications:
/// `videos/<clinic>/<department>[/<videoName>/...]`.
///
/// The third segment only counts as a video name when it is a folder,
/// i.e. followed by another `/`. A key like `videos/c/d/readme.txt` is a
/// loose file, not a video, and must not grow language folders. The cost is
/// that a bare folder key without the trailing slash (`videos/c/d/v1`) is
/// treated the same way; storage consoles create folder keys as `v1/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationPath<'a> {
    pub clinic: &'a str,
    pub department: &'a str,
    pub video_name: Option<&'a str>,
}

impl<'a> NotificationPath<'a> {
    pub fn parse(key: &'a str) -> Option<Self> {
        let mut parts = key.split('/');
        if parts.next()? != VIDEOS_ROOT {
            return None;
        }
        let clinic = parts.next().filter(|s| !s.is_empty())?;
        let department = parts.next().filter(|s| !s.is_empty())?;
        let video_name = match (parts.next(), parts.next()) {
            (Some(name), Some(_)) if !name.is_empty() => Some(name),
            _ => None,
        };

        Some(Self {
            clinic,
            department,
            video_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_video_and_subtitle() {
        let video = AssetPath::parse("videos/c1/d1/v1/en/intro.mp4").unwrap();
        assert_eq!(video.clinic, "c1");
        assert_eq!(video.department, "d1");
        assert_eq!(video.video_id, "v1");
        assert_eq!(video.lang, "en");
        assert_eq!(video.file_name, "intro");
        assert_eq!(video.kind, AssetKind::Video);

        let subs = AssetPath::parse("videos/c1/d1/v1/fr/intro.fr.vtt").unwrap();
        assert_eq!(subs.file_name, "intro.fr");
        assert_eq!(subs.kind, AssetKind::Subtitle);
    }

    #[test]
    fn test_rejects_wrong_segment_count() {
        assert!(AssetPath::parse("videos/c1/d1/v1/a.mp4").is_none());
        assert!(AssetPath::parse("videos/c1/d1/v1/en/extra/a.mp4").is_none());
        assert!(AssetPath::parse("videos/c1/d1/v1/en/").is_none());
    }

    #[test]
    fn test_rejects_bad_extension_or_root() {
        assert!(AssetPath::parse("videos/c1/d1/v1/en/a.mov").is_none());
        assert!(AssetPath::parse("videos/c1/d1/v1/en/a.MP4").is_none());
        assert!(AssetPath::parse("videos/c1/d1/v1/en/.placeholder").is_none());
        assert!(AssetPath::parse("videos/c1/d1/v1/en/.mp4").is_none());
        assert!(AssetPath::parse("videos/c1/d1/v1/en/noext").is_none());
        assert!(AssetPath::parse("bundles/c1/d1/v1/en/a.mp4").is_none());
    }

    #[test]
    fn test_rejects_empty_segments() {
        assert!(AssetPath::parse("videos/c1//v1/en/a.mp4").is_none());
        assert!(AssetPath::parse("videos/c1/d1/v1//a.mp4").is_none());
    }

    #[test]
    fn test_notification_path() {
        let p = NotificationPath::parse("videos/c1/d1/v1/en/a.mp4").unwrap();
        assert_eq!(p.clinic, "c1");
        assert_eq!(p.department, "d1");
        assert_eq!(p.video_name, Some("v1"));

        let p = NotificationPath::parse("videos/c1/d1/v2/").unwrap();
        assert_eq!(p.video_name, Some("v2"));

        let p = NotificationPath::parse("videos/c1/d1/readme.txt").unwrap();
        assert_eq!(p.video_name, None);

        let p = NotificationPath::parse("videos/c1/d1/v3").unwrap();
        assert_eq!(p.video_name, None);

        let p = NotificationPath::parse("videos/c1/d1").unwrap();
        assert_eq!(p.video_name, None);

        assert!(NotificationPath::parse("videos/c1").is_none());
        assert!(NotificationPath::parse("bundles/c1/d1/bundle.json").is_none());
    }
}
