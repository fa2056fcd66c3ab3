//! Stroke styles and the normalization of style labels.
//!
//! Style identifiers arrive in three forms depending on who wrote them:
//! goal params carry short codes (`"Fr"`), practice logs carry display
//! labels in English (`"freestyle"`) or Japanese (`"自由形"`). Everything
//! that compares styles goes through [`StyleKey::normalize`] first.

use serde::{Deserialize, Serialize};

use crate::id::StyleId;

/// The five competitive strokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stroke {
    /// Freestyle (`fr` / `自由形`)
    #[serde(rename = "fr")]
    Freestyle,
    /// Backstroke (`ba` / `背泳ぎ`)
    #[serde(rename = "ba")]
    Backstroke,
    /// Breaststroke (`br` / `平泳ぎ`)
    #[serde(rename = "br")]
    Breaststroke,
    /// Butterfly (`fly` / `バタフライ`)
    #[serde(rename = "fly")]
    Butterfly,
    /// Individual medley (`im` / `個人メドレー`)
    #[serde(rename = "im")]
    Medley,
}

impl Stroke {
    /// Short code used by goal params and the style catalog.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Freestyle => "fr",
            Self::Backstroke => "ba",
            Self::Breaststroke => "br",
            Self::Butterfly => "fly",
            Self::Medley => "im",
        }
    }

    /// English display label.
    pub fn label_en(&self) -> &'static str {
        match self {
            Self::Freestyle => "freestyle",
            Self::Backstroke => "backstroke",
            Self::Breaststroke => "breaststroke",
            Self::Butterfly => "butterfly",
            Self::Medley => "individual medley",
        }
    }

    /// Japanese display label.
    pub fn label_jp(&self) -> &'static str {
        match self {
            Self::Freestyle => "自由形",
            Self::Backstroke => "背泳ぎ",
            Self::Breaststroke => "平泳ぎ",
            Self::Butterfly => "バタフライ",
            Self::Medley => "個人メドレー",
        }
    }

    /// Recognize a stroke from any of its known spellings.
    ///
    /// Accepts the short code, the English label, or the Japanese label,
    /// case-insensitively. Returns `None` for everything else.
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "fr" | "freestyle" | "自由形" => Some(Self::Freestyle),
            "ba" | "backstroke" | "背泳ぎ" => Some(Self::Backstroke),
            "br" | "breaststroke" | "平泳ぎ" => Some(Self::Breaststroke),
            "fly" | "butterfly" | "バタフライ" => Some(Self::Butterfly),
            "im" | "individual medley" | "個人メドレー" => Some(Self::Medley),
            _ => None,
        }
    }

    /// All strokes, in catalog order.
    pub fn all() -> [Stroke; 5] {
        [
            Self::Freestyle,
            Self::Backstroke,
            Self::Breaststroke,
            Self::Butterfly,
            Self::Medley,
        ]
    }
}

impl std::fmt::Display for Stroke {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Canonical key for comparing style labels from different sources.
///
/// Labels outside the known stroke table are kept verbatim (lowercased)
/// and only ever match themselves; no mappings are guessed beyond the
/// catalog's five strokes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StyleKey {
    /// A recognized stroke
    Stroke(Stroke),
    /// An unrecognized label, lowercased
    Other(String),
}

impl StyleKey {
    /// Fold a raw style label into its canonical key.
    pub fn normalize(label: &str) -> Self {
        match Stroke::parse(label) {
            Some(stroke) => Self::Stroke(stroke),
            None => Self::Other(label.trim().to_lowercase()),
        }
    }

    /// Whether a raw label normalizes to this key.
    pub fn matches(&self, label: &str) -> bool {
        *self == Self::normalize(label)
    }

    /// The stroke, when this key is part of the catalog.
    pub fn stroke(&self) -> Option<Stroke> {
        match self {
            Self::Stroke(stroke) => Some(*stroke),
            Self::Other(_) => None,
        }
    }
}

impl std::fmt::Display for StyleKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stroke(stroke) => f.write_str(stroke.code()),
            Self::Other(label) => f.write_str(label),
        }
    }
}

/// A style catalog entry: one stroke swum over one distance.
///
/// Competition records reference catalog entries by [`StyleId`]; goal and
/// milestone params reference them by stroke label + distance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Style {
    /// Catalog key
    pub id: StyleId,

    /// Japanese display label
    pub name_jp: String,

    /// English display label
    pub name: String,

    /// Stroke code
    pub stroke: Stroke,

    /// Distance in meters
    pub distance: u32,
}

impl Style {
    /// Build a catalog entry for a stroke/distance pair.
    pub fn new(id: StyleId, stroke: Stroke, distance: u32) -> Self {
        Self {
            id,
            name_jp: stroke.label_jp().to_string(),
            name: stroke.label_en().to_string(),
            stroke,
            distance,
        }
    }
}

/// Training category of a practice log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwimCategory {
    /// Full stroke
    Swim,
    /// Pull only
    Pull,
    /// Kick only
    Kick,
}

impl std::fmt::Display for SwimCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Swim => "Swim",
            Self::Pull => "Pull",
            Self::Kick => "Kick",
        };
        f.write_str(label)
    }
}

impl std::str::FromStr for SwimCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "swim" => Ok(Self::Swim),
            "pull" => Ok(Self::Pull),
            "kick" => Ok(Self::Kick),
            other => Err(format!("unknown swim category: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stroke_parse_all_spellings() {
        assert_eq!(Stroke::parse("Fr"), Some(Stroke::Freestyle));
        assert_eq!(Stroke::parse("freestyle"), Some(Stroke::Freestyle));
        assert_eq!(Stroke::parse("自由形"), Some(Stroke::Freestyle));
        assert_eq!(Stroke::parse("FLY"), Some(Stroke::Butterfly));
        assert_eq!(Stroke::parse("バタフライ"), Some(Stroke::Butterfly));
        assert_eq!(Stroke::parse("doggy paddle"), None);
    }

    #[test]
    fn test_style_key_folds_spellings_together() {
        let key = StyleKey::normalize("Fr");
        assert_eq!(key, StyleKey::normalize("freestyle"));
        assert_eq!(key, StyleKey::normalize("自由形"));
        assert!(key.matches(" FREESTYLE "));
        assert_ne!(key, StyleKey::normalize("背泳ぎ"));
    }

    #[test]
    fn test_unknown_labels_match_only_themselves() {
        let key = StyleKey::normalize("Sidestroke");
        assert_eq!(key, StyleKey::Other("sidestroke".to_string()));
        assert!(key.matches("sidestroke"));
        assert!(!key.matches("freestyle"));
        assert_eq!(key.stroke(), None);
    }

    #[test]
    fn test_stroke_serializes_as_code() {
        let json = serde_json::to_string(&Stroke::Medley).unwrap();
        assert_eq!(json, "\"im\"");
        let back: Stroke = serde_json::from_str("\"fly\"").unwrap();
        assert_eq!(back, Stroke::Butterfly);
    }
}
