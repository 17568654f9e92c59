use crate::{error::Result, PipelineError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// The content formats offered to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentFormat {
    Webtoon,
    AudioDrama,
    Documentary,
    Exhibition,
    Essay,
    ShortFormVideo,
    Poem,
}

impl ContentFormat {
    /// All formats, in display order.
    pub const ALL: [ContentFormat; 7] = [
        ContentFormat::Webtoon,
        ContentFormat::AudioDrama,
        ContentFormat::Documentary,
        ContentFormat::Exhibition,
        ContentFormat::Essay,
        ContentFormat::ShortFormVideo,
        ContentFormat::Poem,
    ];

    /// The label shown to users and sent to the provider.
    pub fn label(self) -> &'static str {
        match self {
            ContentFormat::Webtoon => "웹툰",
            ContentFormat::AudioDrama => "오디오 드라마",
            ContentFormat::Documentary => "다큐멘터리",
            ContentFormat::Exhibition => "전시회",
            ContentFormat::Essay => "에세이",
            ContentFormat::ShortFormVideo => "숏폼 영상",
            ContentFormat::Poem => "시(Poem)",
        }
    }

    /// ASCII alias accepted by [`FromStr`].
    pub fn slug(self) -> &'static str {
        match self {
            ContentFormat::Webtoon => "webtoon",
            ContentFormat::AudioDrama => "audio-drama",
            ContentFormat::Documentary => "documentary",
            ContentFormat::Exhibition => "exhibition",
            ContentFormat::Essay => "essay",
            ContentFormat::ShortFormVideo => "short-form-video",
            ContentFormat::Poem => "poem",
        }
    }
}

impl fmt::Display for ContentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ContentFormat {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        ContentFormat::ALL
            .into_iter()
            .find(|f| f.label() == s || f.slug().eq_ignore_ascii_case(s))
            .ok_or_else(|| PipelineError::InvalidInput(format!("unsupported content type '{}'", s)))
    }
}

/// How the poster is drawn, decided from the plan's content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PosterStyle {
    /// One image laid out as four sequential panels.
    PanelSequence,
    /// One atmospheric illustration.
    SingleScene,
}

impl PosterStyle {
    /// Keywords that mark a sequential-panel format.
    const PANEL_KEYWORDS: [&'static str; 2] = ["웹툰", "webtoon"];

    /// Classify a (possibly provider-rewritten) content type string.
    ///
    /// ```
    /// use soul_curator::types::PosterStyle;
    ///
    /// assert_eq!(PosterStyle::for_content_type("감성 웹툰"), PosterStyle::PanelSequence);
    /// assert_eq!(PosterStyle::for_content_type("에세이"), PosterStyle::SingleScene);
    /// ```
    pub fn for_content_type(content_type: &str) -> Self {
        let lowered = content_type.to_lowercase();
        if Self::PANEL_KEYWORDS.iter().any(|k| lowered.contains(k)) {
            PosterStyle::PanelSequence
        } else {
            PosterStyle::SingleScene
        }
    }
}

/// What the user asked for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurationInput {
    pub location: String,
    pub emotion: String,
    pub content_type: ContentFormat,
}

impl CurationInput {
    /// Validate and build an input. Location and emotion are trimmed.
    pub fn new(
        location: impl Into<String>,
        emotion: impl Into<String>,
        content_type: &str,
    ) -> Result<Self> {
        let location = location.into().trim().to_string();
        let emotion = emotion.into().trim().to_string();
        if location.is_empty() {
            return Err(PipelineError::InvalidInput("location is empty".into()));
        }
        if emotion.is_empty() {
            return Err(PipelineError::InvalidInput("emotion is empty".into()));
        }
        Ok(Self {
            location,
            emotion,
            content_type: content_type.parse()?,
        })
    }
}

/// Historical background of a place, with the sources grounding returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResult {
    /// The location as submitted.
    pub location: String,

    /// Two or three sentence synthesis.
    pub summary: String,

    /// Discrete facts, in the order the provider gave them.
    pub facts: Vec<String>,

    /// Deduplicated citation URIs. `None` when grounding produced none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_urls: Option<BTreeSet<String>>,
}

/// A structured cultural-content plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentPlan {
    /// Usually the requested format label, but the provider may rephrase it.
    pub content_type: String,
    pub title: String,
    pub concept: String,
    pub storyline: String,
    pub empathy_point: String,
    pub social_post_text: String,
    pub hashtags: Vec<String>,
}

impl ContentPlan {
    /// Field names as they appear on the wire.
    pub const FIELDS: [&'static str; 7] = [
        "contentType",
        "title",
        "concept",
        "storyline",
        "empathyPoint",
        "socialPostText",
        "hashtags",
    ];

    /// Wire name of the first text field that is empty or whitespace.
    pub fn blank_field(&self) -> Option<&'static str> {
        [
            ("contentType", &self.content_type),
            ("title", &self.title),
            ("concept", &self.concept),
            ("storyline", &self.storyline),
            ("empathyPoint", &self.empathy_point),
            ("socialPostText", &self.social_post_text),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
    }

    pub fn poster_style(&self) -> PosterStyle {
        PosterStyle::for_content_type(&self.content_type)
    }
}

/// The generated poster as a self-contained data URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedPoster {
    pub image_url: String,
}

impl GeneratedPoster {
    pub const DEFAULT_MIME_TYPE: &'static str = "image/png";

    /// Build a `data:` URI from a MIME type and base64 payload.
    ///
    /// A missing or blank MIME type falls back to `image/png`.
    pub fn from_inline(mime_type: Option<&str>, base64_data: &str) -> Self {
        let mime = mime_type
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(Self::DEFAULT_MIME_TYPE);
        Self {
            image_url: format!("data:{};base64,{}", mime, base64_data),
        }
    }

    /// MIME type embedded in the data URI.
    pub fn mime_type(&self) -> Option<&str> {
        self.image_url
            .strip_prefix("data:")
            .and_then(|rest| rest.split_once(';'))
            .map(|(mime, _)| mime)
    }
}
