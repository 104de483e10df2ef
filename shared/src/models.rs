use serde::{Serialize, Deserialize};
use time::OffsetDateTime;

pub const MAX_PHOTO_ATTACHMENTS: usize = 1;
pub const PLACEHOLDER_PHOTO_URL: &str = "/placeholder.svg";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PhotoAttachment {
    pub url: String,
    #[serde(default)]
    pub filename: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Participant {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub photo: Vec<PhotoAttachment>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Participant {
    /// URL of the costume photo, or the placeholder image when none was stored.
    pub fn photo_url(&self) -> &str {
        self.photo.first()
            .map(|p| p.url.as_str())
            .filter(|url| !url.is_empty())
            .unwrap_or(PLACEHOLDER_PHOTO_URL)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Vote {
    pub id: String,
    pub voter_name: String,
    pub voted_for: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateVoteRequest {
    #[serde(default)]
    pub voter_name: Option<String>,
    #[serde(default)]
    pub voted_for: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RankedParticipant {
    #[serde(flatten)]
    pub participant: Participant,
    #[serde(rename = "voteCount")]
    pub vote_count: u32,
    pub rank: u32,
}
