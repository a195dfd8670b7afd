//! Database models
//!
//! Entity rows for courses, lectures, concepts and archived review sessions,
//! plus the closed enumerations stored alongside them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::Error;

/// Normalize an enum label for lenient matching ("not_started", "Not Started" → "notstarted")
fn normalize_label(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Four-valued mastery indicator attached to a concept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProgressStatus {
    NotStarted,
    Reviewing,
    Understood,
    Mastered,
}

impl ProgressStatus {
    pub const ALL: [ProgressStatus; 4] = [
        ProgressStatus::NotStarted,
        ProgressStatus::Reviewing,
        ProgressStatus::Understood,
        ProgressStatus::Mastered,
    ];

    /// Label used in storage and in model prompts
    pub fn as_str(&self) -> &'static str {
        match self {
            ProgressStatus::NotStarted => "NotStarted",
            ProgressStatus::Reviewing => "Reviewing",
            ProgressStatus::Understood => "Understood",
            ProgressStatus::Mastered => "Mastered",
        }
    }

    /// Position along NotStarted → Reviewing → Understood → Mastered
    pub fn rank(&self) -> u8 {
        match self {
            ProgressStatus::NotStarted => 0,
            ProgressStatus::Reviewing => 1,
            ProgressStatus::Understood => 2,
            ProgressStatus::Mastered => 3,
        }
    }
}

impl fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProgressStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_label(s).as_str() {
            "notstarted" => Ok(ProgressStatus::NotStarted),
            "reviewing" => Ok(ProgressStatus::Reviewing),
            "understood" => Ok(ProgressStatus::Understood),
            "mastered" => Ok(ProgressStatus::Mastered),
            _ => Err(Error::InvalidInput(format!("Unknown progress status: {}", s))),
        }
    }
}

/// Persona framing that shapes the tutor's conversational style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AudienceLevel {
    Classmate,
    MiddleSchooler,
    Child,
}

impl AudienceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AudienceLevel::Classmate => "Classmate",
            AudienceLevel::MiddleSchooler => "MiddleSchooler",
            AudienceLevel::Child => "Child",
        }
    }
}

impl fmt::Display for AudienceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AudienceLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_label(s).as_str() {
            "classmate" => Ok(AudienceLevel::Classmate),
            "middleschooler" => Ok(AudienceLevel::MiddleSchooler),
            "child" => Ok(AudienceLevel::Child),
            _ => Err(Error::InvalidInput(format!("Unknown audience level: {}", s))),
        }
    }
}

/// Speaker of one transcript utterance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The learner explaining the concept
    User,
    /// The simulated tutor persona
    Assistant,
}

impl Role {
    /// Label used when flattening a transcript into dialogue text
    pub fn speaker_label(&self) -> &'static str {
        match self {
            Role::User => "Student",
            Role::Assistant => "Tutor",
        }
    }
}

/// One utterance in a review conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Structured assessment of a finished review transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub summary: String,
    pub clearly_explained: Vec<String>,
    pub unclear_points: Vec<String>,
    pub jargon_used: Vec<String>,
    pub progress_level: ProgressStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lecture {
    pub id: Uuid,
    pub course_id: Uuid,
    pub name: String,
    pub raw_text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Concept {
    pub id: Uuid,
    pub lecture_id: Uuid,
    pub name: String,
    pub description: String,
    pub status: ProgressStatus,
    /// Order within the owning lecture (decomposition order)
    pub position: i64,
    pub last_reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Archived transcript of one completed review session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewSessionRecord {
    pub id: Uuid,
    pub concept_id: Uuid,
    pub audience_level: AudienceLevel,
    pub transcript: Vec<Turn>,
    pub feedback: Option<Feedback>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_status_lenient_parse() {
        assert_eq!("NotStarted".parse::<ProgressStatus>().unwrap(), ProgressStatus::NotStarted);
        assert_eq!("not_started".parse::<ProgressStatus>().unwrap(), ProgressStatus::NotStarted);
        assert_eq!("Not Started".parse::<ProgressStatus>().unwrap(), ProgressStatus::NotStarted);
        assert_eq!("MASTERED".parse::<ProgressStatus>().unwrap(), ProgressStatus::Mastered);
        assert!("expert".parse::<ProgressStatus>().is_err());
    }

    #[test]
    fn test_progress_status_storage_label_round_trip() {
        for status in ProgressStatus::ALL {
            assert_eq!(status.as_str().parse::<ProgressStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_progress_rank_is_ordered() {
        let ranks: Vec<u8> = ProgressStatus::ALL.iter().map(|s| s.rank()).collect();
        assert_eq!(ranks, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_audience_level_parse() {
        assert_eq!("middle_schooler".parse::<AudienceLevel>().unwrap(), AudienceLevel::MiddleSchooler);
        assert_eq!("child".parse::<AudienceLevel>().unwrap(), AudienceLevel::Child);
        assert!("professor".parse::<AudienceLevel>().is_err());
    }

    #[test]
    fn test_feedback_wire_shape_is_camel_case() {
        let feedback = Feedback {
            summary: "ok".to_string(),
            clearly_explained: vec![],
            unclear_points: vec![],
            jargon_used: vec!["chlorophyll".to_string()],
            progress_level: ProgressStatus::Understood,
        };
        let json = serde_json::to_value(&feedback).unwrap();
        assert_eq!(json["progressLevel"], "Understood");
        assert_eq!(json["jargonUsed"][0], "chlorophyll");
    }

    #[test]
    fn test_turn_role_serializes_lowercase() {
        let json = serde_json::to_value(Turn::assistant("hi")).unwrap();
        assert_eq!(json["role"], "assistant");
    }
}
