use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A chat participant (a person or a role such as "direccion").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Contact {
    pub id: String,
    pub name: String,
}

/// The two participants of a thread, kept sorted so that (a, b) and (b, a)
/// are the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[String; 2]", into = "[String; 2]")]
pub struct ParticipantPair([String; 2]);

impl ParticipantPair {
    pub fn new(a: impl Into<String>, b: impl Into<String>) -> Self {
        let (a, b) = (a.into(), b.into());
        if a <= b {
            Self([a, b])
        } else {
            Self([b, a])
        }
    }

    pub fn first(&self) -> &str {
        &self.0[0]
    }

    pub fn second(&self) -> &str {
        &self.0[1]
    }

    pub fn contains(&self, user: &str) -> bool {
        self.0.iter().any(|p| p == user)
    }

    /// The participant that is not `user`.
    pub fn other(&self, user: &str) -> Option<&str> {
        if self.first() == user {
            Some(self.second())
        } else if self.second() == user {
            Some(self.first())
        } else {
            None
        }
    }

    /// JSON form used inside storage keys, e.g. `["a","b"]`.
    pub fn key_fragment(&self) -> String {
        format!(
            "[{},{}]",
            serde_json::Value::from(self.first()),
            serde_json::Value::from(self.second())
        )
    }
}

impl From<[String; 2]> for ParticipantPair {
    fn from([a, b]: [String; 2]) -> Self {
        Self::new(a, b)
    }
}

impl From<ParticipantPair> for [String; 2] {
    fn from(pair: ParticipantPair) -> Self {
        pair.0
    }
}

impl From<(&str, &str)> for ParticipantPair {
    fn from((a, b): (&str, &str)) -> Self {
        Self::new(a, b)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    #[default]
    Sent,
    Read,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: u64,
    pub from: String,
    pub text: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub status: MessageStatus,
    #[serde(default)]
    pub seen_at: Option<DateTime<Utc>>,
}

impl ChatMessage {
    pub fn is_unread_by(&self, reader: &str) -> bool {
        self.from != reader && self.status == MessageStatus::Sent
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct ChatThread {
    pub id: u64,
    #[cfg_attr(feature = "ts", ts(type = "[string, string]"))]
    pub participants: ParticipantPair,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

impl ChatThread {
    pub fn last_message(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn last_activity(&self) -> Option<DateTime<Utc>> {
        self.last_message().map(|m| m.date)
    }

    pub fn unread_count(&self, reader: &str) -> usize {
        self.messages.iter().filter(|m| m.is_unread_by(reader)).count()
    }
}
