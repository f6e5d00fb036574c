use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A class feed entry written by a teacher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: u64,
    pub class: String,
    pub teacher: String,
    pub date: DateTime<Utc>,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_type: Option<String>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub reactions: Reactions,
}

impl Post {
    pub fn has_media(&self) -> bool {
        self.photo.is_some() || self.video.is_some() || self.doc_url.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Comment {
    pub author: String,
    pub text: String,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Reactions {
    #[serde(default)]
    pub likes: u32,
    #[serde(default)]
    pub emoji: BTreeMap<String, u32>,
}

impl Reactions {
    pub fn apply(&mut self, reaction: &Reaction) {
        match reaction {
            Reaction::Like => self.likes += 1,
            Reaction::Emoji(emoji) => *self.emoji.entry(emoji.clone()).or_insert(0) += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.likes + self.emoji.values().sum::<u32>()
    }
}

/// A reaction a reader leaves on a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reaction {
    Like,
    Emoji(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reactions_apply() {
        let mut reactions = Reactions::default();
        reactions.apply(&Reaction::Like);
        reactions.apply(&Reaction::Emoji("❤️".to_string()));
        reactions.apply(&Reaction::Emoji("❤️".to_string()));
        reactions.apply(&Reaction::Emoji("👏".to_string()));

        assert_eq!(reactions.likes, 1);
        assert_eq!(reactions.emoji.get("❤️"), Some(&2));
        assert_eq!(reactions.total(), 4);
    }

    #[test]
    fn test_post_defaults_when_fields_missing() {
        let json = r#"{"id":1,"class":"Pequeños","teacher":"Maestra Ana","date":"2024-11-04T09:00:00Z","text":"Hola"}"#;
        let post: Post = serde_json::from_str(json).unwrap();
        assert!(post.comments.is_empty());
        assert_eq!(post.reactions, Reactions::default());
        assert!(!post.has_media());
    }

    #[test]
    fn test_post_serializes_camel_case() {
        let json = r#"{"id":2,"class":"Medianos","teacher":"T","date":"2024-11-04T09:00:00Z","text":"x","docUrl":"a.pdf","docType":"pdf"}"#;
        let post: Post = serde_json::from_str(json).unwrap();
        assert_eq!(post.doc_url.as_deref(), Some("a.pdf"));

        let out = serde_json::to_value(&post).unwrap();
        assert_eq!(out["docType"], "pdf");
        assert!(out.get("photo").is_none());
    }
}
