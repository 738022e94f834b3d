use chrono::{ DateTime, Utc };
use serde::{ Deserialize, Serialize };
use uuid::Uuid;

use crate::media::EncodedImage;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    User,
    Spirit,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub origin: Origin,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<EncodedImage>,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Origin::User, text.into(), None)
    }

    pub fn user_photo(text: impl Into<String>, image: EncodedImage) -> Self {
        Self::new(Origin::User, text.into(), Some(image))
    }

    pub fn spirit(text: impl Into<String>) -> Self {
        Self::new(Origin::Spirit, text.into(), None)
    }

    fn new(origin: Origin, text: String, image: Option<EncodedImage>) -> Self {
        Self {
            id: Uuid::new_v4(),
            origin,
            text,
            image,
            timestamp: Utc::now(),
        }
    }
}

/// Ordered, append-only record of one session's conversation.
#[derive(Clone, Debug, Default)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn since(&self, index: usize) -> &[ChatMessage] {
        &self.messages[index.min(self.messages.len())..]
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn recent(&self, limit: usize) -> &[ChatMessage] {
        let start = self.messages.len().saturating_sub(limit);
        &self.messages[start..]
    }
}

/// Renders the tail of the transcript as the `context` field of a chat request.
pub fn format_context(transcript: &Transcript, limit: usize) -> Option<String> {
    let recent = transcript.recent(limit);
    if recent.is_empty() {
        return None;
    }
    let mut result = String::new();
    for msg in recent {
        let role_display = match msg.origin {
            Origin::User => "用户",
            Origin::Spirit => "地灵",
        };
        let text = if msg.text.is_empty() && msg.image.is_some() {
            "[图片]"
        } else {
            msg.text.as_str()
        };
        result.push_str(&format!("{}: {}\n", role_display, text));
    }

    Some(result.trim_end().to_string())
}
