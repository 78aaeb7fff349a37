pub mod error;
pub mod prompts;
pub mod render;
pub mod settings;
pub mod store;

pub use error::{Error, Result};
pub use render::{render, RenderOutcome};
pub use settings::{AiSettings, RenderSettings, ScaleSettings, Settings};
pub use store::{
    read_chat_record, read_feedback_record, save_chat_feedback_json, save_chat_json,
    save_chat_text, save_solution_puml, transcript, ChatPass, ChatRecord, FeedbackChatRecord,
    SavedSolution,
};

use serde::{Deserialize, Serialize};

// --- Messages (chat-completions shape) ---

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageUrl {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        ContentPart::Text { text: text.into() }
    }

    /// Wrap base64-encoded PNG bytes as a data URL part.
    pub fn png_base64(data: impl AsRef<str>) -> Self {
        ContentPart::ImageUrl {
            image_url: ImageUrl {
                url: format!("data:image/png;base64,{}", data.as_ref()),
            },
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentPart::Text { text } => Some(text),
            ContentPart::ImageUrl { .. } => None,
        }
    }

    /// `(mime, base64 payload)` of a `data:` image part.
    pub fn image_data(&self) -> Option<(&str, &str)> {
        let ContentPart::ImageUrl { image_url } = self else {
            return None;
        };
        let rest = image_url.url.strip_prefix("data:")?;
        let (mime, data) = rest.split_once(";base64,")?;
        Some((mime, data))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Content {
    Text(String),
    Parts(Vec<ContentPart>),
}

impl Content {
    /// Text of the content; for multi-part content only the text parts, concatenated.
    pub fn text(&self) -> String {
        match self {
            Content::Text(s) => s.clone(),
            Content::Parts(parts) => parts.iter().filter_map(ContentPart::as_text).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: Content,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: Content::Text(content.into()),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: Content::Text(content.into()),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: Content::Text(content.into()),
        }
    }

    pub fn user_parts(parts: Vec<ContentPart>) -> Self {
        Self {
            role: Role::User,
            content: Content::Parts(parts),
        }
    }

    pub fn parts(&self) -> &[ContentPart] {
        match &self.content {
            Content::Parts(parts) => parts,
            Content::Text(_) => &[],
        }
    }
}

/// Ordered turns sent to the chat service. System prompt first.
pub type Conversation = Vec<Message>;

/// Opaque accounting data returned next to a solution.
pub type Usage = serde_json::Map<String, serde_json::Value>;
