use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use llm::builder::{LLMBackend, LLMBuilder};
use llm::chat::{ChatMessage, ImageMime};

use stategen_core::{AiSettings, Content, ContentPart, Message, Role, Usage};

use crate::{PromptError, Result};

/// Model output for one request.
#[derive(Debug, Clone)]
pub struct Generation {
    pub solution: String,
    pub usage: Usage,
}

fn map_backend(provider: &str) -> Result<LLMBackend> {
    match provider {
        "openai" => Ok(LLMBackend::OpenAI),
        "anthropic" => Ok(LLMBackend::Anthropic),
        "google" => Ok(LLMBackend::Google),
        "ollama" => Ok(LLMBackend::Ollama),
        "groq" => Ok(LLMBackend::Groq),
        "mistral" => Ok(LLMBackend::Mistral),
        "deepseek" => Ok(LLMBackend::DeepSeek),
        other => Err(PromptError::InvalidArgument(format!("unknown provider: {other}"))),
    }
}

fn map_mime(mime: &str) -> Result<ImageMime> {
    match mime {
        "image/png" => Ok(ImageMime::PNG),
        "image/jpeg" => Ok(ImageMime::JPEG),
        other => Err(PromptError::InvalidArgument(format!(
            "unsupported image type: {other}"
        ))),
    }
}

/// Caption for an image with no text before it.
const BARE_IMAGE_CAPTION: &str = "(image continued)";

/// A user turn may carry several images. Each image goes in its own message
/// together with the text that precedes it; text after the last image joins
/// that last message.
fn user_turn(message: &Message, out: &mut Vec<ChatMessage>) -> Result<()> {
    if let Content::Text(text) = &message.content {
        out.push(ChatMessage::user().content(text.as_str()).build());
        return Ok(());
    }

    let mut groups: Vec<(String, Option<(ImageMime, Vec<u8>)>)> = Vec::new();
    let mut pending = String::new();
    for part in message.parts() {
        if let Some(text) = part.as_text() {
            pending.push_str(text);
        } else if let Some((mime, data)) = part.image_data() {
            let bytes = BASE64
                .decode(data)
                .map_err(|e| PromptError::InvalidArgument(format!("image part: {e}")))?;
            groups.push((std::mem::take(&mut pending), Some((map_mime(mime)?, bytes))));
        } else if let ContentPart::ImageUrl { image_url } = part {
            return Err(PromptError::InvalidArgument(format!(
                "only data: image urls are supported, got {}",
                image_url.url
            )));
        }
    }

    match groups.last_mut() {
        Some((text, _)) => text.push_str(&pending),
        None => groups.push((pending, None)),
    }

    for (text, image) in groups {
        let text = if text.is_empty() && image.is_some() {
            BARE_IMAGE_CAPTION.to_string()
        } else {
            text
        };
        let mut builder = ChatMessage::user().content(text);
        if let Some((mime, bytes)) = image {
            builder = builder.image(mime, bytes);
        }
        out.push(builder.build());
    }
    Ok(())
}

/// Split a conversation into the builder's system prompt and the chat turns.
fn to_chat_messages(messages: &[Message]) -> Result<(String, Vec<ChatMessage>)> {
    let mut system = Vec::new();
    let mut chat = Vec::with_capacity(messages.len());

    for m in messages {
        match m.role {
            Role::System => system.push(m.content.text()),
            Role::User => user_turn(m, &mut chat)?,
            Role::Assistant => chat.push(ChatMessage::assistant().content(m.content.text()).build()),
        }
    }

    Ok((system.join("\n\n"), chat))
}

fn usage_map(usage: llm::chat::Usage) -> Usage {
    match serde_json::to_value(usage) {
        Ok(serde_json::Value::Object(map)) => map,
        _ => Usage::new(),
    }
}

/// One chat request, no retry.
pub async fn generate(settings: &AiSettings, messages: &[Message]) -> Result<Generation> {
    let backend = map_backend(&settings.provider)?;
    let (system, chat) = to_chat_messages(messages)?;

    let mut builder = LLMBuilder::new().backend(backend).model(&settings.model);

    if !system.is_empty() {
        builder = builder.system(system);
    }
    if !settings.api_key.is_empty() {
        builder = builder.api_key(&settings.api_key);
    }

    let llm = builder
        .build()
        .map_err(|e| PromptError::Provider(format!("build LLM: {e}")))?;

    let response = llm
        .chat(&chat)
        .await
        .map_err(|e| PromptError::Provider(format!("chat: {e}")))?;

    let usage = response.usage().map(usage_map).unwrap_or_default();

    match response.text() {
        Some(text) if !text.trim().is_empty() => Ok(Generation {
            solution: text,
            usage,
        }),
        Some(_) => Err(PromptError::Provider("LLM returned empty text".to_string())),
        None => Err(PromptError::Provider("LLM returned no text".to_string())),
    }
}
