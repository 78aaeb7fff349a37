pub mod engine;
mod error;
pub mod prompt;
pub mod scale;

pub use engine::{generate, Generation};
pub use error::{PromptError, Result};
pub use prompt::{
    conversation, example_message, feedback_messages, labeled_block, system_message,
    user_message, Example, SourceFile,
};
pub use scale::{encode_png_base64, load_scaled, scale_to_fit, ScaleBounds};

use stategen_core::{AiSettings, ChatPass, Conversation, FeedbackChatRecord, Usage};

/// A conversation and the model's answer to it.
#[derive(Debug, Clone)]
pub struct Pass {
    pub messages: Conversation,
    pub solution: String,
    pub usage: Usage,
}

impl Pass {
    pub fn into_chat_pass(self) -> (String, ChatPass) {
        (
            self.solution,
            ChatPass {
                usage: self.usage,
                messages: self.messages,
            },
        )
    }
}

/// Combine a first pass with the review pass that corrected it.
pub fn feedback_record(first: Pass, feedback: Pass) -> FeedbackChatRecord {
    let (solution, solution_messages) = first.into_chat_pass();
    let (solution_feedback, feedback_messages) = feedback.into_chat_pass();
    FeedbackChatRecord {
        solution,
        solution_feedback,
        solution_messages,
        feedback_messages,
    }
}

async fn run(settings: &AiSettings, messages: Conversation) -> Result<Pass> {
    tracing::info!(
        provider = %settings.provider,
        model = %settings.model,
        turns = messages.len(),
        "sending conversation"
    );
    let Generation { solution, usage } = generate(settings, &messages).await?;
    tracing::debug!(solution_len = solution.len(), "received solution");
    Ok(Pass {
        messages,
        solution,
        usage,
    })
}

/// Ask for a state diagram of `files`, primed with `examples`.
pub async fn solve(
    settings: &AiSettings,
    files: &[SourceFile],
    examples: &[Example],
    bounds: &ScaleBounds,
) -> Result<Pass> {
    let messages = conversation(files, examples, bounds)?;
    run(settings, messages).await
}

/// Ask for a corrected version of `solution`.
pub async fn review(settings: &AiSettings, solution: &str, files: &[SourceFile]) -> Result<Pass> {
    run(settings, feedback_messages(solution, files)).await
}
