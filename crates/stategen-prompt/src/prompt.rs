use std::fs;
use std::path::{Path, PathBuf};

use stategen_core::prompts::{
    EXAMPLE_HEADER, EXAMPLE_IMAGE_CAPTION, FEEDBACK_SYSTEM_PROMPT, SYSTEM_PROMPT, USER_HEADER,
};
use stategen_core::{ContentPart, Conversation, Message};

use crate::scale::{encode_png_base64, load_scaled, ScaleBounds};
use crate::{PromptError, Result};

/// A source file's display name and text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub name: String,
    pub contents: String,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            contents: contents.into(),
        }
    }

    /// Read a file, naming it by its final path component.
    pub fn read(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|source| PromptError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { name, contents })
    }

    pub fn read_all<P: AsRef<Path>>(paths: impl IntoIterator<Item = P>) -> Result<Vec<Self>> {
        paths.into_iter().map(|p| Self::read(p.as_ref())).collect()
    }
}

/// Reference code plus the diagram image drawn for it.
#[derive(Debug, Clone)]
pub struct Example {
    pub files: Vec<SourceFile>,
    pub image: PathBuf,
}

/// Each file wrapped in `<File NAME>` markers, in input order.
pub fn labeled_block(files: &[SourceFile]) -> String {
    let mut out = String::new();
    for f in files {
        out.push_str(&format!(
            "<File {name}>:\n```\n{contents}\n```\n</File {name}>\n",
            name = f.name,
            contents = f.contents
        ));
    }
    out
}

pub fn system_message() -> Message {
    Message::system(SYSTEM_PROMPT)
}

pub fn user_message(files: &[SourceFile]) -> Message {
    Message::user(format!("{USER_HEADER}{}", labeled_block(files)))
}

/// A user turn pairing example code with its diagram image.
pub fn example_message(
    files: &[SourceFile],
    image_path: &Path,
    bounds: &ScaleBounds,
) -> Result<Message> {
    if files.is_empty() {
        return Err(PromptError::InvalidArgument(
            "an example needs at least one source file".into(),
        ));
    }
    if !image_path.is_file() {
        return Err(PromptError::InvalidArgument(format!(
            "example image {} is not a file",
            image_path.display()
        )));
    }

    let image = load_scaled(image_path, bounds)?;
    let data = encode_png_base64(&image)?;
    tracing::debug!(
        image = %image_path.display(),
        width = image.width(),
        height = image.height(),
        encoded_len = data.len(),
        "embedded example image"
    );

    Ok(Message::user_parts(vec![
        ContentPart::text(format!(
            "{EXAMPLE_HEADER}{}{EXAMPLE_IMAGE_CAPTION}",
            labeled_block(files)
        )),
        ContentPart::png_base64(data),
    ]))
}

/// System and user turns asking for a review of `solution` against the code.
pub fn feedback_messages(solution: &str, files: &[SourceFile]) -> Conversation {
    vec![
        Message::system(FEEDBACK_SYSTEM_PROMPT),
        Message::user(format!(
            "# Here the is state diagram:\n<State Diagram>\n```\n{solution}\n```\n</State Diagram>\n\n\
# Here is the source code:```\n{}\n```",
            labeled_block(files)
        )),
    ]
}

/// System turn, then one turn per example, then the target code.
pub fn conversation(
    files: &[SourceFile],
    examples: &[Example],
    bounds: &ScaleBounds,
) -> Result<Conversation> {
    let mut messages = Vec::with_capacity(examples.len() + 2);
    messages.push(system_message());
    for example in examples {
        messages.push(example_message(&example.files, &example.image, bounds)?);
    }
    messages.push(user_message(files));
    Ok(messages)
}
