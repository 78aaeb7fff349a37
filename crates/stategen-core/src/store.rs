use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::{render, Error, Message, RenderOutcome, RenderSettings, Result, Usage};

// --- Records ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatRecord {
    pub solution: String,
    pub usage: Usage,
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatPass {
    pub usage: Usage,
    pub messages: Vec<Message>,
}

/// A first pass and the review pass that corrected it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeedbackChatRecord {
    pub solution: String,
    pub solution_feedback: String,
    pub solution_messages: ChatPass,
    pub feedback_messages: ChatPass,
}

#[derive(Serialize)]
struct ChatRecordRef<'a> {
    solution: &'a str,
    usage: &'a Usage,
    messages: &'a [Message],
}

#[derive(Debug, Clone)]
pub struct SavedSolution {
    pub puml: PathBuf,
    /// Where the renderer is expected to put its output.
    pub image: PathBuf,
    /// `None` when rendering was not requested.
    pub render: Option<RenderOutcome>,
}

// --- Diagram source ---

/// Write `<solution_dir>/<component>/<model>_<timestamp>.puml` and render it
/// in place when `render_with` is given.
pub fn save_solution_puml(
    solution: &str,
    solution_dir: &Path,
    component: &str,
    model: &str,
    timestamp: &str,
    render_with: Option<&RenderSettings>,
) -> Result<SavedSolution> {
    let dir = solution_dir.join(component);
    fs::create_dir_all(&dir).map_err(|e| Error::io(&dir, e))?;

    let puml = dir.join(format!("{model}_{timestamp}.puml"));
    fs::write(&puml, solution).map_err(|e| Error::io(&puml, e))?;
    tracing::info!(path = %puml.display(), "saved solution");

    let format = render_with.map(|r| r.format.as_str()).unwrap_or("png");
    let image = puml.with_extension(format);
    let outcome = render_with.map(|r| render(r, &puml)).transpose()?;

    Ok(SavedSolution {
        puml,
        image,
        render: outcome,
    })
}

// --- Chat transcripts ---

fn chat_file(chat_dir: &Path, filename: &str, timestamp: &str, suffix: &str, ext: &str) -> PathBuf {
    chat_dir.join(format!("{filename}_{timestamp}{suffix}.{ext}"))
}

/// `filename` may carry separators, so the parent can sit below `chat_dir`.
fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
    }
    Ok(())
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    ensure_parent(path)?;
    let file = File::create(path).map_err(|e| Error::io(path, e))?;
    let mut writer = BufWriter::new(file);
    {
        let mut ser = Serializer::with_formatter(&mut writer, PrettyFormatter::with_indent(b"    "));
        value.serialize(&mut ser)?;
    }
    writer.flush().map_err(|e| Error::io(path, e))?;
    tracing::info!(path = %path.display(), "saved chat");
    Ok(())
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    Ok(serde_json::from_str(&raw)?)
}

/// `<chat_dir>/<filename>_<timestamp>.json` holding `{solution, usage, messages}`.
pub fn save_chat_json(
    messages: &[Message],
    solution: &str,
    usage: &Usage,
    chat_dir: &Path,
    filename: &str,
    timestamp: &str,
) -> Result<PathBuf> {
    let path = chat_file(chat_dir, filename, timestamp, "", "json");
    write_json(
        &path,
        &ChatRecordRef {
            solution,
            usage,
            messages,
        },
    )?;
    Ok(path)
}

/// `<chat_dir>/<filename>_<timestamp>_feedback.json`.
pub fn save_chat_feedback_json(
    record: &FeedbackChatRecord,
    chat_dir: &Path,
    filename: &str,
    timestamp: &str,
) -> Result<PathBuf> {
    let path = chat_file(chat_dir, filename, timestamp, "_feedback", "json");
    write_json(&path, record)?;
    Ok(path)
}

pub fn read_chat_record(path: &Path) -> Result<ChatRecord> {
    read_json(path)
}

pub fn read_feedback_record(path: &Path) -> Result<FeedbackChatRecord> {
    read_json(path)
}

/// Human-readable rendering of a conversation. Image parts are left out.
pub fn transcript(messages: &[Message]) -> String {
    let rule = "--".repeat(30);
    let divider = "##".repeat(50);
    let mut out = String::new();

    for m in messages {
        out.push_str(m.role.as_str());
        out.push('\n');
        out.push_str(&rule);
        out.push_str("\n\n");
        out.push_str(&m.content.text());
        out.push_str("\n\n\n");
        out.push_str(&divider);
        out.push_str("\n\n\n");
    }

    out
}

/// `<chat_dir>/<filename>_<timestamp>.txt`, or `..._feedback.txt` for a review pass.
pub fn save_chat_text(
    messages: &[Message],
    chat_dir: &Path,
    filename: &str,
    timestamp: &str,
    is_feedback: bool,
) -> Result<PathBuf> {
    let suffix = if is_feedback { "_feedback" } else { "" };
    let path = chat_file(chat_dir, filename, timestamp, suffix, "txt");
    ensure_parent(&path)?;
    fs::write(&path, transcript(messages)).map_err(|e| Error::io(&path, e))?;
    tracing::info!(path = %path.display(), "saved transcript");
    Ok(path)
}
