use std::path::Path;
use std::process::Command;

use crate::{Error, RenderSettings, Result};

/// Result of one render invocation. A non-zero exit is reported here, not as an `Err`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOutcome {
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl RenderOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Run `<command> -t<format> <file>` and wait for it.
pub fn render(settings: &RenderSettings, file: &Path) -> Result<RenderOutcome> {
    let format_flag = format!("-t{}", settings.format);
    tracing::debug!(command = %settings.command, file = %file.display(), "rendering");

    let output = Command::new(&settings.command)
        .arg(&format_flag)
        .arg(file)
        .output()
        .map_err(|source| Error::Render {
            command: settings.command.clone(),
            source,
        })?;

    let outcome = RenderOutcome {
        exit_code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    };

    if !outcome.success() {
        tracing::warn!(
            command = %settings.command,
            file = %file.display(),
            exit_code = ?outcome.exit_code,
            stderr = %outcome.stderr.trim(),
            "render failed"
        );
    }

    Ok(outcome)
}
