use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use stategen_prompt::{Example, SourceFile};

fn is_png(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("png"))
}

/// An example directory holds exactly one `.png` diagram and the source files it depicts.
pub fn load_example(dir: &Path) -> Result<Example> {
    let mut entries: Vec<_> = fs::read_dir(dir)
        .with_context(|| format!("reading example dir {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file())
        .collect();
    entries.sort();

    let (images, sources): (Vec<_>, Vec<_>) = entries.into_iter().partition(|p| is_png(p));

    let image = match images.as_slice() {
        [one] => one.clone(),
        [] => bail!("example dir {} has no .png diagram", dir.display()),
        _ => bail!("example dir {} has more than one .png diagram", dir.display()),
    };
    if sources.is_empty() {
        bail!("example dir {} has no source files", dir.display());
    }

    let files = SourceFile::read_all(&sources)?;
    tracing::debug!(dir = %dir.display(), files = files.len(), "loaded example");
    Ok(Example { files, image })
}
