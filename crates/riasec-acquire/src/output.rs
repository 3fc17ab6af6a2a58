use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Cache a raw detail page so extraction can be re-examined without re-fetching.
///
/// The file is named after the occupation code (`15-1252.00.html`).
pub fn cache_page(cache_dir: &Path, code: &str, html: &str) -> Result<PathBuf> {
    fs::create_dir_all(cache_dir)
        .with_context(|| format!("Failed to create cache directory {}", cache_dir.display()))?;
    let path = cache_dir.join(format!("{}.html", sanitize_file_stem(code)));
    fs::write(&path, html).with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::debug!(path = %path.display(), bytes = html.len(), "Cached raw HTML");
    Ok(path)
}

fn sanitize_file_stem(code: &str) -> String {
    code.trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_') { c } else { '_' })
        .collect()
}
