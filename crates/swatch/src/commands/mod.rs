pub mod check;
pub mod init;
pub mod render;
pub mod serve;

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use walkdir::WalkDir;

/// File extensions treated as snippets when walking directories.
const SNIPPET_EXTENSIONS: &[&str] = &["tsx", "jsx", "ts", "js", "md", "mdx"];

/// Expand files and directories into a sorted list of snippet files.
///
/// Files named explicitly are kept whatever their extension.
pub fn collect_snippets(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for input in inputs {
        if input.is_file() {
            files.push(input.clone());
            continue;
        }
        if !input.is_dir() {
            bail!("Input not found: {}", input.display());
        }

        for entry in WalkDir::new(input)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if path.is_file() && is_snippet(path) {
                files.push(path.to_path_buf());
            }
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}

fn is_snippet(path: &Path) -> bool {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    SNIPPET_EXTENSIONS.contains(&ext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn collects_snippets_from_directories() {
        let temp = tempdir().unwrap();
        fs::create_dir_all(temp.path().join("nested")).unwrap();
        fs::write(temp.path().join("b.tsx"), "<b />").unwrap();
        fs::write(temp.path().join("nested/a.jsx"), "<a />").unwrap();
        fs::write(temp.path().join("notes.txt"), "skip").unwrap();

        let files = collect_snippets(&[temp.path().to_path_buf()]).unwrap();

        assert_eq!(
            files,
            vec![temp.path().join("b.tsx"), temp.path().join("nested/a.jsx")]
        );
    }

    #[test]
    fn keeps_explicit_files_and_rejects_missing_inputs() {
        let temp = tempdir().unwrap();
        let snippet = temp.path().join("snippet.txt");
        fs::write(&snippet, "<p />").unwrap();

        assert_eq!(collect_snippets(&[snippet.clone()]).unwrap(), vec![snippet]);
        assert!(collect_snippets(&[temp.path().join("missing.tsx")]).is_err());
    }
}
