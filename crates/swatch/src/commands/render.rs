//! Render snippets to preview documents.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use rayon::prelude::*;

use swatch_normalize::{normalize, SourceText};
use swatch_preview::{render_frame, FrameSizing, PreviewBuilder, TemplateEngine};

use super::collect_snippets;
use crate::config::ConfigFile;

/// Renders snippet files. Shared read-only across worker threads.
struct Renderer {
    builder: PreviewBuilder,
    templates: TemplateEngine,
    sizing: FrameSizing,
    frame: bool,
}

impl Renderer {
    fn new(config: ConfigFile, frame: bool) -> Self {
        Self {
            builder: PreviewBuilder::new(config.preview),
            templates: TemplateEngine::new(),
            sizing: config.frame,
            frame,
        }
    }

    fn render_file(&self, path: &Path) -> Result<String> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let source =
            SourceText::new(text).with_context(|| format!("Invalid snippet {}", path.display()))?;

        let normalized = normalize(source.as_str());
        for warning in &normalized.warnings {
            tracing::warn!("{}: {}", path.display(), warning);
        }

        let document = self
            .builder
            .build(&normalized.unit)
            .with_context(|| format!("Failed to build preview for {}", path.display()))?;

        if !self.frame {
            return Ok(document.into_html());
        }

        let html = render_frame(
            &self.templates,
            &file_stem(path),
            &self.builder.config().title,
            &document,
            self.sizing,
        )?;
        Ok(html)
    }
}

/// Run the render command.
pub fn run(
    config: ConfigFile,
    inputs: &[PathBuf],
    output: Option<PathBuf>,
    frame: bool,
) -> Result<()> {
    let start = Instant::now();
    let files = collect_snippets(inputs)?;
    if files.is_empty() {
        bail!("No snippets found");
    }

    let renderer = Renderer::new(config, frame);

    let Some(output_dir) = output else {
        if files.len() != 1 {
            bail!("Rendering {} snippets requires --output", files.len());
        }
        let html = renderer.render_file(&files[0])?;
        std::io::stdout()
            .write_all(html.as_bytes())
            .context("Failed to write to stdout")?;
        return Ok(());
    };

    let outputs = output_names(&files)?;

    fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    // Render in parallel
    let results: Vec<Result<PathBuf>> = outputs
        .par_iter()
        .map(|(file, name)| {
            let html = renderer.render_file(file)?;
            let out = output_dir.join(name);
            fs::write(&out, html).with_context(|| format!("Failed to write {}", out.display()))?;
            Ok(out)
        })
        .collect();

    let mut written = 0;
    for result in results {
        let path = result?;
        tracing::debug!("Wrote {}", path.display());
        written += 1;
    }

    tracing::info!(
        "Rendered {} snippets in {}ms",
        written,
        start.elapsed().as_millis()
    );
    tracing::info!("Output: {}", output_dir.display());

    Ok(())
}

/// Pair each snippet with its output file name.
/// Two snippets that would write the same file are an error.
fn output_names(files: &[PathBuf]) -> Result<Vec<(&PathBuf, String)>> {
    let mut claimed: HashMap<String, &PathBuf> = HashMap::new();
    let mut outputs = Vec::with_capacity(files.len());

    for file in files {
        let name = format!("{}.html", file_stem(file));
        if let Some(previous) = claimed.insert(name.clone(), file) {
            bail!(
                "Output name collision: {} and {} both render to {}",
                previous.display(),
                file.display(),
                name
            );
        }
        outputs.push((file, name));
    }

    Ok(outputs)
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| "snippet".to_string())
}
