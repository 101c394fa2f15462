//! Normalize and execute snippets without a browser.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use swatch_normalize::{normalize, SourceText};
use swatch_preview::{
    resize_channel, FrameSizing, IsolatedHost, MountContent, PreviewBuilder, StaticEvaluator,
};

use super::collect_snippets;
use crate::config::ConfigFile;

/// Outcome of checking one snippet.
#[derive(Debug, PartialEq)]
enum Outcome {
    /// Mounted; frame height after sizing
    Mounted { frame_height: u32, warnings: usize },
    /// The mount point shows an error panel
    Faulted { message: String },
}

struct Checker {
    builder: PreviewBuilder,
    host: IsolatedHost<StaticEvaluator>,
    sizing: FrameSizing,
}

impl Checker {
    fn new(config: ConfigFile) -> Self {
        Self {
            builder: PreviewBuilder::new(config.preview),
            host: IsolatedHost::new(StaticEvaluator::new()),
            sizing: config.frame,
        }
    }

    fn check_file(&self, path: &Path) -> Result<Outcome> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let source =
            SourceText::new(text).with_context(|| format!("Invalid snippet {}", path.display()))?;

        let normalized = normalize(source.as_str());
        for warning in &normalized.warnings {
            tracing::warn!("{}: {}", path.display(), warning);
        }

        let document = self.builder.build(&normalized.unit)?;

        let (emitter, receiver) = resize_channel();
        let mount = self.host.execute(&document, emitter);

        if let MountContent::Error(message) = mount.content() {
            return Ok(Outcome::Faulted {
                message: message.clone(),
            });
        }

        let height = receiver.latest().map(|msg| msg.height()).unwrap_or(0.0);
        Ok(Outcome::Mounted {
            frame_height: self.sizing.apply(height),
            warnings: normalized.warnings.len(),
        })
    }
}

/// Run the check command.
pub fn run(config: ConfigFile, inputs: &[PathBuf]) -> Result<()> {
    let files = collect_snippets(inputs)?;
    if files.is_empty() {
        bail!("No snippets found");
    }

    let checker = Checker::new(config);
    let mut failed = 0;

    for file in &files {
        match checker.check_file(file)? {
            Outcome::Mounted {
                frame_height,
                warnings,
            } => {
                tracing::info!(
                    "{}: ok (frame {}px, {} warnings)",
                    file.display(),
                    frame_height,
                    warnings
                );
            }
            Outcome::Faulted { message } => {
                tracing::error!("{}: {}", file.display(), message);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        bail!("{} of {} snippets failed", failed, files.len());
    }

    tracing::info!("Checked {} snippets", files.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn check_source(source: &str) -> Outcome {
        let temp = tempdir().unwrap();
        let path = temp.path().join("snippet.tsx");
        fs::write(&path, source).unwrap();

        Checker::new(ConfigFile::default()).check_file(&path).unwrap()
    }

    #[test]
    fn mounted_snippet_gets_minimum_frame_height() {
        let outcome = check_source("function Button() { return <button>Hi</button>; }");

        assert_eq!(
            outcome,
            Outcome::Mounted {
                frame_height: 300,
                warnings: 0
            }
        );
    }

    #[test]
    fn undefined_reference_is_reported() {
        let outcome = check_source("function Broken() { return <div>{missingValue}</div>; }");

        assert_eq!(
            outcome,
            Outcome::Faulted {
                message: "ReferenceError: missingValue is not defined".to_string()
            }
        );
    }

    #[test]
    fn failures_fail_the_command() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("ok.tsx"), "<p>fine</p>").unwrap();
        fs::write(temp.path().join("bad.tsx"), "<p>{nope}</p>").unwrap();

        let err = run(ConfigFile::default(), &[temp.path().to_path_buf()]).unwrap_err();
        assert_eq!(err.to_string(), "1 of 2 snippets failed");
    }
}
