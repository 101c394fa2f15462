//! Write a starter configuration and snippet.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Run the init command.
pub fn run(config_path: &Path, force: bool) -> Result<()> {
    tracing::info!("Initializing swatch...");

    if config_path.exists() && !force {
        tracing::warn!(
            "{} already exists. Use --force to overwrite.",
            config_path.display()
        );
    } else {
        fs::write(config_path, DEFAULT_CONFIG)
            .with_context(|| format!("Failed to write {}", config_path.display()))?;
        tracing::info!("Created {}", config_path.display());
    }

    let snippets_dir = config_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join("snippets");
    fs::create_dir_all(&snippets_dir).context("Failed to create snippets directory")?;

    let button_path = snippets_dir.join("button.tsx");
    if !button_path.exists() || force {
        fs::write(&button_path, DEFAULT_SNIPPET).context("Failed to write snippets/button.tsx")?;
        tracing::info!("Created snippets/button.tsx");
    }

    tracing::info!("Initialization complete!");
    tracing::info!("Run 'swatch serve --watch snippets/button.tsx' to open the playground.");

    Ok(())
}

pub const DEFAULT_CONFIG: &str = r#"# Swatch Configuration

[server]
host = "127.0.0.1"
port = 7777
# Open the playground in a browser on start
open = true

[preview]
title = "Preview"
# Minify the preview stylesheet
minify = false
# Delay before the first resize report, in milliseconds
settle_ms = 50

[preview.assets]
react = "https://unpkg.com/react@18/umd/react.development.js"
react_dom = "https://unpkg.com/react-dom@18/umd/react-dom.development.js"
babel = "https://unpkg.com/@babel/standalone/babel.min.js"
# Set to "" to leave the styling engine out
tailwind = "https://cdn.tailwindcss.com"

[frame]
# Pixels added to every reported height
padding = 40
# Frames never shrink below this height
min_height = 300
"#;

const DEFAULT_SNIPPET: &str = r#"import { useState } from 'react';

export default function Button() {
  const [count, setCount] = useState(0);

  return (
    <button
      className="rounded bg-blue-600 px-4 py-2 text-white"
      onClick={() => setCount(count + 1)}
    >
      Clicked {count} times
    </button>
  );
}
"#;
