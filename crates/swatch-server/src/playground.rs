//! Playground host page.
//!
//! Embeds one preview frame, an editor that re-renders through
//! `/api/render`, and, when a snippet file is watched, the reload client.

use swatch_preview::templates::html_escape;

/// Id of the playground's preview frame.
pub const FRAME_ID: &str = "preview";

/// Snippet shown when nothing is watched.
pub const PLACEHOLDER_SNIPPET: &str = r#"<p className="p-4 text-gray-500">Edit the snippet and press Render.</p>"#;

/// Inputs for the playground page.
pub struct PlaygroundPage<'a> {
    /// Rendered frame embed, including its listener
    pub frame: &'a str,
    /// Snippet text shown in the editor
    pub source: &'a str,
    /// Display name of the watched file
    pub watching: Option<&'a str>,
    /// Normalizer warnings for the shown snippet
    pub warnings: &'a [String],
    /// Reload client, present only when watching
    pub reload_script: Option<&'a str>,
}

impl PlaygroundPage<'_> {
    /// Render the page.
    pub fn render(&self) -> String {
        let heading = match self.watching {
            Some(name) => format!("Watching <code>{}</code>", html_escape(name)),
            None => "Playground".to_string(),
        };

        let warnings: String = self
            .warnings
            .iter()
            .map(|w| format!("<li>{}</li>", html_escape(w)))
            .collect();

        let reload = self
            .reload_script
            .map(|s| format!("<script>{}</script>", s))
            .unwrap_or_default();

        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>Swatch Playground</title>
  <style>
    body {{ font-family: system-ui, sans-serif; max-width: 960px; margin: 2rem auto; padding: 0 1rem; }}
    h1 {{ font-size: 1.5rem; }}
    textarea {{ width: 100%; min-height: 12rem; font-family: ui-monospace, monospace; font-size: 0.875rem; }}
    .swatch-frame {{ border: 1px solid #e5e7eb !important; border-radius: 0.5rem; margin-top: 1rem; }}
    .warnings {{ color: #92400e; font-size: 0.875rem; }}
    #reload-status {{ color: #b91c1c; }}
  </style>
</head>
<body>
  <h1>{heading}</h1>
  <p id="reload-status"></p>
  <textarea id="source" spellcheck="false">{source}</textarea>
  <button id="render" type="button">Render</button>
  <ul class="warnings">{warnings}</ul>
  {frame}
  <script>
(function() {{
  'use strict';

  var status = document.getElementById('reload-status');
  document.getElementById('render').addEventListener('click', function() {{
    fetch('/api/render', {{
      method: 'POST',
      headers: {{ 'content-type': 'application/json' }},
      body: JSON.stringify({{ code: document.getElementById('source').value }})
    }})
      .then(function(res) {{ return res.json(); }})
      .then(function(body) {{
        if (typeof body.html === 'string') {{
          status.textContent = '';
          document.getElementById('{frame_id}').srcdoc = body.html;
        }} else {{
          status.textContent = body.message || 'Render failed';
        }}
      }})
      .catch(function(err) {{ status.textContent = String(err); }});
  }});
}})();
  </script>
  {reload}
</body>
</html>"#,
            heading = heading,
            source = html_escape(self.source),
            warnings = warnings,
            frame = self.frame,
            frame_id = FRAME_ID,
            reload = reload,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_editor_contents() {
        let html = PlaygroundPage {
            frame: "<iframe></iframe>",
            source: "</textarea><script>alert(1)</script>",
            watching: None,
            warnings: &[],
            reload_script: None,
        }
        .render();

        assert!(html.contains("&lt;/textarea&gt;&lt;script&gt;"));
        assert!(html.contains("<h1>Playground</h1>"));
        assert!(!html.contains("new WebSocket"));
    }

    #[test]
    fn shows_watched_file_and_warnings() {
        let warnings = vec!["bare markup wrapped in a component".to_string()];
        let html = PlaygroundPage {
            frame: "<iframe></iframe>",
            source: "<p>hi</p>",
            watching: Some("button.tsx"),
            warnings: &warnings,
            reload_script: Some("/* reload */"),
        }
        .render();

        assert!(html.contains("Watching <code>button.tsx</code>"));
        assert!(html.contains("<li>bare markup wrapped in a component</li>"));
        assert!(html.contains("<script>/* reload */</script>"));
    }
}
