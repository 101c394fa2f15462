//! Templates for preview documents and frame embeds.

use minijinja::{AutoEscape, Environment};
use serde::Serialize;

/// Context for rendering a preview document.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentContext<'a> {
    /// Document title
    pub title: &'a str,
    /// Rendering runtime script URL
    pub react: &'a str,
    /// Mount runtime script URL
    pub react_dom: &'a str,
    /// Source transformer script URL
    pub babel: &'a str,
    /// Styling engine script URL
    pub tailwind: Option<&'a str>,
    /// Stylesheet contents
    pub css: &'a str,
    /// Mount point element id
    pub mount_id: &'a str,
    /// Canonical unit, already escaped for a template literal
    pub unit: &'a str,
    /// Size probe script
    pub probe: &'a str,
}

/// Context for rendering a sandboxed frame embed.
#[derive(Debug, Clone, Serialize)]
pub struct FrameContext<'a> {
    /// Frame element id
    pub frame_id: &'a str,
    /// Accessible frame title
    pub title: &'a str,
    /// Initial height in pixels
    pub height: u32,
    /// Full preview document, attribute-escaped by the template
    pub document: &'a str,
    /// Host listener script
    pub listener: &'a str,
}

/// Template engine using minijinja.
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    /// Create a new template engine with the built-in templates.
    pub fn new() -> Self {
        let mut env = Environment::new();

        // Values are escaped explicitly with the `attr` filter
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.add_filter("attr", html_escape);

        env.add_template("preview.html", PREVIEW_TEMPLATE)
            .expect("Failed to add preview template");

        env.add_template("frame.html", FRAME_TEMPLATE)
            .expect("Failed to add frame template");

        Self { env }
    }

    /// Render a preview document.
    pub fn render_document(&self, context: &DocumentContext<'_>) -> Result<String, minijinja::Error> {
        self.env.get_template("preview.html")?.render(context)
    }

    /// Render a frame embed.
    pub fn render_frame(&self, context: &FrameContext<'_>) -> Result<String, minijinja::Error> {
        self.env.get_template("frame.html")?.render(context)
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Escape HTML special characters including single quotes.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

const PREVIEW_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{{ title | attr }}</title>
  <script crossorigin src="{{ react | attr }}"></script>
  <script crossorigin src="{{ react_dom | attr }}"></script>
  <script src="{{ babel | attr }}"></script>
  {% if tailwind %}<script src="{{ tailwind | attr }}"></script>
  {% endif %}<style>{{ css | safe }}</style>
</head>
<body>
  <div id="{{ mount_id | attr }}"></div>
  <script>
(function () {
  'use strict';

  var mount = document.getElementById('{{ mount_id | attr }}');

  function message(err) {
    return 'Error: ' + ((err && err.message) || String(err));
  }

  function showError(err) {
    var panel = document.createElement('div');
    panel.className = 'preview-error';
    panel.setAttribute('data-preview-error', '');
    panel.textContent = message(err);
    mount.replaceChildren(panel);
  }

  window.addEventListener('error', function (event) {
    showError(event.error || event.message);
  });

  var source = `{{ unit | safe }}`;

  try {
    var compiled = Babel.transform(source, {
      filename: 'App.tsx',
      presets: [['typescript', { isTSX: true, allExtensions: true }], 'react']
    }).code;

    var names = ['React', 'ReactDOM', 'Fragment', 'useState', 'useEffect', 'useLayoutEffect',
      'useRef', 'useMemo', 'useCallback', 'useReducer', 'useContext', 'useId',
      'createContext', 'forwardRef', 'memo'];
    var values = names.map(function (name) {
      if (name === 'React') return React;
      if (name === 'ReactDOM') return ReactDOM;
      return React[name];
    });
    // The unit runs in its own scope so its declarations may shadow the
    // injected names (`const { useState } = React;`).
    var App = Function.apply(null, names.concat(
      'return (function () {\n' + compiled +
      '\nreturn typeof App === "undefined" ? undefined : App;\n})();'
    )).apply(null, values);

    if (typeof App === 'undefined') {
      throw new ReferenceError('App is not defined');
    }

    class Boundary extends React.Component {
      constructor(props) {
        super(props);
        this.state = { error: null };
      }
      static getDerivedStateFromError(error) {
        return { error: error };
      }
      render() {
        if (this.state.error) {
          return React.createElement('div', {
            className: 'preview-error',
            'data-preview-error': ''
          }, message(this.state.error));
        }
        return this.props.children;
      }
    }

    var element = React.isValidElement(App) ? App : React.createElement(App);
    ReactDOM.createRoot(mount).render(React.createElement(Boundary, null, element));
{{ probe | safe }}
  } catch (err) {
    showError(err);
  }
})();
  </script>
</body>
</html>
"##;

const FRAME_TEMPLATE: &str = r##"<iframe id="{{ frame_id | attr }}" class="swatch-frame" title="{{ title | attr }}" sandbox="allow-scripts" style="width: 100%; border: 0; height: {{ height }}px" srcdoc="{{ document | attr }}"></iframe>
<script>{{ listener | safe }}</script>
"##;
