//! Browser-side halves of the resize channel.
//!
//! The probe runs inside the sandboxed frame and posts
//! `{ type: 'resize', height }` to the parent. The listener runs in the
//! hosting page and sizes its frame from those messages.

use crate::resize::FrameSizing;

/// Generate the in-frame size probe.
///
/// Observes the mount point (or `document.body` when it is missing) and
/// reports on every size change, plus once after first paint.
pub fn probe_script(mount_id: &str, settle_ms: u32) -> String {
    format!(
        r#"
    (function () {{
      var target = document.getElementById('{mount_id}') || document.body;
      function report() {{
        var height = Math.ceil(document.body.scrollHeight);
        window.parent.postMessage({{ type: 'resize', height: height }}, '*');
      }}
      if (typeof ResizeObserver !== 'undefined') {{
        new ResizeObserver(report).observe(target);
      }}
      requestAnimationFrame(function () {{
        setTimeout(report, {settle_ms});
      }});
    }})();
"#,
        mount_id = mount_id,
        settle_ms = settle_ms,
    )
}

/// Generate the host-page listener for one embedded frame.
///
/// Only messages posted by the frame's own window with exactly the
/// `type`/`height` shape are applied. The listener removes itself once the
/// frame leaves the document.
pub fn listener_script(frame_id: &str, sizing: FrameSizing) -> String {
    format!(
        r#"
(function() {{
  'use strict';

  var frame = document.getElementById('{frame_id}');
  if (!frame) return;

  function onMessage(event) {{
    if (event.source !== frame.contentWindow) return;
    var data = event.data;
    if (!data || typeof data !== 'object') return;
    if (Object.keys(data).length !== 2) return;
    if (data.type !== 'resize') return;
    if (typeof data.height !== 'number' || !isFinite(data.height) || data.height < 0) return;

    frame.style.height = Math.max(Math.ceil(data.height) + {padding}, {min_height}) + 'px';
  }}

  window.addEventListener('message', onMessage);

  var teardown = new MutationObserver(function() {{
    if (!frame.isConnected) {{
      window.removeEventListener('message', onMessage);
      teardown.disconnect();
    }}
  }});
  teardown.observe(document.body, {{ childList: true, subtree: true }});
}})();
"#,
        frame_id = sanitize_id(frame_id),
        padding = sizing.padding,
        min_height = sizing.min_height,
    )
}

/// Restrict an element id to characters safe inside a JS string literal.
pub fn sanitize_id(id: &str) -> String {
    let cleaned: String = id
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    if cleaned.is_empty() {
        "swatch-frame".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_posts_resize_messages() {
        let script = probe_script("root", 50);

        assert!(script.contains("getElementById('root') || document.body"));
        assert!(script.contains("new ResizeObserver(report)"));
        assert!(script.contains("{ type: 'resize', height: height }"));
        assert!(script.contains("setTimeout(report, 50)"));
    }

    #[test]
    fn listener_clamps_to_floor() {
        let script = listener_script(
            "frame-1",
            FrameSizing {
                padding: 40,
                min_height: 300,
            },
        );

        assert!(script.contains("getElementById('frame-1')"));
        assert!(script.contains("Math.ceil(data.height) + 40, 300"));
        assert!(script.contains("event.source !== frame.contentWindow"));
        assert!(script.contains("removeEventListener('message', onMessage)"));
    }

    #[test]
    fn sanitizes_frame_ids() {
        assert_eq!(sanitize_id("frame-1"), "frame-1");
        assert_eq!(sanitize_id("a'); alert(1); ('"), "aalert1");
        assert_eq!(sanitize_id("'\""), "swatch-frame");
    }
}
