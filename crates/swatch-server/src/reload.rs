//! WebSocket live reload for the playground.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Messages pushed to playground clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReloadMessage {
    /// Connection established
    Connected,

    /// The watched snippet changed; fetch the page again
    Reload,

    /// The watched snippet could not be read
    Failed {
        /// Human-readable reason
        message: String,
    },
}

/// Hub for broadcasting reload messages to all connected clients.
#[derive(Debug, Clone)]
pub struct ReloadHub {
    sender: broadcast::Sender<ReloadMessage>,
}

impl ReloadHub {
    /// Create a new reload hub.
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(100);
        Self { sender }
    }

    /// Send a message to all connected clients.
    pub fn send(&self, msg: ReloadMessage) {
        // No receivers is fine
        let _ = self.sender.send(msg);
    }

    /// Subscribe to reload messages.
    pub fn subscribe(&self) -> broadcast::Receiver<ReloadMessage> {
        self.sender.subscribe()
    }

    /// Get the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ReloadHub {
    fn default() -> Self {
        Self::new()
    }
}

/// Generate the playground's reload client.
///
/// Connects to `path` on the page's own host so it works behind any bind
/// address.
pub fn reload_client_script(path: &str) -> String {
    format!(
        r#"
(function() {{
  'use strict';

  var scheme = location.protocol === 'https:' ? 'wss://' : 'ws://';
  var ws = new WebSocket(scheme + location.host + '{path}');
  var attempts = 0;

  ws.onmessage = function(event) {{
    var msg = JSON.parse(event.data);

    switch (msg.type) {{
      case 'connected':
        attempts = 0;
        break;
      case 'reload':
        location.reload();
        break;
      case 'failed':
        var banner = document.getElementById('reload-status');
        if (banner) banner.textContent = msg.message;
        break;
    }}
  }};

  ws.onclose = function() {{
    if (attempts < 10) {{
      attempts++;
      setTimeout(function() {{ location.reload(); }}, 1000 * attempts);
    }}
  }};
}})();
"#,
        path = path
    )
}
