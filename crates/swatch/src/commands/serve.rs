//! Preview server command.

use std::path::PathBuf;

use anyhow::{bail, Result};
use swatch_server::{PreviewServer, ServerConfig};

use crate::config::ConfigFile;

/// Run the preview server.
pub async fn run(
    file_config: ConfigFile,
    port: Option<u16>,
    watch: Option<PathBuf>,
    open: bool,
) -> Result<()> {
    if let Some(path) = &watch {
        if !path.is_file() {
            bail!("Snippet not found: {}", path.display());
        }
    }

    let config = ServerConfig {
        host: file_config.server.host,
        port: port.unwrap_or(file_config.server.port),
        open: open && file_config.server.open,
        watch,
        preview: file_config.preview,
        sizing: file_config.frame,
    };

    tracing::info!("Starting preview server on port {}", config.port);

    PreviewServer::new(config).start().await?;

    Ok(())
}
