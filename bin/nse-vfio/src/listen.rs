//! Listen address advertised for the endpoint

use std::path::{Path, PathBuf};

/// Unix socket path under a per-endpoint temporary directory
pub fn listen_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(name).join("listen.on")
}

/// URL form of a socket path, as advertised in the endpoint registration
pub fn listen_url(path: &Path) -> String {
    format!("unix://{}", path.display())
}
