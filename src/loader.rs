//! Reading type graph manifests.

use std::path::Path;

use tracing::debug;

use crate::error::LoadError;
use crate::types::{TypeGraph, TypeGraphManifest};

#[cfg(feature = "remote")]
use std::time::Duration;

#[cfg(feature = "remote")]
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Read a manifest from disk.
pub fn load_graph(path: &Path) -> Result<TypeGraph, LoadError> {
    if !path.exists() {
        return Err(LoadError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|source| LoadError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;

    debug!(path = %path.display(), "loaded type graph manifest");
    load_graph_str(&content)
}

/// Parse a manifest already held in memory.
pub fn load_graph_str(content: &str) -> Result<TypeGraph, LoadError> {
    let manifest: TypeGraphManifest =
        serde_json::from_str(content).map_err(|source| LoadError::InvalidJson { source })?;
    Ok(TypeGraph::from(manifest))
}

/// Fetch a manifest over HTTP. Non-2xx responses and undecodable bodies
/// are both `NetworkError`.
#[cfg(feature = "remote")]
pub fn load_graph_url(url: &str) -> Result<TypeGraph, LoadError> {
    let network = |source| LoadError::NetworkError {
        url: url.to_string(),
        source,
    };

    let manifest: TypeGraphManifest = reqwest::blocking::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .and_then(|client| client.get(url).send())
        .and_then(|response| response.error_for_status())
        .and_then(|response| response.json())
        .map_err(network)?;

    debug!(url, "fetched type graph manifest");
    Ok(TypeGraph::from(manifest))
}

/// `http://` and `https://` sources are fetched; anything else is a path.
pub fn is_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

/// Load from a path or URL. Without `remote`, a URL is reported as a
/// missing file.
pub fn load_graph_auto(source: &str) -> Result<TypeGraph, LoadError> {
    if is_url(source) {
        #[cfg(feature = "remote")]
        {
            load_graph_url(source)
        }
        #[cfg(not(feature = "remote"))]
        {
            Err(LoadError::FileNotFound {
                path: std::path::PathBuf::from(source),
            })
        }
    } else {
        load_graph(Path::new(source))
    }
}
