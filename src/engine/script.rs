//! Processing script retrieval

use crate::config::ScriptSource;
use crate::error::{Error, Result};
use tracing::debug;
use url::Url;

/// Fetch the processing script source from disk or over HTTP(S)
pub async fn fetch_script(source: &ScriptSource) -> Result<String> {
    match source {
        ScriptSource::Path(path) => {
            debug!(?path, "reading processing script");
            Ok(tokio::fs::read_to_string(path).await?)
        }
        ScriptSource::Url(raw) => {
            let url = Url::parse(raw).map_err(|e| Error::Config {
                message: format!("invalid script URL '{}': {}", raw, e),
                key: Some("engine.script".to_string()),
            })?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(Error::Config {
                    message: format!("unsupported script URL scheme '{}'", url.scheme()),
                    key: Some("engine.script".to_string()),
                });
            }

            debug!(%url, "fetching processing script");
            let response = reqwest::get(url.clone()).await?;
            if !response.status().is_success() {
                return Err(Error::Other(format!(
                    "failed to fetch processing script from '{}': HTTP {}",
                    url,
                    response.status()
                )));
            }
            Ok(response.text().await?)
        }
    }
}
