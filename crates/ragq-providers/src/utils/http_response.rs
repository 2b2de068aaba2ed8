//! Response-status handling shared by the embedding, vector-store, and LLM
//! HTTP adapters.

use ragq_domain::error::{Error, Result};
use reqwest::Response;

/// Check an HTTP response's status and parse its JSON body, mapping
/// non-2xx statuses onto the domain error taxonomy the way every adapter in
/// this crate needs: auth failures map to `Error::authentication`, rate
/// limiting to `Error::rate_limited`, and anything else upstream-shaped to
/// `Error::upstream`.
pub async fn check_and_parse(response: Response, provider: &str) -> Result<serde_json::Value> {
    let status = response.status();

    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        let code = status.as_u16();

        return Err(match code {
            401 | 403 => Error::authentication(format!("{provider}: authentication failed: {body}")),
            429 => Error::rate_limited(format!("{provider}: rate limited: {body}")),
            _ => Error::upstream(format!("{provider}: request failed ({code}): {body}")),
        });
    }

    response
        .json()
        .await
        .map_err(|e| Error::upstream(format!("{provider}: response parse failed: {e}")))
}
