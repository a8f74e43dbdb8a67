// src/api/mod.rs
//
// JSON endpoints of the backend collaborator. Two quirks are load-bearing:
// `/api/recompute` may answer with a non-JSON body, which decodes as the
// empty (failed) result; `/api/response` may answer a 500 with an HTML
// error page, which must become a readable error instead of a parse crash.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::{header, Client, Response};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use url::Url;

/// How much of a non-JSON body survives into the error message.
const BODY_EXCERPT_CHARS: usize = 200;

/// Result payload shared by the backend endpoints. Everything is optional
/// so a missing or foreign body decodes as the default, which reads as a
/// failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiResult {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    /// Per-field validation errors from a rejected submission.
    #[serde(default)]
    pub errors: Option<Value>,
}

/// Capability for the two backend operations the panel issues.
#[async_trait]
pub trait Backend: Send + Sync {
    /// `POST /api/recompute`: regenerate both CSV exports.
    async fn recompute(&self) -> Result<ApiResult>;
    /// `POST /api/response`: store one survey submission.
    async fn submit_response(&self, payload: &Value) -> Result<ApiResult>;
}

/// `Backend` over HTTP with a shared `reqwest` client.
pub struct HttpBackend {
    client: Client,
    base: Url,
}

impl HttpBackend {
    pub fn new(client: Client, base_url: &str) -> Result<Self> {
        let base = Url::parse(base_url).with_context(|| format!("invalid base url {base_url}"))?;
        Ok(Self { client, base })
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn recompute(&self) -> Result<ApiResult> {
        let url = self.base.join("/api/recompute")?;
        let resp = self
            .client
            .post(url.clone())
            .send()
            .await
            .with_context(|| format!("requesting {url}"))?;
        debug!(%url, status = %resp.status(), "recompute answered");
        // Tolerant decode: any body that is not the expected JSON counts as
        // the empty result, i.e. the failure path.
        Ok(resp.json::<ApiResult>().await.unwrap_or_default())
    }

    async fn submit_response(&self, payload: &Value) -> Result<ApiResult> {
        let url = self.base.join("/api/response")?;
        let resp = self
            .client
            .post(url.clone())
            .json(payload)
            .send()
            .await
            .with_context(|| format!("requesting {url}"))?;
        decode_json_checked(resp).await
    }
}

/// Decode a JSON body only after the content type confirms it is one, so an
/// HTML error page turns into an error naming the status and an excerpt of
/// the body.
async fn decode_json_checked(resp: Response) -> Result<ApiResult> {
    let status = resp.status();
    let content_type = resp
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    if !content_type.contains("application/json") {
        let body = resp.text().await.unwrap_or_default();
        bail!(
            "HTTP {} {}: {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("?"),
            truncate_chars(&body, BODY_EXCERPT_CHARS)
        );
    }

    resp.json::<ApiResult>()
        .await
        .context("decoding api response body")
}

/// Truncate at a char boundary; byte slicing could split a code point.
pub(crate) fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_result_is_failure() {
        let result = ApiResult::default();
        assert!(!result.ok);
        assert!(result.error.is_none());
        assert!(result.errors.is_none());
    }

    #[test]
    fn decodes_success_payload() {
        let result: ApiResult = serde_json::from_str(r#"{"ok":true,"msg":"Recalculado"}"#).unwrap();
        assert!(result.ok);
    }

    #[test]
    fn decodes_failure_payload() {
        let result: ApiResult =
            serde_json::from_str(r#"{"ok":false,"error":"sin conexion"}"#).unwrap();
        assert!(!result.ok);
        assert_eq!(result.error.as_deref(), Some("sin conexion"));
    }

    #[test]
    fn decodes_field_errors() {
        let result: ApiResult =
            serde_json::from_str(r#"{"ok":false,"errors":{"edad":"fuera de rango"}}"#).unwrap();
        assert_eq!(
            result.errors.unwrap()["edad"],
            Value::String("fuera de rango".to_string())
        );
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("abcdef", 3), "abc");
        assert_eq!(truncate_chars("ab", 5), "ab");
        // Multibyte: must not split the code point.
        assert_eq!(truncate_chars("ññññ", 2), "ññ");
    }
}
