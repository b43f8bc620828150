use crate::config::env_nonempty;
use deep_search_core::{Error, ModelClass, Provider, Result, SearchEngine};
use serde::Serialize;
use std::time::Instant;

pub const ENGINE_URL_VAR: &str = "DEEP_SEARCH_ENGINE_URL";
pub const ENGINE_TOKEN_VAR: &str = "DEEP_SEARCH_ENGINE_TOKEN";
pub const DEFAULT_ENGINE_URL: &str = "http://127.0.0.1:8787";

/// Forwards search/research calls to an engine service over HTTP.
///
/// The response body is handed back untouched. No request timeout is set; research
/// tasks can run for minutes.
#[derive(Debug, Clone)]
pub struct HttpEngine {
    client: reqwest::Client,
    endpoint: url::Url,
    token: Option<String>,
}

#[derive(Debug, Serialize)]
struct SearchBody<'a> {
    provider: &'static str,
    query: &'a str,
    max_results: usize,
}

#[derive(Debug, Serialize)]
struct ResearchBody<'a> {
    query: &'a str,
    model_class: &'static str,
}

impl HttpEngine {
    pub fn new(client: reqwest::Client, endpoint: &str, token: Option<String>) -> Result<Self> {
        let endpoint = parse_endpoint(endpoint)?;
        Ok(Self {
            client,
            endpoint,
            token: token.filter(|t| !t.trim().is_empty()),
        })
    }

    pub fn from_env(client: reqwest::Client) -> Result<Self> {
        let endpoint =
            env_nonempty(ENGINE_URL_VAR).unwrap_or_else(|| DEFAULT_ENGINE_URL.to_string());
        Self::new(client, &endpoint, env_nonempty(ENGINE_TOKEN_VAR))
    }

    pub fn endpoint(&self) -> &url::Url {
        &self.endpoint
    }

    fn route(&self, leaf: &str) -> String {
        // Accept either a base URL or one with a trailing slash.
        format!("{}/{leaf}", self.endpoint.as_str().trim_end_matches('/'))
    }

    async fn post<B: Serialize + ?Sized>(&self, leaf: &str, body: &B) -> Result<String> {
        let t0 = Instant::now();
        let mut req = self.client.post(self.route(leaf)).json(body);
        if let Some(token) = self.token.as_deref() {
            req = req.bearer_auth(token);
        }
        let resp = req
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let excerpt = body_excerpt(&body);
            return Err(Error::Transport(if excerpt.is_empty() {
                format!("engine {leaf} HTTP {status}")
            } else {
                format!("engine {leaf} HTTP {status}: {excerpt}")
            }));
        }
        let text = resp
            .text()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;
        tracing::debug!(
            route = leaf,
            bytes = text.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "engine responded"
        );
        Ok(text)
    }
}

const ERROR_BODY_CHARS: usize = 300;

fn body_excerpt(body: &str) -> String {
    let body = body.trim();
    let mut out: String = body.chars().take(ERROR_BODY_CHARS).collect();
    if out.len() < body.len() {
        out.push('…');
    }
    out
}

fn parse_endpoint(raw: &str) -> Result<url::Url> {
    let u = url::Url::parse(raw.trim())
        .map_err(|e| Error::NotConfigured(format!("{ENGINE_URL_VAR}={raw:?}: {e}")))?;
    match u.scheme() {
        "http" | "https" => Ok(u),
        other => Err(Error::NotConfigured(format!(
            "{ENGINE_URL_VAR} must be http(s) (got scheme {other:?})"
        ))),
    }
}

#[async_trait::async_trait]
impl SearchEngine for HttpEngine {
    async fn web_search(
        &self,
        provider: Provider,
        query: &str,
        max_results: usize,
    ) -> Result<String> {
        self.post(
            "search",
            &SearchBody {
                provider: provider.as_str(),
                query,
                max_results,
            },
        )
        .await
    }

    async fn web_search_task(&self, query: &str, model_class: ModelClass) -> Result<String> {
        self.post(
            "research",
            &ResearchBody {
                query,
                model_class: model_class.as_str(),
            },
        )
        .await
    }
}
