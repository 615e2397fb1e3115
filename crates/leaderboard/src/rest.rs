//! PostgREST-compatible HTTP store (Supabase `rest/v1` API).
//!
//! - submit: `POST /rest/v1/<table>` with a one-row JSON array
//! - fetch:  `GET /rest/v1/<table>?select=...&order=score.desc&limit=<n>`
//!
//! Both carry the project key as `apikey` and as a bearer token. `https://` goes
//! through rustls with the webpki root set; `http://` is accepted for local
//! PostgREST instances.

use anyhow::{bail, Context, Result};
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use hyper::{Method, Request, Uri};
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use log::debug;

use crate::entry::ScoreEntry;
use crate::names::scrub_control_chars;
use crate::store::ScoreStore;

const SELECT_COLUMNS: &str = "player_name,score,level,lines";

/// Longest error body echoed back in a failure message
const ERROR_BODY_CHARS: usize = 200;

pub struct RestStore {
    client: Client<HttpsConnector<HttpConnector>, Full<Bytes>>,
    endpoint: String,
    key: String,
}

impl RestStore {
    /// Validate the base URL and table name and build the client.
    pub fn new(base_url: &str, key: &str, table: &str) -> Result<Self> {
        let base = base_url.trim().trim_end_matches('/');
        let uri: Uri = base
            .parse()
            .with_context(|| format!("invalid leaderboard URL {base:?}"))?;
        match uri.scheme_str() {
            Some("http") | Some("https") => {}
            Some(other) => bail!("unsupported URL scheme {other:?}"),
            None => bail!("leaderboard URL must start with https:// or http://"),
        }
        if uri.host().is_none() {
            bail!("leaderboard URL has no host");
        }
        if table.is_empty() || !table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            bail!("invalid table name {table:?}");
        }
        if key.is_empty() {
            bail!("missing API key");
        }

        let connector = HttpsConnectorBuilder::new()
            .with_webpki_roots()
            .https_or_http()
            .enable_http1()
            .build();
        let client = Client::builder(TokioExecutor::new()).build(connector);
        Ok(Self {
            client,
            endpoint: format!("{base}/rest/v1/{table}"),
            key: key.to_string(),
        })
    }

    pub fn insert_uri(&self) -> &str {
        &self.endpoint
    }

    pub fn select_uri(&self, limit: usize) -> String {
        format!(
            "{}?select={}&order=score.desc&limit={}",
            self.endpoint, SELECT_COLUMNS, limit
        )
    }

    fn request(&self, method: Method, uri: &str, body: Bytes) -> Result<Request<Full<Bytes>>> {
        let mut builder = Request::builder()
            .method(method.clone())
            .uri(uri)
            .header("apikey", &self.key)
            .header(AUTHORIZATION, format!("Bearer {}", self.key))
            .header(ACCEPT, "application/json");
        if method == Method::POST {
            builder = builder
                .header(CONTENT_TYPE, "application/json")
                .header("Prefer", "return=minimal");
        }
        builder
            .body(Full::new(body))
            .context("failed to build leaderboard request")
    }

    async fn send(&self, req: Request<Full<Bytes>>) -> Result<Bytes> {
        let method = req.method().clone();
        let resp = self
            .client
            .request(req)
            .await
            .context("leaderboard server unreachable")?;
        let status = resp.status();
        let body = resp
            .into_body()
            .collect()
            .await
            .context("failed to read leaderboard response")?
            .to_bytes();
        debug!("{} {} -> {} ({} bytes)", method, self.endpoint, status, body.len());

        if !status.is_success() {
            let text = String::from_utf8_lossy(&body);
            let snippet: String = text.chars().take(ERROR_BODY_CHARS).collect();
            // Error bodies can echo the submitted row, player name included.
            bail!(
                "leaderboard returned {status}: {}",
                scrub_control_chars(snippet.trim())
            );
        }
        Ok(body)
    }
}

impl ScoreStore for RestStore {
    async fn submit(&self, entry: ScoreEntry) -> Result<()> {
        let body = serde_json::to_vec(&[&entry])?;
        let req = self.request(Method::POST, &self.endpoint, Bytes::from(body))?;
        self.send(req).await?;
        Ok(())
    }

    async fn fetch_top(&self, limit: usize) -> Result<Vec<ScoreEntry>> {
        let req = self.request(Method::GET, &self.select_uri(limit), Bytes::new())?;
        let body = self.send(req).await?;
        serde_json::from_slice(&body).context("unexpected leaderboard response")
    }

    fn describe(&self) -> String {
        format!("rest {}", self.endpoint)
    }
}
