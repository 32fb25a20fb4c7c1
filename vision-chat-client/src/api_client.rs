//! Thin HTTP client for the vision-chat API.

use std::path::Path;

use anyhow::{Context, Result};
use reqwest::{StatusCode, multipart};
use serde_json::{Value, json};

const SESSION_HEADER: &str = "X-Session-Id";

/// Status code plus parsed JSON body (or `Null` when the body is not JSON).
pub struct Reply {
    pub status: StatusCode,
    pub body: Value,
}

pub struct ApiClient {
    http: reqwest::Client,
    base: String,
    session: Option<String>,
}

impl ApiClient {
    pub fn new(base: &str, session: Option<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            http,
            base: base.trim_end_matches('/').to_string(),
            session,
        })
    }

    /// `POST /upload` with the file as multipart field `image`.
    pub async fn upload(&self, path: &Path) -> Result<Reply> {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("image.jpg")
            .to_string();

        let form = multipart::Form::new()
            .part("image", multipart::Part::bytes(bytes).file_name(file_name));
        let req = self
            .with_session(self.http.post(self.url("/upload")))
            .multipart(form);
        Self::send(req).await
    }

    pub async fn ask(&self, question: &str) -> Result<Reply> {
        let req = self
            .with_session(self.http.post(self.url("/ask")))
            .json(&json!({ "question": question }));
        Self::send(req).await
    }

    pub async fn reset(&self) -> Result<Reply> {
        let req = self.with_session(self.http.post(self.url("/reset")));
        Self::send(req).await
    }

    pub async fn health(&self) -> Result<Reply> {
        Self::send(self.http.get(self.url("/health"))).await
    }

    /// Downloads an arbitrary URL (used by the smoke run for sample images).
    pub async fn download(&self, url: &str) -> Result<Vec<u8>> {
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .with_context(|| format!("failed to download {url}"))?
            .error_for_status()?;
        Ok(resp.bytes().await?.to_vec())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }

    fn with_session(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.session {
            Some(id) => req.header(SESSION_HEADER, id),
            None => req,
        }
    }

    async fn send(req: reqwest::RequestBuilder) -> Result<Reply> {
        let resp = req.send().await.context("request to vision-chat API failed")?;
        let status = resp.status();
        let text = resp.text().await?;
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);
        Ok(Reply { status, body })
    }
}
