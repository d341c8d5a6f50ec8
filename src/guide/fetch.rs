// src/guide/fetch.rs
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use metrics::counter;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, RequestBuilder};

use crate::guide::config::ProviderConfig;

/// Transport handle for one upstream: base URL, default headers, bounded
/// retries with exponential backoff.
#[derive(Clone)]
pub struct HttpSource {
    client: Client,
    base: String,
    timeout: Duration,
    max_attempts: u8,
}

impl HttpSource {
    pub fn new(cfg: &ProviderConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        for (key, value) in &cfg.headers {
            let name = HeaderName::from_bytes(key.as_bytes())
                .with_context(|| format!("invalid header name: {key}"))?;
            let value = HeaderValue::from_str(value)
                .with_context(|| format!("invalid header value for {key}"))?;
            headers.insert(name, value);
        }

        // Several of the upstreams serve broken certificate chains.
        let client = Client::builder()
            .default_headers(headers)
            .danger_accept_invalid_certs(true)
            .build()
            .context("building http client")?;

        Ok(Self {
            client,
            base: cfg.url.clone(),
            timeout: Duration::from_secs(15),
            max_attempts: 5,
        })
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    pub fn with_attempts(mut self, attempts: u8) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<String> {
        let url = format!("{}{}", self.base, path);
        self.send_with_retry(|| self.client.get(&url).query(query))
            .await
    }

    pub async fn post_form(&self, form: &[(&str, String)]) -> Result<String> {
        self.send_with_retry(|| self.client.post(&self.base).form(form))
            .await
    }

    pub async fn post_json(&self, path: &str, body: &serde_json::Value) -> Result<String> {
        let url = format!("{}{}", self.base, path);
        self.send_with_retry(|| self.client.post(&url).json(body))
            .await
    }

    async fn send_with_retry<F>(&self, build: F) -> Result<String>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut attempt: u8 = 0;
        loop {
            attempt += 1;
            let res = build().timeout(self.timeout).send().await;

            match res {
                Ok(rsp) => match rsp.error_for_status() {
                    Ok(rsp) => return rsp.text().await.context("reading response body"),
                    Err(e) => {
                        if attempt < self.max_attempts {
                            self.backoff(attempt).await;
                            continue;
                        }
                        return Err(anyhow!("upstream HTTP error: {e}"));
                    }
                },
                Err(e) => {
                    if attempt < self.max_attempts {
                        self.backoff(attempt).await;
                        continue;
                    }
                    return Err(anyhow!("upstream request failed: {e}"));
                }
            }
        }
    }

    async fn backoff(&self, attempt: u8) {
        counter!("guide_fetch_retries_total").increment(1);
        tokio::time::sleep(Duration::from_millis(300u64 << (attempt - 1))).await;
    }
}
