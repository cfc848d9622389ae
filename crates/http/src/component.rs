//! Performs web calls described by a [`WebRequest`].
//!
//! Every call logs one `SEND` line before the request goes out and one
//! `RECV` line once the response is read, both tagged with the request's
//! logger name.

use std::time::Instant;

use {
    serde::de::DeserializeOwned,
    serde_json::{Map, Value},
    tracing::info,
};

use crate::{
    body::{Body, encoding_for},
    error::{Result, WebError},
    request::WebRequest,
    response::WebResponse,
};

/// Performs a [`WebRequest`], decoding the response as bytes, text or JSON.
#[derive(Debug, Clone)]
pub struct WebComponent {
    request: WebRequest,
}

impl WebComponent {
    pub fn new(request: WebRequest) -> Self {
        Self { request }
    }

    pub fn request(&self) -> &WebRequest {
        &self.request
    }

    pub fn request_mut(&mut self) -> &mut WebRequest {
        &mut self.request
    }

    /// Perform the call and return the raw response body.
    pub async fn fetch_bytes(&self, body: Option<Body>) -> Result<WebResponse<Vec<u8>>> {
        let response = self.execute(body).await?;
        let summary = if response.data.is_empty() {
            "n/a".to_string()
        } else {
            format!("{} bytes.", response.data.len())
        };
        self.log_received(&response, &summary);
        Ok(response)
    }

    /// Perform the call and decode the body with the request's charset.
    pub async fn fetch_text(&self, body: Option<Body>) -> Result<WebResponse<String>> {
        let response = self.execute(body).await?;
        let text = self.decode_text(&response.data)?;
        self.log_received(&response, &text);
        Ok(response.map(|_| text))
    }

    /// Perform the call and parse the body as JSON into `T`.
    pub async fn fetch_json<T: DeserializeOwned>(&self, body: Option<Body>) -> Result<WebResponse<T>> {
        let response = self.fetch_text(body).await?;
        let value = self.request.json_codec.decode(&response.data)?;
        let data: T = serde_json::from_value(value)?;
        Ok(response.map(|_| data))
    }

    async fn execute(&self, body: Option<Body>) -> Result<WebResponse<Vec<u8>>> {
        let request = &self.request;
        let url = request
            .url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or(WebError::MissingUrl)?;
        let method = request.method.ok_or(WebError::MissingMethod)?;
        match (method.requires_body(), body.is_some()) {
            (true, false) => return Err(WebError::MissingBody { method }),
            (false, true) => return Err(WebError::UnexpectedBody { method }),
            _ => {},
        }

        let client = self.build_client()?;
        let mut builder = client.request(method.to_reqwest(), url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let description = match body {
            Some(body) => {
                let prepared = body.prepare(&*request.json_codec).await?;
                if let Some(content_type) = prepared.content_type
                    && !request
                        .headers
                        .iter()
                        .any(|(n, _)| n.eq_ignore_ascii_case(reqwest::header::CONTENT_TYPE.as_str()))
                {
                    builder = builder.header(reqwest::header::CONTENT_TYPE, content_type);
                }
                builder = builder.body(prepared.content);
                prepared.description
            },
            None => "n/a".to_string(),
        };

        info!(
            logger = %request.logger_name,
            url,
            method = %method,
            headers = %self.headers_json(&request.headers),
            body = %description,
            "SEND"
        );

        let started = Instant::now();
        let response = builder.send().await?;
        let duration = started.elapsed();

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let data = response.bytes().await?.to_vec();

        Ok(WebResponse {
            status,
            duration,
            headers,
            data,
        })
    }

    /// A fresh client per call so each request's timeouts and TLS apply.
    fn build_client(&self) -> Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder()
            .connect_timeout(self.request.connect_timeout())
            .read_timeout(self.request.read_timeout());
        if self.request.is_secure()
            && let Some(tls) = &self.request.tls
        {
            builder = tls.configure(builder)?;
        }
        Ok(builder.build()?)
    }

    fn decode_text(&self, bytes: &[u8]) -> Result<String> {
        match self.request.response_charset.as_deref() {
            Some(charset) => {
                let (text, _, _) = encoding_for(charset)?.decode(bytes);
                Ok(text.into_owned())
            },
            None => Ok(String::from_utf8_lossy(bytes).into_owned()),
        }
    }

    fn log_received<T>(&self, response: &WebResponse<T>, body: &str) {
        info!(
            logger = %self.request.logger_name,
            url = self.request.url.as_deref().unwrap_or_default(),
            method = self.request.method.map(|m| m.as_str()).unwrap_or_default(),
            status = response.status,
            elapsed_ms = response.duration.as_millis() as u64,
            headers = %self.headers_json(&response.headers),
            body,
            "RECV"
        );
    }

    fn headers_json(&self, headers: &[(String, String)]) -> String {
        let map: Map<String, Value> = headers
            .iter()
            .map(|(n, v)| (n.clone(), Value::String(v.clone())))
            .collect();
        self.request
            .json_codec
            .encode(&Value::Object(map))
            .unwrap_or_else(|e| format!("<unavailable: {e}>"))
    }
}
