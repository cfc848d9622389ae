//! Named TLS and JSON providers a request can refer to from properties.

use std::{collections::HashMap, fmt, path::PathBuf, sync::Arc};

use serde_json::Value;

use crate::error::{Result, WebError};

/// Converts JSON values to and from text.
pub trait JsonCodec: Send + Sync + fmt::Debug {
    fn encode(&self, value: &Value) -> Result<String>;
    fn decode(&self, text: &str) -> Result<Value>;
}

/// Customizes the HTTP client used for `https:` URLs.
pub trait TlsProvider: Send + Sync + fmt::Debug {
    fn configure(&self, builder: reqwest::ClientBuilder) -> Result<reqwest::ClientBuilder>;
}

/// Single-line JSON. The default codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompactJson;

impl JsonCodec for CompactJson {
    fn encode(&self, value: &Value) -> Result<String> {
        Ok(serde_json::to_string(value)?)
    }

    fn decode(&self, text: &str) -> Result<Value> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Indented JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrettyJson;

impl JsonCodec for PrettyJson {
    fn encode(&self, value: &Value) -> Result<String> {
        Ok(serde_json::to_string_pretty(value)?)
    }

    fn decode(&self, text: &str) -> Result<Value> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Trusts an extra root certificate read from a PEM file.
#[derive(Debug, Clone)]
pub struct PemRootCertificate {
    path: PathBuf,
}

impl PemRootCertificate {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TlsProvider for PemRootCertificate {
    fn configure(&self, builder: reqwest::ClientBuilder) -> Result<reqwest::ClientBuilder> {
        let failed = |message: String| WebError::Provider {
            name: self.path.display().to_string(),
            message,
        };
        let pem = std::fs::read(&self.path).map_err(|e| failed(format!("failed to read certificate: {e}")))?;
        let cert = reqwest::Certificate::from_pem(&pem).map_err(|e| failed(e.to_string()))?;
        Ok(builder.add_root_certificate(cert))
    }
}

/// Name to provider lookup used when building requests from properties.
#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
    tls: HashMap<String, Arc<dyn TlsProvider>>,
    json: HashMap<String, Arc<dyn JsonCodec>>,
}

impl ProviderRegistry {
    pub const COMPACT_JSON: &'static str = "compact";
    pub const PRETTY_JSON: &'static str = "pretty";

    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in `compact` and `pretty` JSON codecs.
    pub fn with_defaults() -> Self {
        Self::new()
            .with_json(Self::COMPACT_JSON, CompactJson)
            .with_json(Self::PRETTY_JSON, PrettyJson)
    }

    pub fn with_tls(mut self, name: impl Into<String>, provider: impl TlsProvider + 'static) -> Self {
        self.register_tls(name, Arc::new(provider));
        self
    }

    pub fn with_json(mut self, name: impl Into<String>, codec: impl JsonCodec + 'static) -> Self {
        self.register_json(name, Arc::new(codec));
        self
    }

    pub fn register_tls(&mut self, name: impl Into<String>, provider: Arc<dyn TlsProvider>) {
        self.tls.insert(name.into(), provider);
    }

    pub fn register_json(&mut self, name: impl Into<String>, codec: Arc<dyn JsonCodec>) {
        self.json.insert(name.into(), codec);
    }

    pub fn tls(&self, name: &str) -> Option<Arc<dyn TlsProvider>> {
        self.tls.get(name).cloned()
    }

    pub fn json(&self, name: &str) -> Option<Arc<dyn JsonCodec>> {
        self.json.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use {super::*, serde_json::json};

    #[test]
    fn codecs_differ_in_layout_only() {
        let value = json!({"a": [1, 2]});
        let compact = CompactJson.encode(&value).unwrap();
        let pretty = PrettyJson.encode(&value).unwrap();
        assert_eq!(compact, r#"{"a":[1,2]}"#);
        assert!(pretty.contains('\n'));
        assert_eq!(CompactJson.decode(&pretty).unwrap(), value);
    }

    #[test]
    fn defaults_registered() {
        let registry = ProviderRegistry::with_defaults();
        assert!(registry.json("compact").is_some());
        assert!(registry.json("pretty").is_some());
        assert!(registry.json("yaml").is_none());
        assert!(registry.tls("anything").is_none());
    }

    #[test]
    fn pem_provider_reports_missing_file() {
        let provider = PemRootCertificate::new("/definitely/not/here.pem");
        let err = provider.configure(reqwest::Client::builder()).unwrap_err();
        assert!(matches!(err, WebError::Provider { .. }));
    }

    #[test]
    fn pem_provider_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.pem");
        std::fs::write(&path, "not a certificate").unwrap();
        let provider = PemRootCertificate::new(&path);
        assert!(provider.configure(reqwest::Client::builder()).is_err());
    }
}
