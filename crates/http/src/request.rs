//! Everything needed to perform one web call.

use std::{sync::Arc, time::Duration};

use {
    rust_decimal::prelude::ToPrimitive,
    tracing::warn,
    webcall_config::{Decimal, PropertyLoader, keys},
};

use crate::{
    method::HttpMethod,
    provider::{CompactJson, JsonCodec, ProviderRegistry, TlsProvider},
};

/// Logger name used when a request does not set one.
pub const DEFAULT_LOGGER_NAME: &str = "webcall_http::component";

/// Timeout in milliseconds applied when none, or a negative one, is set.
pub const DEFAULT_TIMEOUT_MS: i64 = 15_000;

/// Describes a web call: where, how, and with which headers and providers.
#[derive(Debug, Clone)]
pub struct WebRequest {
    /// Name attached to every log line of the call.
    pub logger_name: String,
    pub url: Option<String>,
    pub method: Option<HttpMethod>,
    /// Headers sent in this order.
    pub headers: Vec<(String, String)>,
    pub connect_timeout_ms: i64,
    pub read_timeout_ms: i64,
    /// Applied to the client for `https:` URLs.
    pub tls: Option<Arc<dyn TlsProvider>>,
    pub json_codec: Arc<dyn JsonCodec>,
    /// Charset used to decode text responses; blank means UTF-8.
    pub response_charset: Option<String>,
}

impl Default for WebRequest {
    fn default() -> Self {
        Self {
            logger_name: DEFAULT_LOGGER_NAME.to_string(),
            url: None,
            method: None,
            headers: Vec::new(),
            connect_timeout_ms: DEFAULT_TIMEOUT_MS,
            read_timeout_ms: DEFAULT_TIMEOUT_MS,
            tls: None,
            json_codec: Arc::new(CompactJson),
            response_charset: None,
        }
    }
}

impl WebRequest {
    pub fn new(url: impl Into<String>, method: HttpMethod) -> Self {
        Self {
            url: Some(url.into()),
            method: Some(method),
            ..Self::default()
        }
    }

    /// Build a request from loaded properties.
    ///
    /// Reads `URL`, `LoggerName`, `HTTPMethod`, `ConnectionTimeout`,
    /// `ReadTimeout`, `CharacterSet`, `SSLContextProvider`,
    /// `ObjectToJSONProvider` and every `Header.<name>` key. Unknown methods
    /// and unregistered providers are logged and left unset.
    pub fn from_properties(props: &PropertyLoader, providers: &ProviderRegistry) -> Self {
        let mut request = Self {
            url: props.value(keys::URL).filter(|u| !u.trim().is_empty()),
            connect_timeout_ms: timeout_property(props, keys::CONNECTION_TIMEOUT),
            read_timeout_ms: timeout_property(props, keys::READ_TIMEOUT),
            response_charset: non_blank(props.value(keys::CHARACTER_SET)),
            ..Self::default()
        };
        if let Some(name) = non_blank(props.value(keys::LOGGER_NAME)) {
            request.logger_name = name;
        }

        if let Some(method) = non_blank(props.value(keys::HTTP_METHOD)) {
            match method.parse() {
                Ok(m) => request.method = Some(m),
                Err(e) => warn!(logger = %request.logger_name, error = %e, "ignoring HTTP method"),
            }
        }

        for key in props.keys() {
            let Some(name) = key.strip_prefix(keys::HEADER_PREFIX) else {
                continue;
            };
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            let value = props.value(&key).unwrap_or_default();
            request.headers.push((name.to_string(), value.trim().to_string()));
        }

        if let Some(name) = non_blank(props.value(keys::SSL_CONTEXT_PROVIDER)) {
            match providers.tls(&name) {
                Some(provider) => request.tls = Some(provider),
                None => warn!(logger = %request.logger_name, provider = %name, "no TLS provider registered under this name"),
            }
        }

        if let Some(name) = non_blank(props.value(keys::OBJECT_TO_JSON_PROVIDER)) {
            match providers.json(&name) {
                Some(codec) => request.json_codec = codec,
                None => warn!(logger = %request.logger_name, provider = %name, "no JSON provider registered under this name"),
            }
        }

        request
    }

    pub fn with_logger_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !name.trim().is_empty() {
            self.logger_name = name.trim().to_string();
        }
        self
    }

    /// Append a header. Repeated names are all sent.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Replace every header called `name` (ignoring case) with one value.
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
        self.headers.push((name.to_string(), value.into()));
    }

    pub fn with_timeouts(mut self, connect_ms: i64, read_ms: i64) -> Self {
        self.connect_timeout_ms = connect_ms;
        self.read_timeout_ms = read_ms;
        self
    }

    pub fn with_tls(mut self, provider: Arc<dyn TlsProvider>) -> Self {
        self.tls = Some(provider);
        self
    }

    pub fn with_json_codec(mut self, codec: Arc<dyn JsonCodec>) -> Self {
        self.json_codec = codec;
        self
    }

    pub fn with_response_charset(mut self, charset: impl Into<String>) -> Self {
        self.response_charset = non_blank(Some(charset.into()));
        self
    }

    pub fn connect_timeout(&self) -> Duration {
        effective_timeout(self.connect_timeout_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        effective_timeout(self.read_timeout_ms)
    }

    /// Whether the URL uses the `https` scheme.
    pub fn is_secure(&self) -> bool {
        self.url
            .as_deref()
            .and_then(|u| u.trim().get(..6))
            .is_some_and(|scheme| scheme.eq_ignore_ascii_case("https:"))
    }
}

fn effective_timeout(ms: i64) -> Duration {
    let ms = if ms < 0 { DEFAULT_TIMEOUT_MS } else { ms };
    Duration::from_millis(ms.unsigned_abs())
}

/// Whole milliseconds from a timeout key; fractions truncate toward zero.
fn timeout_property(props: &PropertyLoader, key: &str) -> i64 {
    props
        .numeric_value_or(key, Decimal::from(DEFAULT_TIMEOUT_MS))
        .to_i64()
        .unwrap_or(DEFAULT_TIMEOUT_MS)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
