//! Content types for request bodies.

use std::{borrow::Cow, fmt};

use crate::error::{Result, WebError};

/// A MIME type with an optional charset parameter.
///
/// Renders as `type/subtype` or `type/subtype; charset=UPPERCASE`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaType {
    essence: Cow<'static, str>,
    charset: Option<String>,
}

impl MediaType {
    pub const JSON: Self = Self::from_static("application/json");
    pub const BINARY: Self = Self::from_static("application/octet-stream");
    pub const HTML: Self = Self::from_static("text/html");
    pub const XML_APPLICATION: Self = Self::from_static("application/xml");
    pub const XML_TEXT: Self = Self::from_static("text/xml");
    pub const ZIP: Self = Self::from_static("application/zip");
    pub const PDF: Self = Self::from_static("application/pdf");
    pub const TEXT: Self = Self::from_static("text/plain");
    pub const FORM: Self = Self::from_static("application/x-www-form-urlencoded");

    const fn from_static(essence: &'static str) -> Self {
        Self {
            essence: Cow::Borrowed(essence),
            charset: None,
        }
    }

    /// Parse a `type/subtype` string. Parameters are not accepted here; use
    /// [`MediaType::with_charset`] for the charset.
    pub fn new(essence: &str) -> Result<Self> {
        let essence = essence.trim();
        let valid = essence
            .split_once('/')
            .is_some_and(|(t, s)| is_token(t) && is_token(s));
        if !valid {
            return Err(WebError::InvalidMediaType(essence.to_string()));
        }
        Ok(Self {
            essence: Cow::Owned(essence.to_ascii_lowercase()),
            charset: None,
        })
    }

    /// `image/<format>`, e.g. `image/png`.
    pub fn image(format: &str) -> Result<Self> {
        Self::new(&format!("image/{}", format.trim()))
    }

    pub fn with_charset(mut self, charset: impl Into<String>) -> Self {
        let charset = charset.into();
        self.charset = (!charset.trim().is_empty()).then(|| charset.trim().to_string());
        self
    }

    pub fn essence(&self) -> &str {
        &self.essence
    }

    pub fn charset(&self) -> Option<&str> {
        self.charset.as_deref()
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.charset {
            Some(charset) => write!(f, "{}; charset={}", self.essence, charset.to_uppercase()),
            None => f.write_str(&self.essence),
        }
    }
}

fn is_token(s: &str) -> bool {
    !s.is_empty()
        && s.bytes()
            .all(|b| b.is_ascii_alphanumeric() || b"!#$&-^_.+".contains(&b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constants_render_plain() {
        assert_eq!(MediaType::JSON.to_string(), "application/json");
        assert_eq!(MediaType::XML_TEXT.to_string(), "text/xml");
        assert_eq!(MediaType::BINARY.charset(), None);
    }

    #[test]
    fn charset_is_uppercased() {
        let mt = MediaType::HTML.with_charset("utf-8");
        assert_eq!(mt.to_string(), "text/html; charset=UTF-8");
        assert_eq!(mt.charset(), Some("utf-8"));
    }

    #[test]
    fn blank_charset_is_dropped() {
        assert_eq!(MediaType::PDF.with_charset("  ").to_string(), "application/pdf");
    }

    #[test]
    fn image_types() {
        assert_eq!(MediaType::image("PNG").unwrap().to_string(), "image/png");
        assert!(MediaType::image("").is_err());
    }

    #[test]
    fn parsed_types() {
        assert_eq!(MediaType::new("Application/Vnd.Api+JSON").unwrap().essence(), "application/vnd.api+json");
        assert!(MediaType::new("nonsense").is_err());
        assert!(MediaType::new("text/plain; charset=utf-8").is_err());
    }
}
