use std::{fmt, str::FromStr};

use thiserror::Error;

/// The HTTP methods a web call can use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
    Trace,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown HTTP method: {0}")]
pub struct UnknownMethod(pub String);

impl HttpMethod {
    pub const ALL: [Self; 8] = [
        Self::Get,
        Self::Post,
        Self::Put,
        Self::Patch,
        Self::Delete,
        Self::Head,
        Self::Options,
        Self::Trace,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
            Self::Trace => "TRACE",
        }
    }

    /// POST, PUT and PATCH must carry a body; every other method must not.
    pub fn requires_body(self) -> bool {
        matches!(self, Self::Post | Self::Put | Self::Patch)
    }

    pub(crate) fn to_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
            Self::Patch => reqwest::Method::PATCH,
            Self::Delete => reqwest::Method::DELETE,
            Self::Head => reqwest::Method::HEAD,
            Self::Options => reqwest::Method::OPTIONS,
            Self::Trace => reqwest::Method::TRACE,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = UnknownMethod;

    /// Case-insensitive match on the method name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| UnknownMethod(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_ignores_case() {
        assert_eq!("get".parse(), Ok(HttpMethod::Get));
        assert_eq!("Patch".parse(), Ok(HttpMethod::Patch));
        assert_eq!(" DELETE ".parse(), Ok(HttpMethod::Delete));
    }

    #[test]
    fn unknown_method() {
        let err = "FETCH".parse::<HttpMethod>().unwrap_err();
        assert_eq!(err.to_string(), "unknown HTTP method: FETCH");
    }

    #[test]
    fn body_rules() {
        let with_body: Vec<_> = HttpMethod::ALL
            .into_iter()
            .filter(|m| m.requires_body())
            .collect();
        assert_eq!(with_body, vec![
            HttpMethod::Post,
            HttpMethod::Put,
            HttpMethod::Patch
        ]);
    }

    #[test]
    fn display_matches_wire_name() {
        for method in HttpMethod::ALL {
            assert_eq!(method.to_string(), method.to_reqwest().as_str());
        }
    }
}
