//! Request bodies and how they are put on the wire.

use std::{fmt, path::PathBuf, sync::Arc};

use {
    encoding_rs::Encoding,
    serde::Serialize,
    serde_json::Value,
};

use crate::{
    error::{Result, WebError},
    media_type::MediaType,
    provider::JsonCodec,
};

/// Charset used when a body does not name one.
pub const DEFAULT_CHARSET: &str = "UTF-8";

/// Payload of an upload body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadData {
    /// Read from disk when the request is sent.
    File(PathBuf),
    Bytes(Vec<u8>),
}

/// A request body.
pub enum Body {
    /// Plain text encoded in `charset`.
    Text { body: String, charset: Option<String> },
    /// A JSON value serialized with the request's codec, or `codec` when set.
    Json {
        value: Value,
        charset: Option<String>,
        codec: Option<Arc<dyn JsonCodec>>,
    },
    /// `application/x-www-form-urlencoded` name/value pairs.
    Form {
        values: Vec<(String, String)>,
        charset: Option<String>,
    },
    /// Raw bytes or a file, optionally labeled with a media type.
    Upload {
        data: UploadData,
        media_type: Option<MediaType>,
    },
    /// A body built by the caller, sent as-is.
    External(reqwest::Body),
}

/// A body ready to attach to a request.
pub(crate) struct PreparedBody {
    pub content: reqwest::Body,
    pub content_type: Option<String>,
    /// Human readable description for the send log.
    pub description: String,
}

impl Body {
    pub fn text(body: impl Into<String>) -> Self {
        Self::Text {
            body: body.into(),
            charset: None,
        }
    }

    /// Serialize `value` to a JSON body.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        Ok(Self::Json {
            value: serde_json::to_value(value)?,
            charset: None,
            codec: None,
        })
    }

    pub fn form<K, V>(values: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self::Form {
            values: values
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            charset: None,
        }
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::Upload {
            data: UploadData::File(path.into()),
            media_type: None,
        }
    }

    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::Upload {
            data: UploadData::Bytes(bytes.into()),
            media_type: None,
        }
    }

    pub fn external(body: impl Into<reqwest::Body>) -> Self {
        Self::External(body.into())
    }

    /// Set the charset of a text, JSON or form body. Ignored for other kinds.
    pub fn with_charset(mut self, value: impl Into<String>) -> Self {
        let value = value.into();
        let value = (!value.trim().is_empty()).then(|| value.trim().to_string());
        match &mut self {
            Self::Text { charset, .. } | Self::Json { charset, .. } | Self::Form { charset, .. } => {
                *charset = value;
            },
            Self::Upload { .. } | Self::External(_) => {},
        }
        self
    }

    /// Set the media type of an upload body. Ignored for other kinds.
    pub fn with_media_type(mut self, value: MediaType) -> Self {
        if let Self::Upload { media_type, .. } = &mut self {
            *media_type = Some(value);
        }
        self
    }

    /// Use `codec` instead of the request's codec. Ignored for non-JSON bodies.
    pub fn with_codec(mut self, value: Arc<dyn JsonCodec>) -> Self {
        if let Self::Json { codec, .. } = &mut self {
            *codec = Some(value);
        }
        self
    }

    pub(crate) async fn prepare(self, request_codec: &dyn JsonCodec) -> Result<PreparedBody> {
        match self {
            Self::Text { body, charset } => {
                let charset = charset.as_deref().unwrap_or(DEFAULT_CHARSET);
                let content = encode_text(&body, charset)?;
                Ok(PreparedBody {
                    content: content.into(),
                    content_type: Some(MediaType::TEXT.with_charset(charset).to_string()),
                    description: format!("{} String: {body}", charset.to_uppercase()),
                })
            },
            Self::Json {
                value,
                charset,
                codec,
            } => {
                let charset = charset.as_deref().unwrap_or(DEFAULT_CHARSET);
                let codec = codec.as_deref().unwrap_or(request_codec);
                let text = codec.encode(&value)?;
                let content = encode_text(&text, charset)?;
                Ok(PreparedBody {
                    content: content.into(),
                    content_type: Some(MediaType::JSON.with_charset(charset).to_string()),
                    description: format!("{} JSON String: {text}", charset.to_uppercase()),
                })
            },
            Self::Form { values, charset } => {
                let charset = charset.as_deref().unwrap_or(DEFAULT_CHARSET);
                let encoded = encode_form(&values, charset)?;
                let listed = values
                    .iter()
                    .map(|(k, v)| format!("[\"{k}\"], [\"{v}\"]"))
                    .collect::<Vec<_>>()
                    .join("; ");
                Ok(PreparedBody {
                    content: encoded.into(),
                    content_type: Some(MediaType::FORM.with_charset(charset).to_string()),
                    description: format!("{} Form Encoded values: {listed}", values.len()),
                })
            },
            Self::Upload { data, media_type } => {
                let (content, source) = match data {
                    UploadData::File(path) => {
                        let bytes = tokio::fs::read(&path).await.map_err(|source| WebError::BodyFile {
                            path: path.clone(),
                            source,
                        })?;
                        (bytes, format!("File (\"{}\")", path.display()))
                    },
                    UploadData::Bytes(bytes) => {
                        let source = format!("Byte array (\"{} bytes in length\")", bytes.len());
                        (bytes, source)
                    },
                };
                let content_type = media_type.map(|m| m.to_string());
                let description = match &content_type {
                    Some(ct) => format!("Body being applied with a {source} with media type {ct}"),
                    None => format!("Body being applied with a {source}"),
                };
                Ok(PreparedBody {
                    content: content.into(),
                    content_type,
                    description,
                })
            },
            Self::External(content) => Ok(PreparedBody {
                content,
                content_type: None,
                description: "Externally constructed body".to_string(),
            }),
        }
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text { body, charset } => f
                .debug_struct("Text")
                .field("body", body)
                .field("charset", charset)
                .finish(),
            Self::Json { value, charset, .. } => f
                .debug_struct("Json")
                .field("value", value)
                .field("charset", charset)
                .finish_non_exhaustive(),
            Self::Form { values, charset } => f
                .debug_struct("Form")
                .field("values", values)
                .field("charset", charset)
                .finish(),
            Self::Upload { data, media_type } => f
                .debug_struct("Upload")
                .field("data", data)
                .field("media_type", media_type)
                .finish(),
            Self::External(_) => f.write_str("External"),
        }
    }
}

/// Look up an encoding by WHATWG label, e.g. `UTF-8` or `ISO-8859-1`.
pub(crate) fn encoding_for(charset: &str) -> Result<&'static Encoding> {
    Encoding::for_label(charset.trim().as_bytes())
        .ok_or_else(|| WebError::UnsupportedCharset(charset.to_string()))
}

fn encode_text(text: &str, charset: &str) -> Result<Vec<u8>> {
    let encoding = encoding_for(charset)?;
    let (bytes, _, _) = encoding.encode(text);
    Ok(bytes.into_owned())
}

fn encode_form(values: &[(String, String)], charset: &str) -> Result<String> {
    let encoding = encoding_for(charset)?;
    Ok(url::form_urlencoded::Serializer::new(String::new())
        .encoding_override(Some(&|s: &str| encoding.encode(s).0))
        .extend_pairs(values)
        .finish())
}
