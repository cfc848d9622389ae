//! HTTP calls described by property files.
//!
//! A [`WebRequest`] is usually built with [`WebRequest::from_properties`]
//! from a [`webcall_config::PropertyLoader`], then handed to a
//! [`WebComponent`] that performs it.

pub mod body;
pub mod component;
pub mod error;
pub mod media_type;
pub mod method;
pub mod provider;
pub mod request;
pub mod response;

pub use {
    body::{Body, UploadData},
    component::WebComponent,
    error::{Result, WebError},
    media_type::MediaType,
    method::{HttpMethod, UnknownMethod},
    provider::{CompactJson, JsonCodec, PemRootCertificate, PrettyJson, ProviderRegistry, TlsProvider},
    request::WebRequest,
    response::WebResponse,
};
