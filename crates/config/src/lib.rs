//! Property loading with cascading includes and `${...}` placeholders.
//!
//! Placeholder forms, tried in this order:
//!
//! | Form | Looks up |
//! |---|---|
//! | `${env.ci.NAME}` | environment variable, ignoring case |
//! | `${env.NAME}` | environment variable |
//! | `${jvm.ci.NAME}` | process-wide property, ignoring case |
//! | `${jvm.NAME}` | process-wide property |
//! | `${ci.NAME}` | loaded property, ignoring case |
//! | `${NAME}` | loaded property |
//!
//! Anything unresolved becomes an empty string.

pub mod collection;
pub mod error;
pub mod keys;
pub mod loader;
pub mod properties;
pub mod replacer;
pub mod resources;
pub mod sources;
pub mod subst;

pub use {
    collection::PropertyCollection,
    error::{ConfigError, Result},
    loader::{PropertyLoader, parse_number},
    properties::{parse_properties, parse_properties_bytes},
    resources::{ResourceLocator, ResourceRoots},
    sources::{ProcessEnvironment, StaticVariables, SystemProperties, VariableSource},
};

pub use rust_decimal::Decimal;
