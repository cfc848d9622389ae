//! Property keys understood by the loader and the request factory.

/// Keys starting with this prefix (any case) name another source to load.
pub const ADDITIONAL_PROPERTY_FILE_PREFIX: &str = "AdditionalPropertyFile.";

/// Directive scheme for resources found through a resource locator.
pub const CLASSPATH_SCHEME: &str = "classpath:";

/// Directive scheme for files on disk.
pub const FILE_SCHEME: &str = "file:";

pub const URL: &str = "URL";
pub const LOGGER_NAME: &str = "LoggerName";
pub const HTTP_METHOD: &str = "HTTPMethod";
pub const CONNECTION_TIMEOUT: &str = "ConnectionTimeout";
pub const READ_TIMEOUT: &str = "ReadTimeout";
pub const CHARACTER_SET: &str = "CharacterSet";

/// Each `Header.<name>` key becomes one request header called `<name>`.
pub const HEADER_PREFIX: &str = "Header.";

/// Registered name of the TLS provider to apply to `https` calls.
pub const SSL_CONTEXT_PROVIDER: &str = "SSLContextProvider";

/// Registered name of the JSON codec used for bodies and responses.
pub const OBJECT_TO_JSON_PROVIDER: &str = "ObjectToJSONProvider";
