use std::{
    collections::HashSet,
    fmt,
    io::Read,
    path::{Path, PathBuf},
    sync::Arc,
};

use {
    rust_decimal::Decimal,
    tracing::{debug, info, trace, warn},
};

use crate::{
    collection::PropertyCollection,
    error::{ConfigError, Result},
    keys::{ADDITIONAL_PROPERTY_FILE_PREFIX, CLASSPATH_SCHEME, FILE_SCHEME},
    properties::parse_properties_bytes,
    replacer::ResolveContext,
    resources::{ResourceLocator, ResourceRoots},
    sources::{ProcessEnvironment, SystemProperties, VariableSource},
    subst::substitute,
};

/// Logger name used when none is supplied.
pub const DEFAULT_LOGGER_NAME: &str = "webcall_config::loader";

/// Accumulates properties from maps, streams, files and resources.
///
/// Keys named `AdditionalPropertyFile.<n>` pull in further sources instead of
/// being stored. Values are stored raw; placeholders are resolved each time a
/// value is read, so a value may reference keys loaded after it.
///
/// ```
/// use webcall_config::PropertyLoader;
///
/// let mut props = PropertyLoader::new();
/// props
///     .load_pairs([("Greeting", "Hello ${Name}"), ("Name", "World")])
///     .unwrap();
/// assert_eq!(props.value("Greeting").as_deref(), Some("Hello World"));
/// ```
pub struct PropertyLoader {
    logger: String,
    properties: PropertyCollection,
    loaded_sources: HashSet<String>,
    load_kind: LoadKind,
    environment: Arc<dyn VariableSource>,
    system_properties: Arc<dyn VariableSource>,
    resources: Arc<dyn ResourceLocator>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadKind {
    Initial,
    Additional,
}

impl fmt::Display for LoadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Initial => "initial",
            Self::Additional => "additional",
        })
    }
}

impl fmt::Debug for PropertyLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyLoader")
            .field("logger", &self.logger)
            .field("properties", &self.properties.len())
            .field("loaded_sources", &self.loaded_sources)
            .finish()
    }
}

impl Default for PropertyLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl PropertyLoader {
    /// Loader reading the real environment and the process-wide property
    /// store, with resource roots from `WEBCALL_RESOURCE_PATH`.
    pub fn new() -> Self {
        Self {
            logger: DEFAULT_LOGGER_NAME.to_string(),
            properties: PropertyCollection::new(),
            loaded_sources: HashSet::new(),
            load_kind: LoadKind::Initial,
            environment: Arc::new(ProcessEnvironment),
            system_properties: Arc::new(SystemProperties),
            resources: Arc::new(ResourceRoots::from_env()),
        }
    }

    /// Tag every log event with `name`. A blank name keeps the default.
    pub fn with_logger_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !name.trim().is_empty() {
            self.logger = name.trim().to_string();
        }
        self
    }

    pub fn with_environment(mut self, source: impl VariableSource + 'static) -> Self {
        self.environment = Arc::new(source);
        self
    }

    pub fn with_system_properties(mut self, source: impl VariableSource + 'static) -> Self {
        self.system_properties = Arc::new(source);
        self
    }

    pub fn with_resources(mut self, locator: impl ResourceLocator + 'static) -> Self {
        self.resources = Arc::new(locator);
        self
    }

    pub fn logger_name(&self) -> &str {
        &self.logger
    }

    // ── Loading ─────────────────────────────────────────────────────────────

    /// Load an in-memory batch. Not tracked for duplicate loads.
    pub fn load_pairs<K, V>(&mut self, pairs: impl IntoIterator<Item = (K, V)>) -> Result<()>
    where
        K: Into<String>,
        V: Into<String>,
    {
        let batch: Vec<(String, String)> = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        info!(logger = %self.logger, count = batch.len(), "loading {} precanned properties", self.load_kind);
        self.ingest(batch)
    }

    /// Load property text from a byte stream. Not tracked for duplicate loads.
    pub fn load_reader(&mut self, mut reader: impl Read) -> Result<()> {
        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .map_err(ConfigError::Stream)?;
        let batch = parse_properties_bytes(&bytes)?;
        info!(logger = %self.logger, bytes = bytes.len(), "loading {} properties from input stream", self.load_kind);
        self.ingest(batch)
    }

    /// Load a property file, once per absolute path.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
        let id = file_source_id(&absolute);
        if self.loaded_sources.contains(&id) {
            info!(logger = %self.logger, file = %absolute.display(), "skipping the reload of file");
            return Ok(());
        }

        info!(logger = %self.logger, file = %absolute.display(), "loading {} properties from file", self.load_kind);
        let bytes = std::fs::read(&absolute).map_err(|source| ConfigError::Read {
            path: absolute.clone(),
            source,
        })?;
        let batch = parse_properties_bytes(&bytes)?;

        // Recorded before ingesting so files that include each other terminate.
        self.loaded_sources.insert(id);
        self.ingest(batch)
    }

    /// Load a resource through the configured [`ResourceLocator`], once per path.
    pub fn load_resource(&mut self, path: &str) -> Result<()> {
        let id = resource_source_id(path);
        if self.loaded_sources.contains(&id) {
            info!(logger = %self.logger, resource = path, "skipping the reload of classpath resource");
            return Ok(());
        }

        info!(logger = %self.logger, resource = path, "loading {} properties from classpath resource", self.load_kind);
        let bytes = self.resources.read(path)?;
        let batch = parse_properties_bytes(&bytes)?;

        self.loaded_sources.insert(id);
        self.ingest(batch)
    }

    fn ingest(&mut self, batch: Vec<(String, String)>) -> Result<()> {
        self.load_kind = LoadKind::Additional;
        for (key, value) in batch {
            if is_directive(&key) {
                self.load_directive(&key, &value)?;
            } else {
                trace!(logger = %self.logger, key = %key, value = %value, "adding property");
                self.properties.insert(key, value);
            }
        }
        Ok(())
    }

    fn load_directive(&mut self, key: &str, value: &str) -> Result<()> {
        let directive = value.trim();

        let result = if let Some(resource) = strip_scheme(directive, CLASSPATH_SCHEME) {
            self.load_resource(resource.trim())
        } else if let Some(file) = strip_scheme(directive, FILE_SCHEME) {
            self.load_file(PathBuf::from(file.trim()))
        } else {
            debug!(logger = %self.logger, key, value = directive, "ignoring directive without a known scheme");
            Ok(())
        };

        result.map_err(|source| ConfigError::Include {
            directive: directive.to_string(),
            source: Box::new(source),
        })
    }

    // ── Reading ─────────────────────────────────────────────────────────────

    fn resolve_context(&self) -> ResolveContext<'_> {
        ResolveContext {
            environment: self.environment.as_ref(),
            system_properties: self.system_properties.as_ref(),
            properties: &self.properties,
        }
    }

    /// Resolved value of `key`, or `None` if it was never loaded.
    pub fn value(&self, key: &str) -> Option<String> {
        self.properties
            .get(key)
            .map(|raw| substitute(raw, &self.resolve_context()))
    }

    /// Resolved value of `key`, or the resolved `default` when missing.
    pub fn value_or(&self, key: &str, default: &str) -> String {
        let raw = self.properties.get(key).unwrap_or(default);
        substitute(raw, &self.resolve_context())
    }

    /// Numeric value of `key`, or `0` when missing or not a number.
    pub fn numeric_value(&self, key: &str) -> Decimal {
        self.numeric_value_or(key, Decimal::ZERO)
    }

    /// Exact numeric value of `key`, ignoring `,` and space separators.
    ///
    /// Blank or missing values yield `default` silently; anything that does
    /// not parse as a decimal number yields `default` with a warning.
    pub fn numeric_value_or(&self, key: &str, default: Decimal) -> Decimal {
        let Some(val) = self.value(key) else {
            return default;
        };
        if val.trim().is_empty() {
            return default;
        }
        match parse_number(&val) {
            Some(n) => n,
            None => {
                warn!(logger = %self.logger, key, value = %val, "property value could not be made into a number");
                default
            },
        }
    }

    /// All stored keys, in insertion order. Directive keys are never stored.
    pub fn keys(&self) -> Vec<String> {
        self.properties.keys().map(str::to_string).collect()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Canonical identifiers of every file and resource loaded so far.
    pub fn loaded_sources(&self) -> impl Iterator<Item = &str> {
        self.loaded_sources.iter().map(String::as_str)
    }

    /// Raw, unsubstituted properties.
    pub fn raw(&self) -> &PropertyCollection {
        &self.properties
    }
}

fn is_directive(key: &str) -> bool {
    let key = key.trim().to_lowercase();
    key.strip_prefix(&ADDITIONAL_PROPERTY_FILE_PREFIX.to_lowercase())
        .is_some_and(|suffix| !suffix.is_empty())
}

fn strip_scheme<'a>(directive: &'a str, scheme: &str) -> Option<&'a str> {
    directive
        .get(..scheme.len())
        .filter(|head| head.eq_ignore_ascii_case(scheme))
        .map(|_| &directive[scheme.len()..])
}

fn file_source_id(absolute: &Path) -> String {
    format!("FILE:{}", absolute.display()).to_uppercase()
}

fn resource_source_id(path: &str) -> String {
    format!("CP:{path}").to_uppercase()
}

/// Parse a number the way property values are read.
///
/// `,` and space separators are dropped. Plain and exponent forms are both
/// accepted; the result is exact within `Decimal`'s 28 digits.
pub fn parse_number(text: &str) -> Option<Decimal> {
    let cleaned: String = text.chars().filter(|c| !matches!(c, ',' | ' ')).collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned
        .parse::<Decimal>()
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .ok()
}
