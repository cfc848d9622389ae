//! Accessors for the variable stores placeholders can read from.
//!
//! The loader never touches `std::env` or the process-wide property store
//! directly; it goes through a [`VariableSource`] so callers (and tests) can
//! swap in fixed values.

use std::{
    path::MAIN_SEPARATOR_STR,
    sync::{LazyLock, PoisonError, RwLock},
};

use crate::collection::{PropertyCollection, eq_ignore_case};

/// A read-only view over named string variables.
pub trait VariableSource: Send + Sync {
    /// Exact-name lookup.
    fn get(&self, name: &str) -> Option<String>;

    /// All variables, in the order a case-insensitive scan should visit them.
    fn entries(&self) -> Vec<(String, String)>;

    /// First variable whose name equals `name` ignoring case.
    fn get_ignore_case(&self, name: &str) -> Option<String> {
        self.entries()
            .into_iter()
            .find(|(k, _)| eq_ignore_case(k, name))
            .map(|(_, v)| v)
    }
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnvironment;

impl VariableSource for ProcessEnvironment {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }

    fn entries(&self) -> Vec<(String, String)> {
        // Variables that are not valid unicode cannot be substituted into text.
        std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect()
    }
}

static SYSTEM_PROPERTIES: LazyLock<RwLock<PropertyCollection>> =
    LazyLock::new(|| RwLock::new(platform_properties()));

fn platform_properties() -> PropertyCollection {
    let mut props = PropertyCollection::new();
    props.insert("os.name", std::env::consts::OS);
    props.insert("os.arch", std::env::consts::ARCH);
    props.insert("os.family", std::env::consts::FAMILY);
    props.insert("file.separator", MAIN_SEPARATOR_STR);
    props.insert("path.separator", if cfg!(windows) { ";" } else { ":" });
    props.insert("line.separator", if cfg!(windows) { "\r\n" } else { "\n" });
    if let Ok(dir) = std::env::current_dir() {
        props.insert("user.dir", dir.display().to_string());
    }
    if let Some(dirs) = directories::BaseDirs::new() {
        props.insert("user.home", dirs.home_dir().display().to_string());
    }
    props.insert("webcall.version", env!("CARGO_PKG_VERSION"));
    props
}

/// The process-wide named-property store.
///
/// Seeded with platform values (`os.name`, `user.dir`, `user.home`, ...) on
/// first use and shared by every loader in the process.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProperties;

impl SystemProperties {
    /// Set a property, returning the previous value.
    pub fn set(name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        SYSTEM_PROPERTIES
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name, value)
    }

    /// Remove a property, returning its value.
    pub fn remove(name: &str) -> Option<String> {
        SYSTEM_PROPERTIES
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name)
    }

    pub fn property(name: &str) -> Option<String> {
        SYSTEM_PROPERTIES
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .map(str::to_string)
    }
}

impl VariableSource for SystemProperties {
    fn get(&self, name: &str) -> Option<String> {
        Self::property(name)
    }

    fn entries(&self) -> Vec<(String, String)> {
        SYSTEM_PROPERTIES
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }
}

/// A fixed, ordered set of variables.
#[derive(Debug, Clone, Default)]
pub struct StaticVariables {
    vars: Vec<(String, String)>,
}

impl StaticVariables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.push((name.into(), value.into()));
        self
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for StaticVariables {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl VariableSource for StaticVariables {
    fn get(&self, name: &str) -> Option<String> {
        self.vars
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.clone())
    }

    fn entries(&self) -> Vec<(String, String)> {
        self.vars.clone()
    }
}
