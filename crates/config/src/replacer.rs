//! The ordered chain of placeholder resolvers.
//!
//! A token body is offered to each [`Replacer`] in [`REPLACERS`] order; the
//! first whose prefix starts the body handles it alone. A miss resolves to
//! an empty string and never falls through to a later replacer. This masks
//! typos in placeholder names, but numeric lookups rely on a blank result
//! falling back to their default, so it stays.

use crate::{collection::PropertyCollection, sources::VariableSource};

/// Where a replacer looks up names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Process environment variables.
    Environment,
    /// The process-wide property store.
    SystemProperties,
    /// The loader's own property collection.
    Collection,
}

/// A placeholder prefix bound to a lookup strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Replacer {
    pub prefix: &'static str,
    pub scope: Scope,
    pub case_insensitive: bool,
}

/// Resolver precedence, most specific prefix first.
pub static REPLACERS: [Replacer; 6] = [
    Replacer::new("env.ci.", Scope::Environment, true),
    Replacer::new("env.", Scope::Environment, false),
    Replacer::new("jvm.ci.", Scope::SystemProperties, true),
    Replacer::new("jvm.", Scope::SystemProperties, false),
    Replacer::new("ci.", Scope::Collection, true),
    Replacer::new("", Scope::Collection, false),
];

/// Everything a replacer may read.
#[derive(Clone, Copy)]
pub struct ResolveContext<'a> {
    pub environment: &'a dyn VariableSource,
    pub system_properties: &'a dyn VariableSource,
    pub properties: &'a PropertyCollection,
}

impl Replacer {
    pub const fn new(prefix: &'static str, scope: Scope, case_insensitive: bool) -> Self {
        Self {
            prefix,
            scope,
            case_insensitive,
        }
    }

    /// Look up `name` (the token body with this replacer's prefix removed).
    pub fn resolve(&self, name: &str, ctx: &ResolveContext<'_>) -> String {
        let found = match (self.scope, self.case_insensitive) {
            (Scope::Environment, true) => ctx.environment.get_ignore_case(name),
            (Scope::Environment, false) => ctx.environment.get(name),
            (Scope::SystemProperties, true) => ctx.system_properties.get_ignore_case(name),
            (Scope::SystemProperties, false) => ctx.system_properties.get(name),
            (Scope::Collection, true) => ctx.properties.get_ignore_case(name).map(str::to_string),
            (Scope::Collection, false) => ctx.properties.get(name).map(str::to_string),
        };
        found.unwrap_or_default()
    }
}

/// Resolve a full token body through the chain.
///
/// Returns the handling replacer along with the replacement text.
pub fn resolve_token(token: &str, ctx: &ResolveContext<'_>) -> (&'static Replacer, String) {
    // The last replacer has an empty prefix, so some replacer always matches.
    let replacer = REPLACERS
        .iter()
        .find(|r| token.starts_with(r.prefix))
        .unwrap_or(&REPLACERS[REPLACERS.len() - 1]);
    let value = replacer.resolve(&token[replacer.prefix.len()..], ctx);
    (replacer, value)
}

#[cfg(test)]
mod tests {
    use {super::*, crate::sources::StaticVariables};

    struct Fixture {
        env: StaticVariables,
        sys: StaticVariables,
        props: PropertyCollection,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                env: [("PORT", "8080"), ("HOME", "/home/app")].into_iter().collect(),
                sys: [("user.name", "svc"), ("OS.Name", "plan9")].into_iter().collect(),
                props: [("Foo", "Bar"), ("FOO", "Baz"), ("env.", "literal")]
                    .into_iter()
                    .collect(),
            }
        }

        fn ctx(&self) -> ResolveContext<'_> {
            ResolveContext {
                environment: &self.env,
                system_properties: &self.sys,
                properties: &self.props,
            }
        }

        fn resolve(&self, token: &str) -> (Scope, bool, String) {
            let (r, v) = resolve_token(token, &self.ctx());
            (r.scope, r.case_insensitive, v)
        }
    }

    #[test]
    fn chain_order() {
        let prefixes: Vec<_> = REPLACERS.iter().map(|r| r.prefix).collect();
        assert_eq!(prefixes, vec!["env.ci.", "env.", "jvm.ci.", "jvm.", "ci.", ""]);
    }

    #[test]
    fn environment_lookups() {
        let f = Fixture::new();
        assert_eq!(f.resolve("env.ci.port"), (Scope::Environment, true, "8080".into()));
        assert_eq!(f.resolve("env.PORT"), (Scope::Environment, false, "8080".into()));
        assert_eq!(f.resolve("env.port"), (Scope::Environment, false, String::new()));
    }

    #[test]
    fn system_property_lookups() {
        let f = Fixture::new();
        assert_eq!(f.resolve("jvm.user.name").2, "svc");
        assert_eq!(f.resolve("jvm.os.name").2, "");
        assert_eq!(f.resolve("jvm.ci.os.name").2, "plan9");
    }

    #[test]
    fn collection_lookups() {
        let f = Fixture::new();
        assert_eq!(f.resolve("Foo"), (Scope::Collection, false, "Bar".into()));
        assert_eq!(f.resolve("ci.foo"), (Scope::Collection, true, "Bar".into()));
        assert_eq!(f.resolve("Missing").2, "");
    }

    #[test]
    fn miss_does_not_fall_through() {
        let f = Fixture::new();
        // `env.` claims the token even though the collection has a key "env.".
        assert_eq!(f.resolve("env.").2, "");
        assert_eq!(f.resolve("env.ci.NOPE"), (Scope::Environment, true, String::new()));
    }
}
