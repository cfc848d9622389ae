use std::collections::HashMap;

use tracing::{debug, warn};

use crate::replacer::{ResolveContext, resolve_token};

/// Upper bound on expanding substitutions of one token within one value.
///
/// A substitution expands when it changes the value without reducing the
/// number of pending `${` markers. Only a token that keeps expanding can grow
/// a value forever, so values with any number of distinct placeholders,
/// nested or not, never reach it.
pub const MAX_EXPANSIONS: usize = 1024;

/// Replace `${...}` placeholders in a property value.
///
/// Scans left to right. Each token body (trimmed) is resolved once through the
/// replacer chain and every occurrence of that exact `${body}` literal is
/// replaced. The cursor then moves just past the `${` that was found, so text
/// a replacement introduces further along is scanned again. An unclosed `${`
/// ends substitution and leaves the rest of the value as-is.
pub fn substitute(input: &str, ctx: &ResolveContext<'_>) -> String {
    if !input.contains("${") {
        return input.to_string();
    }

    let mut value = input.to_string();
    let mut cursor = 0;
    let mut pending = value.matches("${").count();
    let mut expansions: HashMap<String, usize> = HashMap::new();

    while let Some(start) = find_from(&value, "${", cursor) {
        let Some(end) = value[start..].find('}').map(|i| start + i) else {
            break;
        };

        let token = value[start + 2..end].trim().to_string();
        let (replacer, replacement) = resolve_token(&token, ctx);
        let replaced = value.replace(&format!("${{{token}}}"), &replacement);
        let now_pending = replaced.matches("${").count();

        if replaced != value && now_pending >= pending {
            let count = expansions.entry(token.clone()).or_default();
            if *count == MAX_EXPANSIONS {
                warn!(
                    limit = MAX_EXPANSIONS,
                    token = %token,
                    "placeholder keeps expanding, value left partially resolved"
                );
                break;
            }
            *count += 1;
        }

        debug!(token = %token, prefix = replacer.prefix, replacement = %replacement, "replacing placeholder");
        value = replaced;
        pending = now_pending;
        cursor = start + 2;
    }

    value
}

/// `str::find` starting at byte `from`, moved forward to a char boundary.
fn find_from(haystack: &str, needle: &str, mut from: usize) -> Option<usize> {
    while from < haystack.len() && !haystack.is_char_boundary(from) {
        from += 1;
    }
    haystack
        .get(from..)
        .and_then(|rest| rest.find(needle))
        .map(|i| from + i)
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{collection::PropertyCollection, sources::StaticVariables},
    };

    fn run(props: &[(&str, &str)], input: &str) -> String {
        let env: StaticVariables = [("PORT", "8080")].into_iter().collect();
        let sys = StaticVariables::new().with("user.name", "svc");
        let props: PropertyCollection = props.iter().copied().collect();
        let ctx = ResolveContext {
            environment: &env,
            system_properties: &sys,
            properties: &props,
        };
        substitute(input, &ctx)
    }

    #[test]
    fn no_placeholders() {
        assert_eq!(run(&[], "plain text"), "plain text");
        assert_eq!(run(&[], "cost: $5 {each}"), "cost: $5 {each}");
    }

    #[test]
    fn resolves_from_collection() {
        assert_eq!(run(&[("Name", "World")], "Hello ${Name}"), "Hello World");
    }

    #[test]
    fn resolves_every_scope() {
        assert_eq!(
            run(&[("x", "1")], "${env.ci.port}/${jvm.user.name}/${x}/${ci.X}"),
            "8080/svc/1/1"
        );
    }

    #[test]
    fn unresolved_becomes_empty() {
        assert_eq!(run(&[], "[${Missing}]"), "[]");
        assert_eq!(run(&[], "[${env.NOPE}]"), "[]");
        assert_eq!(run(&[], "[${}]"), "[]");
    }

    #[test]
    fn every_occurrence_is_replaced() {
        assert_eq!(run(&[("a", "x")], "${a}-${a}-${a}"), "x-x-x");
    }

    #[test]
    fn unclosed_placeholder_is_left_alone() {
        assert_eq!(run(&[("A", "1")], "abc ${A"), "abc ${A");
        assert_eq!(run(&[("A", "1")], "${A} and ${B"), "1 and ${B");
    }

    #[test]
    fn padded_token_is_not_replaced() {
        // The trimmed body `Name` is resolved, but `${Name}` never occurs.
        assert_eq!(run(&[("Name", "World")], "Hi ${ Name }"), "Hi ${ Name }");
    }

    #[test]
    fn replacement_is_rescanned_past_cursor() {
        let props = [("Inner", "ab${Leaf}"), ("Leaf", "c")];
        assert_eq!(run(&props, "${Inner}"), "abc");
    }

    #[test]
    fn replacement_at_cursor_is_not_rescanned() {
        // After replacing at position 0 the scan resumes at 2, past the new `${`.
        let props = [("Direct", "${Leaf}"), ("Leaf", "c")];
        assert_eq!(run(&props, "${Direct}"), "${Leaf}");
        assert_eq!(run(&props, "x${Direct}"), "x${Leaf}");
    }

    #[test]
    fn self_reference_growth_is_bounded() {
        let out = run(&[("Grow", "xx${Grow}")], "${Grow}");
        assert!(out.ends_with("${Grow}"));
        assert_eq!(out.len(), 2 * MAX_EXPANSIONS + "${Grow}".len());
    }

    #[test]
    fn many_distinct_placeholders_resolve_fully() {
        let keys: Vec<String> = (0..1100).map(|i| format!("k{i}")).collect();
        let props: Vec<(&str, &str)> = keys.iter().map(|k| (k.as_str(), "v")).collect();
        let input: String = keys.iter().map(|k| format!("${{{k}}}")).collect();

        let out = run(&props, &input);
        assert!(!out.contains("${"));
        assert_eq!(out, "v".repeat(1100));
    }

    #[test]
    fn many_nested_placeholders_resolve_fully() {
        // Each `aN` expands to `x${bN}`, which keeps the pending count level.
        let names: Vec<(String, String, String)> = (0..1100)
            .map(|i| (format!("a{i}"), format!("x${{b{i}}}"), format!("b{i}")))
            .collect();
        let mut props: Vec<(&str, &str)> = Vec::new();
        for (a, a_value, b) in &names {
            props.push((a.as_str(), a_value.as_str()));
            props.push((b.as_str(), "y"));
        }
        let input: String = names.iter().map(|(a, ..)| format!("-${{{a}}}")).collect();

        let out = run(&props, &input);
        assert!(!out.contains("${"));
        assert_eq!(out, "-xy".repeat(1100));
    }

    #[test]
    fn mutual_reference_is_bounded() {
        let out = run(&[("A", "aa${B}"), ("B", "bb${A}")], "${A}");
        assert!(out.ends_with("${A}"));
        assert_eq!(out.len(), 2 * 2 * MAX_EXPANSIONS + "${A}".len());
    }

    #[test]
    fn cursor_lands_on_char_boundary() {
        assert_eq!(run(&[("a", "日"), ("b", "z")], "${a}${b}"), "日z");
    }
}
