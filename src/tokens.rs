//! Selector interpolation.
//!
//! Selectors may reference the entity hosting the field through bracket
//! tokens, so one formatter configuration can target a different element per
//! page:
//!
//! ```text
//! "#node-[node:nid] .hero"   +   { node: id 42 }   →   "#node-42 .hero"
//! ```
//!
//! Replacement is a single pass over the template. Text produced by a
//! substitution is never scanned again, and tokens nobody can answer are
//! left as written.
//!
//! Token values come from content, not from whoever configured the
//! selector, so they are trimmed and CSS-escaped before they are spliced in.
//! ASCII characters outside `[A-Za-z0-9_-]` become hex escapes:
//!
//! ```text
//! "x</style><script>"   →   "x\3c \2f style\3e \3c script\3e "
//! ```

use crate::host::TokenResolver;
use crate::types::{HostEntity, RenderContext};
use regex::{Captures, Regex};
use std::sync::LazyLock;

static TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[([A-Za-z0-9_-]+):([^\[\]\s]+)\]").expect("token pattern is valid")
});

/// Expand `template` against `context`.
///
/// Without a context, or without a token service, the template is returned
/// unchanged and no token syntax is evaluated.
pub fn interpolate(
    template: &str,
    context: Option<&RenderContext>,
    tokens: Option<&dyn TokenResolver>,
) -> String {
    match (context, tokens) {
        (Some(context), Some(tokens)) if !context.is_empty() => tokens.replace(template, context),
        _ => template.to_string(),
    }
}

/// `[type:name]` token service backed by [`HostEntity`] values.
#[derive(Debug, Clone, Copy, Default)]
pub struct BracketTokens;

impl TokenResolver for BracketTokens {
    fn replace(&self, template: &str, context: &RenderContext) -> String {
        TOKEN
            .replace_all(template, |caps: &Captures| {
                context
                    .get(&caps[1])
                    .and_then(|entity| token_value(entity, &caps[2]))
                    .map(|value| escape_css(value.trim()))
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }
}

fn token_value(entity: &HostEntity, name: &str) -> Option<String> {
    match name {
        "id" => Some(entity.id.to_string()),
        "entity-type" => Some(entity.entity_type.clone()),
        "bundle" | "type" => entity.bundle.clone(),
        _ if name == id_key(&entity.entity_type) => Some(entity.id.to_string()),
        _ => entity.fields.get(name).cloned(),
    }
}

/// Escape `value` so it can only ever form part of a CSS identifier.
fn escape_css(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii() {
            escaped.push(c);
        } else {
            escaped.push_str(&format!("\\{:x} ", u32::from(c)));
        }
    }
    escaped
}

/// Name of the id key for an entity type (`nid` for nodes, ...).
fn id_key(entity_type: &str) -> String {
    match entity_type {
        "node" => "nid".to_string(),
        "taxonomy_term" => "tid".to_string(),
        "user" => "uid".to_string(),
        "media" => "mid".to_string(),
        "file" => "fid".to_string(),
        other => format!("{other}_id"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::host_entity;
    use proptest::prelude::*;

    fn node_context() -> RenderContext {
        let mut node = host_entity("node", "42");
        node.bundle = Some("article".into());
        node.fields.insert("field_slug".into(), "summer-sale".into());
        RenderContext::for_host(node)
    }

    fn expand(template: &str, context: &RenderContext) -> String {
        interpolate(template, Some(context), Some(&BracketTokens))
    }

    #[test]
    fn node_id_token() {
        assert_eq!(expand("#node-[node:nid]", &node_context()), "#node-42");
    }

    #[test]
    fn generic_id_bundle_and_fields() {
        let ctx = node_context();
        assert_eq!(expand(".n-[node:id]", &ctx), ".n-42");
        assert_eq!(expand(".[node:bundle]", &ctx), ".article");
        assert_eq!(expand(".[node:type]", &ctx), ".article");
        assert_eq!(expand(".[node:entity-type]", &ctx), ".node");
        assert_eq!(expand("#[node:field_slug] .hero", &ctx), "#summer-sale .hero");
    }

    #[test]
    fn custom_entity_type_id_key() {
        let ctx = RenderContext::for_host(host_entity("block_content", "5"));
        assert_eq!(expand("#b-[block_content:block_content_id]", &ctx), "#b-5");
    }

    #[test]
    fn unknown_tokens_stay_literal() {
        let ctx = node_context();
        assert_eq!(expand("#[user:uid] .x", &ctx), "#[user:uid] .x");
        assert_eq!(expand("#[node:field_missing]", &ctx), "#[node:field_missing]");
    }

    #[test]
    fn attribute_selectors_are_not_tokens() {
        let ctx = node_context();
        assert_eq!(expand("a[href] .x", &ctx), "a[href] .x");
        assert_eq!(expand("[data-id=\"node:1\"]", &ctx), "[data-id=\"node:1\"]");
    }

    #[test]
    fn substitution_is_single_pass() {
        let mut node = host_entity("node", "42");
        node.fields.insert("field_trap".into(), "[node:nid]".into());
        let ctx = RenderContext::for_host(node);
        assert_eq!(expand("#[node:field_trap]", &ctx), "#\\5b node\\3a nid\\5d ");
    }

    #[test]
    fn values_cannot_close_the_style_element() {
        let mut node = host_entity("node", "42");
        node.fields
            .insert("field_slug".into(), "x</style><script>alert(1)</script>".into());
        let ctx = RenderContext::for_host(node);
        let selector = expand("#[node:field_slug] .hero", &ctx);
        assert!(!selector.contains('<'));
        assert!(!selector.contains('/'));
        assert!(selector.starts_with("#x\\3c \\2f style\\3e "));
        assert!(selector.ends_with(" .hero"));
    }

    #[test]
    fn values_cannot_open_a_new_rule() {
        let mut node = host_entity("node", "42");
        node.fields.insert("field_slug".into(), "a{} body{display:none".into());
        let ctx = RenderContext::for_host(node);
        let selector = expand("#[node:field_slug]", &ctx);
        assert_eq!(selector, "#a\\7b \\7d \\20 body\\7b display\\3a none");
    }

    #[test]
    fn values_are_trimmed() {
        let mut node = host_entity("node", "42");
        node.fields.insert("field_slug".into(), "  summer-sale \n".into());
        let ctx = RenderContext::for_host(node);
        assert_eq!(expand("#[node:field_slug]", &ctx), "#summer-sale");
    }

    #[test]
    fn no_context_leaves_template() {
        assert_eq!(
            interpolate("#node-[node:nid]", None, Some(&BracketTokens)),
            "#node-[node:nid]"
        );
        assert_eq!(
            interpolate("#node-[node:nid]", Some(&RenderContext::new()), Some(&BracketTokens)),
            "#node-[node:nid]"
        );
    }

    #[test]
    fn no_token_service_leaves_template() {
        assert_eq!(
            interpolate("#node-[node:nid]", Some(&node_context()), None),
            "#node-[node:nid]"
        );
    }

    proptest! {
        #[test]
        fn token_free_templates_are_unchanged(template in "[a-z0-9 .#>:_-]{0,40}") {
            prop_assert_eq!(expand(&template, &node_context()), template);
        }

        #[test]
        fn expanded_selector_is_stable(prefix in "[a-z.#]{1,10}") {
            let ctx = node_context();
            let once = expand(&format!("{prefix}[node:nid]"), &ctx);
            prop_assert_eq!(expand(&once, &ctx), once.clone());
        }
    }
}
