//! Style fragment generation and page-head attachment.
//!
//! A fragment is one CSS rule plus a key:
//!
//! ```text
//! .hero { background-image: url('/sites/default/files/styles/large/a.png'); }
//! background_image_tools__6f1c...e2__7
//! ```
//!
//! Keys are fresh for every call, never derived from the rule text. Rendering
//! the same field twice on one page attaches two identical rules under two
//! keys; nothing is memoized.

use crate::host::UrlGenerator;
use crate::types::{EntityId, HeadAttachment, StyleFragment};
use maud::{Markup, PreEscaped, html};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use thiserror::Error;
use uuid::Uuid;

/// Namespace every fragment key starts with.
pub const KEY_PREFIX: &str = "background_image_tools__";

static STYLE_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</(style)").expect("style end pattern is valid"));

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FragmentError {
    /// A rule without a selector would apply to the whole document.
    #[error("selector is empty")]
    EmptySelector,
    #[error("no image URLs to render")]
    NoUrls,
}

pub struct FragmentBuilder<'a> {
    urls: &'a dyn UrlGenerator,
}

impl<'a> FragmentBuilder<'a> {
    pub fn new(urls: &'a dyn UrlGenerator) -> Self {
        Self { urls }
    }

    /// Build one `background-image` rule for `selector`.
    ///
    /// `urls` keep their order: the first one is the top background layer.
    /// `salt` is appended to the key to make it easier to trace in page
    /// source.
    pub fn build(
        &self,
        selector: &str,
        urls: &[String],
        salt: Option<&EntityId>,
    ) -> Result<StyleFragment, FragmentError> {
        let selector = selector.trim();
        if selector.is_empty() {
            return Err(FragmentError::EmptySelector);
        }
        if urls.is_empty() {
            return Err(FragmentError::NoUrls);
        }

        let layers: Vec<String> = urls
            .iter()
            .map(|url| format!("url('{}')", self.urls.transform_relative(url)))
            .collect();

        Ok(StyleFragment {
            css_text: format!("{} {{ background-image: {}; }}", selector, layers.join(", ")),
            fragment_key: fragment_key(salt),
            source: salt.cloned(),
        })
    }
}

fn fragment_key(salt: Option<&EntityId>) -> String {
    let id = Uuid::new_v4();
    match salt {
        Some(salt) => format!("{KEY_PREFIX}{id}__{salt}"),
        None => format!("{KEY_PREFIX}{id}"),
    }
}

/// The page's head attachment list, as seen from one render.
///
/// Append-only. An attachment whose key is already present is dropped, so a
/// key is merged into the head at most once.
#[derive(Debug, Default)]
pub struct PageHead {
    attachments: Vec<HeadAttachment>,
    keys: HashSet<String>,
}

impl PageHead {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when the key was already attached.
    pub fn attach(&mut self, attachment: HeadAttachment) -> bool {
        if !self.keys.insert(attachment.key.clone()) {
            return false;
        }
        self.attachments.push(attachment);
        true
    }

    pub fn attach_all(&mut self, attachments: impl IntoIterator<Item = HeadAttachment>) {
        for attachment in attachments {
            self.attach(attachment);
        }
    }

    pub fn attachments(&self) -> &[HeadAttachment] {
        &self.attachments
    }

    pub fn len(&self) -> usize {
        self.attachments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attachments.is_empty()
    }

    /// `<style>` elements in attachment order.
    ///
    /// Rule text is raw CSS. A literal `</style` in it is written as
    /// `<\/style` so it cannot end the element early.
    pub fn to_markup(&self) -> Markup {
        html! {
            @for attachment in &self.attachments {
                style data-key=(attachment.key) {
                    (PreEscaped(STYLE_END.replace_all(&attachment.element.value, r"<\/$1")))
                }
            }
        }
    }
}
