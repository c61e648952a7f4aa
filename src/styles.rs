//! In-memory image style registry.
//!
//! An image style derives a processed variant of a source image. This crate
//! never processes images; a style only knows where its derivative lives:
//!
//! ```text
//! public://hero/a.png  --thumbnail-->  public://styles/thumbnail/hero/a.png
//! ```

use crate::host::{StyleRegistry, TransformHandle};
use std::collections::BTreeMap;

/// Scheme assumed for source paths that carry none.
const DEFAULT_SCHEME: &str = "public";

#[derive(Debug, Clone, PartialEq)]
pub struct ImageStyle {
    pub name: String,
    pub label: String,
}

impl ImageStyle {
    pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
        }
    }

    /// URI of this style's derivative for `source_uri`.
    pub fn derivative_uri(&self, source_uri: &str) -> String {
        let (scheme, target) = match source_uri.split_once("://") {
            Some((scheme, target)) => (scheme, target),
            None => (DEFAULT_SCHEME, source_uri),
        };
        format!(
            "{}://styles/{}/{}",
            scheme,
            self.name,
            target.trim_start_matches('/')
        )
    }
}

impl TransformHandle for ImageStyle {
    fn label(&self) -> &str {
        &self.label
    }

    fn build_url(&self, source_uri: &str) -> String {
        self.derivative_uri(source_uri)
    }
}

/// Styles keyed by machine name.
#[derive(Debug, Clone, Default)]
pub struct StyleCatalog {
    styles: BTreeMap<String, ImageStyle>,
}

impl StyleCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, style: ImageStyle) {
        self.styles.insert(style.name.clone(), style);
    }

    pub fn with_style(mut self, name: &str, label: &str) -> Self {
        self.register(ImageStyle::new(name, label));
        self
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }
}

impl StyleRegistry for StyleCatalog {
    fn lookup_style(&self, name: &str) -> Option<&dyn TransformHandle> {
        self.styles.get(name).map(|s| s as &dyn TransformHandle)
    }

    fn style_options(&self) -> Vec<(String, String)> {
        self.styles
            .values()
            .map(|s| (s.name.clone(), s.label.clone()))
            .collect()
    }
}
