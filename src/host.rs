//! Seams to the host content system.
//!
//! The pipeline never reaches for ambient services. Everything it needs from
//! the host is passed in through these traits, bundled in [`Collaborators`].
//! In-memory implementations live in [`crate::styles`], [`crate::content`],
//! [`crate::tokens`], and [`SiteUrlGenerator`] below.

use crate::config::SiteSettings;
use crate::types::{EntityId, FileEntity, RenderContext};

/// File lookup by id (the host's file storage).
pub trait FileStorage {
    fn load_file(&self, id: &EntityId) -> Option<FileEntity>;
}

/// A registered image style able to derive a URL from a source URI.
pub trait TransformHandle {
    fn label(&self) -> &str;
    fn build_url(&self, source_uri: &str) -> String;
}

/// Registry of image styles by machine name.
pub trait StyleRegistry {
    fn lookup_style(&self, name: &str) -> Option<&dyn TransformHandle>;

    /// Machine name → label pairs, in a stable order, for settings forms.
    fn style_options(&self) -> Vec<(String, String)>;
}

/// Token replacement service. Optional: hosts without token support pass
/// `None` and selectors are used verbatim.
pub trait TokenResolver {
    fn replace(&self, template: &str, context: &RenderContext) -> String;
}

/// Turns stream-wrapper URIs and same-origin absolute URLs into paths
/// suitable for `url(...)`.
pub trait UrlGenerator {
    fn transform_relative(&self, url: &str) -> String;
}

/// Borrowed host services for one render.
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    pub files: &'a dyn FileStorage,
    pub styles: &'a dyn StyleRegistry,
    pub urls: &'a dyn UrlGenerator,
    pub tokens: Option<&'a dyn TokenResolver>,
}

/// URL generator for a single site with `public://` and `private://` mounts.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteUrlGenerator {
    base_url: String,
    public_path: String,
    private_path: String,
}

impl SiteUrlGenerator {
    pub fn new(
        base_url: impl Into<String>,
        public_path: impl Into<String>,
        private_path: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            public_path: public_path.into().trim_end_matches('/').to_string(),
            private_path: private_path.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_settings(site: &SiteSettings) -> Self {
        Self::new(&site.base_url, &site.public_path, &site.private_path)
    }
}

impl UrlGenerator for SiteUrlGenerator {
    fn transform_relative(&self, url: &str) -> String {
        if let Some(target) = url.strip_prefix("public://") {
            return format!("{}/{}", self.public_path, target);
        }
        if let Some(target) = url.strip_prefix("private://") {
            return format!("{}/{}", self.private_path, target);
        }
        match url.strip_prefix(&self.base_url) {
            Some("") => "/".to_string(),
            Some(rest) if rest.starts_with('/') => rest.to_string(),
            // Either another origin, or a host that merely shares a prefix
            // (example.com vs example.com.evil).
            _ => url.to_string(),
        }
    }
}
