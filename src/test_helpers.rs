//! Shared test utilities: entity builders and an in-memory host.
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let host = TestHost::new().with_file("3", "public://a.png");
//! let pipeline = RenderPipeline::new(host.collaborators());
//! let fragments = pipeline.render(
//!     &[image_media("7", Some("3"))],
//!     &StyleSpec::new(".hero", "large"),
//!     None,
//!     FormatterVariant::Media,
//! );
//! ```

use std::collections::BTreeMap;

use crate::content::ContentStore;
use crate::host::{Collaborators, SiteUrlGenerator};
use crate::styles::StyleCatalog;
use crate::tokens::BracketTokens;
use crate::types::{AssetReference, FileEntity, HostEntity, MediaEntity};

// =========================================================================
// Entity builders
// =========================================================================

pub fn file_ref(id: &str, uri: &str) -> AssetReference {
    AssetReference::File(FileEntity {
        id: id.into(),
        uri: uri.into(),
    })
}

pub fn media_ref(id: &str, source: &str, source_file: Option<&str>) -> AssetReference {
    AssetReference::Media(MediaEntity {
        id: id.into(),
        source: source.into(),
        source_file: source_file.map(Into::into),
    })
}

pub fn image_media(id: &str, source_file: Option<&str>) -> AssetReference {
    media_ref(id, "image", source_file)
}

pub fn host_entity(entity_type: &str, id: &str) -> HostEntity {
    HostEntity {
        entity_type: entity_type.into(),
        id: id.into(),
        bundle: None,
        fields: BTreeMap::new(),
    }
}

// =========================================================================
// In-memory host
// =========================================================================

pub fn site_urls() -> SiteUrlGenerator {
    SiteUrlGenerator::new(
        "https://example.com",
        "/sites/default/files",
        "/system/files",
    )
}

/// Host with the four core image styles and an empty file store.
pub struct TestHost {
    pub content: ContentStore,
    pub styles: StyleCatalog,
    pub urls: SiteUrlGenerator,
    pub tokens: BracketTokens,
}

impl TestHost {
    pub fn new() -> Self {
        Self {
            content: ContentStore::new(),
            styles: StyleCatalog::new()
                .with_style("thumbnail", "Thumbnail (100×100)")
                .with_style("medium", "Medium (220×220)")
                .with_style("large", "Large (480×480)")
                .with_style("wide", "Wide (1090)"),
            urls: site_urls(),
            tokens: BracketTokens,
        }
    }

    pub fn with_file(mut self, id: &str, uri: &str) -> Self {
        self.content.insert_file(FileEntity {
            id: id.into(),
            uri: uri.into(),
        });
        self
    }

    pub fn collaborators(&self) -> Collaborators<'_> {
        Collaborators {
            files: &self.content,
            styles: &self.styles,
            urls: &self.urls,
            tokens: Some(&self.tokens),
        }
    }
}
