//! Content documents: a host entity, one of its fields, and the files and
//! media the field points at, described in TOML.
//!
//! ```toml
//! [host]
//! entity_type = "node"
//! id = "42"
//! bundle = "article"
//!
//! [field]
//! name = "field_hero"
//! field_type = "entity_reference"
//! target_type = "media"
//! items = [{ media = "7" }, { media = "8" }]
//!
//! [[files]]
//! id = "3"
//! uri = "public://hero/a.png"
//!
//! [[media]]
//! id = "7"
//! source = "image"
//! source_file = "3"
//! ```
//!
//! Field items are loaded the way an entity reference field loads them:
//! references to entities that do not exist are dropped before rendering.
//! A media item whose *source file* is gone is kept, so the pipeline can
//! report it.

use crate::formatter::FieldDefinition;
use crate::host::FileStorage;
use crate::types::{
    AssetReference, EntityId, FileEntity, HostEntity, MediaEntity, RenderContext,
    StyleOverrides,
};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("duplicate {kind} id '{id}'")]
    DuplicateId { kind: &'static str, id: EntityId },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContentDocument {
    pub host: Option<HostEntity>,
    pub field: FieldValue,
    #[serde(default)]
    pub files: Vec<FileEntity>,
    #[serde(default)]
    pub media: Vec<MediaEntity>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldValue {
    pub name: String,
    pub field_type: String,
    pub target_type: String,
    #[serde(default)]
    pub items: Vec<FieldItem>,
    /// Per-field formatter settings, layered over the configured defaults.
    /// Only the keys written here override anything.
    #[serde(default)]
    pub settings: Option<StyleOverrides>,
}

impl FieldValue {
    pub fn definition(&self) -> FieldDefinition {
        FieldDefinition::new(&self.field_type, &self.target_type)
    }
}

/// One field item: a reference to a file or a media item by id.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldItem {
    File(EntityId),
    Media(EntityId),
}

/// Files and media by id.
#[derive(Debug, Clone, Default)]
pub struct ContentStore {
    files: BTreeMap<EntityId, FileEntity>,
    media: BTreeMap<EntityId, MediaEntity>,
}

impl ContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_file(&mut self, file: FileEntity) -> Option<FileEntity> {
        self.files.insert(file.id.clone(), file)
    }

    pub fn insert_media(&mut self, media: MediaEntity) -> Option<MediaEntity> {
        self.media.insert(media.id.clone(), media)
    }

    pub fn load_media(&self, id: &EntityId) -> Option<MediaEntity> {
        self.media.get(id).cloned()
    }

    /// Load field items into asset references, dropping dangling ones.
    pub fn field_references(&self, items: &[FieldItem]) -> Vec<AssetReference> {
        items
            .iter()
            .filter_map(|item| {
                let loaded = match item {
                    FieldItem::File(id) => self.load_file(id).map(AssetReference::File),
                    FieldItem::Media(id) => self.load_media(id).map(AssetReference::Media),
                };
                if loaded.is_none() {
                    tracing::warn!(item = ?item, "field item references a missing entity");
                }
                loaded
            })
            .collect()
    }
}

impl FileStorage for ContentStore {
    fn load_file(&self, id: &EntityId) -> Option<FileEntity> {
        self.files.get(id).cloned()
    }
}

impl ContentDocument {
    pub fn from_toml(text: &str) -> Result<Self, ContentError> {
        Ok(toml::from_str(text)?)
    }

    pub fn store(&self) -> Result<ContentStore, ContentError> {
        let mut store = ContentStore::new();
        for file in &self.files {
            if store.insert_file(file.clone()).is_some() {
                return Err(ContentError::DuplicateId {
                    kind: "file",
                    id: file.id.clone(),
                });
            }
        }
        for media in &self.media {
            if store.insert_media(media.clone()).is_some() {
                return Err(ContentError::DuplicateId {
                    kind: "media",
                    id: media.id.clone(),
                });
            }
        }
        Ok(store)
    }

    /// Token context for the host entity, if the document has one.
    pub fn context(&self) -> Option<RenderContext> {
        self.host.clone().map(RenderContext::for_host)
    }
}

pub fn load_content(path: &Path) -> Result<ContentDocument, ContentError> {
    let text = fs::read_to_string(path)?;
    ContentDocument::from_toml(&text)
}
