//! Shared types passed between the host, the resolver, and the pipeline.
//!
//! Everything here is read-only from the pipeline's point of view: the host
//! supplies entities and settings for one render, and receives
//! [`StyleFragment`]s back.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Opaque identity of a host entity (file, media item, node, ...).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A stored file pointing at a raster asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileEntity {
    pub id: EntityId,
    /// Stream-wrapper URI, e.g. `public://hero/a.png`.
    pub uri: String,
}

/// A media item wrapping (usually) a file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaEntity {
    pub id: EntityId,
    /// Source plugin kind: `image`, `document`, `oembed:video`, ...
    pub source: String,
    /// File id stored in the media item's source field. Absent for sources
    /// that do not store a file (remote video, for one).
    #[serde(default)]
    pub source_file: Option<EntityId>,
}

/// One item of a field value: either a file directly, or a media wrapper.
#[derive(Debug, Clone, PartialEq)]
pub enum AssetReference {
    File(FileEntity),
    Media(MediaEntity),
}

impl AssetReference {
    pub fn id(&self) -> &EntityId {
        match self {
            AssetReference::File(file) => &file.id,
            AssetReference::Media(media) => &media.id,
        }
    }

    /// Host entity type id of the referenced entity.
    pub fn entity_type(&self) -> &'static str {
        match self {
            AssetReference::File(_) => "file",
            AssetReference::Media(_) => "media",
        }
    }
}

/// Which rule layout the pipeline emits for a field.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum RenderMode {
    /// One rule and one fragment per image entity.
    #[default]
    PerEntity,
    /// All of the field's images layered into a single rule.
    Combined,
}

/// Settings of one formatter instance.
///
/// Serialized with the keys the settings store uses (`selector`,
/// `image_style`). Both default to the empty string; nothing is ever
/// invented for an unset value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StyleSpec {
    /// CSS selector, possibly containing `[type:name]` tokens.
    #[serde(rename = "selector")]
    pub selector_template: String,
    /// Machine name of a registered image style.
    #[serde(rename = "image_style")]
    pub style_name: String,
    pub mode: RenderMode,
}

impl StyleSpec {
    pub fn new(selector_template: impl Into<String>, style_name: impl Into<String>) -> Self {
        Self {
            selector_template: selector_template.into(),
            style_name: style_name.into(),
            mode: RenderMode::PerEntity,
        }
    }

    pub fn combined(mut self) -> Self {
        self.mode = RenderMode::Combined;
        self
    }

    /// These settings with every value present in `overrides` replacing ours.
    ///
    /// Presence is what counts: an explicit empty selector or an explicit
    /// `per-entity` mode still wins over a configured default.
    pub fn with_overrides(&self, overrides: &StyleOverrides) -> StyleSpec {
        StyleSpec {
            selector_template: overrides
                .selector_template
                .clone()
                .unwrap_or_else(|| self.selector_template.clone()),
            style_name: overrides
                .style_name
                .clone()
                .unwrap_or_else(|| self.style_name.clone()),
            mode: overrides.mode.unwrap_or(self.mode),
        }
    }
}

/// A partial [`StyleSpec`]: only the keys that were actually set.
///
/// Per-field settings and command-line flags are layered over the configured
/// defaults with [`StyleSpec::with_overrides`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StyleOverrides {
    #[serde(rename = "selector", skip_serializing_if = "Option::is_none")]
    pub selector_template: Option<String>,
    #[serde(rename = "image_style", skip_serializing_if = "Option::is_none")]
    pub style_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<RenderMode>,
}

/// The entity that hosts the field being rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HostEntity {
    pub entity_type: String,
    pub id: EntityId,
    #[serde(default)]
    pub bundle: Option<String>,
    /// Plain field values available to tokens as `[type:field_name]`.
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
}

/// Token-substitution context: context-type name → entity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderContext {
    entries: BTreeMap<String, HostEntity>,
}

impl RenderContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context keyed by the host entity's own type, the way a field render
    /// exposes its parent.
    pub fn for_host(host: HostEntity) -> Self {
        let mut context = Self::new();
        context.insert(host.entity_type.clone(), host);
        context
    }

    pub fn insert(&mut self, name: impl Into<String>, entity: HostEntity) {
        self.entries.insert(name.into(), entity);
    }

    pub fn get(&self, name: &str) -> Option<&HostEntity> {
        self.entries.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &HostEntity)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// One generated CSS rule plus the key it is attached under.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StyleFragment {
    pub css_text: String,
    pub fragment_key: String,
    /// Entity the rule was built from, when there is a single one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<EntityId>,
}

/// Element descriptor for the page head.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeadElement {
    pub tag: &'static str,
    pub value: String,
}

/// What the page-attachment boundary receives: an element and its unique key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeadAttachment {
    pub element: HeadElement,
    pub key: String,
}

impl StyleFragment {
    pub fn head_attachment(&self) -> HeadAttachment {
        HeadAttachment {
            element: HeadElement {
                tag: "style",
                value: self.css_text.clone(),
            },
            key: self.fragment_key.clone(),
        }
    }
}
