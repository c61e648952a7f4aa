//! Formatter variants and their settings.
//!
//! Four variants exist, two per field shape:
//!
//! | Variant | Field type | Applies when | Counts as image |
//! |---------|------------|--------------|-----------------|
//! | `File` | `image` | field holds files | always |
//! | `Media` | `entity_reference` | target type is `media` | source kind is `image` |
//! | `ResponsiveFile` | `image` | as `File` | as `File` |
//! | `ResponsiveMedia` | `entity_reference` | as `Media` | as `Media` |
//!
//! The responsive variants resolve exactly like their plain counterparts;
//! they only tell the host to deliver the result through its responsive
//! image hook instead of a single fixed style.

use crate::host::StyleRegistry;
use crate::types::{AssetReference, StyleSpec};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Field storage shape the host reports for a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    /// Field type id: `image`, `entity_reference`, ...
    pub field_type: String,
    /// Entity type the field's storage targets: `file`, `media`, `node`, ...
    pub target_type: String,
}

impl FieldDefinition {
    pub fn new(field_type: impl Into<String>, target_type: impl Into<String>) -> Self {
        Self {
            field_type: field_type.into(),
            target_type: target_type.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum FormatterVariant {
    File,
    Media,
    ResponsiveFile,
    ResponsiveMedia,
}

/// Host rendering hook a variant delivers through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderHook {
    ImageStyle,
    ResponsiveImage,
}

impl FormatterVariant {
    pub const ALL: [FormatterVariant; 4] = [
        FormatterVariant::File,
        FormatterVariant::Media,
        FormatterVariant::ResponsiveFile,
        FormatterVariant::ResponsiveMedia,
    ];

    pub fn plugin_id(self) -> &'static str {
        match self {
            FormatterVariant::File => "background_image_tools_file",
            FormatterVariant::Media => "background_image_tools_media",
            FormatterVariant::ResponsiveFile => "responsive_background_image_tools_file",
            FormatterVariant::ResponsiveMedia => "responsive_background_image_tools_media",
        }
    }

    pub fn label(self) -> &'static str {
        if self.is_responsive() {
            "Responsive Background Image"
        } else {
            "Background Image"
        }
    }

    /// Field types the variant is offered for.
    pub fn field_types(self) -> &'static [&'static str] {
        if self.wraps_media() {
            &["entity_reference"]
        } else {
            &["image"]
        }
    }

    pub fn is_responsive(self) -> bool {
        matches!(
            self,
            FormatterVariant::ResponsiveFile | FormatterVariant::ResponsiveMedia
        )
    }

    fn wraps_media(self) -> bool {
        matches!(
            self,
            FormatterVariant::Media | FormatterVariant::ResponsiveMedia
        )
    }

    pub fn render_hook(self) -> RenderHook {
        if self.is_responsive() {
            RenderHook::ResponsiveImage
        } else {
            RenderHook::ImageStyle
        }
    }

    pub fn is_applicable(self, field: &FieldDefinition) -> bool {
        if self.wraps_media() {
            field.target_type == "media"
        } else {
            field.field_type == "image" || field.target_type == "file"
        }
    }

    /// Whether `entity` contributes a background at all.
    ///
    /// Media fields may mix images with documents or remote video; only
    /// media with an `image` source pass.
    pub fn is_image(self, entity: &AssetReference) -> bool {
        if !self.wraps_media() {
            return true;
        }
        match entity {
            AssetReference::Media(media) => media.source == "image",
            AssetReference::File(_) => false,
        }
    }

    pub fn default_settings(self) -> StyleSpec {
        StyleSpec::default()
    }

    /// Applicable variants for `field`, plain variants first.
    pub fn applicable_variants(field: &FieldDefinition) -> Vec<FormatterVariant> {
        Self::ALL
            .into_iter()
            .filter(|v| v.is_applicable(field))
            .collect()
    }
}

impl fmt::Display for FormatterVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.plugin_id())
    }
}

/// One-line-per-setting summary shown next to a configured formatter.
pub fn settings_summary(spec: &StyleSpec, styles: &dyn StyleRegistry) -> Vec<String> {
    let selector = if spec.selector_template.is_empty() {
        "None"
    } else {
        spec.selector_template.as_str()
    };
    let style = styles
        .lookup_style(&spec.style_name)
        .map(|s| s.label().to_string())
        .unwrap_or_else(|| "None".to_string());

    vec![
        format!("CSS Selector: {selector}"),
        format!("Image Style: {style}"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::styles::StyleCatalog;
    use crate::test_helpers::*;

    fn media_field() -> FieldDefinition {
        FieldDefinition::new("entity_reference", "media")
    }

    fn image_field() -> FieldDefinition {
        FieldDefinition::new("image", "file")
    }

    #[test]
    fn media_variants_need_media_target() {
        for variant in [FormatterVariant::Media, FormatterVariant::ResponsiveMedia] {
            assert!(variant.is_applicable(&media_field()));
            for target in ["file", "node", "Media", "media_type", ""] {
                let field = FieldDefinition::new("entity_reference", target);
                assert!(!variant.is_applicable(&field), "{variant} on {target}");
            }
        }
    }

    #[test]
    fn file_variants_apply_to_file_fields() {
        for variant in [FormatterVariant::File, FormatterVariant::ResponsiveFile] {
            assert!(variant.is_applicable(&image_field()));
            assert!(variant.is_applicable(&FieldDefinition::new("file", "file")));
            assert!(!variant.is_applicable(&media_field()));
        }
    }

    #[test]
    fn applicable_variants_for_media_field() {
        assert_eq!(
            FormatterVariant::applicable_variants(&media_field()),
            vec![FormatterVariant::Media, FormatterVariant::ResponsiveMedia]
        );
        assert!(
            FormatterVariant::applicable_variants(&FieldDefinition::new("string", "")).is_empty()
        );
    }

    #[test]
    fn file_variant_accepts_everything() {
        assert!(FormatterVariant::File.is_image(&file_ref("1", "public://a.png")));
        assert!(FormatterVariant::ResponsiveFile.is_image(&file_ref("1", "public://a.pdf")));
    }

    #[test]
    fn media_variant_accepts_only_image_sources() {
        for variant in [FormatterVariant::Media, FormatterVariant::ResponsiveMedia] {
            assert!(variant.is_image(&image_media("7", Some("1"))));
            assert!(!variant.is_image(&media_ref("8", "document", Some("2"))));
            assert!(!variant.is_image(&media_ref("9", "oembed:video", None)));
        }
    }

    #[test]
    fn responsive_variants_use_responsive_hook() {
        assert_eq!(FormatterVariant::File.render_hook(), RenderHook::ImageStyle);
        assert_eq!(
            FormatterVariant::ResponsiveMedia.render_hook(),
            RenderHook::ResponsiveImage
        );
        assert_eq!(FormatterVariant::ResponsiveFile.label(), "Responsive Background Image");
        assert_eq!(FormatterVariant::Media.field_types(), &["entity_reference"]);
    }

    #[test]
    fn defaults_are_empty() {
        for variant in FormatterVariant::ALL {
            let defaults = variant.default_settings();
            assert_eq!(defaults.selector_template, "");
            assert_eq!(defaults.style_name, "");
        }
    }

    #[test]
    fn summary_uses_style_label() {
        let styles = StyleCatalog::new().with_style("large", "Large (480×480)");
        let spec = StyleSpec::new(".hero", "large");
        assert_eq!(
            settings_summary(&spec, &styles),
            vec!["CSS Selector: .hero", "Image Style: Large (480×480)"]
        );
    }

    #[test]
    fn summary_of_unset_settings() {
        let styles = StyleCatalog::new();
        assert_eq!(
            settings_summary(&StyleSpec::default(), &styles),
            vec!["CSS Selector: None", "Image Style: None"]
        );
        assert_eq!(
            settings_summary(&StyleSpec::new(".x", "gone"), &styles)[1],
            "Image Style: None"
        );
    }
}
