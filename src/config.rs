//! Site configuration.
//!
//! Loads `config.toml` from a directory and layers it over stock defaults.
//! Only keys that differ from the defaults need to be written:
//!
//! ```toml
//! [site]
//! base_url = "https://example.com"       # Origin stripped from same-site URLs
//! public_path = "/sites/default/files"   # Where public:// is served
//! private_path = "/system/files"         # Where private:// is served
//!
//! [styles.thumbnail]                     # One table per image style
//! label = "Thumbnail (100×100)"
//!
//! [formatter]
//! selector = ""                          # CSS selector, may contain tokens
//! image_style = ""                       # Machine name of an image style
//! mode = "per-entity"                    # or "combined"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::styles::{ImageStyle, StyleCatalog};
use crate::types::StyleSpec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Site origin and file mount points.
    pub site: SiteSettings,
    /// Registered image styles by machine name.
    pub styles: BTreeMap<String, StyleConfig>,
    /// Default formatter settings.
    pub formatter: StyleSpec,
}

impl Default for SiteConfig {
    fn default() -> Self {
        let styles = [
            ("thumbnail", "Thumbnail (100×100)"),
            ("medium", "Medium (220×220)"),
            ("large", "Large (480×480)"),
            ("wide", "Wide (1090)"),
        ]
        .into_iter()
        .map(|(name, label)| {
            (
                name.to_string(),
                StyleConfig {
                    label: label.to_string(),
                },
            )
        })
        .collect();

        Self {
            site: SiteSettings::default(),
            styles,
            formatter: StyleSpec::default(),
        }
    }
}

impl SiteConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let base = &self.site.base_url;
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ConfigError::Validation(format!(
                "site.base_url must be an http(s) URL, got '{base}'"
            )));
        }
        for (key, path) in [
            ("public_path", &self.site.public_path),
            ("private_path", &self.site.private_path),
        ] {
            if !path.starts_with('/') {
                return Err(ConfigError::Validation(format!(
                    "site.{key} must start with '/', got '{path}'"
                )));
            }
        }
        for (name, style) in &self.styles {
            if name.is_empty() || name.contains(char::is_whitespace) {
                return Err(ConfigError::Validation(format!(
                    "style machine name '{name}' must be non-empty without whitespace"
                )));
            }
            if style.label.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "styles.{name}.label must not be empty"
                )));
            }
        }
        Ok(())
    }

    pub fn style_catalog(&self) -> StyleCatalog {
        let mut catalog = StyleCatalog::new();
        for (name, style) in &self.styles {
            catalog.register(ImageStyle::new(name, &style.label));
        }
        catalog
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteSettings {
    pub base_url: String,
    pub public_path: String,
    pub private_path: String,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost".to_string(),
            public_path: "/sites/default/files".to_string(),
            private_path: "/system/files".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StyleConfig {
    pub label: String,
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Stock defaults as a TOML table, the base layer for user overrides.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(SiteConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// Tables merge key by key; any other overlay value replaces the base value.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Raw `config.toml` of a directory, `None` if the file is absent.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    Ok(Some(toml::from_str(&content)?))
}

pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load `config.toml` from `dir` over stock defaults and validate it.
pub fn load_config(dir: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(dir)?;
    resolve_config(base, overlay)
}

/// Fully commented stock `config.toml`, printed by `gen-config`.
pub fn stock_config_toml() -> &'static str {
    r##"# background-image-tools configuration
# ====================================
# All settings are optional. Values shown below are the defaults.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Site
# ---------------------------------------------------------------------------
[site]
# Origin of the site. Absolute URLs on this origin are emitted as
# root-relative paths in the generated CSS.
base_url = "http://localhost"

# Web path that public:// files are served from.
public_path = "/sites/default/files"

# Web path that private:// files are served from.
private_path = "/system/files"

# ---------------------------------------------------------------------------
# Image styles
# ---------------------------------------------------------------------------
# One table per style, keyed by machine name. A derivative of
# public://a.png for style "large" lives at public://styles/large/a.png.
[styles.thumbnail]
label = "Thumbnail (100×100)"

[styles.medium]
label = "Medium (220×220)"

[styles.large]
label = "Large (480×480)"

[styles.wide]
label = "Wide (1090)"

# ---------------------------------------------------------------------------
# Formatter defaults
# ---------------------------------------------------------------------------
[formatter]
# CSS selector the background is applied to. Supports tokens such as
# [node:nid] resolved against the entity hosting the field.
# An empty selector emits nothing.
selector = ""

# Machine name of the image style to render with.
image_style = ""

# "per-entity": one rule per image.
# "combined":   every image of the field layered into a single rule.
mode = "per-entity"
"##
}
