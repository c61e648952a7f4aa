//! # Background Image Tools
//!
//! Render an image or media field as CSS instead of markup. Each image in the
//! field becomes a `background-image` rule on a configurable selector, and
//! the rule is attached to the page head under a unique key. The field itself
//! renders nothing.
//!
//! # Pipeline
//!
//! ```text
//! field items ─is_image─▶ AssetResolver ─▶ FragmentBuilder ─▶ head attachments
//!                            ▲                  ▲
//!     image style registry ──┘    selector ─────┘ (tokens expanded
//!                                                  against the host entity)
//! ```
//!
//! All host services arrive through the traits in [`host`]; nothing is
//! looked up globally. A render is synchronous and reads its inputs only.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`types`] | Entities, settings, fragments, head attachments |
//! | [`host`] | Collaborator traits and the site URL generator |
//! | [`styles`] | In-memory image style registry |
//! | [`resolve`] | File / media → image style URL |
//! | [`tokens`] | Selector token interpolation |
//! | [`fragment`] | CSS rule + unique key generation, page head |
//! | [`formatter`] | Formatter variants, applicability, image filter, settings summary |
//! | [`pipeline`] | Per-field orchestration and render reports |
//! | [`config`] | `config.toml` loading: site URLs, image styles, formatter defaults |
//! | [`content`] | TOML content documents and the in-memory content store |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Broken references never break the page
//!
//! A field can point at a deleted file, a media item whose source has no
//! file, or a style that was removed. Each of these skips one entity; the
//! rest of the field still renders. At worst a background silently does not
//! appear.
//!
//! ## No empty selectors
//!
//! A rule with an empty selector would style the whole document. The
//! selector is checked after token expansion and an empty result emits
//! nothing.
//!
//! ## Fresh keys per render
//!
//! Fragment keys are random (UUID v4), salted with the entity id. Keys are
//! not derived from content, so nothing needs to be cached or deduplicated
//! across renders.

pub mod config;
pub mod content;
pub mod formatter;
pub mod fragment;
pub mod host;
pub mod output;
pub mod pipeline;
pub mod resolve;
pub mod styles;
pub mod tokens;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
