//! Asset resolution: entity + image style name → derivative URL.
//!
//! Files and media items are resolved the same way once the media item has
//! been unwrapped to its source file:
//!
//! ```text
//! File(uri)                         ─┐
//! Media(source_file) → load_file()  ─┴→ lookup_style(name).build_url(uri)
//! ```

use crate::host::{FileStorage, StyleRegistry};
use crate::types::{AssetReference, EntityId, FileEntity};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolveError {
    #[error("image style '{0}' is not registered")]
    UnknownStyle(String),
    #[error("media {media} references file {file}, which does not exist")]
    MissingUnderlyingFile { media: EntityId, file: EntityId },
    #[error("media {media} has a '{source_kind}' source that stores no file")]
    UnresolvableAsset { media: EntityId, source_kind: String },
}

pub struct AssetResolver<'a> {
    files: &'a dyn FileStorage,
    styles: &'a dyn StyleRegistry,
}

impl<'a> AssetResolver<'a> {
    pub fn new(files: &'a dyn FileStorage, styles: &'a dyn StyleRegistry) -> Self {
        Self { files, styles }
    }

    /// URL of `reference` transformed by the image style `style_name`.
    pub fn resolve(
        &self,
        reference: &AssetReference,
        style_name: &str,
    ) -> Result<String, ResolveError> {
        let file = self.source_file(reference)?;
        let style = self
            .styles
            .lookup_style(style_name)
            .ok_or_else(|| ResolveError::UnknownStyle(style_name.to_string()))?;
        Ok(style.build_url(&file.uri))
    }

    fn source_file(&self, reference: &AssetReference) -> Result<FileEntity, ResolveError> {
        match reference {
            AssetReference::File(file) => Ok(file.clone()),
            AssetReference::Media(media) => {
                let fid = media.source_file.as_ref().ok_or_else(|| {
                    ResolveError::UnresolvableAsset {
                        media: media.id.clone(),
                        source_kind: media.source.clone(),
                    }
                })?;
                self.files
                    .load_file(fid)
                    .ok_or_else(|| ResolveError::MissingUnderlyingFile {
                        media: media.id.clone(),
                        file: fid.clone(),
                    })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;

    #[test]
    fn direct_file_resolves_through_style() {
        let host = TestHost::new();
        let resolver = AssetResolver::new(&host.content, &host.styles);
        let url = resolver
            .resolve(&file_ref("1", "public://a.png"), "thumbnail")
            .unwrap();
        assert_eq!(url, "public://styles/thumbnail/a.png");
    }

    #[test]
    fn resolving_twice_gives_same_url() {
        let host = TestHost::new();
        let resolver = AssetResolver::new(&host.content, &host.styles);
        let reference = file_ref("1", "public://a.png");
        assert_eq!(
            resolver.resolve(&reference, "large").unwrap(),
            resolver.resolve(&reference, "large").unwrap()
        );
    }

    #[test]
    fn media_unwraps_to_its_source_file() {
        let host = TestHost::new().with_file("3", "public://hero/b.jpg");
        let resolver = AssetResolver::new(&host.content, &host.styles);
        let url = resolver
            .resolve(&image_media("7", Some("3")), "large")
            .unwrap();
        assert_eq!(url, "public://styles/large/hero/b.jpg");
    }

    #[test]
    fn media_with_missing_file() {
        let host = TestHost::new();
        let resolver = AssetResolver::new(&host.content, &host.styles);
        let err = resolver
            .resolve(&image_media("7", Some("99")), "large")
            .unwrap_err();
        assert_eq!(
            err,
            ResolveError::MissingUnderlyingFile {
                media: "7".into(),
                file: "99".into(),
            }
        );
    }

    #[test]
    fn media_without_source_file_is_unresolvable() {
        let host = TestHost::new();
        let resolver = AssetResolver::new(&host.content, &host.styles);
        let err = resolver
            .resolve(&media_ref("8", "oembed:video", None), "large")
            .unwrap_err();
        assert!(matches!(
            err,
            ResolveError::UnresolvableAsset { ref source_kind, .. } if source_kind == "oembed:video"
        ));
    }

    #[test]
    fn unknown_style() {
        let host = TestHost::new();
        let resolver = AssetResolver::new(&host.content, &host.styles);
        let err = resolver
            .resolve(&file_ref("1", "public://a.png"), "poster")
            .unwrap_err();
        assert_eq!(err, ResolveError::UnknownStyle("poster".into()));
        assert_eq!(err.to_string(), "image style 'poster' is not registered");
    }

    #[test]
    fn empty_style_name_is_unknown() {
        let host = TestHost::new();
        let resolver = AssetResolver::new(&host.content, &host.styles);
        let err = resolver
            .resolve(&file_ref("1", "public://a.png"), "")
            .unwrap_err();
        assert_eq!(err, ResolveError::UnknownStyle(String::new()));
    }
}
