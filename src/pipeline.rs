//! Field rendering: entities in, head attachments out.
//!
//! For one field value the pipeline:
//!
//! 1. drops entities the variant does not consider images,
//! 2. expands the selector template once against the render context,
//! 3. resolves each remaining entity to its image style URL,
//! 4. builds fragments, one per entity (or one per field in combined mode).
//!
//! A broken entity never aborts the field. It is logged, recorded in the
//! [`RenderReport`], and its siblings still render. The field's own markup is
//! always empty; the background rules are the only output.

use crate::formatter::FormatterVariant;
use crate::fragment::{FragmentBuilder, FragmentError};
use crate::host::{Collaborators, TokenResolver};
use crate::resolve::{AssetResolver, ResolveError};
use crate::tokens::interpolate;
use crate::types::{
    AssetReference, EntityId, HeadAttachment, RenderContext, RenderMode, StyleFragment, StyleSpec,
};
use maud::{Markup, html};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Fragment(#[from] FragmentError),
    #[error("no image entities in field")]
    NoApplicableEntities,
}

/// An entity that passed the image filter but produced no fragment.
#[derive(Debug, Clone, PartialEq)]
pub struct Skipped {
    pub entity: EntityId,
    pub reason: RenderError,
}

#[derive(Debug, Default)]
pub struct RenderReport {
    pub fragments: Vec<StyleFragment>,
    pub skipped: Vec<Skipped>,
    /// Entities removed by the variant's image filter.
    pub filtered: Vec<EntityId>,
    /// Set when the field produced nothing for a field-wide reason.
    pub empty_reason: Option<RenderError>,
}

impl RenderReport {
    pub fn attachments(&self) -> Vec<HeadAttachment> {
        self.fragments.iter().map(StyleFragment::head_attachment).collect()
    }

    fn skip(&mut self, entity: &AssetReference, reason: RenderError) {
        tracing::warn!(
            entity = %entity.id(),
            entity_type = entity.entity_type(),
            error = %reason,
            "skipping background image"
        );
        self.skipped.push(Skipped {
            entity: entity.id().clone(),
            reason,
        });
    }
}

/// What a field render hands back to the host.
pub struct FieldView {
    /// Inline markup of the field. Always empty.
    pub markup: Markup,
    pub attachments: Vec<HeadAttachment>,
}

pub struct RenderPipeline<'a> {
    resolver: AssetResolver<'a>,
    builder: FragmentBuilder<'a>,
    tokens: Option<&'a dyn TokenResolver>,
}

impl<'a> RenderPipeline<'a> {
    pub fn new(host: Collaborators<'a>) -> Self {
        Self {
            resolver: AssetResolver::new(host.files, host.styles),
            builder: FragmentBuilder::new(host.urls),
            tokens: host.tokens,
        }
    }

    pub fn render(
        &self,
        entities: &[AssetReference],
        spec: &StyleSpec,
        context: Option<&RenderContext>,
        variant: FormatterVariant,
    ) -> Vec<StyleFragment> {
        self.render_report(entities, spec, context, variant).fragments
    }

    /// Render and keep track of what was filtered or skipped.
    pub fn render_report(
        &self,
        entities: &[AssetReference],
        spec: &StyleSpec,
        context: Option<&RenderContext>,
        variant: FormatterVariant,
    ) -> RenderReport {
        let mut report = RenderReport::default();

        let (images, others): (Vec<&AssetReference>, Vec<&AssetReference>) =
            entities.iter().partition(|e| variant.is_image(e));
        report.filtered = others.into_iter().map(|e| e.id().clone()).collect();

        if images.is_empty() {
            report.empty_reason = Some(RenderError::NoApplicableEntities);
            return report;
        }

        let selector = interpolate(&spec.selector_template, context, self.tokens);
        if selector.trim().is_empty() {
            tracing::warn!(
                template = %spec.selector_template,
                variant = %variant,
                "selector is empty, no background rules emitted"
            );
            let reason = RenderError::from(FragmentError::EmptySelector);
            report.skipped = images
                .iter()
                .map(|e| Skipped {
                    entity: e.id().clone(),
                    reason: reason.clone(),
                })
                .collect();
            report.empty_reason = Some(reason);
            return report;
        }

        match spec.mode {
            RenderMode::PerEntity => {
                for entity in images {
                    match self.render_entity(entity, &selector, &spec.style_name) {
                        Ok(fragment) => report.fragments.push(fragment),
                        Err(reason) => report.skip(entity, reason),
                    }
                }
            }
            RenderMode::Combined => {
                let mut urls = Vec::new();
                let mut first = None;
                for entity in images {
                    match self.resolver.resolve(entity, &spec.style_name) {
                        Ok(url) => {
                            first.get_or_insert_with(|| entity.id().clone());
                            urls.push(url);
                        }
                        Err(err) => report.skip(entity, err.into()),
                    }
                }
                if !urls.is_empty() {
                    match self.builder.build(&selector, &urls, first.as_ref()) {
                        Ok(fragment) => {
                            tracing::debug!(
                                key = %fragment.fragment_key,
                                layers = urls.len(),
                                "combined background rule"
                            );
                            report.fragments.push(fragment);
                        }
                        Err(err) => report.empty_reason = Some(err.into()),
                    }
                }
            }
        }

        report
    }

    fn render_entity(
        &self,
        entity: &AssetReference,
        selector: &str,
        style_name: &str,
    ) -> Result<StyleFragment, RenderError> {
        let url = self.resolver.resolve(entity, style_name)?;
        let fragment = self
            .builder
            .build(selector, std::slice::from_ref(&url), Some(entity.id()))?;
        tracing::debug!(entity = %entity.id(), key = %fragment.fragment_key, "background rule");
        Ok(fragment)
    }

    /// Full field view: empty markup plus head attachments.
    pub fn view(
        &self,
        entities: &[AssetReference],
        spec: &StyleSpec,
        context: Option<&RenderContext>,
        variant: FormatterVariant,
    ) -> FieldView {
        let report = self.render_report(entities, spec, context, variant);
        FieldView {
            markup: html! {},
            attachments: report.attachments(),
        }
    }
}
