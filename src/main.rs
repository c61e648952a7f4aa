use background_image_tools::{
    config,
    content::{self, FieldValue},
    formatter::{FormatterVariant, settings_summary},
    fragment::PageHead,
    host::{Collaborators, SiteUrlGenerator, StyleRegistry, TokenResolver},
    output,
    pipeline::RenderPipeline,
    tokens::BracketTokens,
    types::{RenderMode, StyleOverrides, StyleSpec},
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "background-image-tools")]
#[command(version, about = "Render image and media fields as CSS background images")]
#[command(long_about = "\
Render image and media fields as CSS background images

A content document describes the entity hosting a field, the field's items,
and the files and media they reference. Every image in the field becomes a
background-image rule on the configured selector:

  [field]
  name = \"field_hero\"
  field_type = \"entity_reference\"
  target_type = \"media\"
  items = [{ media = \"7\" }]

  #node-42 { background-image: url('/sites/default/files/styles/wide/a.png'); }

Settings are layered: config.toml [formatter] → [field.settings] → flags.
Only the keys actually written in a layer override the one below it.

Exits with status 2 when an image in the field could not be rendered.

Run 'background-image-tools gen-config' to generate a documented config.toml.")]
struct Cli {
    /// Directory containing config.toml
    #[arg(long, default_value = ".", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args)]
struct RenderArgs {
    /// Content document (TOML)
    content: PathBuf,

    /// Formatter variant (defaults to the first one applicable to the field)
    #[arg(long, value_enum)]
    variant: Option<FormatterVariant>,

    /// CSS selector, may contain tokens such as [node:nid]
    #[arg(long)]
    selector: Option<String>,

    /// Image style machine name
    #[arg(long)]
    image_style: Option<String>,

    /// One rule per image, or every image layered into a single rule
    #[arg(long, value_enum)]
    mode: Option<RenderMode>,

    /// Use selectors verbatim, as a host without token support would
    #[arg(long)]
    no_tokens: bool,

    /// Print head attachments as JSON
    #[arg(long, conflicts_with = "html")]
    json: bool,

    /// Print the <style> elements that would be added to the page head
    #[arg(long)]
    html: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Render a field from a content document
    Render(RenderArgs),
    /// List registered image styles
    Styles,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Render(args) => {
            let site_config = config::load_config(&cli.config)?;
            let status = render(&site_config, &args)?;
            return Ok(ExitCode::from(status));
        }
        Command::Styles => {
            let site_config = config::load_config(&cli.config)?;
            output::print_style_options(&site_config.style_catalog().style_options());
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Render one document and return the process exit status.
fn render(
    site_config: &config::SiteConfig,
    args: &RenderArgs,
) -> Result<u8, Box<dyn std::error::Error>> {
    let document = content::load_content(&args.content)?;
    let store = document.store()?;
    let styles = site_config.style_catalog();
    let urls = SiteUrlGenerator::from_settings(&site_config.site);
    let tokens = BracketTokens;

    let variant = pick_variant(&document.field, args.variant)?;
    let spec = effective_spec(&site_config.formatter, &document.field, args);
    let entities = store.field_references(&document.field.items);
    let context = document.context();

    let host = Collaborators {
        files: &store,
        styles: &styles,
        urls: &urls,
        tokens: (!args.no_tokens).then_some(&tokens as &dyn TokenResolver),
    };
    let pipeline = RenderPipeline::new(host);
    let report = pipeline.render_report(&entities, &spec, context.as_ref(), variant);

    let mut head = PageHead::new();
    head.attach_all(report.attachments());

    if args.json {
        println!("{}", serde_json::to_string_pretty(head.attachments())?);
    } else if args.html {
        println!("{}", head.to_markup().into_string());
    } else {
        let summary = settings_summary(&spec, &styles);
        output::print_render_output(&document.field.name, variant, &summary, &entities, &report);
    }

    let missing = output::unrendered(&entities, &report);
    if !missing.is_empty() {
        eprintln!(
            "warning: {} image(s) could not be rendered: {}",
            missing.len(),
            missing
                .iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }
    Ok(output::exit_status(&entities, &report))
}

/// Explicit variant if it applies to the field, otherwise the first
/// applicable one.
fn pick_variant(
    field: &FieldValue,
    requested: Option<FormatterVariant>,
) -> Result<FormatterVariant, String> {
    let definition = field.definition();
    match requested {
        Some(variant) if variant.is_applicable(&definition) => Ok(variant),
        Some(variant) => Err(format!(
            "{} does not apply to field {} ({} → {})",
            variant, field.name, definition.field_type, definition.target_type
        )),
        None => FormatterVariant::applicable_variants(&definition)
            .into_iter()
            .next()
            .ok_or_else(|| {
                format!(
                    "no background formatter applies to field {} ({} → {})",
                    field.name, definition.field_type, definition.target_type
                )
            }),
    }
}

/// Configured defaults, then the field's settings, then flags.
fn effective_spec(defaults: &StyleSpec, field: &FieldValue, args: &RenderArgs) -> StyleSpec {
    let flags = StyleOverrides {
        selector_template: args.selector.clone(),
        style_name: args.image_style.clone(),
        mode: args.mode,
    };
    match &field.settings {
        Some(settings) => defaults.with_overrides(settings).with_overrides(&flags),
        None => defaults.with_overrides(&flags),
    }
}
