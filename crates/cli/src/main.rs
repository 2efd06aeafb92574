//! Shopify catalog CLI - export, convert, translate and register products.
//!
//! # Usage
//!
//! ```bash
//! # Export every product (raw JSON + annotated JSON/CSV/XLSX)
//! catalog all
//!
//! # Export one product, a tag or a collection
//! catalog single --handle desk-lamp
//! catalog tag --name summer
//! catalog --no-xlsx collection --title "New Arrivals"
//!
//! # Convert an edited file to XLSX
//! catalog convert exports/products_with_lang_translated.json
//!
//! # Fill empty English columns with the AI translator
//! catalog translate --in exports/products_with_lang.json --concurrency 4
//!
//! # Register the English columns as Shopify translations
//! catalog register --in exports/products_with_lang_translated.json --verify
//! ```
//!
//! # Logging
//!
//! `RUST_LOG` overrides the default filter. Set `CATALOG_LOG_FORMAT=json`
//! for JSON lines.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{ArgGroup, Args, Parser, Subcommand};
use shopify_catalog::{AppError, ProductSelector};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::register::{RegisterArgs, RegisterSource};
use commands::translate::{BrandNormalize, TranslateArgs};

#[derive(Parser)]
#[command(name = "catalog")]
#[command(author, version, about = "Shopify catalog export and translation tools")]
struct Cli {
    /// Directory for exports (overrides `OUTPUT_DIR`)
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    /// Skip the CSV export
    #[arg(long, global = true)]
    no_csv: bool,

    /// Skip the XLSX export
    #[arg(long, global = true)]
    no_xlsx: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export every product
    All,
    /// Export one product
    Single {
        #[command(flatten)]
        target: SingleTarget,
    },
    /// Export the products carrying a tag
    Tag {
        /// Exact tag
        #[arg(long)]
        name: String,
    },
    /// Export the products of a collection
    Collection {
        #[command(flatten)]
        target: CollectionTarget,
    },
    /// Convert a JSON/CSV/XLSX record file to another format
    Convert {
        /// File to read
        input: PathBuf,
        /// File to write (default: input with .xlsx extension)
        output: Option<PathBuf>,
    },
    /// Register translated columns as Shopify translations
    #[command(group(ArgGroup::new("flag_values").args(["title", "desc"]).multiple(true)))]
    Register {
        #[command(flatten)]
        source: RegisterSourceArgs,

        /// Column holding the product id
        #[arg(long, default_value = "id")]
        id_col: String,

        /// Column with the translated title (default: `title_<locale>`)
        #[arg(long)]
        title_col: Option<String>,

        /// Column with the translated description (default: `descriptionHtml_<locale>`)
        #[arg(long)]
        desc_col: Option<String>,

        /// Column with the translated SEO title (default: `seoTitle_<locale>`)
        #[arg(long)]
        seo_title_col: Option<String>,

        /// Column with the translated SEO description (default: `seoDescription_<locale>`)
        #[arg(long)]
        seo_desc_col: Option<String>,

        /// Worksheet to read from a workbook (default: first sheet)
        #[arg(long)]
        sheet: Option<String>,

        /// Translated title (with `--id`)
        #[arg(long, requires = "id")]
        title: Option<String>,

        /// Translated description HTML (with `--id`)
        #[arg(long, requires = "id")]
        desc: Option<String>,

        /// Target locale (default: `TARGET_LANGUAGE`)
        #[arg(long)]
        locale: Option<String>,

        /// Write placeholder primary content when a field has none
        #[arg(long)]
        ensure_base: bool,

        /// Placeholder primary title
        #[arg(long)]
        base_title: Option<String>,

        /// Placeholder primary description
        #[arg(long)]
        base_desc: Option<String>,

        /// Read translations back after registering
        #[arg(long)]
        verify: bool,
    },
    /// Fill empty target-language columns with an AI translator
    Translate {
        /// File to translate
        #[arg(long = "in")]
        input: PathBuf,

        /// File to write (default: `<input stem>_translated.json`)
        #[arg(long = "out")]
        output: Option<PathBuf>,

        /// Completion model (overrides `OPENAI_MODEL`)
        #[arg(long)]
        model: Option<String>,

        /// Re-translate fields that already have a value
        #[arg(long)]
        force: bool,

        /// Completion cache file; pass an empty string to disable
        #[arg(long, default_value = shopify_catalog::services::DEFAULT_CACHE_PATH)]
        cache: String,

        /// Records translated at once
        #[arg(long, default_value_t = 1)]
        concurrency: usize,

        /// Remove `translate="no"` attributes from translated HTML
        #[arg(long)]
        strip_translate_no: bool,

        /// Brand-name normalisation after `Brand:`
        #[arg(long, value_enum, default_value_t = BrandNormalize::En)]
        brand_normalize: BrandNormalize,
    },
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct SingleTarget {
    /// Product handle
    #[arg(long)]
    handle: Option<String>,
    /// Product GID or numeric id
    #[arg(long)]
    id: Option<String>,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct CollectionTarget {
    /// Collection handle
    #[arg(long)]
    handle: Option<String>,
    /// Exact collection title
    #[arg(long)]
    title: Option<String>,
    /// Collection GID or numeric id
    #[arg(long)]
    id: Option<String>,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct RegisterSourceArgs {
    /// JSON/CSV/XLSX file with translated columns
    #[arg(long = "in")]
    input: Option<PathBuf>,
    /// Register a single product from flags (with `--title` and/or `--desc`)
    #[arg(long, requires = "flag_values")]
    id: Option<String>,
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        if let Some(hint) = e.hint() {
            tracing::info!("Hint: {hint}");
        }
        std::process::exit(1);
    }
}

fn init_tracing() {
    let _ = dotenvy::dotenv();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "shopify_catalog=info,catalog=info".into());
    let json = std::env::var("CATALOG_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let export = commands::fetch::ExportFlags {
        output_dir: cli.output_dir,
        csv: !cli.no_csv,
        xlsx: !cli.no_xlsx,
    };

    match cli.command {
        Commands::All => commands::fetch::run(ProductSelector::All, &export).await,
        Commands::Single { target } => {
            let target = match (target.handle, target.id) {
                (Some(handle), _) => ProductSelector::Handle(handle),
                (None, Some(id)) => ProductSelector::Id(id),
                (None, None) => return Err(missing("--handle or --id")),
            };
            commands::fetch::run(target, &export).await
        }
        Commands::Tag { name } => {
            commands::fetch::run(ProductSelector::Tag(name), &export).await
        }
        Commands::Collection { target } => {
            let target = match (target.handle, target.title, target.id) {
                (Some(handle), _, _) => ProductSelector::CollectionHandle(handle),
                (None, Some(title), _) => ProductSelector::CollectionTitle(title),
                (None, None, Some(id)) => ProductSelector::CollectionId(id),
                (None, None, None) => return Err(missing("--handle, --title or --id")),
            };
            commands::fetch::run(target, &export).await
        }
        Commands::Convert { input, output } => commands::convert::run(&input, output.as_deref()),
        Commands::Register {
            source,
            id_col,
            title_col,
            desc_col,
            seo_title_col,
            seo_desc_col,
            sheet,
            title,
            desc,
            locale,
            ensure_base,
            base_title,
            base_desc,
            verify,
        } => {
            let source = match (source.input, source.id) {
                (Some(path), _) => RegisterSource::File { path, sheet },
                (None, Some(id)) => RegisterSource::Flags { id, title, desc },
                (None, None) => return Err(missing("--in or --id")),
            };
            commands::register::run(RegisterArgs {
                source,
                id_col,
                title_col,
                desc_col,
                seo_title_col,
                seo_desc_col,
                locale,
                ensure_base,
                base_title,
                base_desc,
                verify,
            })
            .await
        }
        Commands::Translate {
            input,
            output,
            model,
            force,
            cache,
            concurrency,
            strip_translate_no,
            brand_normalize,
        } => {
            commands::translate::run(TranslateArgs {
                input,
                output,
                model,
                force,
                cache,
                concurrency,
                strip_translate_no,
                brand_normalize,
            })
            .await
        }
    }
}

fn missing(what: &str) -> AppError {
    AppError::InvalidArguments(format!("one of {what} is required"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_single_requires_exactly_one_target() {
        assert!(Cli::try_parse_from(["catalog", "single"]).is_err());
        assert!(
            Cli::try_parse_from(["catalog", "single", "--handle", "a", "--id", "1"]).is_err()
        );
        assert!(Cli::try_parse_from(["catalog", "single", "--handle", "a"]).is_ok());
    }

    #[test]
    fn test_global_export_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["catalog", "tag", "--name", "summer", "--no-xlsx"]);
        assert!(cli.is_ok_and(|c| c.no_xlsx && !c.no_csv));
    }

    #[test]
    fn test_register_title_needs_id() {
        assert!(
            Cli::try_parse_from(["catalog", "register", "--in", "a.json", "--title", "X"])
                .is_err()
        );
        assert!(
            Cli::try_parse_from(["catalog", "register", "--id", "1", "--title", "X"]).is_ok()
        );
    }

    #[test]
    fn test_register_id_needs_a_value() {
        assert!(Cli::try_parse_from(["catalog", "register", "--id", "1"]).is_err());
        assert!(
            Cli::try_parse_from(["catalog", "register", "--id", "1", "--desc", "<p>D</p>"]).is_ok()
        );
        assert!(
            Cli::try_parse_from([
                "catalog", "register", "--id", "1", "--title", "T", "--desc", "<p>D</p>"
            ])
            .is_ok()
        );
        assert!(Cli::try_parse_from(["catalog", "register", "--in", "a.json"]).is_ok());
    }

    #[test]
    fn test_translate_defaults() {
        let cli = Cli::try_parse_from(["catalog", "translate", "--in", "a.json"]);
        let Ok(Cli {
            command:
                Commands::Translate {
                    concurrency,
                    cache,
                    brand_normalize,
                    ..
                },
            ..
        }) = cli
        else {
            panic!("translate did not parse");
        };
        assert_eq!(concurrency, 1);
        assert_eq!(cache, ".translation_cache.json");
        assert_eq!(brand_normalize, BrandNormalize::En);
    }
}
