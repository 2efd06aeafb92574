//! AI translation (`translate`).
//!
//! # Environment Variables
//!
//! - `OPENAI_API_KEY` - `OpenAI` API key
//! - `OPENAI_MODEL` - Completion model (overridden by `--model`)
//! - `ORIGINAL_LANGUAGE`, `TARGET_LANGUAGE` - Translation direction

use std::path::PathBuf;

use clap::ValueEnum;
use shopify_catalog::AppError;
use shopify_catalog::config::{OpenAIConfig, languages_from_env};
use shopify_catalog::openai::OpenAIClient;
use shopify_catalog::services::{
    PostProcessOptions, TranslateOptions, TranslationCache, Translator, default_output_path,
    translate_file,
};

/// Brand-name handling in translated HTML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BrandNormalize {
    /// Replace known Arabic brand names with their Latin names.
    En,
    /// Leave brand names as translated.
    #[value(name = "none")]
    Keep,
}

pub struct TranslateArgs {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub model: Option<String>,
    pub force: bool,
    pub cache: String,
    pub concurrency: usize,
    pub strip_translate_no: bool,
    pub brand_normalize: BrandNormalize,
}

/// Translate the input file and fail if any record failed.
pub async fn run(args: TranslateArgs) -> Result<(), AppError> {
    let languages = languages_from_env()?;
    let mut config = OpenAIConfig::from_env()?;
    if let Some(model) = args.model {
        config.model = model;
    }
    let client = OpenAIClient::new(&config)?;

    let cache = if args.cache.is_empty() {
        TranslationCache::in_memory()
    } else {
        TranslationCache::load(&args.cache)
    };

    let mut options = TranslateOptions::new(languages);
    options.force = args.force;
    options.concurrency = args.concurrency;
    options.postprocess = PostProcessOptions {
        normalize_brands: args.brand_normalize == BrandNormalize::En,
        strip_translate_no: args.strip_translate_no,
    };

    let output = args
        .output
        .unwrap_or_else(|| default_output_path(&args.input));
    tracing::info!(
        input = %args.input.display(),
        output = %output.display(),
        model = %config.model,
        "Translating"
    );

    let translator = Translator::new(client, cache, options);
    let report = translate_file(&translator, &args.input, &output)
        .await?
        .into_result()?;
    tracing::info!(
        translated = report.translated,
        unchanged = report.unchanged,
        "Translation complete"
    );
    Ok(())
}
