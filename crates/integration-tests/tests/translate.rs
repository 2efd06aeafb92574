//! AI translation through the chat-completions client against a mock API.

#![allow(clippy::unwrap_used)]

use secrecy::SecretString;
use shopify_catalog::config::OpenAIConfig;
use shopify_catalog::formats;
use shopify_catalog::openai::OpenAIClient;
use shopify_catalog::services::{
    TranslateOptions, TranslationCache, Translator, default_output_path, translate_file,
};
use shopify_catalog_core::LanguagePair;
use shopify_catalog_integration_tests::MockOpenAI;

fn client(mock: &MockOpenAI) -> OpenAIClient {
    let config = OpenAIConfig {
        api_key: SecretString::from("sk-mock-4c1d9e".to_string()),
        model: "gpt-4o-mini".to_string(),
    };
    OpenAIClient::with_url(&config, mock.url()).unwrap()
}

#[tokio::test]
async fn test_translate_file_fills_targets_and_reports_failures() {
    let mock = MockOpenAI::start(&[
        ("مصباح مكتب", "Desk lamp"),
        ("<p>ضوء ساطع</p>", "<p>Bright light, 300 grams</p>"),
        ("طاولة", "Table"),
    ])
    .await;

    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("products_with_lang.json");
    std::fs::write(
        &input,
        r#"[
  {"id": "gid://shopify/Product/1", "title_ar": "مصباح مكتب", "title_en": "",
   "descriptionHtml_ar": "<p>ضوء ساطع</p>", "descriptionHtml_en": ""},
  {"id": "gid://shopify/Product/2", "title_ar": "كرسي غامض", "title_en": ""},
  {"id": "gid://shopify/Product/3", "title_ar": "طاولة", "title_en": "Edited table"}
]"#,
    )
    .unwrap();
    let output = default_output_path(&input);

    let translator = Translator::new(
        client(&mock),
        TranslationCache::load(dir.path().join("cache.json")),
        TranslateOptions::new(LanguagePair::new("ar", "en").unwrap()),
    );
    let report = translate_file(&translator, &input, &output).await.unwrap();

    assert_eq!(report.translated, 1);
    assert_eq!(report.unchanged, 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].row, 2);

    let records = formats::read_records(&output, None).unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].get_str("title_en"), Some("Desk lamp"));
    assert_eq!(
        records[0].get_str("descriptionHtml_en"),
        Some("<p>Bright light, 300 g</p>")
    );
    assert_eq!(records[1].get_str("title_en"), Some(""));
    assert_eq!(records[2].get_str("title_en"), Some("Edited table"));
    assert!(mock.prompts().iter().all(|p| !p.contains("طاولة")));
    assert!(dir.path().join("cache.json").exists());
}

#[tokio::test]
async fn test_cache_survives_between_runs() {
    let mock = MockOpenAI::start(&[("مصباح", "Lamp")]).await;
    let dir = tempfile::tempdir().unwrap();
    let cache_path = dir.path().join("cache.json");
    let input = dir.path().join("in.json");
    std::fs::write(&input, r#"[{"id": "1", "title_ar": "مصباح", "title_en": ""}]"#).unwrap();
    let languages = LanguagePair::new("ar", "en").unwrap();

    for run in 0..2 {
        let translator = Translator::new(
            client(&mock),
            TranslationCache::load(&cache_path),
            TranslateOptions::new(languages.clone()),
        );
        let output = dir.path().join(format!("out_{run}.json"));
        let report = translate_file(&translator, &input, &output).await.unwrap();
        assert_eq!(report.translated, 1);
    }

    assert_eq!(mock.prompts().len(), 1);
}
