//! Clean-up of machine-translated HTML before it goes to the store.

use std::sync::LazyLock;

use regex::Regex;

/// Arabic brand spellings and their Latin names.
const BRAND_NAMES: &[(&str, &str)] = &[
    ("شاومي", "Xiaomi"),
    ("سامسونج", "Samsung"),
    ("ابل", "Apple"),
    ("أبل", "Apple"),
    ("هواوي", "Huawei"),
    ("انكر", "Anker"),
];

static FULL_TURN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b360\s*degrees?\b").expect("Invalid regex"));
static CELSIUS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(-?\d+)\s*degrees\s*Celsius").expect("Invalid regex"));
static GRAMS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d+)\s*grams?\b").expect("Invalid regex"));
static MILLIMETERS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d+)\s*millimeters?\b").expect("Invalid regex"));
static MM_SPACING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d)mm\b").expect("Invalid regex"));

static BRAND_RES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    BRAND_NAMES
        .iter()
        .map(|(arabic, latin)| {
            let re = Regex::new(&format!(r"(?i)Brand:\s*{}\b", regex::escape(arabic)))
                .expect("Invalid regex");
            (re, *latin)
        })
        .collect()
});

static META_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)<p[^>]*>\s*(?:<strong>)?\s*(?:Product name in (?:Arabic|English)|اسم المنتج بالعربي|اسم المنتج بالإنجليزي)\s*:[\s\S]*?</p>",
    )
    .expect("Invalid regex")
});
static BLANK_LINES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{2,}").expect("Invalid regex"));

static TRANSLATE_NO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\s*translate\s*=\s*"(?:no|false)""#).expect("Invalid regex")
});
static INTER_TAG_SPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r">\s+</").expect("Invalid regex"));

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("Invalid regex"));
static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Invalid regex"));

/// Which optional clean-ups run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostProcessOptions {
    /// Replace Arabic brand names after `Brand:` with Latin ones.
    pub normalize_brands: bool,
    /// Remove `translate="no"` attributes.
    pub strip_translate_no: bool,
}

impl Default for PostProcessOptions {
    fn default() -> Self {
        Self {
            normalize_brands: true,
            strip_translate_no: false,
        }
    }
}

/// Clean translated HTML for the storefront.
#[must_use]
pub fn postprocess_html(html: &str, options: PostProcessOptions) -> String {
    let mut html = normalize_units(html);
    if options.normalize_brands {
        html = normalize_brand_names(&html);
    }
    html = drop_meta_lines(&html);
    if options.strip_translate_no {
        html = TRANSLATE_NO_RE.replace_all(&html, "").into_owned();
    }
    INTER_TAG_SPACE_RE.replace_all(&html, "></").into_owned()
}

fn normalize_units(text: &str) -> String {
    let text = FULL_TURN_RE.replace_all(text, "360°");
    let text = CELSIUS_RE.replace_all(&text, "${1}°C");
    let text = GRAMS_RE.replace_all(&text, "${1} g");
    let text = MILLIMETERS_RE.replace_all(&text, "${1} mm");
    MM_SPACING_RE.replace_all(&text, "${1} mm").into_owned()
}

fn normalize_brand_names(html: &str) -> String {
    let mut html = html.to_string();
    for (re, latin) in BRAND_RES.iter() {
        html = re
            .replace_all(&html, regex::NoExpand(&format!("Brand: {latin}")))
            .into_owned();
    }
    for (arabic, latin) in BRAND_NAMES {
        html = html.replace(
            &format!("<strong>Brand:</strong> {arabic}"),
            &format!("<strong>Brand:</strong> {latin}"),
        );
    }
    html
}

fn drop_meta_lines(html: &str) -> String {
    let html = META_LINE_RE.replace_all(html, "");
    BLANK_LINES_RE.replace_all(&html, "\n").into_owned()
}

/// Visible text of an HTML fragment, whitespace collapsed.
#[must_use]
pub fn html_to_text(html: &str) -> String {
    let text = TAG_RE.replace_all(html, " ");
    collapse_whitespace(&text)
}

/// Runs of whitespace become one space; ends trimmed.
#[must_use]
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RE.replace_all(text, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_units_are_normalized() {
        assert_eq!(
            normalize_units("Rotates 360 degrees, works at -10 degrees Celsius"),
            "Rotates 360°, works at -10°C"
        );
        assert_eq!(normalize_units("Weighs 250 grams"), "Weighs 250 g");
        assert_eq!(normalize_units("78 millimeters wide"), "78 mm wide");
        assert_eq!(normalize_units("78mm wide"), "78 mm wide");
    }

    #[test]
    fn test_brand_names_become_latin() {
        let html = "<p>Brand: شاومي</p><p><strong>Brand:</strong> سامسونج</p>";
        assert_eq!(
            normalize_brand_names(html),
            "<p>Brand: Xiaomi</p><p><strong>Brand:</strong> Samsung</p>"
        );
    }

    #[test]
    fn test_brand_normalization_can_be_disabled() {
        let options = PostProcessOptions {
            normalize_brands: false,
            strip_translate_no: false,
        };
        assert_eq!(
            postprocess_html("<p>Brand: هواوي</p>", options),
            "<p>Brand: هواوي</p>"
        );
    }

    #[test]
    fn test_meta_paragraphs_are_dropped() {
        let html = "<p><strong>Product name in Arabic:</strong> مصباح</p>\n\n<p>Bright lamp</p>";
        assert_eq!(drop_meta_lines(html), "\n<p>Bright lamp</p>");
    }

    #[test]
    fn test_translate_no_and_inter_tag_space() {
        let options = PostProcessOptions {
            normalize_brands: true,
            strip_translate_no: true,
        };
        assert_eq!(
            postprocess_html("<p translate=\"no\">X100</p><ul>\n  </ul>", options),
            "<p>X100</p><ul></ul>"
        );
        assert_eq!(
            postprocess_html("<span translate=\"no\">X100</span>", PostProcessOptions::default()),
            "<span translate=\"no\">X100</span>"
        );
    }

    #[test]
    fn test_html_to_text() {
        assert_eq!(
            html_to_text("<p>ضوء <strong>ساطع</strong></p>\n<ul><li>أبيض</li></ul>"),
            "ضوء ساطع أبيض"
        );
    }
}
