use std::{fmt, future::Future, str::FromStr, time::Duration};

use crate::{
    config::TranslationConfig,
    error::{Result, TldwError},
};

/// A language a summary can be delivered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetLanguage {
    pub name: &'static str,
    /// Code understood by the translation endpoint.
    pub code: &'static str,
}

const fn lang(name: &'static str, code: &'static str) -> TargetLanguage {
    TargetLanguage { name, code }
}

static LANGUAGES: [TargetLanguage; 68] = [
    lang("Amharic", "am"),
    lang("Arabic", "ar"),
    lang("Akan", "ak"),
    lang("Bengali", "bn"),
    lang("Bhojpuri", "bho"),
    lang("Bulgarian", "bg"),
    lang("Catalan", "ca"),
    lang("Chinese (Simplified)", "zh-CN"),
    lang("Croatian", "hr"),
    lang("Czech", "cs"),
    lang("Danish", "da"),
    lang("Dutch", "nl"),
    lang("English", "en"),
    lang("Estonian", "et"),
    lang("Filipino", "tl"),
    lang("Finnish", "fi"),
    lang("French", "fr"),
    lang("German", "de"),
    lang("Greek", "el"),
    lang("Gujarati", "gu"),
    lang("Hausa", "ha"),
    lang("Hebrew", "iw"),
    lang("Hindi", "hi"),
    lang("Hungarian", "hu"),
    lang("Icelandic", "is"),
    lang("Igbo", "ig"),
    lang("Indonesian", "id"),
    lang("Italian", "it"),
    lang("Japanese", "ja"),
    lang("Kannada", "kn"),
    lang("Kinyarwanda", "rw"),
    lang("Korean", "ko"),
    lang("Latvian", "lv"),
    lang("Lithuanian", "lt"),
    lang("Luo", "luo"),
    lang("Malay", "ms"),
    lang("Malayalam", "ml"),
    lang("Marathi", "mr"),
    lang("Nepali", "ne"),
    lang("Norwegian", "no"),
    lang("Odia", "or"),
    lang("Oromo", "om"),
    lang("Persian", "fa"),
    lang("Polish", "pl"),
    lang("Portuguese", "pt"),
    lang("Punjabi", "pa"),
    lang("Romanian", "ro"),
    lang("Russian", "ru"),
    lang("Slovak", "sk"),
    lang("Slovenian", "sl"),
    lang("Somali", "so"),
    lang("Spanish", "es"),
    lang("Swahili", "sw"),
    lang("Swedish", "sv"),
    lang("Tamil", "ta"),
    lang("Telugu", "te"),
    lang("Thai", "th"),
    lang("Tigrinya", "ti"),
    lang("Turkish", "tr"),
    lang("Twi", "ak"),
    lang("Ukrainian", "uk"),
    lang("Urdu", "ur"),
    lang("Vietnamese", "vi"),
    lang("Welsh", "cy"),
    lang("Wolof", "wo"),
    lang("Xhosa", "xh"),
    lang("Yoruba", "yo"),
    lang("Zulu", "zu"),
];

impl TargetLanguage {
    pub const ENGLISH: TargetLanguage = lang("English", "en");

    pub fn all() -> &'static [TargetLanguage] {
        &LANGUAGES
    }

    /// Look up a language by display name (case-insensitive) or code.
    pub fn parse(input: &str) -> Result<Self> {
        let needle = input.trim();
        LANGUAGES
            .iter()
            .find(|l| l.name.eq_ignore_ascii_case(needle))
            .or_else(|| LANGUAGES.iter().find(|l| l.code.eq_ignore_ascii_case(needle)))
            .copied()
            .ok_or_else(|| {
                TldwError::config(format!(
                    "unsupported language '{}' (run `tldw languages` for the list)",
                    needle
                ))
            })
    }

    /// Summaries are produced in English, so no translation is needed.
    pub fn is_english(&self) -> bool {
        self.code == Self::ENGLISH.code
    }
}

impl FromStr for TargetLanguage {
    type Err = TldwError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for TargetLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

pub trait Translator: Send + Sync {
    fn translate(
        &self,
        text: &str,
        target: &TargetLanguage,
    ) -> impl Future<Output = Result<String>> + Send;
}

/// Client for the public Google Translate `translate_a/single` endpoint.
pub struct GoogleTranslator {
    client: reqwest::Client,
    endpoint: String,
    max_chars_per_request: usize,
}

impl GoogleTranslator {
    pub fn new(endpoint: impl Into<String>, max_chars_per_request: usize) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            max_chars_per_request: max_chars_per_request.max(1),
        }
    }

    pub fn from_config(config: &TranslationConfig) -> Result<Self> {
        let mut translator = Self::new(&config.endpoint, config.max_chars_per_request);
        translator.client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(translator)
    }

    async fn translate_piece(&self, text: &str, code: &str) -> Result<String> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", "auto"),
                ("tl", code),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(TldwError::Api { status, message });
        }

        let body: serde_json::Value = response.json().await?;
        let sentences = body[0].as_array().ok_or_else(|| TldwError::InvalidResponse {
            reason: "translation response has no sentence list".to_string(),
        })?;
        Ok(sentences
            .iter()
            .filter_map(|sentence| sentence[0].as_str())
            .collect())
    }
}

impl Translator for GoogleTranslator {
    #[tracing::instrument(skip_all, fields(language = target.name, chars = text.len()))]
    async fn translate(&self, text: &str, target: &TargetLanguage) -> Result<String> {
        if target.is_english() || text.trim().is_empty() {
            return Ok(text.to_string());
        }

        let mut translated = String::with_capacity(text.len());
        for piece in split_for_requests(text, self.max_chars_per_request) {
            let body = piece.trim_end();
            if !body.trim().is_empty() {
                let result = self
                    .translate_piece(body, target.code)
                    .await
                    .map_err(|e| TldwError::Translation {
                        language: target.name.to_string(),
                        reason: e.to_string(),
                    })?;
                translated.push_str(&result);
            }
            translated.push_str(&piece[body.len()..]);
        }
        Ok(translated)
    }
}

/// Cut `text` into pieces of at most `max_chars` characters, preferring
/// paragraph, then sentence, then word boundaries. Joining the pieces gives
/// back `text`.
fn split_for_requests(text: &str, max_chars: usize) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut rest = text;

    while rest.chars().count() > max_chars {
        let limit = rest
            .char_indices()
            .nth(max_chars)
            .map_or(rest.len(), |(i, _)| i);
        let window = &rest[..limit];

        let cut = window
            .rfind("\n\n")
            .map(|i| i + 2)
            .or_else(|| {
                [". ", "! ", "? ", ".\n", "!\n", "?\n"]
                    .iter()
                    .filter_map(|end| window.rfind(end))
                    .max()
                    .map(|i| i + 2)
            })
            .or_else(|| {
                window
                    .char_indices()
                    .rev()
                    .find(|(_, c)| c.is_whitespace())
                    .map(|(i, c)| i + c.len_utf8())
            })
            .filter(|&cut| cut > 0)
            .unwrap_or(limit);

        pieces.push(&rest[..cut]);
        rest = &rest[cut..];
    }
    if !rest.is_empty() {
        pieces.push(rest);
    }

    pieces
}
