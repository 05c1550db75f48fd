use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::models::Intent;

static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9\s]").expect("valid normalizer regex"));

const BRAND_TOKENS: &[&str] = &["quickprompt", "askprompt"];
const AUTHOR_PHRASES: &[&str] = &["who developed", "who built", "who made"];
const SITE_PHRASES: &[&str] = &["this website", "this site", "this app", "this application"];
const SELF_PHRASES: &[&str] = &["tell me", "about", "who are you", "who r u"];

/// Lower-cases, blanks out everything but ascii letters, digits and whitespace,
/// then collapses whitespace. Output is idempotent under a second pass.
pub fn normalize_text(input: &str) -> String {
    let lower = input.to_lowercase();
    NON_WORD
        .replace_all(&lower, " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Literal keyword rules for "tell me about the product" questions.
///
/// Each rule is independent; a match on any of them is an about intent.
/// Paraphrases that avoid the exact phrases fall through to prompt help.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AboutRule {
    BrandQuestion,
    AuthorQuestion,
    SiteQuestion,
    SelfIntroduction,
}

impl AboutRule {
    pub const ALL: [AboutRule; 4] = [
        Self::BrandQuestion,
        Self::AuthorQuestion,
        Self::SiteQuestion,
        Self::SelfIntroduction,
    ];

    pub fn matches(self, q: &str) -> bool {
        match self {
            Self::BrandQuestion => {
                mentions_brand(q)
                    && (contains_any(q, &["what is", "about"]) || contains_any(q, AUTHOR_PHRASES))
            }
            Self::AuthorQuestion => {
                contains_any(q, AUTHOR_PHRASES) && (q.contains("this") || mentions_brand(q))
            }
            Self::SiteQuestion => {
                contains_any(q, SITE_PHRASES) && contains_any(q, &["about", "what is"])
            }
            Self::SelfIntroduction => contains_any(q, SELF_PHRASES) && q.contains("yourself"),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::BrandQuestion => "brand_question",
            Self::AuthorQuestion => "author_question",
            Self::SiteQuestion => "site_question",
            Self::SelfIntroduction => "self_introduction",
        }
    }
}

/// Expects text that already went through [`normalize_text`].
pub fn classify_about(normalized: &str) -> bool {
    matching_rule(normalized).is_some()
}

pub fn matching_rule(normalized: &str) -> Option<AboutRule> {
    AboutRule::ALL.into_iter().find(|rule| rule.matches(normalized))
}

pub fn classify_intent(raw: &str) -> Intent {
    if classify_about(&normalize_text(raw)) {
        Intent::About
    } else {
        Intent::PromptHelp
    }
}

fn mentions_brand(q: &str) -> bool {
    contains_any(q, BRAND_TOKENS)
}

fn contains_any(input: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| input.contains(needle))
}
