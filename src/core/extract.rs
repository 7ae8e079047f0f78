//! Heuristic task extraction from the listings page.
//!
//! The page structure is not under our control, so extraction is driven by
//! ordered CSS selector guesses taken from `[extractor]` config. Swapping the
//! guesses for a site-specific ruleset never touches the poller.

use crate::config::ExtractorConfig;
use crate::core::task::{TaskRecord, resolve_link};
use crate::error::ConfigError;
use chrono::{DateTime, Utc};
use scraper::{ElementRef, Html, Selector};

#[derive(Debug, Clone)]
pub struct TaskExtractor {
    guesses: Vec<String>,
    candidates: String,
    title: String,
    description: String,
    link: String,
    category: String,
}

struct CompiledRules {
    candidates: Selector,
    title: Selector,
    description: Selector,
    link: Selector,
    category: Selector,
}

impl TaskExtractor {
    /// Build an extractor, rejecting selector lists that do not parse.
    pub fn new(config: &ExtractorConfig) -> Result<Self, ConfigError> {
        let extractor = Self {
            guesses: config.candidates.clone(),
            candidates: config.candidates.join(", "),
            title: config.title.join(", "),
            description: config.description.join(", "),
            link: config.link.join(", "),
            category: config.category.join(", "),
        };
        for guess in &extractor.guesses {
            parse_selector("candidates", guess)?;
        }
        extractor.compile()?;
        Ok(extractor)
    }

    fn compile(&self) -> Result<CompiledRules, ConfigError> {
        Ok(CompiledRules {
            candidates: parse_selector("candidates", &self.candidates)?,
            title: parse_selector("title", &self.title)?,
            description: parse_selector("description", &self.description)?,
            link: parse_selector("link", &self.link)?,
            category: parse_selector("category", &self.category)?,
        })
    }

    /// Pull every valid task out of `html`, in document order.
    ///
    /// Candidates without a title or a link are skipped.
    pub fn extract(&self, html: &str, base_url: &str) -> Vec<TaskRecord> {
        let rules = match self.compile() {
            Ok(rules) => rules,
            Err(e) => {
                tracing::error!(error = %e, "extractor rules no longer compile");
                return Vec::new();
            }
        };

        let document = Html::parse_document(html);
        let discovered_at = Utc::now();

        document
            .select(&rules.candidates)
            .filter(|candidate| !wraps_valid_candidate(*candidate, &rules))
            .filter_map(|candidate| build_record(candidate, &rules, base_url, discovered_at))
            .collect()
    }

    /// Number of elements each candidate selector matches, in config order.
    pub fn selector_coverage(&self, html: &str) -> Vec<(String, usize)> {
        let document = Html::parse_document(html);
        self.guesses
            .iter()
            .filter_map(|guess| {
                let selector = Selector::parse(guess).ok()?;
                Some((guess.clone(), document.select(&selector).count()))
            })
            .collect()
    }
}

fn build_record(
    candidate: ElementRef<'_>,
    rules: &CompiledRules,
    base_url: &str,
    discovered_at: DateTime<Utc>,
) -> Option<TaskRecord> {
    let title = first_text(candidate, &rules.title)?;
    let href = first_href(candidate, &rules.link)?;

    Some(TaskRecord {
        id: href.to_string(),
        title,
        description: first_text(candidate, &rules.description),
        link: resolve_link(href, base_url),
        category: first_text(candidate, &rules.category),
        discovered_at,
    })
}

/// Whether a nested candidate yields a record of its own. Such wrappers
/// (`<main class="task-list">`) are skipped so the items inside win.
fn wraps_valid_candidate(candidate: ElementRef<'_>, rules: &CompiledRules) -> bool {
    candidate
        .descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .any(|inner| {
            rules.candidates.matches(&inner)
                && first_text(inner, &rules.title).is_some()
                && first_href(inner, &rules.link).is_some()
        })
}

fn first_href<'a>(element: ElementRef<'a>, selector: &Selector) -> Option<&'a str> {
    element
        .select(selector)
        .next()
        .and_then(|anchor| anchor.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty())
}

fn parse_selector(rule: &'static str, selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector).map_err(|_| ConfigError::Selector {
        rule,
        selector: selector.to_string(),
    })
}

/// Whitespace-collapsed text of the first descendant matching `selector`.
fn first_text(element: ElementRef<'_>, selector: &Selector) -> Option<String> {
    let found = element.select(selector).next()?;
    let text = found.text().collect::<Vec<_>>().join(" ");
    let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}
