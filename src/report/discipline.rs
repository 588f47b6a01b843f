//! Discipline resolution for sprint report issues.
//!
//! A discipline is resolved through an ordered fallback chain:
//!
//! 1. the resolver's cache, keyed by issue key;
//! 2. a bracketed tag in the issue title (`[Backend] Fix login`);
//! 3. the discipline custom field of the full issue, fetched remotely and
//!    used verbatim unless it is the empty string;
//! 4. the first component of that issue;
//! 5. [`OTHER_DISCIPLINE`].
//!
//! A failed remote fetch yields [`OTHER_DISCIPLINE`] without caching it, so
//! the next occurrence of the same key retries the fetch. Every other outcome
//! is cached, including an [`OTHER_DISCIPLINE`] reached after a successful
//! fetch that carried neither a field value nor a component.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::jira::IssueDetailsSource;

/// Label used when no discipline can be determined.
pub const OTHER_DISCIPLINE: &str = "Other";

/// Title tags recognised, in match order.
const TITLE_TAGS: [&str; 5] = ["Backend", "Web", "AutoQA", "Android", "iOS"];

/// Storage for resolved disciplines.
pub trait DisciplineCache: Send {
    /// Returns the cached discipline for `key`.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores the discipline for `key`.
    fn put(&mut self, key: &str, discipline: &str);
}

/// Unbounded in-memory cache. Entries are never evicted.
#[derive(Debug, Default)]
pub struct InMemoryDisciplineCache {
    entries: HashMap<String, String>,
}

impl InMemoryDisciplineCache {
    /// Number of cached keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been cached yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl DisciplineCache for InMemoryDisciplineCache {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn put(&mut self, key: &str, discipline: &str) {
        self.entries.insert(key.to_string(), discipline.to_string());
    }
}

/// Matches a bracketed title tag that starts with a discipline name.
///
/// Matching is case-insensitive and tolerates whitespace and a single
/// leading marker character inside the brackets: `[Backend]`, `[ web ]`,
/// `[*iOS app]`.
#[derive(Debug, Clone)]
pub struct TitleMatcher {
    label: String,
    pattern: Regex,
}

impl TitleMatcher {
    /// Builds a matcher for `label`.
    pub fn new(label: &str) -> Result<Self, regex::Error> {
        let pattern = Regex::new(&format!(
            r"(?i)\[\s*[^\]\s]?\s*{}[^\]]*\]",
            regex::escape(label)
        ))?;
        Ok(Self {
            label: label.to_string(),
            pattern,
        })
    }

    /// Discipline label returned on match.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Whether `title` carries this matcher's tag.
    pub fn is_match(&self, title: &str) -> bool {
        self.pattern.is_match(title)
    }
}

static DEFAULT_MATCHERS: LazyLock<Vec<TitleMatcher>> = LazyLock::new(|| {
    TITLE_TAGS
        .iter()
        .map(|label| TitleMatcher::new(label).unwrap())
        .collect()
});

/// Returns the first discipline whose tag appears in `title`.
///
/// Order is significant: for `[Backend][Web] Sync` the earlier matcher wins.
pub fn match_title<'a>(matchers: &'a [TitleMatcher], title: &str) -> Option<&'a str> {
    matchers
        .iter()
        .find(|m| m.is_match(title))
        .map(TitleMatcher::label)
}

/// Resolves and memoizes issue disciplines.
pub struct DisciplineResolver {
    source: Box<dyn IssueDetailsSource>,
    cache: Box<dyn DisciplineCache>,
    matchers: Vec<TitleMatcher>,
    remote_fetches: usize,
}

impl DisciplineResolver {
    /// Creates a resolver with an empty in-memory cache and the default
    /// title matchers.
    pub fn new(source: Box<dyn IssueDetailsSource>) -> Self {
        Self::with_cache(source, Box::<InMemoryDisciplineCache>::default())
    }

    /// Creates a resolver backed by the given cache.
    pub fn with_cache(
        source: Box<dyn IssueDetailsSource>,
        cache: Box<dyn DisciplineCache>,
    ) -> Self {
        Self {
            source,
            cache,
            matchers: DEFAULT_MATCHERS.clone(),
            remote_fetches: 0,
        }
    }

    /// Replaces the title matchers. Order is match order.
    #[must_use]
    pub fn with_matchers(mut self, matchers: Vec<TitleMatcher>) -> Self {
        self.matchers = matchers;
        self
    }

    /// Number of remote detail fetches performed so far.
    pub fn remote_fetches(&self) -> usize {
        self.remote_fetches
    }

    /// Returns the discipline for an issue. Never fails.
    pub async fn resolve(&mut self, key: &str, title: &str) -> String {
        if let Some(discipline) = self.cache.get(key) {
            debug!(issue_key = %key, discipline = %discipline, "Discipline found in cache");
            return discipline;
        }

        if let Some(label) = match_title(&self.matchers, title) {
            let label = label.to_string();
            debug!(issue_key = %key, discipline = %label, "Discipline matched from title");
            self.cache.put(key, &label);
            return label;
        }

        self.remote_fetches += 1;
        let details = match self.source.issue_details(key).await {
            Ok(details) => details,
            Err(e) => {
                warn!(
                    issue_key = %key,
                    error = %e,
                    "Failed to fetch issue details, using {OTHER_DISCIPLINE}"
                );
                return OTHER_DISCIPLINE.to_string();
            }
        };

        let discipline = details
            .discipline
            .filter(|d| !d.is_empty())
            .or_else(|| details.components.into_iter().next().map(|c| c.name))
            .unwrap_or_else(|| OTHER_DISCIPLINE.to_string());

        debug!(
            issue_key = %key,
            discipline = %discipline,
            "Discipline resolved from issue details"
        );
        self.cache.put(key, &discipline);
        discipline
    }
}
