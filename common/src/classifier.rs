//! Keyword-scoring classifier
//!
//! Each category is scored against the lower-cased item name:
//! - a trigger found on word boundaries adds [`BOUNDARY_POINTS`]
//! - otherwise a trigger found as a raw substring adds [`PARTIAL_POINTS`]
//!   (only in [`MatchMode::BoundaryAndPartial`])
//!
//! The highest-scoring category wins; ties go to the category listed first in
//! the taxonomy. Confidence is `min(max_score / 2, 1)`, so one boundary match
//! already saturates it.

use crate::error::Result;
use crate::table::CellValue;
use crate::taxonomy::{Taxonomy, UNCATEGORIZED};
use regex::Regex;
use serde::{Deserialize, Serialize, Serializer};

pub const BOUNDARY_POINTS: u32 = 2;
pub const PARTIAL_POINTS: u32 = 1;

/// Score equivalent to one full boundary match.
const FULL_MATCH_SCORE: f64 = 2.0;

/// Whether substring hits inside longer tokens count at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Boundary hits score 2, embedded substring hits score 1.
    #[default]
    BoundaryAndPartial,
    /// Only boundary hits score.
    BoundaryOnly,
}

/// Category assigned to one item.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CategoryLabel {
    Named(String),
    Uncategorized,
}

impl CategoryLabel {
    pub fn as_str(&self) -> &str {
        match self {
            CategoryLabel::Named(name) => name,
            CategoryLabel::Uncategorized => UNCATEGORIZED,
        }
    }

    pub fn is_uncategorized(&self) -> bool {
        matches!(self, CategoryLabel::Uncategorized)
    }
}

impl std::fmt::Display for CategoryLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for CategoryLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Category plus confidence in `[0.0, 1.0]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationResult {
    pub category: CategoryLabel,
    pub confidence: f64,
}

impl ClassificationResult {
    pub fn uncategorized() -> Self {
        Self {
            category: CategoryLabel::Uncategorized,
            confidence: 0.0,
        }
    }

    pub fn is_uncategorized(&self) -> bool {
        self.category.is_uncategorized()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Boundary,
    Partial,
}

impl MatchKind {
    pub fn points(self) -> u32 {
        match self {
            MatchKind::Boundary => BOUNDARY_POINTS,
            MatchKind::Partial => PARTIAL_POINTS,
        }
    }
}

/// One trigger that contributed to a category score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TriggerMatch {
    pub category: String,
    pub trigger: String,
    pub kind: MatchKind,
}

/// Full scoring trace for one text.
#[derive(Debug, Clone, Serialize)]
pub struct Explanation {
    /// Lower-cased, trimmed text that was scored.
    pub normalized: String,
    pub tokens: Vec<String>,
    /// Scores in taxonomy order.
    pub scores: Vec<(String, u32)>,
    pub matches: Vec<TriggerMatch>,
    pub result: ClassificationResult,
}

struct CompiledTrigger {
    phrase: String,
    boundary: Regex,
}

struct CompiledCategory {
    name: String,
    triggers: Vec<CompiledTrigger>,
}

/// Classifier bound to one taxonomy. Immutable and shareable across threads.
pub struct Classifier {
    taxonomy: Taxonomy,
    categories: Vec<CompiledCategory>,
    mode: MatchMode,
}

impl std::fmt::Debug for Classifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Classifier")
            .field("categories", &self.categories.len())
            .field("mode", &self.mode)
            .finish()
    }
}

impl Classifier {
    /// Compile one word-boundary pattern per trigger.
    pub fn new(taxonomy: Taxonomy, mode: MatchMode) -> Result<Self> {
        let mut categories = Vec::with_capacity(taxonomy.len());
        for category in taxonomy.categories() {
            let mut triggers = Vec::with_capacity(category.triggers.len());
            for phrase in &category.triggers {
                let boundary = Regex::new(&format!(r"\b{}\b", regex::escape(phrase)))?;
                triggers.push(CompiledTrigger {
                    phrase: phrase.clone(),
                    boundary,
                });
            }
            categories.push(CompiledCategory {
                name: category.name.clone(),
                triggers,
            });
        }

        log::debug!(
            "classifier ready: {} categories, {} triggers, {:?}",
            categories.len(),
            categories.iter().map(|c| c.triggers.len()).sum::<usize>(),
            mode
        );

        Ok(Self {
            taxonomy,
            categories,
            mode,
        })
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    /// Classify one item name. Missing or blank text is uncategorized.
    pub fn classify(&self, text: Option<&str>) -> ClassificationResult {
        let normalized = match text.map(normalize) {
            Some(n) if !n.is_empty() => n,
            _ => return ClassificationResult::uncategorized(),
        };

        let scores = self.category_scores(&normalized, None);
        self.decide(&scores)
    }

    /// Classify a spreadsheet cell; numbers and booleans are scored as text.
    pub fn classify_value(&self, value: &CellValue) -> ClassificationResult {
        let text = value.as_text();
        self.classify(text.as_deref())
    }

    /// Confidence of the best category, computed from the raw scores.
    pub fn confidence(&self, text: Option<&str>) -> f64 {
        let normalized = match text.map(normalize) {
            Some(n) if !n.is_empty() => n,
            _ => return 0.0,
        };
        let max = self
            .category_scores(&normalized, None)
            .into_iter()
            .max()
            .unwrap_or(0);
        confidence_for(max)
    }

    /// Raw per-category scores in taxonomy order.
    pub fn score(&self, text: &str) -> Vec<(String, u32)> {
        let normalized = normalize(text);
        self.category_scores(&normalized, None)
            .into_iter()
            .zip(&self.categories)
            .map(|(score, category)| (category.name.clone(), score))
            .collect()
    }

    pub fn explain(&self, text: &str) -> Explanation {
        let normalized = normalize(text);
        let mut matches = Vec::new();
        let raw = if normalized.is_empty() {
            vec![0; self.categories.len()]
        } else {
            self.category_scores(&normalized, Some(&mut matches))
        };
        let result = self.decide(&raw);

        Explanation {
            tokens: tokenize(&normalized),
            scores: self
                .categories
                .iter()
                .zip(raw)
                .map(|(category, score)| (category.name.clone(), score))
                .collect(),
            matches,
            result,
            normalized,
        }
    }

    fn category_scores(
        &self,
        normalized: &str,
        mut matches: Option<&mut Vec<TriggerMatch>>,
    ) -> Vec<u32> {
        self.categories
            .iter()
            .map(|category| {
                let mut score = 0;
                for trigger in &category.triggers {
                    let kind = if trigger.boundary.is_match(normalized) {
                        MatchKind::Boundary
                    } else if self.mode == MatchMode::BoundaryAndPartial
                        && normalized.contains(trigger.phrase.as_str())
                    {
                        MatchKind::Partial
                    } else {
                        continue;
                    };

                    score += kind.points();
                    if let Some(matches) = matches.as_mut() {
                        matches.push(TriggerMatch {
                            category: category.name.clone(),
                            trigger: trigger.phrase.clone(),
                            kind,
                        });
                    }
                }
                score
            })
            .collect()
    }

    /// First category (taxonomy order) holding the maximum score wins.
    fn decide(&self, scores: &[u32]) -> ClassificationResult {
        let mut best: Option<(usize, u32)> = None;
        for (idx, &score) in scores.iter().enumerate() {
            if best.map_or(true, |(_, max)| score > max) {
                best = Some((idx, score));
            }
        }

        match best {
            Some((idx, max)) if max > 0 => ClassificationResult {
                category: CategoryLabel::Named(self.categories[idx].name.clone()),
                confidence: confidence_for(max),
            },
            _ => ClassificationResult::uncategorized(),
        }
    }
}

fn confidence_for(max_score: u32) -> f64 {
    (max_score as f64 / FULL_MATCH_SCORE).min(1.0)
}

/// Lower-case and trim.
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Alphanumeric runs of the text.
pub fn tokenize(text: &str) -> Vec<String> {
    lazy_static::lazy_static! {
        static ref TOKEN_RE: Regex = Regex::new(r"\w+").unwrap();
    }

    TOKEN_RE
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}
