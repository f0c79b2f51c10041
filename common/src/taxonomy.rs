//! Keyword taxonomy
//!
//! Category → trigger phrase table used by the classifier. The table is plain
//! data: adding a category or a trigger is a configuration change, never a
//! change to the scoring code.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Label written for rows where no trigger scored.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// One category and its ordered trigger phrases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub triggers: Vec<String>,
}

impl Category {
    pub fn new(name: impl Into<String>, triggers: &[&str]) -> Self {
        Self {
            name: name.into(),
            triggers: triggers.iter().map(|t| t.to_string()).collect(),
        }
    }
}

/// Validated, immutable taxonomy.
///
/// Category order is significant: it is the tie-break order of the classifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Taxonomy {
    categories: Vec<Category>,
}

impl Taxonomy {
    /// Build a taxonomy, normalising triggers (trimmed, lower-cased) and
    /// dropping duplicates within a category (first occurrence wins).
    pub fn new(categories: Vec<Category>) -> Result<Self> {
        if categories.is_empty() {
            return Err(Error::InvalidTaxonomy("no categories defined".into()));
        }

        let mut seen_names = HashSet::new();
        let mut normalized = Vec::with_capacity(categories.len());

        for category in categories {
            let name = category.name.trim().to_string();
            if name.is_empty() {
                return Err(Error::InvalidTaxonomy("category name is empty".into()));
            }
            if name.eq_ignore_ascii_case(UNCATEGORIZED) {
                return Err(Error::InvalidTaxonomy(format!(
                    "'{}' is reserved for unmatched items",
                    UNCATEGORIZED
                )));
            }
            if !seen_names.insert(name.clone()) {
                return Err(Error::InvalidTaxonomy(format!(
                    "duplicate category '{}'",
                    name
                )));
            }

            let mut seen_triggers = HashSet::new();
            let mut triggers = Vec::with_capacity(category.triggers.len());
            for trigger in &category.triggers {
                let trigger = trigger.trim().to_lowercase();
                if trigger.is_empty() {
                    return Err(Error::InvalidTaxonomy(format!(
                        "category '{}' has an empty trigger",
                        name
                    )));
                }
                if seen_triggers.insert(trigger.clone()) {
                    triggers.push(trigger);
                } else {
                    log::debug!("duplicate trigger '{}' in '{}' ignored", trigger, name);
                }
            }

            if triggers.is_empty() {
                return Err(Error::InvalidTaxonomy(format!(
                    "category '{}' has no triggers",
                    name
                )));
            }

            normalized.push(Category { name, triggers });
        }

        Ok(Self {
            categories: normalized,
        })
    }

    /// Load from a JSON array of `{ "name": ..., "triggers": [...] }`.
    pub fn from_json(json: &str) -> Result<Self> {
        let categories: Vec<Category> = serde_json::from_str(json)?;
        Self::new(categories)
    }

    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.categories)?)
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|c| c.name.as_str())
    }

    pub fn triggers(&self, name: &str) -> Option<&[String]> {
        self.categories
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.triggers.as_slice())
    }

    /// Position of a category in tie-break order.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.categories.iter().position(|c| c.name == name)
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Built-in furniture taxonomy.
    pub fn reference() -> Self {
        let categories = vec![
            Category::new(
                "Loose Furniture",
                &[
                    "sofa", "couch", "bed", "table", "chair", "desk", "dresser", "wardrobe",
                    "bookshelf", "bookcase", "cabinet", "console", "armchair", "dining",
                    "chest", "bench", "tv stand", "entertainment", "sideboard", "credenza",
                    "armoire", "nightstand", "headboard", "footboard", "recliner", "loveseat",
                    "sectional", "ottoman", "coffee table", "end table", "accent table",
                    "futon", "daybed", "bunk bed", "display cabinet", "bar cart",
                    "filing cabinet", "office chair", "dining chair", "rocking chair",
                ],
            ),
            Category::new(
                "Outdoor Furniture",
                &[
                    "patio", "outdoor", "garden", "deck", "lawn", "sun lounger", "hammock",
                    "adironack", "porch", "bbq", "grill", "beach", "pool", "terrace",
                    "balcony", "outdoor sofa", "patio chair", "garden bench", "picnic",
                    "camping", "foldable", "weatherproof", "weather-resistant", "all-weather",
                    "rattan", "teak", "aluminum", "resin", "outdoor dining", "porch swing",
                    "deck chair", "chaise lounge", "outdoor cushion", "gazebo", "canopy",
                ],
            ),
            Category::new(
                "Artwork & Accessories",
                &[
                    "painting", "sculpture", "vase", "candle", "frame", "photo", "art",
                    "decor", "ornament", "figurine", "throw pillow", "blanket", "tray",
                    "clock", "mirror", "wall art", "print", "poster", "tapestry",
                    "wall sculpture", "bowl", "candle holder", "candlestick", "centerpiece",
                    "decoration", "accessory", "knick knack", "showpiece", "art piece",
                    "collectible", "memorabilia", "pottery", "ceramic", "glassware",
                    "photo frame", "picture frame", "wall clock", "mantel clock",
                ],
            ),
            Category::new(
                "Drapery",
                &[
                    "curtain", "drape", "blind", "shade", "valance", "rod", "window",
                    "drapery", "sheer", "blackout", "voile", "panel", "swag", "cornice",
                    "pelmet", "tieback", "holdback", "curtain rod", "track", "finial",
                    "window treatment", "roman shade", "roller blind", "venetian blind",
                    "vertical blind", "cellular shade", "pleated shade", "shutter",
                ],
            ),
            Category::new(
                "Rug",
                &[
                    "rug", "carpet", "runner", "doormat", "mat", "kilim", "persian",
                    "oriental", "area rug", "floor rug", "throw rug", "dhurrie", "braided",
                    "shag", "wool rug", "silk rug", "cotton rug", "jute", "sisal", "seagrass",
                    "bamboo", "needlefelt", "tufted", "woven", "hand-knotted", "machine made",
                    "round rug", "square rug", "rectangle rug", "oval rug",
                ],
            ),
            Category::new(
                "Lighting",
                &[
                    "lamp", "light", "chandelier", "sconce", "pendant", "fixture",
                    "floor lamp", "table lamp", "led", "bulb", "ceiling light", "wall light",
                    "track lighting", "spotlight", "floodlight", "downlight", "uplight",
                    "ambient light", "task light", "accent light", "desk lamp", "reading lamp",
                    "bedside lamp", "night light", "string light", "fairy light", "lantern",
                    "torchiere", "arc lamp", "banker lamp", "tiffany lamp", "crystal",
                    "light fixture", "lamp shade", "bulb holder",
                ],
            ),
        ];

        // The built-in table satisfies every validation rule.
        Self::new(categories).unwrap_or_else(|e| unreachable!("reference taxonomy: {}", e))
    }
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self::reference()
    }
}
