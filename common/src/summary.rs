//! Run statistics shown after categorization.

use crate::batch::ProcessedTable;
use crate::classifier::CategoryLabel;
use crate::taxonomy::Taxonomy;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub categorized: usize,
    pub uncategorized: usize,
    /// Mean confidence over all rows (0.0 for an empty table).
    pub average_confidence: f64,
    /// Non-zero counts, largest first; ties in taxonomy order, `Uncategorized` last.
    pub distribution: Vec<CategoryCount>,
}

impl Summary {
    pub fn from_processed(processed: &ProcessedTable, taxonomy: &Taxonomy) -> Self {
        let total = processed.len();
        let uncategorized = processed.results().filter(|r| r.is_uncategorized()).count();
        let confidence_sum: f64 = processed.results().map(|r| r.confidence).sum();
        let average_confidence = if total == 0 {
            0.0
        } else {
            confidence_sum / total as f64
        };

        let mut distribution: Vec<(usize, CategoryCount)> = taxonomy
            .names()
            .enumerate()
            .map(|(order, name)| {
                let count = processed
                    .results()
                    .filter(|r| matches!(&r.category, CategoryLabel::Named(n) if n == name))
                    .count();
                (
                    order,
                    CategoryCount {
                        category: name.to_string(),
                        count,
                    },
                )
            })
            .filter(|(_, c)| c.count > 0)
            .collect();
        if uncategorized > 0 {
            distribution.push((
                usize::MAX,
                CategoryCount {
                    category: CategoryLabel::Uncategorized.to_string(),
                    count: uncategorized,
                },
            ));
        }
        distribution.sort_by(|(ao, a), (bo, b)| b.count.cmp(&a.count).then(ao.cmp(bo)));

        Self {
            total,
            categorized: total - uncategorized,
            uncategorized,
            average_confidence,
            distribution: distribution.into_iter().map(|(_, c)| c).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::process;
    use crate::classifier::{Classifier, MatchMode};
    use crate::table::{CellValue, Row, Table};

    fn table(names: &[&str]) -> Table {
        Table::new(
            vec!["Item".into()],
            names.iter().map(|n| Row::new(vec![CellValue::from(*n)])).collect(),
        )
    }

    #[test]
    fn test_summary_counts() {
        let taxonomy = Taxonomy::reference();
        let classifier = Classifier::new(taxonomy.clone(), MatchMode::default()).unwrap();
        let processed = process(
            &table(&["Jute Rug", "Wool Rug", "Floor Lamp", "Widget", "Gadget"]),
            "Item",
            &classifier,
        )
        .unwrap();

        let summary = Summary::from_processed(&processed, &taxonomy);
        assert_eq!(summary.total, 5);
        assert_eq!(summary.categorized, 3);
        assert_eq!(summary.uncategorized, 2);
        assert!((summary.average_confidence - 0.6).abs() < 1e-9);

        let order: Vec<(&str, usize)> = summary
            .distribution
            .iter()
            .map(|c| (c.category.as_str(), c.count))
            .collect();
        assert_eq!(
            order,
            vec![("Rug", 2), ("Uncategorized", 2), ("Lighting", 1)]
        );
    }

    #[test]
    fn test_summary_empty() {
        let taxonomy = Taxonomy::reference();
        let classifier = Classifier::new(taxonomy.clone(), MatchMode::default()).unwrap();
        let processed = process(&table(&[]), "Item", &classifier).unwrap();

        let summary = Summary::from_processed(&processed, &taxonomy);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.average_confidence, 0.0);
        assert!(summary.distribution.is_empty());
    }
}
