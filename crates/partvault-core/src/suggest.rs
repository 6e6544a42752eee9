use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use crate::name::PartName;
use crate::record::Record;
use crate::taxonomy::Taxonomy;

pub const DEFAULT_SUGGESTION_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionSource {
    Pattern,
    Similarity,
}

/// One candidate hierarchy placement for a part.
#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    pub category: String,
    pub subcategory: String,
    pub sub_subcategory: String,
    pub score: f32,
    pub source: SuggestionSource,
}

fn complete_triple(record: &Record) -> Option<(String, String, String)> {
    let (category, subcategory, sub_subcategory) = record.hierarchy();
    if category.is_empty() || subcategory.is_empty() || sub_subcategory.is_empty() {
        return None;
    }
    Some((
        category.to_string(),
        subcategory.to_string(),
        sub_subcategory.to_string(),
    ))
}

/// Most frequent hierarchy triple among records sharing the given name type.
/// Ties break toward the lexicographically smallest triple so the result is
/// stable across runs.
#[must_use]
pub fn pattern_for_type(records: &[Record], type_code: &str) -> Option<(String, String, String)> {
    let needle = type_code.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }

    let mut counts: HashMap<(String, String, String), usize> = HashMap::new();
    for record in records {
        if record.name().type_code.trim().to_lowercase() != needle {
            continue;
        }
        let Some(triple) = complete_triple(record) else {
            continue;
        };
        *counts.entry(triple).or_insert(0) += 1;
    }

    counts
        .into_iter()
        .max_by(|(a_triple, a_count), (b_triple, b_count)| {
            a_count.cmp(b_count).then_with(|| b_triple.cmp(a_triple))
        })
        .map(|(triple, _)| triple)
}

fn word_overlap(a: &str, b: &str) -> f32 {
    let a_words: HashSet<&str> = a.split_whitespace().collect();
    let b_words: HashSet<&str> = b.split_whitespace().collect();
    if a_words.is_empty() || b_words.is_empty() {
        return 0.0;
    }
    let intersection = a_words.intersection(&b_words).count();
    let union = a_words.union(&b_words).count();
    intersection as f32 / union as f32
}

/// Hierarchy triples of the records most similar to the queried name, by
/// word overlap of the full-text forms. Duplicate triples keep their best
/// score.
#[must_use]
pub fn similar(records: &[Record], name: &PartName, limit: usize) -> Vec<Suggestion> {
    let query = name.search_text();
    if query.is_empty() {
        return Vec::new();
    }

    let mut best: HashMap<(String, String, String), f32> = HashMap::new();
    for record in records {
        let Some(triple) = complete_triple(record) else {
            continue;
        };
        let score = word_overlap(&query, &record.name().search_text());
        if score <= 0.0 {
            continue;
        }
        let slot = best.entry(triple).or_insert(0.0);
        if score > *slot {
            *slot = score;
        }
    }

    let mut suggestions: Vec<Suggestion> = best
        .into_iter()
        .map(|((category, subcategory, sub_subcategory), score)| Suggestion {
            category,
            subcategory,
            sub_subcategory,
            score,
            source: SuggestionSource::Similarity,
        })
        .collect();
    suggestions.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| {
                (&a.category, &a.subcategory, &a.sub_subcategory).cmp(&(
                    &b.category,
                    &b.subcategory,
                    &b.sub_subcategory,
                ))
            })
    });
    suggestions.truncate(limit);
    suggestions
}

/// Combined suggestion list: the type-pattern match first, then similarity
/// candidates. When a taxonomy is loaded, candidates outside its leaf paths
/// are dropped.
#[must_use]
pub fn suggest(
    records: &[Record],
    taxonomy: Option<&Taxonomy>,
    name: &PartName,
    limit: usize,
) -> Vec<Suggestion> {
    let mut suggestions = Vec::new();

    if let Some((category, subcategory, sub_subcategory)) = pattern_for_type(records, &name.type_code)
    {
        suggestions.push(Suggestion {
            category,
            subcategory,
            sub_subcategory,
            score: 1.0,
            source: SuggestionSource::Pattern,
        });
    }

    for candidate in similar(records, name, limit) {
        let duplicate = suggestions.iter().any(|s| {
            s.category == candidate.category
                && s.subcategory == candidate.subcategory
                && s.sub_subcategory == candidate.sub_subcategory
        });
        if !duplicate {
            suggestions.push(candidate);
        }
    }

    if let Some(taxonomy) = taxonomy {
        if !taxonomy.is_empty() {
            suggestions
                .retain(|s| taxonomy.contains_path(&s.category, &s.subcategory, &s.sub_subcategory));
        }
    }

    suggestions.truncate(limit);
    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(full_name: &str, category: &str, subcategory: &str, sub: &str) -> Record {
        let mut record = Record::new(PartName::parse(full_name));
        record.set_hierarchy(category, subcategory, sub);
        record
    }

    fn dataset() -> Vec<Record> {
        vec![
            record("SCREW_S-1_hex", "Hardware", "Fasteners", "Screws"),
            record("SCREW_S-2_hex", "Hardware", "Fasteners", "Screws"),
            record("SCREW_S-3", "Chemicals", "Adhesives", "Glues"),
            record("WIRE_W-1_copper", "Electrical", "Cables", "Wires"),
            record("UNSORTED_U-1", "", "", ""),
        ]
    }

    #[test]
    fn pattern_picks_most_frequent_triple() {
        let triple = pattern_for_type(&dataset(), "screw").expect("no pattern");
        assert_eq!(
            triple,
            (
                "Hardware".to_string(),
                "Fasteners".to_string(),
                "Screws".to_string()
            )
        );
    }

    #[test]
    fn pattern_ignores_incomplete_triples_and_unknown_types() {
        assert!(pattern_for_type(&dataset(), "unsorted").is_none());
        assert!(pattern_for_type(&dataset(), "").is_none());
        assert!(pattern_for_type(&dataset(), "bracket").is_none());
    }

    #[test]
    fn similarity_ranks_by_word_overlap() {
        let suggestions = similar(
            &dataset(),
            &PartName::parse("SCREW_S-1_hex"),
            DEFAULT_SUGGESTION_LIMIT,
        );
        // Exact-text match wins outright; the weaker screw match surfaces its
        // own triple with a lower score; the wire shares no words at all.
        assert_eq!(suggestions.len(), 2);
        assert_eq!(suggestions[0].category, "Hardware");
        assert!((suggestions[0].score - 1.0).abs() < f32::EPSILON);
        assert_eq!(suggestions[1].category, "Chemicals");
        assert!(suggestions[1].score < suggestions[0].score);
        assert!(
            suggestions
                .iter()
                .all(|s| s.source == SuggestionSource::Similarity)
        );
    }

    #[test]
    fn taxonomy_filters_invalid_candidates() {
        let taxonomy: Taxonomy = serde_json::from_str(
            r#"[{"category": "Hardware", "subcategories": [
                {"name": "Fasteners", "sub_subcategories": [{"name": "Screws"}]}
            ]}]"#,
        )
        .expect("parse failed");

        let suggestions = suggest(
            &dataset(),
            Some(&taxonomy),
            &PartName::parse("SCREW_S-1_hex"),
            DEFAULT_SUGGESTION_LIMIT,
        );
        assert!(!suggestions.is_empty());
        assert!(
            suggestions
                .iter()
                .all(|s| s.category == "Hardware" && s.sub_subcategory == "Screws")
        );
        assert_eq!(suggestions[0].source, SuggestionSource::Pattern);
    }

    #[test]
    fn empty_name_yields_nothing() {
        assert!(
            suggest(
                &dataset(),
                None,
                &PartName::default(),
                DEFAULT_SUGGESTION_LIMIT
            )
            .is_empty()
        );
    }
}
