//! Header column classification
//!
//! Each header name is matched once against a precedence-ordered rule table
//! (case-sensitive substrings). The resulting [`ColumnClassification`] is
//! immutable and shared by every row of a run.

use tracing::debug;

use crate::app::models::{ColumnTag, Family, Role};
use crate::config::ClassifierConfig;
use crate::constants::{family_keywords, role_keywords};

/// A family keyword and the role keywords recognised inside it, in precedence order
struct FamilyRule {
    keyword: &'static str,
    family: Family,
    roles: &'static [(&'static str, Role)],
}

const FAMILY_RULES: &[FamilyRule] = &[
    FamilyRule {
        keyword: family_keywords::INSTITUTION,
        family: Family::Institution,
        roles: &[
            (role_keywords::NAME, Role::Name),
            (role_keywords::CITY, Role::City),
            (role_keywords::STATE, Role::State),
            (role_keywords::ZIP, Role::Zip),
            (role_keywords::TYPE_1, Role::Type1),
            (role_keywords::TYPE_2, Role::Type2),
        ],
    },
    FamilyRule {
        keyword: family_keywords::PRESS,
        family: Family::Press,
        roles: &[
            (role_keywords::TEXT, Role::Text),
            (role_keywords::LINK, Role::Link),
        ],
    },
    FamilyRule {
        keyword: family_keywords::FOOTNOTE,
        family: Family::Footnote,
        roles: &[(role_keywords::TEXT, Role::Text)],
    },
];

/// Classifies header columns into plain, grouped and ignored columns
#[derive(Debug, Clone)]
pub struct FieldClassifier {
    identifier_column: String,
}

impl Default for FieldClassifier {
    fn default() -> Self {
        Self::new(&ClassifierConfig::default())
    }
}

impl FieldClassifier {
    pub fn new(config: &ClassifierConfig) -> Self {
        Self {
            identifier_column: config.identifier_column.clone(),
        }
    }

    /// Classify every column of a header
    pub fn classify(&self, header: &[String]) -> ColumnClassification {
        let tags: Vec<ColumnTag> = header
            .iter()
            .map(|name| self.classify_column(name))
            .collect();

        let classification = ColumnClassification {
            columns: header.to_vec(),
            tags,
        };
        debug!(
            "Classified {} columns: {} plain, {} ignored, {} institution, {} press, {} footnote",
            classification.len(),
            classification.plain_count(),
            classification.ignored_count(),
            classification.family_column_count(Family::Institution),
            classification.family_column_count(Family::Press),
            classification.family_column_count(Family::Footnote),
        );
        classification
    }

    /// Classify a single header name
    pub fn classify_column(&self, name: &str) -> ColumnTag {
        if let Some(rule) = FAMILY_RULES.iter().find(|rule| name.contains(rule.keyword)) {
            let role = rule
                .roles
                .iter()
                .find(|(keyword, _)| name.contains(keyword))
                .map(|&(_, role)| role)
                .unwrap_or(Role::Unrecognised);
            return ColumnTag::Grouped {
                family: rule.family,
                role,
            };
        }

        if name == self.identifier_column {
            ColumnTag::Ignore
        } else {
            ColumnTag::Plain
        }
    }
}

/// Immutable mapping from column index to [`ColumnTag`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnClassification {
    columns: Vec<String>,
    tags: Vec<ColumnTag>,
}

impl ColumnClassification {
    /// Tag of the column at `index`
    pub fn tag(&self, index: usize) -> Option<ColumnTag> {
        self.tags.get(index).copied()
    }

    /// Header name of the column at `index`
    pub fn column_name(&self, index: usize) -> Option<&str> {
        self.columns.get(index).map(String::as_str)
    }

    /// Header names in column order
    pub fn header(&self) -> &[String] {
        &self.columns
    }

    /// Columns as `(index, name, tag)` in header order
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str, ColumnTag)> {
        self.columns
            .iter()
            .zip(self.tags.iter())
            .enumerate()
            .map(|(index, (name, tag))| (index, name.as_str(), *tag))
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn plain_count(&self) -> usize {
        self.tags.iter().filter(|t| **t == ColumnTag::Plain).count()
    }

    pub fn ignored_count(&self) -> usize {
        self.tags.iter().filter(|t| **t == ColumnTag::Ignore).count()
    }

    /// Number of columns belonging to a family, including unrecognised roles
    pub fn family_column_count(&self, family: Family) -> usize {
        self.tags
            .iter()
            .filter(|t| matches!(t, ColumnTag::Grouped { family: f, .. } if *f == family))
            .count()
    }

    /// Whether any column is grouped
    pub fn has_grouped_columns(&self) -> bool {
        self.tags
            .iter()
            .any(|t| matches!(t, ColumnTag::Grouped { .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn grouped(family: Family, role: Role) -> ColumnTag {
        ColumnTag::Grouped { family, role }
    }

    #[test]
    fn test_institution_roles() {
        let classifier = FieldClassifier::default();
        let cases = [
            ("Inst1 Name", Role::Name),
            ("Inst1 City", Role::City),
            ("Inst1 State", Role::State),
            ("Inst1 Zip", Role::Zip),
            ("Inst1 Type 1", Role::Type1),
            ("Inst1 Type 2", Role::Type2),
            ("Inst1 Website", Role::Unrecognised),
        ];
        for (name, role) in cases {
            assert_eq!(
                classifier.classify_column(name),
                grouped(Family::Institution, role),
                "column {}",
                name
            );
        }
    }

    #[test]
    fn test_press_and_footnote_roles() {
        let classifier = FieldClassifier::default();
        assert_eq!(
            classifier.classify_column("Press1 Text"),
            grouped(Family::Press, Role::Text)
        );
        assert_eq!(
            classifier.classify_column("Press1 Link"),
            grouped(Family::Press, Role::Link)
        );
        assert_eq!(
            classifier.classify_column("Press Date"),
            grouped(Family::Press, Role::Unrecognised)
        );
        assert_eq!(
            classifier.classify_column("Footnotes 3 Text"),
            grouped(Family::Footnote, Role::Text)
        );
        // Singular "Footnote" is not a family keyword
        assert_eq!(classifier.classify_column("Footnote Text"), ColumnTag::Plain);
    }

    #[test]
    fn test_family_precedence() {
        let classifier = FieldClassifier::default();
        // "Inst" outranks "Press" and "Footnotes"
        assert_eq!(
            classifier.classify_column("Inst Press Text"),
            grouped(Family::Institution, Role::Unrecognised)
        );
        assert_eq!(
            classifier.classify_column("Press Footnotes Text"),
            grouped(Family::Press, Role::Text)
        );
        // "Name" outranks "City" inside the institution family
        assert_eq!(
            classifier.classify_column("Inst City Name"),
            grouped(Family::Institution, Role::Name)
        );
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        let classifier = FieldClassifier::default();
        assert_eq!(classifier.classify_column("inst1 name"), ColumnTag::Plain);
        assert_eq!(classifier.classify_column("press text"), ColumnTag::Plain);
        assert_eq!(classifier.classify_column("id"), ColumnTag::Plain);
    }

    #[test]
    fn test_identifier_requires_exact_match() {
        let classifier = FieldClassifier::default();
        assert_eq!(classifier.classify_column("ID"), ColumnTag::Ignore);
        assert_eq!(classifier.classify_column("ID "), ColumnTag::Plain);
        assert_eq!(classifier.classify_column("Grant ID"), ColumnTag::Plain);
    }

    #[test]
    fn test_custom_identifier_column() {
        let classifier = FieldClassifier::new(&ClassifierConfig {
            identifier_column: "Key".to_string(),
        });
        assert_eq!(classifier.classify_column("Key"), ColumnTag::Ignore);
        assert_eq!(classifier.classify_column("ID"), ColumnTag::Plain);
    }

    #[test]
    fn test_classification_counts_and_order() {
        let classifier = FieldClassifier::default();
        let classification = classifier.classify(&header(&[
            "ID",
            "Title",
            "Inst1 Name",
            "Inst1 City",
            "Press1 Text",
            "Footnotes Text",
            "Summary",
        ]));

        assert_eq!(classification.len(), 7);
        assert_eq!(classification.plain_count(), 2);
        assert_eq!(classification.ignored_count(), 1);
        assert_eq!(classification.family_column_count(Family::Institution), 2);
        assert_eq!(classification.family_column_count(Family::Press), 1);
        assert_eq!(classification.family_column_count(Family::Footnote), 1);
        assert!(classification.has_grouped_columns());

        assert_eq!(classification.tag(0), Some(ColumnTag::Ignore));
        assert_eq!(classification.column_name(6), Some("Summary"));
        assert_eq!(classification.tag(7), None);

        let names: Vec<_> = classification.iter().map(|(_, name, _)| name).collect();
        assert_eq!(names, classification.header());
    }

    #[test]
    fn test_classification_is_idempotent() {
        let classifier = FieldClassifier::default();
        let names = header(&["ID", "Title", "Inst1 Name", "Inst2 Name", "Press Link"]);

        assert_eq!(classifier.classify(&names), classifier.classify(&names));
    }

    #[test]
    fn test_duplicate_names_classified_per_index() {
        let classifier = FieldClassifier::default();
        let classification = classifier.classify(&header(&["Inst Name", "Inst Name", "Notes"]));

        assert_eq!(classification.tag(0), classification.tag(1));
        assert_eq!(classification.tag(2), Some(ColumnTag::Plain));
    }

    #[test]
    fn test_plain_only_header() {
        let classification = FieldClassifier::default().classify(&header(&["Title", "Year"]));
        assert!(!classification.has_grouped_columns());
        assert_eq!(classification.plain_count(), 2);
    }
}
