//! Search request models: field prefixes, boolean combinators and sort options.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Searchable paper attribute, rendered as the `code:` part of a clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldPrefix {
    Title,
    Author,
    Abstract,
    Comment,
    JournalReference,
    SubjectCategory,
    ReportNumber,
    Id,
    AllOfTheAbove,
    /// Anything outside the catalog. Renders as `unk` instead of failing.
    Unrecognized,
}

impl FieldPrefix {
    /// Catalog entries in wire order.
    pub const ALL: [FieldPrefix; 9] = [
        FieldPrefix::Title,
        FieldPrefix::Author,
        FieldPrefix::Abstract,
        FieldPrefix::Comment,
        FieldPrefix::JournalReference,
        FieldPrefix::SubjectCategory,
        FieldPrefix::ReportNumber,
        FieldPrefix::Id,
        FieldPrefix::AllOfTheAbove,
    ];

    /// Wire code used in `search_query`
    pub fn code(self) -> &'static str {
        match self {
            FieldPrefix::Title => "ti",
            FieldPrefix::Author => "au",
            FieldPrefix::Abstract => "abs",
            FieldPrefix::Comment => "co",
            FieldPrefix::JournalReference => "jr",
            FieldPrefix::SubjectCategory => "cat",
            FieldPrefix::ReportNumber => "rn",
            FieldPrefix::Id => "id",
            FieldPrefix::AllOfTheAbove => "all",
            FieldPrefix::Unrecognized => "unk",
        }
    }

    /// Look up a prefix by its position in [`FieldPrefix::ALL`].
    pub fn from_index(index: usize) -> Self {
        Self::ALL
            .get(index)
            .copied()
            .unwrap_or(FieldPrefix::Unrecognized)
    }
}

impl From<&str> for FieldPrefix {
    /// Accepts either the wire code (`au`) or a long name (`author`,
    /// `journal-reference`). Unknown names map to [`FieldPrefix::Unrecognized`].
    fn from(value: &str) -> Self {
        let normalized: String = value
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .flat_map(char::to_lowercase)
            .collect();

        match normalized.as_str() {
            "ti" | "title" => FieldPrefix::Title,
            "au" | "author" => FieldPrefix::Author,
            "abs" | "abstract" => FieldPrefix::Abstract,
            "co" | "comment" => FieldPrefix::Comment,
            "jr" | "journal" | "journalref" | "journalreference" => FieldPrefix::JournalReference,
            "cat" | "category" | "subjectcategory" => FieldPrefix::SubjectCategory,
            "rn" | "report" | "reportnumber" => FieldPrefix::ReportNumber,
            "id" => FieldPrefix::Id,
            "all" | "alloftheabove" => FieldPrefix::AllOfTheAbove,
            _ => FieldPrefix::Unrecognized,
        }
    }
}

impl fmt::Display for FieldPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Boolean combinator joining two clauses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchOp {
    #[serde(rename = "AND")]
    And,
    #[serde(rename = "OR")]
    Or,
    #[serde(rename = "ANDNOT")]
    AndNot,
}

impl SearchOp {
    pub fn as_str(self) -> &'static str {
        match self {
            SearchOp::And => "AND",
            SearchOp::Or => "OR",
            SearchOp::AndNot => "ANDNOT",
        }
    }
}

impl fmt::Display for SearchOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort field accepted by the `sortBy` parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortBy {
    Relevance,
    LastUpdatedDate,
    SubmittedDate,
}

impl SortBy {
    pub fn as_str(self) -> &'static str {
        match self {
            SortBy::Relevance => "relevance",
            SortBy::LastUpdatedDate => "lastUpdatedDate",
            SortBy::SubmittedDate => "submittedDate",
        }
    }
}

/// Sort order accepted by the `sortOrder` parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Ascending => "ascending",
            SortOrder::Descending => "descending",
        }
    }
}

/// One modifier applied to a search after its first clause.
///
/// Operators are plain values; [`RequestParams::apply`](crate::client::RequestParams::apply)
/// folds them into the request in the order they are given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchOperator {
    And { prefix: FieldPrefix, term: String },
    Or { prefix: FieldPrefix, term: String },
    AndNot { prefix: FieldPrefix, term: String },
    SortBy(SortBy),
    SortOrder(SortOrder),
    MaxResults(i64),
}

/// Append `AND prefix:term`
pub fn with_and(prefix: FieldPrefix, term: impl Into<String>) -> SearchOperator {
    SearchOperator::And {
        prefix,
        term: term.into(),
    }
}

/// Append `OR prefix:term`
pub fn with_or(prefix: FieldPrefix, term: impl Into<String>) -> SearchOperator {
    SearchOperator::Or {
        prefix,
        term: term.into(),
    }
}

/// Append `ANDNOT prefix:term`
pub fn with_and_not(prefix: FieldPrefix, term: impl Into<String>) -> SearchOperator {
    SearchOperator::AndNot {
        prefix,
        term: term.into(),
    }
}

/// Set `sortBy`
pub fn with_sort_by(sort: SortBy) -> SearchOperator {
    SearchOperator::SortBy(sort)
}

/// Set `sortOrder`
pub fn with_sort_order(order: SortOrder) -> SearchOperator {
    SearchOperator::SortOrder(order)
}

/// Set `max_results`. The value is sent as-is, without range checks.
pub fn with_max_results(n: i64) -> SearchOperator {
    SearchOperator::MaxResults(n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_prefix_codes() {
        let expected = ["ti", "au", "abs", "co", "jr", "cat", "rn", "id", "all"];
        for (prefix, code) in FieldPrefix::ALL.iter().zip(expected) {
            assert_eq!(prefix.code(), code);
        }
    }

    #[test]
    fn test_unrecognized_prefix_falls_back_to_unk() {
        assert_eq!(FieldPrefix::Unrecognized.code(), "unk");
        assert_eq!(FieldPrefix::from_index(9).code(), "unk");
        assert_eq!(FieldPrefix::from_index(usize::MAX).code(), "unk");
        assert_eq!(FieldPrefix::from("submitted").code(), "unk");
        assert_eq!(FieldPrefix::from("").code(), "unk");
    }

    #[test]
    fn test_field_prefix_from_str() {
        assert_eq!(FieldPrefix::from("au"), FieldPrefix::Author);
        assert_eq!(FieldPrefix::from("Author"), FieldPrefix::Author);
        assert_eq!(
            FieldPrefix::from("journal-reference"),
            FieldPrefix::JournalReference
        );
        assert_eq!(
            FieldPrefix::from("subject_category"),
            FieldPrefix::SubjectCategory
        );
        assert_eq!(FieldPrefix::from(" CAT "), FieldPrefix::SubjectCategory);
        assert_eq!(FieldPrefix::from("all"), FieldPrefix::AllOfTheAbove);
    }

    #[test]
    fn test_from_index_follows_catalog_order() {
        assert_eq!(FieldPrefix::from_index(0), FieldPrefix::Title);
        assert_eq!(FieldPrefix::from_index(5), FieldPrefix::SubjectCategory);
        assert_eq!(FieldPrefix::from_index(8), FieldPrefix::AllOfTheAbove);
    }

    #[test]
    fn test_wire_strings() {
        assert_eq!(SearchOp::AndNot.to_string(), "ANDNOT");
        assert_eq!(SortBy::LastUpdatedDate.as_str(), "lastUpdatedDate");
        assert_eq!(SortBy::SubmittedDate.as_str(), "submittedDate");
        assert_eq!(SortOrder::Descending.as_str(), "descending");

        // serde names match the wire names so config files can use them directly
        assert_eq!(
            serde_json::to_string(&SortBy::SubmittedDate).unwrap(),
            "\"submittedDate\""
        );
        assert_eq!(
            serde_json::to_string(&SortOrder::Ascending).unwrap(),
            "\"ascending\""
        );
    }

    #[test]
    fn test_operator_constructors() {
        assert_eq!(
            with_and(FieldPrefix::Title, "QED"),
            SearchOperator::And {
                prefix: FieldPrefix::Title,
                term: "QED".to_string()
            }
        );
        assert_eq!(with_max_results(-1), SearchOperator::MaxResults(-1));
    }
}
