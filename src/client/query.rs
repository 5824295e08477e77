//! `search_query` rendering and request parameter assembly.
//!
//! The arXiv query grammar is a flat, left-to-right chain of clauses:
//!
//! ```text
//! code:term (AND|OR|ANDNOT) code:term ...
//! ```
//!
//! There is no parenthesization and no escaping. A term containing `:` or one of
//! the operator keywords is sent as-is and may change how arXiv parses the
//! query; only URL encoding is applied.

use std::collections::BTreeMap;
use url::Url;

use crate::models::{FieldPrefix, SearchOp, SearchOperator, SortBy, SortOrder};

/// One `[OP] code:term` unit of a query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    /// `None` for the first clause
    pub op: Option<SearchOp>,
    pub prefix: FieldPrefix,
    pub term: String,
}

/// Ordered boolean search expression
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryExpression {
    clauses: Vec<Clause>,
}

impl QueryExpression {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole expression with a single clause.
    pub fn start(&mut self, prefix: FieldPrefix, term: impl Into<String>) {
        self.clauses.clear();
        self.clauses.push(Clause {
            op: None,
            prefix,
            term: term.into(),
        });
    }

    /// Append `op prefix:term`.
    ///
    /// On an empty expression the operator is dropped and the clause becomes
    /// the first one.
    pub fn push(&mut self, op: SearchOp, prefix: FieldPrefix, term: impl Into<String>) {
        let op = if self.clauses.is_empty() {
            None
        } else {
            Some(op)
        };
        self.clauses.push(Clause {
            op,
            prefix,
            term: term.into(),
        });
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Render to the `search_query` mini-language
    pub fn render(&self) -> String {
        let mut out = String::new();
        for clause in &self.clauses {
            if let Some(op) = clause.op {
                out.push(' ');
                out.push_str(op.as_str());
                out.push(' ');
            }
            out.push_str(clause.prefix.code());
            out.push(':');
            out.push_str(&clause.term);
        }
        out
    }
}

/// Keyed query parameters for one API request.
///
/// `search_query` accumulates through [`QueryExpression`]; every other key is
/// overwritten on each set.
#[derive(Debug, Clone, Default)]
pub struct RequestParams {
    query: QueryExpression,
    values: BTreeMap<&'static str, String>,
}

impl RequestParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the first clause, then fold `ops` in order.
    pub fn search<I>(&mut self, prefix: FieldPrefix, term: impl Into<String>, ops: I)
    where
        I: IntoIterator<Item = SearchOperator>,
    {
        self.query.start(prefix, term);
        for op in ops {
            self.apply(op);
        }
    }

    pub fn apply(&mut self, op: SearchOperator) {
        match op {
            SearchOperator::And { prefix, term } => self.query.push(SearchOp::And, prefix, term),
            SearchOperator::Or { prefix, term } => self.query.push(SearchOp::Or, prefix, term),
            SearchOperator::AndNot { prefix, term } => {
                self.query.push(SearchOp::AndNot, prefix, term)
            }
            SearchOperator::SortBy(sort) => self.set_sort_by(sort),
            SearchOperator::SortOrder(order) => self.set_sort_order(order),
            SearchOperator::MaxResults(n) => self.set_max_results(n),
        }
    }

    pub fn set_sort_by(&mut self, sort: SortBy) {
        self.values.insert("sortBy", sort.as_str().to_string());
    }

    pub fn set_sort_order(&mut self, order: SortOrder) {
        self.values.insert("sortOrder", order.as_str().to_string());
    }

    pub fn set_max_results(&mut self, n: i64) {
        self.values.insert("max_results", n.to_string());
    }

    pub fn query(&self) -> &QueryExpression {
        &self.query
    }

    /// Look up a parameter's wire value
    pub fn get(&self, key: &str) -> Option<String> {
        if key == "search_query" {
            return (!self.query.is_empty()).then(|| self.query.render());
        }
        self.values.get(key).cloned()
    }

    /// Form-encode all parameters, keys in sorted order.
    pub fn encode(&self) -> String {
        let rendered = (!self.query.is_empty()).then(|| self.query.render());

        let mut pairs: Vec<(&str, &str)> = self
            .values
            .iter()
            .map(|(k, v)| (*k, v.as_str()))
            .collect();
        if let Some(q) = rendered.as_deref() {
            pairs.push(("search_query", q));
        }
        pairs.sort_by(|a, b| a.0.cmp(b.0));

        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish()
    }

    /// `base` with its query replaced by [`RequestParams::encode`]
    pub fn to_url(&self, base: &Url) -> Url {
        let mut url = base.clone();
        let encoded = self.encode();
        url.set_query((!encoded.is_empty()).then_some(encoded.as_str()));
        url
    }
}
