// ********* Input data structures ***********

use std::collections::HashMap;
use std::error::Error;
use std::fmt::Display;

/// The respondent groups compared throughout the survey.
///
/// This is a closed set: the source data never contains anything else for
/// included respondents.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum Source {
    FleetManagers,
    OwnerOperators,
    Other,
}

impl Source {
    /// All the groups, in the fixed presentation order.
    pub const ALL: [Source; 3] = [Source::FleetManagers, Source::OwnerOperators, Source::Other];

    /// The display label, as it appears in the source data and in the charts.
    pub fn label(&self) -> &'static str {
        match self {
            Source::FleetManagers => "Fleet managers",
            Source::OwnerOperators => "Owner-Operators",
            Source::Other => "Other",
        }
    }

    pub fn from_label(s: &str) -> Option<Source> {
        Source::ALL.iter().find(|src| src.label() == s).copied()
    }
}

/// A group selection for the aggregators that accept "All" in addition to a
/// specific group.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum SourceFilter {
    All,
    Only(Source),
}

impl SourceFilter {
    pub fn matches(&self, source: Source) -> bool {
        match self {
            SourceFilter::All => true,
            SourceFilter::Only(s) => *s == source,
        }
    }

    pub fn from_label(s: &str) -> Option<SourceFilter> {
        if s == "All" {
            Some(SourceFilter::All)
        } else {
            Source::from_label(s).map(SourceFilter::Only)
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SourceFilter::All => "All",
            SourceFilter::Only(s) => s.label(),
        }
    }
}

/// One survey participant, as held by the response store.
///
/// Answers are integer response codes keyed by raw column name. A missing
/// key is a null answer. No interpretation happens at this level: indicator
/// flags, Likert codes, categorical codes and ranks all live in the same
/// map and only acquire meaning through the family configuration.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Respondent {
    pub id: String,
    pub source: Source,
    pub answers: HashMap<String, i64>,
}

// ******** Output data structures *********

/// One option row of a multi-select comparison table.
#[derive(PartialEq, Debug, Clone)]
pub struct ComparisonRow {
    pub option: String,
    /// One cell per group, co-indexed with `ComparisonTable::groups`.
    /// `None` when the group has no respondents.
    pub percentages: Vec<Option<f64>>,
}

/// Percentage of respondents per group who selected each option of a
/// multi-select question family.
#[derive(PartialEq, Debug, Clone)]
pub struct ComparisonTable {
    /// The display name of the option column, e.g. "Priorities".
    pub title: String,
    pub groups: Vec<String>,
    pub rows: Vec<ComparisonRow>,
}

/// Percentage distribution of one group's answers over the response
/// categories of a Likert family, one row per question.
///
/// The three fields are co-indexed for direct charting: `matrix[i][j]` is
/// the percentage of `question_labels[i]` answers falling in
/// `category_labels[j]`. A row is all-`None` when the group gave no
/// mappable answer to that question.
#[derive(PartialEq, Debug, Clone)]
pub struct LikertDistribution {
    pub matrix: Vec<Vec<Option<f64>>>,
    pub question_labels: Vec<String>,
    pub category_labels: Vec<String>,
}

/// Percentage distribution over the timeline categories, one row per group.
#[derive(PartialEq, Debug, Clone)]
pub struct TimelineDistribution {
    pub matrix: Vec<Vec<Option<f64>>>,
    pub group_labels: Vec<String>,
    pub category_labels: Vec<String>,
}

/// One ranking question with its top-choice tally.
#[derive(PartialEq, Debug, Clone)]
pub struct RankingRow {
    pub question: String,
    pub label: String,
    /// Number of rank-1 occurrences. Duplicate top ranks from a single
    /// respondent are all counted, matching the tolerant behavior of the
    /// survey export.
    pub count: u64,
    /// `None` when the denominator is zero.
    pub percentage: Option<f64>,
}

/// Share of respondents who ranked each support type as their #1 choice,
/// sorted descending by raw count.
#[derive(PartialEq, Debug, Clone)]
pub struct RankingTable {
    /// Respondents with a non-null answer on the reference column, after
    /// group filtering. Shared by every row.
    pub denominator: u64,
    pub rows: Vec<RankingRow>,
}

/// Errors surfaced to the caller by the aggregation layer.
///
/// Empty groups and unmapped response codes are not errors: they yield
/// null cells and warn-logged exclusions respectively.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum AggregationErrors {
    /// The caller passed a family or field name that is not declared.
    InvalidQuestion { name: String },
    /// A declared family table is malformed (duplicate or empty columns).
    InvalidConfiguration { reason: String },
}

impl Error for AggregationErrors {}

impl Display for AggregationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AggregationErrors::InvalidQuestion { name } => {
                write!(f, "unknown question family or field: {}", name)
            }
            AggregationErrors::InvalidConfiguration { reason } => {
                write!(f, "invalid family configuration: {}", reason)
            }
        }
    }
}
