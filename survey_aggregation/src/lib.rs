mod builder;
mod config;
mod families;

use log::{debug, info, warn};

use std::cmp::Ordering;
use std::collections::HashMap;

pub use crate::builder::Builder;
pub use crate::config::*;
pub use crate::families::*;

/// The in-memory survey dataset: one row per respondent, loaded once per
/// session and read many times.
///
/// Every aggregator is a pure function of the store content and its call
/// parameters. Nothing here is mutated after construction, so calling an
/// aggregator twice with the same inputs yields identical output.
#[derive(PartialEq, Debug, Clone)]
pub struct ResponseStore {
    respondents: Vec<Respondent>,
}

impl ResponseStore {
    pub(crate) fn from_respondents(respondents: Vec<Respondent>) -> ResponseStore {
        ResponseStore { respondents }
    }

    pub fn len(&self) -> usize {
        self.respondents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.respondents.is_empty()
    }

    pub fn respondents(&self) -> &[Respondent] {
        &self.respondents
    }

    /// Group sizes of the unpartitioned table, in `Source::ALL` order.
    /// A respondent with all-null answers still counts here.
    fn group_sizes(&self) -> [u64; 3] {
        let mut sizes = [0u64; 3];
        for r in self.respondents.iter() {
            for (idx, source) in Source::ALL.iter().enumerate() {
                if r.source == *source {
                    sizes[idx] += 1;
                }
            }
        }
        sizes
    }
}

/// Percentage of respondents in each group who selected each option of the
/// given multi-select question family.
///
/// Denominators are the group sizes of the unpartitioned table: a
/// respondent who skipped the whole question still counts. Rows are sorted
/// ascending by the "Fleet managers" column value regardless of which
/// groups the caller renders; this keeps chart row order stable across
/// filter toggles. Groups with zero respondents get null cells, never a
/// division by zero.
pub fn scatter_comparison_data(
    store: &ResponseStore,
    question: &str,
) -> Result<ComparisonTable, AggregationErrors> {
    let family =
        families::multi_select_family(question).ok_or(AggregationErrors::InvalidQuestion {
            name: question.to_string(),
        })?;
    info!(
        "scatter_comparison_data: family {} over {} respondents",
        family.name,
        store.len()
    );

    let sizes = store.group_sizes();
    debug!("scatter_comparison_data: group sizes {:?}", sizes);

    let mut rows: Vec<ComparisonRow> = Vec::new();
    for (column, label) in family.options.iter() {
        let mut sums = [0i64; 3];
        for r in store.respondents().iter() {
            if let Some(v) = r.answers.get(*column) {
                for (idx, source) in Source::ALL.iter().enumerate() {
                    if r.source == *source {
                        // The indicator is nominally 0/1 but the export does
                        // not enforce it; sum whatever is there.
                        sums[idx] += *v;
                    }
                }
            }
        }
        let percentages: Vec<Option<f64>> = sums
            .iter()
            .zip(sizes.iter())
            .map(|(&sum, &size)| {
                if size == 0 {
                    None
                } else {
                    Some(100.0 * sum as f64 / size as f64)
                }
            })
            .collect();
        rows.push(ComparisonRow {
            option: label.to_string(),
            percentages,
        });
    }

    // Fixed sort key: the "Fleet managers" column, null cells last.
    let sort_idx = Source::ALL
        .iter()
        .position(|s| *s == families::COMPARISON_SORT_GROUP)
        .unwrap_or(0);
    rows.sort_by(|a, b| {
        cmp_cells(
            a.percentages.get(sort_idx).cloned().flatten(),
            b.percentages.get(sort_idx).cloned().flatten(),
        )
    });

    Ok(ComparisonTable {
        title: family.title.to_string(),
        groups: Source::ALL.iter().map(|s| s.label().to_string()).collect(),
        rows,
    })
}

/// Percentage distribution of one group's answers over the response
/// categories of the given Likert family.
///
/// Each question normalizes over its own non-null, mappable answer count,
/// so different questions may have different effective denominators.
/// Unmapped codes are excluded from the counts and logged: they indicate a
/// drift between the declared scale and the underlying codebook. Questions
/// with a zero denominator yield an all-null row. Rows are sorted ascending
/// by the value of the strongest affirmative category (last in the scale),
/// null rows last.
pub fn likert_data(
    store: &ResponseStore,
    question: &str,
    source: Source,
) -> Result<LikertDistribution, AggregationErrors> {
    let family = families::likert_family(question).ok_or(AggregationErrors::InvalidQuestion {
        name: question.to_string(),
    })?;
    info!(
        "likert_data: family {} group {} over {} respondents",
        family.name,
        source.label(),
        store.len()
    );

    let mut rows: Vec<(String, Vec<Option<f64>>)> = Vec::new();
    for (column, label) in family.questions.iter() {
        let mut counts: Vec<u64> = vec![0; family.scale.len()];
        for r in store.respondents().iter() {
            if r.source != source {
                continue;
            }
            if let Some(code) = r.answers.get(*column) {
                match family.scale.iter().position(|(c, _)| c == code) {
                    Some(idx) => counts[idx] += 1,
                    None => {
                        // Treated as missing data, not as an extra category.
                        warn!(
                            "likert_data: unmapped response code {} in column {}",
                            code, column
                        );
                    }
                }
            }
        }
        let total: u64 = counts.iter().sum();
        debug!(
            "likert_data: column {} counts {:?} total {}",
            column, counts, total
        );
        let row: Vec<Option<f64>> = if total == 0 {
            vec![None; family.scale.len()]
        } else {
            counts
                .iter()
                .map(|&c| Some(100.0 * c as f64 / total as f64))
                .collect()
        };
        rows.push((label.to_string(), row));
    }

    rows.sort_by(|a, b| {
        cmp_cells(
            a.1.last().cloned().flatten(),
            b.1.last().cloned().flatten(),
        )
    });

    let (question_labels, matrix): (Vec<String>, Vec<Vec<Option<f64>>>) =
        rows.into_iter().unzip();
    Ok(LikertDistribution {
        matrix,
        question_labels,
        category_labels: family.scale.iter().map(|(_, l)| l.to_string()).collect(),
    })
}

/// Percentage distribution of each group's answers over the fixed timeline
/// categories of the given field.
///
/// Respondents with the "not applicable" sentinel code are excluded before
/// the denominators are computed: they appear in neither the numerator nor
/// the denominator. A group with zero remaining respondents yields an
/// all-null row. The category order is a fixed presentation contract.
pub fn timeline_data(
    store: &ResponseStore,
    question: &str,
) -> Result<TimelineDistribution, AggregationErrors> {
    let field = families::timeline_field(question).ok_or(AggregationErrors::InvalidQuestion {
        name: question.to_string(),
    })?;
    info!(
        "timeline_data: field {} ({}) over {} respondents",
        field.name,
        field.column,
        store.len()
    );

    let mut matrix: Vec<Vec<Option<f64>>> = Vec::new();
    for source in Source::ALL.iter() {
        let mut counts: HashMap<&str, u64> = HashMap::new();
        let mut total: u64 = 0;
        for r in store.respondents().iter() {
            if r.source != *source {
                continue;
            }
            let code = match r.answers.get(field.column) {
                Some(code) => *code,
                None => continue,
            };
            if code == field.not_applicable_code {
                continue;
            }
            match field.codes.iter().find(|(c, _)| *c == code) {
                Some((_, label)) => {
                    *counts.entry(*label).or_insert(0) += 1;
                    total += 1;
                }
                None => {
                    warn!(
                        "timeline_data: unmapped response code {} in column {}",
                        code, field.column
                    );
                }
            }
        }
        debug!(
            "timeline_data: group {} counts {:?} total {}",
            source.label(),
            counts,
            total
        );
        let row: Vec<Option<f64>> = field
            .category_order
            .iter()
            .map(|label| {
                if total == 0 {
                    None
                } else {
                    let c = counts.get(label).cloned().unwrap_or(0);
                    Some(100.0 * c as f64 / total as f64)
                }
            })
            .collect();
        matrix.push(row);
    }

    Ok(TimelineDistribution {
        matrix,
        group_labels: Source::ALL.iter().map(|s| s.label().to_string()).collect(),
        category_labels: field
            .category_order
            .iter()
            .map(|l| l.to_string())
            .collect(),
    })
}

/// Share of respondents who ranked each support type as their #1 choice.
///
/// The denominator is the count of respondents with a non-null answer on
/// the reference column, after group filtering, and is shared by every
/// row. Every rank-1 occurrence is counted, without checking that a
/// respondent assigned rank 1 at most once: the survey export does not
/// enforce that invariant and deduplicating here would hide the data
/// issue. Rows are sorted descending by raw count, ties keeping the
/// declared question order.
pub fn ranking_data(store: &ResponseStore, filter: SourceFilter) -> RankingTable {
    let family = &families::RANK_SUPPORT;
    let denominator = store
        .respondents()
        .iter()
        .filter(|r| filter.matches(r.source) && r.answers.contains_key(family.reference_column))
        .count() as u64;
    info!(
        "ranking_data: filter {} denominator {}",
        filter.label(),
        denominator
    );

    let mut rows: Vec<RankingRow> = Vec::new();
    for (column, label) in family.questions.iter() {
        let count = store
            .respondents()
            .iter()
            .filter(|r| filter.matches(r.source) && r.answers.get(*column) == Some(&1))
            .count() as u64;
        let percentage = if denominator == 0 {
            None
        } else {
            Some(100.0 * count as f64 / denominator as f64)
        };
        rows.push(RankingRow {
            question: column.to_string(),
            label: label.to_string(),
            count,
            percentage,
        });
    }
    // Stable sort: equal counts keep the declared order.
    rows.sort_by(|a, b| b.count.cmp(&a.count));

    RankingTable { denominator, rows }
}

// Ascending comparison of percentage cells, null cells last.
fn cmp_cells(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
