pub use crate::config::*;
use crate::ResponseStore;

use std::collections::HashMap;

/// A builder for assembling the response store.
///
/// The store is loaded once per session and never mutated afterwards:
/// the builder is consumed by [`Builder::build`].
///
/// ```
/// pub use survey_aggregation::{Builder, Source};
///
/// let mut builder = Builder::new();
/// builder.add_respondent(
///     "r1",
///     Source::FleetManagers,
///     &[("turnover_priorities_1", Some(1)), ("decision_tools_cost", None)],
/// );
/// let store = builder.build();
/// assert_eq!(store.len(), 1);
/// ```
#[derive(Default)]
pub struct Builder {
    pub(crate) _respondents: Vec<Respondent>,
}

impl Builder {
    pub fn new() -> Builder {
        Builder {
            _respondents: Vec::new(),
        }
    }

    /// Adds one respondent row. A `None` answer is a null and is simply not
    /// recorded.
    pub fn add_respondent(&mut self, id: &str, source: Source, answers: &[(&str, Option<i64>)]) {
        let filled: HashMap<String, i64> = answers
            .iter()
            .filter_map(|(column, value)| value.map(|v| (column.to_string(), v)))
            .collect();
        self._respondents.push(Respondent {
            id: id.to_string(),
            source,
            answers: filled,
        });
    }

    /// Adds an already-assembled respondent record.
    pub fn add_record(&mut self, respondent: Respondent) {
        self._respondents.push(respondent);
    }

    pub fn build(self) -> ResponseStore {
        ResponseStore::from_respondents(self._respondents)
    }
}
