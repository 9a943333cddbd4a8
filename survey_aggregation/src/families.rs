// ********* Question family configuration **********

// The declared configuration tables for every question family of the
// survey. Column selection is static: a column takes part in an
// aggregation if and only if it is listed here, which is also how the
// free-text "other" columns of the raw export stay out of the numeric
// aggregations.
//
// The display labels are a presentation contract. They are consumed
// verbatim by the plotting front end, including the `<br>` line-break
// markup, and must not be normalized.

use crate::config::{AggregationErrors, Source};
use std::collections::HashSet;

/// A multi-select question family: one binary indicator column per option.
#[derive(Eq, PartialEq, Debug)]
pub struct MultiSelectFamily {
    pub name: &'static str,
    /// Display name of the option column in the output table.
    pub title: &'static str,
    /// Ordered (raw column, display label) pairs.
    pub options: &'static [(&'static str, &'static str)],
}

/// A Likert question family: one integer-coded column per question, all
/// sharing the same ordered response scale.
#[derive(Eq, PartialEq, Debug)]
pub struct LikertFamily {
    pub name: &'static str,
    /// Ordered (response code, category label) pairs, weakest to strongest.
    pub scale: &'static [(i64, &'static str)],
    /// Ordered (raw column, display label) pairs.
    pub questions: &'static [(&'static str, &'static str)],
}

/// A single-choice timeline field with a "not applicable" sentinel code.
#[derive(Eq, PartialEq, Debug)]
pub struct TimelineField {
    pub name: &'static str,
    pub column: &'static str,
    /// Respondents with this code are excluded from both the numerator and
    /// the denominator.
    pub not_applicable_code: i64,
    pub codes: &'static [(i64, &'static str)],
    /// Fixed output order of the categories (negative to positive). Not
    /// alphabetical, not code order.
    pub category_order: &'static [&'static str],
}

/// A ranked-choice question family: one column per ranked item, holding the
/// rank assigned by the respondent (1 = best).
#[derive(Eq, PartialEq, Debug)]
pub struct RankingFamily {
    /// Respondents with a non-null answer here count in the denominator.
    pub reference_column: &'static str,
    pub questions: &'static [(&'static str, &'static str)],
}

/// The sort key of the multi-select comparison table. Rows are always
/// ordered by this group's column, even when the caller only renders other
/// groups, so that chart row order is stable across filter toggles.
pub const COMPARISON_SORT_GROUP: Source = Source::FleetManagers;

pub const MULTI_SELECT_FAMILIES: &[MultiSelectFamily] = &[
    MultiSelectFamily {
        name: "turnover",
        title: "Priorities",
        options: &[
            ("turnover_priorities_1", "Cost savings"),
            ("turnover_priorities_2", "Vehicle reliability"),
            ("turnover_priorities_3", "Emissions reduction"),
            ("turnover_priorities_4", "Regulatory compliance"),
            ("turnover_priorities_5", "Operational efficiency"),
            ("turnover_priorities_6", "Driver comfort and satisfaction"),
            ("turnover_priorities_7", "Technology integration"),
            ("turnover_priorities_8", "Brand image"),
        ],
    },
    MultiSelectFamily {
        name: "financial",
        title: "Financial",
        options: &[
            ("turnover_financial_1", "Upfront vehicle acquisition"),
            ("turnover_financial_2", "Fuel and energy"),
            ("turnover_financial_3", "Maintenance and repairs"),
            ("turnover_financial_4", "Depreciation"),
            ("turnover_financial_5", "Insurance premiums"),
            ("turnover_financial_6", "Tax incentives"),
            ("turnover_financial_7", "Financing or leasing terms"),
            ("turnover_financial_8", "Lifecycle cost optimization"),
            ("turnover_financial_9", "Budget stability"),
        ],
    },
    MultiSelectFamily {
        name: "barriers",
        title: "Barriers",
        options: &[
            ("renewal_barriers_1", "Capital costs<br> for new vehicles"),
            ("renewal_barriers_2", "Limited availability of<br> suitable models"),
            (
                "renewal_barriers_3",
                "Operational disruptions<br> during the transition",
            ),
            ("renewal_barriers_4", "Uncertainty around future<br> regulations"),
            (
                "renewal_barriers_5",
                "Insufficient charging/fueling<br> infrastructure",
            ),
            (
                "renewal_barriers_6",
                "Limited internal capacity<br> for planning and implementation",
            ),
            (
                "renewal_barriers_7",
                "Lack of access to <br>financing or incentives",
            ),
            (
                "renewal_barriers_8",
                "Concerns about vehicle <br>performance or reliability",
            ),
            (
                "renewal_barriers_9",
                "Data or technology <br>integrations challenges",
            ),
            (
                "renewal_barriers_10",
                "Resistance to change <br>within the organization",
            ),
            ("renewal_barriers_11", "Other"),
        ],
    },
];

pub const LIKERT_FAMILIES: &[LikertFamily] = &[
    LikertFamily {
        name: "decision_tools",
        scale: &[(2, "Rarely or never"), (3, "Sometimes"), (4, "Often")],
        questions: &[
            ("decision_tools_cost", "Cost analysis tools"),
            (
                "decision_tools_maintenance",
                "Maintenance and <br> performance tracking",
            ),
            (
                "decision_tools_telematics",
                "Telematics or vehicle <br>usage data",
            ),
            (
                "decision_tools_emissions",
                "Emissions performance <br> or reduction target",
            ),
            (
                "decision_tools_regulations",
                "Regulatory compliance<br> assessment",
            ),
            (
                "decision_tools_consulting",
                "External consulting <br> or advisory services",
            ),
            ("decision_tools_AI", "A.I. tools"),
        ],
    },
    LikertFamily {
        name: "innovation",
        scale: &[(1, "Not likely"), (2, "Somewhat likely"), (3, "Very likely")],
        questions: &[
            ("innovation_ice", "Replacing older ICE <br>with newer ICE"),
            ("innovation_hybrid", "Transitioning to <br>hybrid vehicles"),
            ("innovation_bev", "Transitioning to BEV"),
            (
                "innovation_hydrogen",
                "Transitioning to hydrogen<br> fuel cell vehicles",
            ),
            (
                "innovation_telematic",
                "Adopting telematics, <br>smart fleet management tools",
            ),
            (
                "innovation_ai",
                "Adopting A.I. tools for <br>planning and operations",
            ),
            (
                "innovation_route",
                "Implementing route optimization<br> and logistics innovation",
            ),
        ],
    },
];

pub const TIMELINE_FIELDS: &[TimelineField] = &[
    TimelineField {
        name: "replace",
        column: "replace_pre2010",
        not_applicable_code: 5,
        codes: &[
            (1, "Yes, within <br>the next 3 years"),
            (2, "Yes, in more <br> than 3 years"),
            (3, "No"),
            (4, "Not sure"),
        ],
        category_order: &[
            "No",
            "Not sure",
            "Yes, in more <br> than 3 years",
            "Yes, within <br>the next 3 years",
        ],
    },
    TimelineField {
        name: "expand",
        column: "expand_fleet",
        not_applicable_code: 5,
        codes: &[
            (1, "Yes, within <br>the next 3 years"),
            (2, "Yes, in more <br> than 3 years"),
            (3, "No"),
            (4, "Not sure"),
        ],
        category_order: &[
            "No",
            "Not sure",
            "Yes, in more <br> than 3 years",
            "Yes, within <br>the next 3 years",
        ],
    },
];

// The raw export carries a trailing free-text column in this family
// (rank_support_*_TEXT). It is excluded by not being declared.
pub const RANK_SUPPORT: RankingFamily = RankingFamily {
    reference_column: "rank_support_financial",
    questions: &[
        ("rank_support_financial", "Financial"),
        ("rank_support_technical", "Technical"),
        ("rank_support_infrastructure", "Infrastructure"),
        ("rank_support_certifications", "Certifications"),
        ("rank_support_other", "Other"),
    ],
};

pub fn multi_select_family(name: &str) -> Option<&'static MultiSelectFamily> {
    MULTI_SELECT_FAMILIES.iter().find(|f| f.name == name)
}

pub fn likert_family(name: &str) -> Option<&'static LikertFamily> {
    LIKERT_FAMILIES.iter().find(|f| f.name == name)
}

pub fn timeline_field(name: &str) -> Option<&'static TimelineField> {
    TIMELINE_FIELDS.iter().find(|f| f.name == name)
}

/// Checks the declared family tables for internal consistency.
///
/// This is where a drift between the label maps and the underlying
/// codebook becomes detectable at configuration-load time instead of at
/// call time. Intended to run once at startup.
pub fn validate_families() -> Result<(), AggregationErrors> {
    for family in MULTI_SELECT_FAMILIES {
        check_unique_columns(family.name, family.options)?;
    }
    for family in LIKERT_FAMILIES {
        check_unique_columns(family.name, family.questions)?;
        if family.scale.is_empty() {
            return Err(AggregationErrors::InvalidConfiguration {
                reason: format!("family {} has an empty response scale", family.name),
            });
        }
        let mut codes: HashSet<i64> = HashSet::new();
        for (code, _) in family.scale {
            if !codes.insert(*code) {
                return Err(AggregationErrors::InvalidConfiguration {
                    reason: format!("family {} maps response code {} twice", family.name, code),
                });
            }
        }
    }
    for field in TIMELINE_FIELDS {
        let labels: HashSet<&str> = field.codes.iter().map(|(_, l)| *l).collect();
        for cat in field.category_order {
            if !labels.contains(cat) {
                return Err(AggregationErrors::InvalidConfiguration {
                    reason: format!(
                        "field {} orders unknown category {:?}",
                        field.name, cat
                    ),
                });
            }
        }
        if field.category_order.len() != field.codes.len() {
            return Err(AggregationErrors::InvalidConfiguration {
                reason: format!(
                    "field {} category order does not cover all codes",
                    field.name
                ),
            });
        }
    }
    check_unique_columns("rank_support", RANK_SUPPORT.questions)?;
    if !RANK_SUPPORT
        .questions
        .iter()
        .any(|(c, _)| *c == RANK_SUPPORT.reference_column)
    {
        return Err(AggregationErrors::InvalidConfiguration {
            reason: format!(
                "ranking reference column {} is not a declared question",
                RANK_SUPPORT.reference_column
            ),
        });
    }
    Ok(())
}

fn check_unique_columns(
    family: &str,
    columns: &[(&str, &str)],
) -> Result<(), AggregationErrors> {
    if columns.is_empty() {
        return Err(AggregationErrors::InvalidConfiguration {
            reason: format!("family {} declares no columns", family),
        });
    }
    let mut seen: HashSet<&str> = HashSet::new();
    for (column, _) in columns {
        if !seen.insert(column) {
            return Err(AggregationErrors::InvalidConfiguration {
                reason: format!("family {} declares column {} twice", family, column),
            });
        }
    }
    Ok(())
}
