use log::{debug, info, warn};

use snafu::{prelude::*, Snafu};
use survey_aggregation::*;

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::dashboard::config_reader::*;

pub mod config_reader;
pub mod io_common;
pub mod io_csv;
pub mod io_text;
pub mod io_xlsx;

#[derive(Debug, Snafu)]
pub enum DashboardError {
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display(""))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error opening file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading the CSV header row"))]
    CsvHeader { source: csv::Error },
    #[snafu(display("Error parsing CSV line {lineno}"))]
    CsvLineParse { source: csv::Error, lineno: usize },
    #[snafu(display("CSV line {lineno} is too short"))]
    CsvLineTooShort { lineno: usize },
    #[snafu(display("Missing required column {column}"))]
    MissingColumn { column: String },
    #[snafu(display("Unknown source label {label:?} at line {lineno}"))]
    UnknownSourceLabel { label: String, lineno: usize },
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display(""))]
    EmptyExcel {},
    #[snafu(display(""))]
    MissingParentDir {},
    #[snafu(display("Error writing the summary to {path}"))]
    WritingSummary {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display(""))]
    Aggregation { source: AggregationErrors },
    #[snafu(display("The computed summary differs from the reference summary"))]
    ReferenceMismatch {},

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type DashResult<T> = Result<T, DashboardError>;

/// A respondent row, as parsed by the readers.
/// This is before checking the source label against the closed group set.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ParsedRespondent {
    pub id: Option<String>,
    pub source_label: String,
    /// Integer-coded answers; cells that did not parse as codes are already
    /// dropped at this point.
    pub answers: Vec<(String, i64)>,
    pub lineno: usize,
}

/// Checks the parsed rows against the closed source set and assembles the
/// response store. An unknown source label is fatal: the survey export only
/// ever contains the three declared groups.
pub fn validate_respondents(parsed: &[ParsedRespondent]) -> DashResult<ResponseStore> {
    let mut builder = Builder::new();
    for pr in parsed.iter() {
        let source = Source::from_label(&pr.source_label).context(UnknownSourceLabelSnafu {
            label: pr.source_label.clone(),
            lineno: pr.lineno,
        })?;
        let answers: Vec<(&str, Option<i64>)> = pr
            .answers
            .iter()
            .map(|(c, v)| (c.as_str(), Some(*v)))
            .collect();
        let default_id = format!("respondent-{:08}", pr.lineno);
        builder.add_respondent(pr.id.as_deref().unwrap_or(&default_id), source, &answers);
    }
    Ok(builder.build())
}

fn read_survey_data(root_path: String, sfs: &FileSource) -> DashResult<Vec<ParsedRespondent>> {
    let p: PathBuf = [root_path, sfs.file_path.clone()].iter().collect();
    let p2 = p.as_path().display().to_string();
    info!("Attempting to read survey file {:?}", p2);
    match sfs.provider.as_str() {
        "csv" => io_csv::read_csv_respondents(p2, sfs),
        "xlsx" => io_xlsx::read_xlsx_respondents(p2, sfs),
        x => whatever!("Provider not implemented {:?}", x),
    }
}

/// The default view set: everything the dashboard pages render.
pub fn default_views() -> Vec<ViewSpec> {
    let mut views: Vec<ViewSpec> = Vec::new();
    for family in MULTI_SELECT_FAMILIES.iter() {
        views.push(ViewSpec {
            view_type: "comparison".to_string(),
            question: Some(family.name.to_string()),
            source: None,
        });
    }
    for family in LIKERT_FAMILIES.iter() {
        for source in Source::ALL.iter() {
            views.push(ViewSpec {
                view_type: "likert".to_string(),
                question: Some(family.name.to_string()),
                source: Some(source.label().to_string()),
            });
        }
    }
    for field in TIMELINE_FIELDS.iter() {
        views.push(ViewSpec {
            view_type: "timeline".to_string(),
            question: Some(field.name.to_string()),
            source: None,
        });
    }
    for label in ["All", "Fleet managers", "Owner-Operators", "Other"] {
        views.push(ViewSpec {
            view_type: "ranking".to_string(),
            question: None,
            source: Some(label.to_string()),
        });
    }
    views
}

fn comparison_to_json(question: &str, table: &ComparisonTable) -> JSValue {
    let rows: Vec<JSValue> = table
        .rows
        .iter()
        .map(|r| json!({"option": r.option, "percentages": r.percentages}))
        .collect();
    json!({
        "view": "comparison",
        "question": question,
        "title": table.title,
        "groups": table.groups,
        "rows": rows,
    })
}

fn likert_to_json(question: &str, source: Source, dist: &LikertDistribution) -> JSValue {
    json!({
        "view": "likert",
        "question": question,
        "source": source.label(),
        "questions": dist.question_labels,
        "categories": dist.category_labels,
        "matrix": dist.matrix,
    })
}

fn timeline_to_json(question: &str, dist: &TimelineDistribution) -> JSValue {
    json!({
        "view": "timeline",
        "question": question,
        "groups": dist.group_labels,
        "categories": dist.category_labels,
        "matrix": dist.matrix,
    })
}

fn ranking_to_json(filter: SourceFilter, table: &RankingTable) -> JSValue {
    let rows: Vec<JSValue> = table
        .rows
        .iter()
        .map(|r| {
            json!({
                "question": r.question,
                "label": r.label,
                "count": r.count,
                "percentage": r.percentage,
            })
        })
        .collect();
    json!({
        "view": "ranking",
        "source": filter.label(),
        "denominator": table.denominator,
        "rows": rows,
    })
}

/// Runs the requested views against the store, in order.
pub fn run_views(store: &ResponseStore, views: &[ViewSpec]) -> DashResult<Vec<JSValue>> {
    let mut res: Vec<JSValue> = Vec::new();
    for view in views.iter() {
        debug!("run_views: {:?}", view);
        let js = match view.view_type.as_str() {
            "comparison" => {
                let question = view
                    .question
                    .as_deref()
                    .whatever_context("comparison view requires a question family")?;
                let table =
                    scatter_comparison_data(store, question).context(AggregationSnafu {})?;
                comparison_to_json(question, &table)
            }
            "likert" => {
                let question = view
                    .question
                    .as_deref()
                    .whatever_context("likert view requires a question family")?;
                let source_label = view
                    .source
                    .as_deref()
                    .whatever_context("likert view requires a source group")?;
                let source = match Source::from_label(source_label) {
                    Some(s) => s,
                    None => whatever!("Unknown source group {:?}", source_label),
                };
                let dist = likert_data(store, question, source).context(AggregationSnafu {})?;
                likert_to_json(question, source, &dist)
            }
            "timeline" => {
                let question = view
                    .question
                    .as_deref()
                    .whatever_context("timeline view requires a field name")?;
                let dist = timeline_data(store, question).context(AggregationSnafu {})?;
                timeline_to_json(question, &dist)
            }
            "ranking" => {
                let source_label = view.source.as_deref().unwrap_or("All");
                let filter = match SourceFilter::from_label(source_label) {
                    Some(f) => f,
                    None => whatever!("Unknown source group {:?}", source_label),
                };
                let table = ranking_data(store, filter);
                ranking_to_json(filter, &table)
            }
            x => whatever!("Unknown view type {:?}", x),
        };
        res.push(js);
    }
    Ok(res)
}

fn build_summary_js(
    config: &DashboardConfig,
    respondents: u64,
    views: Vec<JSValue>,
    comments: Option<Vec<JSValue>>,
    keywords: Option<Vec<JSValue>>,
) -> JSValue {
    let c = OutputConfig {
        survey: config.output_settings.survey_name.clone(),
        date: config.output_settings.survey_date.clone(),
        respondents: Some(respondents),
    };
    let mut summary = json!({
        "config": c,
        "views": views,
    });
    if let Some(rows) = comments {
        summary["comments"] = JSValue::Array(rows);
    }
    if let Some(rows) = keywords {
        summary["keywords"] = JSValue::Array(rows);
    }
    summary
}

fn load_config(config_path: String) -> DashResult<(DashboardConfig, PathBuf)> {
    let config_p = Path::new(config_path.as_str());
    let config_str = fs::read_to_string(config_path.clone()).context(OpeningJsonSnafu {
        path: config_path.clone(),
    })?;
    let config: DashboardConfig =
        serde_json::from_str(&config_str).context(ParsingJsonSnafu {})?;
    info!("config: {:?}", config);
    let root_p = config_p.parent().context(MissingParentDirSnafu {})?;
    Ok((config, root_p.to_path_buf()))
}

pub fn run_dashboard(
    config_path: String,
    reference_path: Option<String>,
    out_path: Option<String>,
) -> DashResult<()> {
    let (config, root) = load_config(config_path)?;
    run_with_config(&config, root.as_path(), reference_path, out_path)
}

/// Runs a single survey file with the default configuration, for the case
/// where no configuration file is provided.
pub fn run_direct(
    input_path: String,
    input_type: Option<String>,
    excel_worksheet_name: Option<String>,
    reference_path: Option<String>,
    out_path: Option<String>,
) -> DashResult<()> {
    let p = Path::new(input_path.as_str());
    let root = p.parent().context(MissingParentDirSnafu {})?;
    let file_name = io_common::simplify_file_name(input_path.as_str());
    let config = DashboardConfig {
        output_settings: OutputSettings {
            survey_name: file_name.clone(),
            output_path: None,
            survey_date: None,
        },
        survey_file_sources: vec![FileSource {
            provider: input_type.unwrap_or_else(|| "csv".to_string()),
            file_path: file_name,
            id_column: None,
            source_column: None,
            excel_worksheet_name,
        }],
        comments_file_path: None,
        keywords_file_path: None,
        views: None,
    };
    run_with_config(&config, root, reference_path, out_path)
}

pub fn run_with_config(
    config: &DashboardConfig,
    root: &Path,
    reference_path: Option<String>,
    out_path: Option<String>,
) -> DashResult<()> {
    // A drift between the label maps and the codebook should fail here, at
    // startup, not at call time.
    validate_families().context(AggregationSnafu {})?;

    if config.survey_file_sources.is_empty() {
        whatever!("No survey file sources declared in the configuration");
    }

    let root_s = root.display().to_string();
    let mut parsed: Vec<ParsedRespondent> = Vec::new();
    for sfs in config.survey_file_sources.iter() {
        let mut rows = read_survey_data(root_s.clone(), sfs)?;
        parsed.append(&mut rows);
    }
    let store = validate_respondents(&parsed)?;
    info!("Loaded {} respondents", store.len());

    let views = match &config.views {
        Some(views) => views.clone(),
        None => default_views(),
    };
    let views_js = run_views(&store, &views)?;

    // The comment and keyword tables are not aggregated: they are passed
    // through for the presentation layer.
    let comments = match &config.comments_file_path {
        Some(p) => Some(io_text::read_table_json(join_path(&root_s, p))?),
        None => None,
    };
    let keywords = match &config.keywords_file_path {
        Some(p) => Some(io_text::read_table_json(join_path(&root_s, p))?),
        None => None,
    };

    let summary = build_summary_js(config, store.len() as u64, views_js, comments, keywords);
    let pretty = serde_json::to_string_pretty(&summary).context(ParsingJsonSnafu {})?;

    let out = out_path.or_else(|| config.output_settings.output_path.clone());
    match out.as_deref() {
        None | Some("stdout") => println!("{}", pretty),
        Some(path) => {
            info!("Writing the summary to {}", path);
            fs::write(path, &pretty).context(WritingSummarySnafu { path })?;
        }
    }

    // The reference summary, if provided for comparison
    if let Some(summary_p) = reference_path {
        let summary_ref = read_summary(summary_p)?;
        let pretty_ref =
            serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
        if pretty_ref != pretty {
            warn!("Found differences with the reference summary");
            print_diff(pretty_ref.as_str(), pretty.as_ref(), "\n");
            return ReferenceMismatchSnafu {}.fail();
        }
    }

    Ok(())
}

fn join_path(root: &str, rel: &str) -> String {
    let p: PathBuf = [root.to_string(), rel.to_string()].iter().collect();
    p.as_path().display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(id: &str, source: &str, answers: &[(&str, i64)]) -> ParsedRespondent {
        ParsedRespondent {
            id: Some(id.to_string()),
            source_label: source.to_string(),
            answers: answers
                .iter()
                .map(|(c, v)| (c.to_string(), *v))
                .collect(),
            lineno: 2,
        }
    }

    #[test]
    fn validate_respondents_accepts_known_labels() {
        let rows = vec![
            parsed("r1", "Fleet managers", &[("turnover_priorities_1", 1)]),
            parsed("r2", "Owner-Operators", &[]),
            parsed("r3", "Other", &[]),
        ];
        let store = validate_respondents(&rows).unwrap();
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn validate_respondents_rejects_unknown_label() {
        let rows = vec![parsed("r1", "Dispatchers", &[])];
        let res = validate_respondents(&rows);
        assert!(matches!(
            res,
            Err(DashboardError::UnknownSourceLabel { .. })
        ));
    }

    #[test]
    fn default_views_cover_all_families() {
        let views = default_views();
        // 3 comparison + 2x3 likert + 2 timeline + 4 ranking.
        assert_eq!(views.len(), 15);
    }

    #[test]
    fn run_views_produces_one_summary_per_view() {
        let rows = vec![
            parsed(
                "r1",
                "Fleet managers",
                &[
                    ("turnover_priorities_2", 1),
                    ("decision_tools_cost", 3),
                    ("replace_pre2010", 1),
                    ("rank_support_financial", 1),
                ],
            ),
            parsed("r2", "Owner-Operators", &[("expand_fleet", 3)]),
        ];
        let store = validate_respondents(&rows).unwrap();
        let views_js = run_views(&store, &default_views()).unwrap();
        assert_eq!(views_js.len(), 15);
        assert_eq!(views_js[0]["view"], json!("comparison"));
        assert_eq!(views_js[0]["groups"][0], json!("Fleet managers"));
    }

    #[test]
    fn run_views_rejects_unknown_view_type() {
        let store = validate_respondents(&[]).unwrap();
        let views = vec![ViewSpec {
            view_type: "heatmap".to_string(),
            question: None,
            source: None,
        }];
        assert!(run_views(&store, &views).is_err());
    }

    #[test]
    fn run_views_surfaces_invalid_question() {
        let store = validate_respondents(&[]).unwrap();
        let views = vec![ViewSpec {
            view_type: "comparison".to_string(),
            question: Some("nonexistent".to_string()),
            source: None,
        }];
        let res = run_views(&store, &views);
        assert!(matches!(res, Err(DashboardError::Aggregation { .. })));
    }

    #[test]
    fn config_parses_camel_case() {
        let raw = r#"{
            "outputSettings": {"surveyName": "Fleet survey 2025"},
            "surveyFileSources": [
                {"provider": "csv", "filePath": "data_full_app.csv"}
            ],
            "commentsFilePath": "text_df.csv",
            "views": [{"type": "ranking", "source": "All"}]
        }"#;
        let config: DashboardConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(config.output_settings.survey_name, "Fleet survey 2025");
        assert_eq!(config.survey_file_sources[0].provider, "csv");
        assert_eq!(
            config.comments_file_path.as_deref(),
            Some("text_df.csv")
        );
        assert_eq!(config.views.unwrap()[0].view_type, "ranking");
    }
}
