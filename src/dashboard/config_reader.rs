use crate::dashboard::*;

use serde::{Deserialize, Serialize};

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "surveyName")]
    pub survey_name: String,
    #[serde(rename = "outputPath")]
    pub output_path: Option<String>,
    #[serde(rename = "surveyDate")]
    pub survey_date: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub survey: String,
    pub date: Option<String>,
    pub respondents: Option<u64>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FileSource {
    pub provider: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "idColumn")]
    pub id_column: Option<String>,
    #[serde(rename = "sourceColumn")]
    pub source_column: Option<String>,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
}

impl FileSource {
    pub fn id_column_name(&self) -> &str {
        self.id_column.as_deref().unwrap_or("id")
    }

    pub fn source_column_name(&self) -> &str {
        self.source_column.as_deref().unwrap_or("source")
    }
}

/// One aggregation view to compute. The question refers to a declared family
/// name, the source to a group label (or "All" for the ranking view).
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ViewSpec {
    #[serde(rename = "type")]
    pub view_type: String,
    pub question: Option<String>,
    pub source: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(rename = "outputSettings")]
    pub output_settings: OutputSettings,
    #[serde(rename = "surveyFileSources")]
    pub survey_file_sources: Vec<FileSource>,
    #[serde(rename = "commentsFilePath")]
    pub comments_file_path: Option<String>,
    #[serde(rename = "keywordsFilePath")]
    pub keywords_file_path: Option<String>,
    pub views: Option<Vec<ViewSpec>>,
}

pub fn read_summary(path: String) -> DashResult<JSValue> {
    let contents = fs::read_to_string(path.clone()).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}
