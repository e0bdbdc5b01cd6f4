// 📋 Project Register - read-only spreadsheet of programme projects
// Source is a CSV file or a published CSV export URL. Never on the write path.

use crate::error::RegisterError;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRow {
    #[serde(rename = "Project Code")]
    pub code: String,

    #[serde(rename = "Project Title")]
    pub title: String,

    #[serde(rename = "Lead Org", default)]
    pub lead_org: String,

    #[serde(rename = "Lead", default)]
    pub lead: String,

    /// "Yes" when the project has impact to report
    #[serde(rename = "Impact to Report", default)]
    pub impact_to_report: String,

    #[serde(rename = "Impact / Outcomes", default)]
    pub impact: String,

    #[serde(rename = "Method Area(s)", default)]
    pub method_areas: String,

    #[serde(rename = "Additional Notes", default)]
    pub notes: String,
}

impl ProjectRow {
    pub fn has_impact(&self) -> bool {
        self.impact_to_report.trim().eq_ignore_ascii_case("yes")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterSource {
    File(PathBuf),
    Url(String),
}

impl RegisterSource {
    /// `http(s)://...` is fetched, anything else is a file path
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        if s.starts_with("http://") || s.starts_with("https://") {
            RegisterSource::Url(s.to_string())
        } else {
            RegisterSource::File(PathBuf::from(s))
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectRegister {
    pub rows: Vec<ProjectRow>,
}

impl ProjectRegister {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, RegisterError> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

        let rows = rdr
            .deserialize()
            .collect::<Result<Vec<ProjectRow>, _>>()?;

        Ok(ProjectRegister { rows })
    }

    pub async fn load(source: &RegisterSource) -> Result<Self, RegisterError> {
        let register = match source {
            RegisterSource::File(path) => {
                let file = std::fs::File::open(path)?;
                Self::from_reader(file)?
            }
            RegisterSource::Url(url) => {
                let resp = reqwest::get(url).await?;
                let status = resp.status();
                if !status.is_success() {
                    return Err(RegisterError::Fetch(format!("status {}", status.as_u16())));
                }
                let body = resp.bytes().await?;
                Self::from_reader(body.as_ref())?
            }
        };

        info!(rows = register.rows.len(), "Project register loaded");
        Ok(register)
    }

    /// Projects flagged as having impact to report
    pub fn impact_projects(&self) -> Vec<&ProjectRow> {
        self.rows.iter().filter(|row| row.has_impact()).collect()
    }
}
