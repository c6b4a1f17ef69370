//! The analysis report document.
//!
//! Carries everything the rendered report shows: client identity,
//! generation date, the weight split, and one score table per available
//! map. The text rendering is deterministic; page layout and chart
//! rasterization are presentation concerns outside this crate.

use chrono::NaiveDate;
use grapho_core::{AnalysisSession, ScoreMap, Weight};

const TITLE: &str = "Handwriting Analysis Report";
const ATTRIBUTION: &str = "This report is generated by grapho";

/// One score table of the report.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSection {
    pub title: String,
    pub scores: ScoreMap,
}

/// The report document.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    pub client_name: String,
    pub client_email: String,
    pub generated_on: NaiveDate,
    pub weight: Weight,
    pub sections: Vec<ReportSection>,
}

impl AnalysisReport {
    #[must_use]
    pub fn new(
        client_name: impl Into<String>,
        client_email: impl Into<String>,
        generated_on: NaiveDate,
        weight: Weight,
    ) -> Self {
        Self {
            client_name: client_name.into(),
            client_email: client_email.into(),
            generated_on,
            weight,
            sections: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_section(mut self, title: impl Into<String>, scores: ScoreMap) -> Self {
        self.sections.push(ReportSection {
            title: title.into(),
            scores,
        });
        self
    }

    /// Build the report for a session, one section per available map.
    ///
    /// Returns `None` before any analysis exists (no script scores yet).
    #[must_use]
    pub fn from_session(session: &AnalysisSession, generated_on: NaiveDate) -> Option<Self> {
        let client = session.client()?;
        let script = session.script_scores()?;

        let mut report = Self::new(
            client.name.clone(),
            client.email.clone(),
            generated_on,
            session.weight(),
        )
        .with_section("Script Analysis Results", script.clone());

        if let Some(questionnaire) = session.questionnaire_scores() {
            report = report.with_section("Questionnaire Scores", questionnaire.clone());
        }
        if let Some(combined) = session.combined_scores() {
            report = report.with_section("Comprehensive Analysis", combined.clone());
        }
        Some(report)
    }

    /// Conventional report file name for the generation date.
    #[must_use]
    pub fn file_name(&self) -> String {
        format!(
            "handwriting-analysis-report-{}.txt",
            self.generated_on.format("%Y-%m-%d")
        )
    }

    /// Deterministic plain-text rendering.
    #[must_use]
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        out.push_str(TITLE);
        out.push('\n');
        out.push_str(&"=".repeat(TITLE.len()));
        out.push('\n');
        out.push_str(&format!("Generated on: {}\n", self.generated_on));
        out.push_str(&format!(
            "Client: {} <{}>\n",
            self.client_name, self.client_email
        ));
        out.push_str(&format!(
            "Weight: script {}% / questionnaire {}%\n",
            self.weight.script_percent(),
            self.weight.questionnaire_percent()
        ));

        for section in &self.sections {
            out.push('\n');
            out.push_str(&section.title);
            out.push('\n');
            out.push_str(&"-".repeat(section.title.len()));
            out.push('\n');

            let width = section
                .scores
                .categories()
                .map(str::len)
                .max()
                .unwrap_or(0);
            for (category, score) in section.scores.iter() {
                out.push_str(&format!("  {category:<width$}  {score:>5.1}%\n"));
            }
        }

        out.push('\n');
        out.push_str(ATTRIBUTION);
        out.push('\n');
        out
    }
}
