//! Data contracts handed from one stage to the next.
//!
//! Each structure is produced by exactly one stage and only read afterwards.
//! The schemas returned by [`StructuredOutput::schema`] are what the reasoning
//! loop validates the model's final answer against.

use crate::engine::StructuredOutput;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::BTreeMap;
use url::Url;

/// Company label used in reports when the caller did not name one.
pub const UNKNOWN_COMPANY: &str = "Unknown company";

/// What the Scraper Agent learned about the company behind a page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyAnalysis {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub offerings: Vec<String>,
    #[serde(default)]
    pub pricing: Option<String>,
    #[serde(default)]
    pub segments: Vec<String>,
    #[serde(default)]
    pub differentiators: Vec<String>,
    #[serde(default)]
    pub contact: Option<String>,
    #[serde(default)]
    pub links: Vec<String>,
}

impl StructuredOutput for CompanyAnalysis {
    const NAME: &'static str = "CompanyAnalysis";

    fn schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "name": { "type": ["string", "null"] },
                "offerings": { "type": "array", "items": { "type": "string" } },
                "pricing": { "type": ["string", "null"] },
                "segments": { "type": "array", "items": { "type": "string" } },
                "differentiators": { "type": "array", "items": { "type": "string" } },
                "contact": { "type": ["string", "null"] },
                "links": { "type": "array", "items": { "type": "string" } }
            },
            "required": ["offerings", "segments", "differentiators", "links"]
        })
    }
}

/// Tactical details of the competitor. `pricing` and `contacts` are the
/// recognized keys; anything else the model reports is carried along.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tactics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pricing: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contacts: Option<String>,
    #[serde(flatten)]
    pub other: BTreeMap<String, String>,
}

/// SWOT-style analysis produced by the Summarizer Agent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompetitiveAnalysis {
    #[serde(default)]
    pub company: String,
    pub value_proposition: String,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub threats: Vec<String>,
    #[serde(default)]
    pub opportunities: Vec<String>,
    #[serde(default)]
    pub tactics: Tactics,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

impl CompetitiveAnalysis {
    /// Render the analysis as a short markdown report.
    pub fn render_summary(&self) -> String {
        let mut out = String::new();
        let company = if self.company.trim().is_empty() {
            UNKNOWN_COMPANY
        } else {
            self.company.as_str()
        };

        out.push_str(&format!("# Competitive analysis: {}\n\n", company));
        out.push_str("## Value proposition\n\n");
        if self.value_proposition.trim().is_empty() {
            out.push_str("_Not identified._\n\n");
        } else {
            out.push_str(self.value_proposition.trim());
            out.push_str("\n\n");
        }

        push_section(&mut out, "Strengths", &self.strengths);
        push_section(&mut out, "Threats", &self.threats);
        push_section(&mut out, "Opportunities", &self.opportunities);

        out.push_str("## Tactics\n\n");
        let pricing = self.tactics.pricing.as_deref().unwrap_or("not found");
        let contacts = self.tactics.contacts.as_deref().unwrap_or("not found");
        out.push_str(&format!("- Pricing: {}\n", pricing));
        out.push_str(&format!("- Contacts: {}\n", contacts));
        for (key, value) in &self.tactics.other {
            out.push_str(&format!("- {}: {}\n", key, value));
        }
        out.push('\n');

        push_section(&mut out, "Recommendations", &self.recommendations);
        out.trim_end().to_string()
    }
}

fn push_section(out: &mut String, title: &str, items: &[String]) {
    out.push_str(&format!("## {}\n\n", title));
    if items.is_empty() {
        out.push_str("_None identified._\n\n");
        return;
    }
    for item in items {
        out.push_str(&format!("- {}\n", item.trim()));
    }
    out.push('\n');
}

impl StructuredOutput for CompetitiveAnalysis {
    const NAME: &'static str = "CompetitiveAnalysis";

    fn schema() -> Value {
        let list = json!({ "type": "array", "items": { "type": "string" } });
        json!({
            "type": "object",
            "properties": {
                "company": { "type": "string" },
                "value_proposition": { "type": "string" },
                "strengths": list,
                "threats": list,
                "opportunities": list,
                "tactics": {
                    "type": "object",
                    "additionalProperties": { "type": ["string", "null"] }
                },
                "recommendations": list
            },
            "required": [
                "value_proposition",
                "strengths",
                "threats",
                "opportunities",
                "recommendations"
            ]
        })
    }
}

/// Quality-gate verdict on a [`CompetitiveAnalysis`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub complete: bool,
    pub relevant: bool,
    pub actionable: bool,
    #[serde(default)]
    pub strong_points: Vec<String>,
    #[serde(default)]
    pub improvements: Vec<String>,
}

impl EvaluationResult {
    /// True when all three criteria pass.
    pub fn passed(&self) -> bool {
        self.complete && self.relevant && self.actionable
    }
}

impl StructuredOutput for EvaluationResult {
    const NAME: &'static str = "EvaluationResult";

    fn schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "complete": { "type": "boolean" },
                "relevant": { "type": "boolean" },
                "actionable": { "type": "boolean" },
                "strong_points": { "type": "array", "items": { "type": "string" } },
                "improvements": { "type": "array", "items": { "type": "string" } }
            },
            "required": ["complete", "relevant", "actionable"]
        })
    }
}

/// A validated analysis request.
#[derive(Debug, Clone)]
pub struct PipelineRequest {
    pub url: Url,
    pub company_name: Option<String>,
}

impl PipelineRequest {
    /// Validate `url` and build a request. Only absolute http(s) URLs with a
    /// host are accepted.
    pub fn new(url: &str, company_name: Option<String>) -> Result<Self> {
        let parsed = Url::parse(url.trim()).map_err(|e| Error::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::InvalidUrl {
                url: url.to_string(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }
        if parsed.host_str().is_none_or(str::is_empty) {
            return Err(Error::InvalidUrl {
                url: url.to_string(),
                reason: "missing host".to_string(),
            });
        }

        let company_name = company_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());

        Ok(Self {
            url: parsed,
            company_name,
        })
    }

    /// The company label for the report, falling back to [`UNKNOWN_COMPANY`].
    pub fn company_label(&self) -> &str {
        self.company_name.as_deref().unwrap_or(UNKNOWN_COMPANY)
    }
}

/// Page metadata recorded in the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapeMeta {
    pub title: String,
    pub chars: usize,
}

/// The assembled output of a successful pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub url: String,
    pub company: String,
    pub scrape_meta: ScrapeMeta,
    pub company_analysis: CompanyAnalysis,
    pub competitive_analysis: CompetitiveAnalysis,
    pub evaluation_result: EvaluationResult,
    pub summary: String,
    pub timestamp: DateTime<Utc>,
}
