//! Summarizer Agent: strategic analysis of the scraped company.

use crate::engine::{
    LanguageModel, LoopConfig, ReasoningLoop, Tool, Toolset, tracing_callbacks,
};
use crate::error::Result;
use crate::extract::{ContactInfo, extract_contacts, extract_pricing};
use crate::model::{CompanyAnalysis, CompetitiveAnalysis, Tactics};
use crate::text::truncate_words;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Words of page text given to the reasoning pass.
pub const SUMMARY_WORDS: usize = 500;

const SUMMARIZER_SYSTEM: &str = r#"You are an expert in strategic competitive analysis.

Produce a structured competitive analysis focused on:
1. Company identification: name, positioning, sector
2. Value proposition: main offerings, unique differentiators, customer benefits
3. Competitive strategy: strengths and competitive advantages
4. Opportunities and threats: growth opportunities, competitive risks, market gaps
5. Tactical information: prices/plans and contact channels
6. Recommendations: concrete, actionable next steps for a competitor

Be objective, strategic and focused on actionable insights."#;

struct ContactsTool {
    text: String,
}

impl Tool for ContactsTool {
    fn name(&self) -> &'static str {
        "extract_contacts"
    }

    fn description(&self) -> &'static str {
        "List the phone numbers and URLs found in the page text"
    }

    fn invoke(&self, _arguments: &Value) -> std::result::Result<Value, String> {
        serde_json::to_value(extract_contacts(&self.text)).map_err(|e| e.to_string())
    }
}

struct PricingTool {
    text: String,
}

impl Tool for PricingTool {
    fn name(&self) -> &'static str {
        "extract_pricing"
    }

    fn description(&self) -> &'static str {
        "List the price mentions found in the page text, in page order"
    }

    fn invoke(&self, _arguments: &Value) -> std::result::Result<Value, String> {
        Ok(json!(extract_pricing(&self.text)))
    }
}

/// Fill the recognized tactic keys. Extractor findings win; the model's values
/// are kept only for keys the extractors left empty.
pub fn merge_tactics(model: Tactics, contacts: &ContactInfo, prices: &[String]) -> Tactics {
    let pricing = if prices.is_empty() {
        model.pricing.filter(|p| !p.trim().is_empty())
    } else {
        Some(prices.join("; "))
    };
    let contacts = contacts
        .joined()
        .or_else(|| model.contacts.filter(|c| !c.trim().is_empty()));

    Tactics {
        pricing,
        contacts,
        other: model.other,
    }
}

/// Combines the company analysis, page text and extractor findings into a
/// [`CompetitiveAnalysis`].
pub struct SummarizerAgent {
    model: Arc<dyn LanguageModel>,
    config: LoopConfig,
}

impl SummarizerAgent {
    pub const NAME: &'static str = "summarizer";

    pub fn new(model: Arc<dyn LanguageModel>, config: LoopConfig) -> Self {
        Self { model, config }
    }

    /// Loop configuration used when none is supplied.
    pub fn default_config(model: &str) -> LoopConfig {
        LoopConfig::new(model)
            .temperature(0.2)
            .max_steps(4)
            .system(SUMMARIZER_SYSTEM)
    }

    pub async fn summarize(
        &self,
        company: &CompanyAnalysis,
        raw_text: &str,
    ) -> Result<CompetitiveAnalysis> {
        info!("summarizer: starting strategic analysis");

        let excerpt = truncate_words(raw_text, SUMMARY_WORDS);
        let contacts = extract_contacts(raw_text);
        let prices = extract_pricing(raw_text);
        debug!(
            "summarizer: {} chars in, {} phones, {} urls, {} prices",
            raw_text.len(),
            contacts.phones.len(),
            contacts.urls.len(),
            prices.len()
        );

        let tools = Toolset::new()
            .with(ContactsTool {
                text: raw_text.to_string(),
            })
            .with(PricingTool {
                text: raw_text.to_string(),
            });

        let company_json = serde_json::to_string_pretty(company).unwrap_or_default();
        let findings = json!({ "contacts": contacts, "pricing": prices });
        let task = format!(
            "Write the competitive analysis of this company.\n\n\
             Collected company data:\n```json\n{company_json}\n```\n\n\
             Page text (first {SUMMARY_WORDS} words):\n<page>\n{excerpt}\n</page>\n\n\
             Deterministic findings from the page:\n```json\n{findings}\n```\n\n\
             Fill tactics.pricing and tactics.contacts only from what the page states."
        );

        let mut run = ReasoningLoop::new(self.model.clone(), self.config.clone(), tools)
            .with_callbacks(tracing_callbacks(Self::NAME));
        let draft: CompetitiveAnalysis = run
            .run(&task)
            .await
            .inspect_err(|e| error!("summarizer: analysis failed: {}", e))?;

        let company_name = if draft.company.trim().is_empty() {
            company.name.clone().unwrap_or_default()
        } else {
            draft.company
        };

        let analysis = CompetitiveAnalysis {
            company: company_name,
            tactics: merge_tactics(draft.tactics, &contacts, &prices),
            ..draft
        };

        info!(
            "summarizer: analysis ready ({} strengths, {} recommendations)",
            analysis.strengths.len(),
            analysis.recommendations.len()
        );
        Ok(analysis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::testing::ScriptedModel;

    const PAGE_TEXT: &str = "Acme payroll. Starter $29/month, Growth $99/month. \
        Sales: (11) 4002-8922, https://acme.example/contact";

    fn draft(tactics: &str) -> String {
        format!(
            r#"<finish>{{
                "company": "",
                "value_proposition": "Payroll in minutes",
                "strengths": ["Simple onboarding"],
                "threats": ["Incumbent HR suites"],
                "opportunities": ["Latin American SMBs"],
                "tactics": {},
                "recommendations": ["Match the starter price"]
            }}</finish>"#,
            tactics
        )
    }

    fn company() -> CompanyAnalysis {
        CompanyAnalysis {
            name: Some("Acme".into()),
            offerings: vec!["Payroll".into()],
            ..Default::default()
        }
    }

    fn agent(model: &Arc<ScriptedModel>) -> SummarizerAgent {
        SummarizerAgent::new(model.clone(), SummarizerAgent::default_config("test"))
    }

    #[test]
    fn test_merge_prefers_extractors() {
        let model = Tactics {
            pricing: Some("about $30".into()),
            contacts: Some("email only".into()),
            ..Default::default()
        };
        let contacts = extract_contacts("(11) 4002-8922");
        let merged = merge_tactics(model, &contacts, &["$29/month".to_string()]);
        assert_eq!(merged.pricing.as_deref(), Some("$29/month"));
        assert_eq!(merged.contacts.as_deref(), Some("(11) 4002-8922"));
    }

    #[test]
    fn test_merge_falls_back_to_model() {
        let mut other = std::collections::BTreeMap::new();
        other.insert("channels".to_string(), "webinars".to_string());
        let model = Tactics {
            pricing: Some("on request".into()),
            contacts: Some("".into()),
            other,
        };
        let merged = merge_tactics(model, &ContactInfo::default(), &[]);
        assert_eq!(merged.pricing.as_deref(), Some("on request"));
        assert_eq!(merged.contacts, None);
        assert_eq!(merged.other.get("channels").map(String::as_str), Some("webinars"));
    }

    #[tokio::test]
    async fn test_summarize_applies_precedence() {
        let model =
            ScriptedModel::new([draft(r#"{"pricing": "cheap", "contacts": "sales@acme"}"#)]);

        let analysis = agent(&model).summarize(&company(), PAGE_TEXT).await.unwrap();
        assert_eq!(analysis.company, "Acme");
        assert_eq!(analysis.value_proposition, "Payroll in minutes");
        assert_eq!(analysis.tactics.pricing.as_deref(), Some("$29/month; $99/month"));
        assert_eq!(
            analysis.tactics.contacts.as_deref(),
            Some("(11) 4002-8922; https://acme.example/contact")
        );
    }

    #[test]
    fn test_model_fills_what_extractors_missed() {
        let model = ScriptedModel::new([draft(r#"{"pricing": "Custom quotes"}"#)]);

        let analysis = tokio_test::block_on(
            agent(&model).summarize(&company(), "No numbers on this page at all."),
        )
        .unwrap();
        assert_eq!(analysis.tactics.pricing.as_deref(), Some("Custom quotes"));
        assert_eq!(analysis.tactics.contacts, None);
    }

    #[tokio::test]
    async fn test_prompt_uses_word_budget_and_findings() {
        let text = format!("{} $15/month", "filler ".repeat(SUMMARY_WORDS + 100));
        let model = ScriptedModel::new([draft("{}")]);

        agent(&model).summarize(&company(), &text).await.unwrap();

        let requests = model.requests();
        let task = &requests[0].messages[1].content;
        assert_eq!(task.matches("filler").count(), SUMMARY_WORDS);
        assert!(task.contains("$15/month"));
    }

    #[tokio::test]
    async fn test_extractor_tools_are_callable() {
        let model = ScriptedModel::new([
            r#"<tool>{"name": "extract_pricing", "arguments": {}}</tool>"#.to_string(),
            draft("{}"),
        ]);

        agent(&model).summarize(&company(), PAGE_TEXT).await.unwrap();
        let requests = model.requests();
        let observation = &requests[1].messages.last().unwrap().content;
        assert!(observation.contains("$29/month"));
    }

    #[tokio::test]
    async fn test_missing_fields_is_extraction_failure() {
        let bad = r#"<finish>{"company": "Acme"}</finish>"#;
        let model = ScriptedModel::new([bad; 4]);

        let err = agent(&model).summarize(&company(), PAGE_TEXT).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ExtractionFailure);
    }
}
