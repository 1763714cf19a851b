use async_trait::async_trait;
use synapse_models::{EvaluatedCandidate, InteractiveOption, Scenario};

use crate::error::EngineError;
use crate::llm_cli::{invoke_llm, LlmCliConfig};
use crate::parser::{parse_options, truncate_words};
use crate::prompts::{explanation_system_prompt, options_system_prompt, user_prompt};

/// Explanation used whenever the reasoning collaborator fails.
pub const FALLBACK_EXPLANATION: &str = "Solution optimized for maximum profit.";

const MAX_EXPLANATION_WORDS: usize = 100;

/// Options used whenever the reasoning collaborator fails.
pub fn fallback_options() -> Vec<InteractiveOption> {
    vec![
        InteractiveOption::new(
            "Make Changes to Driver's Route",
            "route_change",
            "Update delivery route to avoid disruption",
        ),
        InteractiveOption::new(
            "Connect Customer Service Agent",
            "customer_service",
            "Get customer service agent involved",
        ),
    ]
}

/// One-line description of the winning plan handed to the reasoner.
pub fn candidate_summary(scenario: &Scenario, winner: &EvaluatedCandidate) -> String {
    let actions: Vec<&str> = winner
        .candidate
        .actions
        .iter()
        .map(|action| action.description.as_str())
        .collect();
    format!(
        "{} plan for a {} affecting {} deliveries ({}); projected profit {} against cost {}, ROI {}%",
        winner.candidate.approach,
        scenario.scenario_type.as_str().replace('_', " "),
        scenario.affected_units,
        actions.join(", "),
        winner.roi.total_profit,
        winner.roi.total_cost,
        winner.roi.roi_percentage,
    )
}

/// Natural-language collaborator. Mockable for testing.
#[async_trait]
pub trait Reasoner: Send + Sync {
    fn name(&self) -> &str;

    async fn explain(&self, scenario_text: &str, summary: &str) -> Result<String, EngineError>;

    async fn suggest_options(
        &self,
        scenario_text: &str,
        summary: &str,
    ) -> Result<Vec<InteractiveOption>, EngineError>;
}

/// Reasoner that shells out to an LLM command-line tool.
pub struct CliReasoner {
    pub cli_config: LlmCliConfig,
}

impl CliReasoner {
    pub fn new(cli_config: LlmCliConfig) -> Self {
        Self { cli_config }
    }
}

#[async_trait]
impl Reasoner for CliReasoner {
    fn name(&self) -> &str {
        "cli"
    }

    async fn explain(&self, scenario_text: &str, summary: &str) -> Result<String, EngineError> {
        let raw = invoke_llm(
            &explanation_system_prompt(),
            &user_prompt(scenario_text, summary),
            &self.cli_config,
        )
        .await?;
        Ok(truncate_words(&raw, MAX_EXPLANATION_WORDS))
    }

    async fn suggest_options(
        &self,
        scenario_text: &str,
        summary: &str,
    ) -> Result<Vec<InteractiveOption>, EngineError> {
        let raw = invoke_llm(
            &options_system_prompt(),
            &user_prompt(scenario_text, summary),
            &self.cli_config,
        )
        .await?;
        parse_options(&raw)
    }
}

fn mentions(lower: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| lower.contains(kw))
}

/// Keyword-matched follow-up options, three per family.
pub fn keyword_options(scenario_text: &str) -> Vec<InteractiveOption> {
    let lower = scenario_text.to_lowercase();
    let options: [(&str, &str, &str); 3] =
        if mentions(&lower, &["traffic", "accident", "jam", "road"]) {
            [
                (
                    "Reroute via Alternative Path",
                    "reroute_alternative",
                    "Use backup route to avoid traffic",
                ),
                (
                    "Notify Customers of Delay",
                    "notify_customers",
                    "Send delay notifications to affected customers",
                ),
                (
                    "Activate Emergency Protocol",
                    "emergency_protocol",
                    "Implement emergency delivery procedures",
                ),
            ]
        } else if mentions(&lower, &["complaint", "angry", "cold", "food"]) {
            [
                (
                    "Offer Refund/Credit",
                    "offer_compensation",
                    "Provide customer compensation",
                ),
                (
                    "Send Replacement Order",
                    "replacement_order",
                    "Prepare and send fresh order",
                ),
                (
                    "Escalate to Manager",
                    "escalate_manager",
                    "Get manager involved in resolution",
                ),
            ]
        } else if mentions(&lower, &["driver", "unwell", "sick", "replacement"]) {
            [
                (
                    "Show Live Driver Map",
                    "show_live_map",
                    "Display real-time driver location",
                ),
                (
                    "Reroute to Best Path",
                    "reroute_best_path",
                    "Calculate and apply the optimal route from live traffic data",
                ),
                (
                    "Dispatch Backup Driver",
                    "backup_driver",
                    "Send replacement driver immediately",
                ),
            ]
        } else if mentions(&lower, &["weather", "rain", "storm", "delay"]) {
            [
                (
                    "Activate Weather Protocol",
                    "weather_protocol",
                    "Implement weather-safe delivery procedures",
                ),
                (
                    "Provide Weather Updates",
                    "weather_updates",
                    "Keep customers informed of weather delays",
                ),
                (
                    "Use Weather-Protected Routes",
                    "protected_routes",
                    "Route through covered/indoor areas",
                ),
            ]
        } else {
            [
                (
                    "Implement Solution",
                    "implement_solution",
                    "Execute the recommended solution",
                ),
                (
                    "Get More Details",
                    "get_details",
                    "Request additional information",
                ),
                ("Escalate Issue", "escalate", "Escalate to higher management"),
            ]
        };

    options
        .iter()
        .map(|(label, tag, description)| InteractiveOption::new(label, tag, description))
        .collect()
}

/// Offline reasoner: templated explanations and keyword option sets.
pub struct KeywordReasoner;

#[async_trait]
impl Reasoner for KeywordReasoner {
    fn name(&self) -> &str {
        "local"
    }

    async fn explain(&self, _scenario_text: &str, summary: &str) -> Result<String, EngineError> {
        if summary.trim().is_empty() {
            return Err(EngineError::Reasoning("empty plan summary".to_string()));
        }
        Ok(truncate_words(
            &format!("Recommended: {summary}. Acting now keeps the affected deliveries moving."),
            MAX_EXPLANATION_WORDS,
        ))
    }

    async fn suggest_options(
        &self,
        scenario_text: &str,
        _summary: &str,
    ) -> Result<Vec<InteractiveOption>, EngineError> {
        Ok(keyword_options(scenario_text))
    }
}
