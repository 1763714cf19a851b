/// Schema example included in the options prompt.
fn options_schema() -> String {
    let example = serde_json::json!({
        "options": [
            {
                "label": "<short button label>",
                "action_tag": "<snake_case_action>",
                "description": "<one sentence>"
            }
        ]
    });
    serde_json::to_string_pretty(&example).unwrap_or_default()
}

pub fn explanation_system_prompt() -> String {
    "You are the dispatch assistant of a food-delivery operations platform. An optimizer \
     has already chosen a plan for a delivery disruption; your job is to explain it to \
     the operator.\n\n\
     Respond in about 100 words with this structure:\n\
     1. SPECIFIC ACTION: what exactly to do to resolve this disruption\n\
     2. WHY: a brief explanation of why this plan is best, including its profit impact\n\n\
     Be conversational and actionable. Focus on immediate next steps. \
     Do NOT include follow-up options or questions."
        .to_string()
}

pub fn options_system_prompt() -> String {
    format!(
        "You are the dispatch assistant of a food-delivery operations platform. Given a \
         delivery disruption and the plan chosen for it, propose the follow-up actions an \
         operator could take next.\n\n\
         Respond ONLY with a JSON object, no other text, in exactly this shape:\n{}\n\n\
         Return two or three options. `action_tag` must be snake_case.",
        options_schema()
    )
}

pub fn user_prompt(scenario_text: &str, summary: &str) -> String {
    format!("Scenario: {scenario_text}\nChosen plan: {summary}")
}
