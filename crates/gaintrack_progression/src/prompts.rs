use rmcp::model::{GetPromptResult, PromptMessage, PromptMessageRole};

pub fn progression_review_prompt(exercise_name: Option<&str>) -> GetPromptResult {
    let exercise = exercise_name.map(str::trim).filter(|n| !n.is_empty());
    match exercise {
        Some(name) => GetPromptResult::new(vec![PromptMessage::new_text(
                PromptMessageRole::User,
                format!(
                    "Review my progress on {name}.\n\nInclude:\n1. Recent sessions (top weight, volume, RPE)\n2. Personal records and how far off them I am\n3. The current trend and what is driving it\n4. The weight I should use next session\n\nUse get_exercise_progression with exercise_name=\"{name}\" for history and records, then get_progression_suggestions for the recommended weight. Finish with calculate_warmup_sets for that weight."
                ),
            )])
        .with_description(format!("Progression review for {}", name)),
        None => GetPromptResult::new(vec![PromptMessage::new_text(
                PromptMessageRole::User,
                "Review my strength training progress.\n\nInclude:\n1. Exercises that are ready for more weight (high confidence first)\n2. Exercises that are stalling or declining, and what to do about them\n3. Exercises without enough history to judge\n\nUse get_progression_suggestions for the ranked list and get_exercise_progression for any exercise that needs a closer look. Keep recommendations concrete: exercise, current weight, next weight.",
            )])
        .with_description("Progression review across all exercises"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn focused_prompt_names_the_exercise() {
        let prompt = progression_review_prompt(Some(" Bench Press "));
        assert_eq!(
            prompt.description.as_deref(),
            Some("Progression review for Bench Press")
        );
        assert_eq!(prompt.messages.len(), 1);
    }

    #[test]
    fn blank_exercise_falls_back_to_overview() {
        let prompt = progression_review_prompt(Some("  "));
        assert_eq!(
            prompt.description.as_deref(),
            Some("Progression review across all exercises")
        );
    }
}
