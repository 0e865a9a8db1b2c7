/// System instruction sent with every screenshot.
pub const SYSTEM_PROMPT: &str = "You are a concise trading assistant.";

/// User-role instruction accompanying the chart image. The reply format here is
/// what `parser::parse_signal` understands.
pub fn analysis_prompt() -> String {
    format!(
        "You are a professional trader. \
         Analyze the chart screenshot and return ONLY one signal: \
         'up', 'down', or 'wait', optionally with duration {min}–{max} minutes.\n\
         Examples: 'up 2 min', 'down 1 min', 'wait'.",
        min = snapsig_models::HoldMinutes::MIN,
        max = snapsig_models::HoldMinutes::MAX,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_lists_every_signal_word() {
        let prompt = analysis_prompt();
        for word in ["'up'", "'down'", "'wait'", "1–5 minutes"] {
            assert!(prompt.contains(word), "missing {word}");
        }
    }
}
