pub const PREDICT_SYSTEM: &str = include_str!("../data/prompts/predict_system.txt");
pub const PREDICT_USER: &str = include_str!("../data/prompts/predict_user.txt");

/// Replace `{{key}}` placeholders in a template string.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        result = result.replace(&format!("{{{{{}}}}}", key), value);
    }
    result
}

/// User prompt for a single dream.
pub fn predict_user(dream: &str) -> String {
    render(PREDICT_USER, &[("dream", dream)])
}
