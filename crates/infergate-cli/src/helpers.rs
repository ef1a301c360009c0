//! Shared CLI helpers: key masking, missing-setting report, vector previews.

use colored::Colorize;

/// Show only the last four characters of a secret.
pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.trim().chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{tail}")
}

/// Environment variable that sets a config key.
pub fn env_var_for(key: &str) -> Option<&'static str> {
    match key {
        "baseUrl" => Some("INFERGATE_BASE_URL"),
        "apiKey" => Some("INFERGATE_API_KEY"),
        "completionModel" => Some("INFERGATE_COMPLETION_MODEL"),
        "embeddingModel" => Some("INFERGATE_EMBEDDING_MODEL"),
        _ => None,
    }
}

/// Print the required settings that are missing and how to set them.
pub fn print_missing(missing: &[&str]) {
    eprintln!("{}", "Missing required configuration:".red().bold());
    for key in missing {
        match env_var_for(key) {
            Some(var) => eprintln!("  - gateway.{key} (or {var})"),
            None => eprintln!("  - gateway.{key}"),
        }
    }
    eprintln!(
        "{}",
        "Set them in ~/.infergate/config.json, the environment, or a .env file.".dimmed()
    );
}

pub fn print_model_header(model: &str) {
    println!();
    println!("{}", model.cyan().bold());
}

/// First few components of a vector, for display.
pub fn preview(vector: &[f32]) -> String {
    let head: Vec<String> = vector.iter().take(3).map(|x| format!("{x:.4}")).collect();
    if vector.len() > 3 {
        format!("[{}, ...]", head.join(", "))
    } else {
        format!("[{}]", head.join(", "))
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_key_keeps_tail() {
        assert_eq!(mask_key("nvapi-abcdefgh1234"), "****1234");
    }

    #[test]
    fn mask_key_hides_short_keys() {
        assert_eq!(mask_key("abc"), "****");
        assert_eq!(mask_key("12345678"), "****");
    }

    #[test]
    fn env_var_names() {
        assert_eq!(env_var_for("baseUrl"), Some("INFERGATE_BASE_URL"));
        assert_eq!(env_var_for("embeddingModel"), Some("INFERGATE_EMBEDDING_MODEL"));
        assert_eq!(env_var_for("nope"), None);
    }

    #[test]
    fn preview_formats() {
        assert_eq!(preview(&[0.5, 0.25]), "[0.5000, 0.2500]");
        assert_eq!(preview(&[1.0, 0.0, 0.0, 0.0]), "[1.0000, 0.0000, 0.0000, ...]");
    }
}
