pub mod address_service;
pub mod auth_service;
pub mod favorite_service;
pub mod inventory_service;
pub mod menu_service;
pub mod order_service;
pub mod recipe_service;
pub mod review_service;

/// Escapes `ILIKE` wildcards so user input only matches literally.
/// Postgres treats backslash as the default escape character.
pub fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// `%term%` pattern for substring search.
pub fn contains_pattern(input: &str) -> String {
    format!("%{}%", escape_like(input.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcards_are_escaped() {
        assert_eq!(escape_like("%"), "\\%");
        assert_eq!(escape_like("a_b\\c"), "a\\_b\\\\c");
        assert_eq!(escape_like("pizza"), "pizza");
    }

    #[test]
    fn contains_pattern_wraps_escaped_term() {
        assert_eq!(contains_pattern("  50% off "), "%50\\% off%");
    }
}
