use std::env;
use std::sync::OnceLock;

static GRAPH_SCOPE_EAGER: OnceLock<Option<bool>> = OnceLock::new();

fn parse_bool(value: &str) -> bool {
    let normalized = value.trim().to_ascii_lowercase();
    matches!(normalized.as_str(), "1" | "true" | "yes" | "on")
}

/// Eager-mode override from `GRAPH_SCOPE_EAGER`, read once per process.
pub(crate) fn eager_override() -> Option<bool> {
    *GRAPH_SCOPE_EAGER.get_or_init(|| match env::var("GRAPH_SCOPE_EAGER") {
        Ok(value) if !value.trim().is_empty() => Some(parse_bool(&value)),
        _ => None,
    })
}
