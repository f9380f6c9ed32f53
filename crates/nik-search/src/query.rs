//! Deterministic query expansion.

/// What kind of answer the user is after.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchIntent {
    History,
    #[default]
    General,
}

/// Expand a topic into the web queries sent for it, most specific first.
pub fn expand_queries(topic: &str, intent: SearchIntent) -> Vec<String> {
    let base = topic.trim().to_lowercase();
    if base.is_empty() {
        return Vec::new();
    }
    match intent {
        SearchIntent::History => vec![
            format!("history of {base}"),
            format!("{base} historical timeline"),
            format!("{base} major historical events"),
            format!("{base} ancient medieval modern history"),
            format!("{base} empire independence"),
        ],
        SearchIntent::General => vec![
            base.clone(),
            format!("{base} explanation"),
            format!("{base} overview"),
            format!("what is {base}"),
        ],
    }
}
