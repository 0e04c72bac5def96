//! Text rendering for resolution diagnostics.
//!
//! Formats resolution chains, Rust type names and "did you mean?"
//! hints for the container's error messages.

/// Joins a resolution chain with arrows.
///
/// # Examples
/// ```
/// use wiring_support::rendering::render_chain;
///
/// let chain = ["Transient Injected X", "Singleton Injected Y", "Transient Injected X"];
/// assert_eq!(
///     render_chain(&chain),
///     "Transient Injected X → Singleton Injected Y → Transient Injected X"
/// );
/// ```
pub fn render_chain(chain: &[impl AsRef<str>]) -> String {
    chain
        .iter()
        .map(|s| s.as_ref())
        .collect::<Vec<_>>()
        .join(" → ")
}

/// One line of a vertically rendered resolution chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainEntry {
    /// Service name as registered.
    pub name: String,
    /// Lifetime label, e.g. "Singleton".
    pub lifetime: String,
    /// Construction style label, e.g. "Injected".
    pub style: String,
}

/// Renders a resolution chain one service per line, lifetimes aligned.
///
/// ```text
/// [Transient] X  (Injected)
///              ↓
/// [Singleton] Y  (Injected)
/// ```
pub fn render_chain_vertical(entries: &[ChainEntry]) -> String {
    let width = entries.iter().map(|e| e.lifetime.len()).max().unwrap_or(0);

    let mut out = String::new();
    for (i, entry) in entries.iter().enumerate() {
        if i > 0 {
            out.push_str(&" ".repeat(width + 3));
            out.push_str("↓\n");
        }
        out.push_str(&format!(
            "[{:<width$}] {}  ({})\n",
            entry.lifetime, entry.name, entry.style,
        ));
    }
    out
}

/// Strips module paths from a fully qualified type name.
///
/// ```
/// use wiring_support::rendering::shorten_type_name;
///
/// assert_eq!(shorten_type_name("app::services::ApiClient"), "ApiClient");
/// assert_eq!(
///     shorten_type_name("alloc::sync::Arc<dyn app::cache::LocalCache>"),
///     "Arc<dyn LocalCache>"
/// );
/// ```
pub fn shorten_type_name(full_name: &str) -> String {
    let mut out = String::with_capacity(full_name.len());
    let mut segment = String::new();
    let mut chars = full_name.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            ':' if chars.peek() == Some(&':') => {
                chars.next();
                segment.clear();
            }
            '<' | '>' | ',' | ' ' | '(' | ')' | '[' | ']' | ';' | '&' => {
                out.push_str(&segment);
                out.push(ch);
                segment.clear();
            }
            _ => segment.push(ch),
        }
    }

    out.push_str(&segment);
    out
}

/// Picks registered names that look like `requested`, best match first.
///
/// Substring matches rank above shared prefixes; a prefix must share at
/// least three characters. At most `max` names are returned.
pub fn suggest_similar(requested: &str, available: &[&str], max: usize) -> Vec<String> {
    let wanted = requested.to_lowercase();
    if wanted.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<(&str, usize)> = available
        .iter()
        .filter_map(|&name| {
            let candidate = name.to_lowercase();
            if candidate == wanted {
                return None;
            }
            if candidate.contains(&wanted) || wanted.contains(&candidate) {
                return Some((name, 100));
            }

            let common = candidate
                .chars()
                .zip(wanted.chars())
                .take_while(|(a, b)| a == b)
                .count();
            (common >= 3).then_some((name, common * 10))
        })
        .collect();

    scored.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    scored
        .into_iter()
        .take(max)
        .map(|(name, _)| name.to_string())
        .collect()
}
