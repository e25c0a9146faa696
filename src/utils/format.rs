//! Display helpers for terminal output.

/// Shorten an address for display: `0x1234...5678`.
/// Anything that isn't a full-length hex address is returned unchanged.
pub fn short_address(address: &str) -> String {
    if address.len() == 42 && address.is_ascii() && address.starts_with("0x") {
        format!("{}...{}", &address[..6], &address[38..])
    } else {
        address.to_string()
    }
}

/// Truncate to at most `max` characters, marking the cut with `...`.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
