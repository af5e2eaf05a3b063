/// Masks an API key for display: a short prefix, `...`, the last four characters.
///
/// Keys of ten characters or fewer are fully masked.
pub fn redact_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    let len = chars.len();
    if len <= 10 {
        return "***".to_string();
    }

    let prefix_len = if len >= 16 { 8 } else { 6 };
    let prefix: String = chars[..prefix_len].iter().collect();
    let suffix: String = chars[len - 4..].iter().collect();
    format!("{}...{}", prefix, suffix)
}
