//! Ethereum address shape checks and display helpers.

/// Returns true iff `address` is `0x` followed by exactly 40 hex characters.
///
/// Only the shape is checked. Mixed-case checksums are not verified.
pub fn validate_address(address: &str) -> bool {
    match address.strip_prefix("0x") {
        Some(hex) => hex.len() == 40 && hex.bytes().all(|b| b.is_ascii_hexdigit()),
        None => false,
    }
}

/// Short form shown once a wallet is connected: `0xABCDE...EF01`.
pub fn format_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 11 {
        return address.to_string();
    }
    let head: String = chars[..7].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}
