use crate::hashers::is_digest_shaped;
use crate::models::Algorithm;

/// Turn a configured password hash into the expected digest, or `None` if
/// no usable hash is configured.
///
/// Accepts a bare hex digest or a line copied from `sha256sum` style tools
/// ("<hash>  -" / "<hash>  filename"). Placeholders (blank, all zeros) and
/// values that cannot be a digest of `algorithm` count as absent.
pub fn normalize_expected_hash(raw: Option<&str>, algorithm: Algorithm) -> Option<String> {
    let t = raw?.trim();
    if t.is_empty() {
        return None;
    }
    let candidate = t
        .split_whitespace()
        .find(|tok| is_digest_shaped(tok, algorithm))?
        .to_ascii_lowercase();
    if candidate.chars().all(|c| c == '0') {
        return None;
    }
    Some(candidate)
}

/// First and last four characters of a digest, for log lines.
pub fn short_hash(hash: &str) -> String {
    if hash.len() > 12 && hash.is_ascii() {
        format!("{}...{}", &hash[..4], &hash[hash.len() - 4..])
    } else {
        "[hash]".to_string()
    }
}
