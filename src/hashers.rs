use crate::models::Algorithm;

/// Hash the UTF-8 bytes of `input` and return the lowercase hex digest.
pub fn digest_hex(input: &str, algorithm: Algorithm) -> String {
    let bytes = input.as_bytes();
    match algorithm {
        Algorithm::Sha256 => rustcrypto_hex::<sha2::Sha256>(bytes),
        Algorithm::Sha512 => rustcrypto_hex::<sha2::Sha512>(bytes),
        Algorithm::Sha3_256 => rustcrypto_hex::<sha3::Sha3_256>(bytes),
        Algorithm::Blake3 => blake3::hash(bytes).to_hex().to_string(),
    }
}

fn rustcrypto_hex<D: sha2::Digest>(bytes: &[u8]) -> String {
    let mut hasher = D::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// True if `s` looks like a digest produced by `algorithm`.
pub fn is_digest_shaped(s: &str, algorithm: Algorithm) -> bool {
    s.len() == algorithm.hex_len() && s.chars().all(|c| c.is_ascii_hexdigit())
}
