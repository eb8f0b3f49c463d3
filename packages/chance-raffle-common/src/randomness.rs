use cosmwasm_std::Uint256;
use sha2::{Digest, Sha256};

/// Expand a 32-byte seed into `num_words` independent random words.
///
/// word_i = sha256(seed || request_id (be) || i (be)), read as a big-endian Uint256.
pub fn derive_random_words(seed: &[u8], request_id: u64, num_words: u32) -> Vec<Uint256> {
    (0..num_words)
        .map(|i| {
            let mut hasher = Sha256::new();
            hasher.update(seed);
            hasher.update(request_id.to_be_bytes());
            hasher.update(i.to_be_bytes());
            let digest: [u8; 32] = hasher.finalize().into();
            Uint256::from_be_bytes(digest)
        })
        .collect()
}

/// Hex form of a word, as carried in event attributes.
pub fn word_hex(word: &Uint256) -> String {
    hex::encode(word.to_be_bytes())
}
