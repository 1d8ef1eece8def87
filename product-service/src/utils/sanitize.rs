/// Longest string `sanitize` will return, in characters.
pub const MAX_SANITIZED_LEN: usize = 255;

const STRIPPED: [char; 4] = ['<', '>', '"', '\''];

/// Normalizes untrusted text: drops angle brackets and quotes, trims
/// surrounding whitespace and caps the result at [`MAX_SANITIZED_LEN`] chars.
///
/// Total and idempotent: `sanitize(&sanitize(x)) == sanitize(x)`.
pub fn sanitize(raw: &str) -> String {
    // Strip before trimming so removed characters can't leave whitespace exposed.
    let stripped: String = raw.chars().filter(|c| !STRIPPED.contains(c)).collect();

    let truncated: String = stripped.trim().chars().take(MAX_SANITIZED_LEN).collect();

    // Truncation can end on whitespace.
    truncated.trim_end().to_string()
}
