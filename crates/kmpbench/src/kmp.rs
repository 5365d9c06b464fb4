//! Knuth-Morris-Pratt substring search over one streamed chunk.
//!
//! Ported from the reference benchmark's `build_prefix_function`/
//! `kmp_search`: prefix-function state is local to each call, so a match
//! straddling two chunk boundaries is not found. That limitation belongs
//! to this driver, not to the cache it streams through.

/// Builds the KMP failure function for `pattern`.
fn prefix_function(pattern: &[u8]) -> Vec<usize> {
    let mut prefix = vec![0usize; pattern.len()];
    let mut j = 0usize;
    for i in 1..pattern.len() {
        while j > 0 && pattern[i] != pattern[j] {
            j = prefix[j - 1];
        }
        if pattern[i] == pattern[j] {
            j += 1;
        }
        prefix[i] = j;
    }
    prefix
}

/// Returns the offset (relative to `base_offset`) of every occurrence of
/// `pattern` in `text`. An empty pattern matches nothing.
pub fn find_matches(pattern: &[u8], text: &[u8], base_offset: u64) -> Vec<u64> {
    if pattern.is_empty() {
        return Vec::new();
    }
    let prefix = prefix_function(pattern);
    let mut matches = Vec::new();
    let mut j = 0usize;
    for (i, &byte) in text.iter().enumerate() {
        while j > 0 && byte != pattern[j] {
            j = prefix[j - 1];
        }
        if byte == pattern[j] {
            j += 1;
        }
        if j == pattern.len() {
            matches.push(base_offset + (i + 1 - pattern.len()) as u64);
            j = prefix[j - 1];
        }
    }
    matches
}
