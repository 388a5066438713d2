/// Shortest accepted search term, in characters
pub const MIN_SEARCH_LEN: usize = 2;

/// Maximum number of units returned by a search
pub const SEARCH_LIMIT: i64 = 50;
