//! Lenient parsing of query and path values.
//!
//! Clients send things like `?limit=10px` or `/api/character/3.0`; the
//! leading integer is honoured and the rest ignored.

/// Raw query pairs in request order. Repeated keys are kept, so nothing in
/// the query string can make extraction fail.
pub type QueryPairs = Vec<(String, String)>;

/// First `limit` value in the query, if any.
pub fn limit_param(pairs: &[(String, String)]) -> Option<&str> {
    pairs
        .iter()
        .find(|(key, _)| key == "limit")
        .map(|(_, value)| value.as_str())
}

/// Parse the leading integer of `raw`: optional surrounding whitespace, an
/// optional sign, then at least one ASCII digit. Overflow saturates.
pub fn leading_integer(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    let magnitude = digits[..end].bytes().fold(0i64, |acc, b| {
        acc.saturating_mul(10).saturating_add(i64::from(b - b'0'))
    });
    Some(if negative { -magnitude } else { magnitude })
}

/// Interpret a `limit` value. Anything that is not a positive integer means
/// "no limit".
pub fn parse_limit(raw: Option<&str>) -> Option<usize> {
    raw.and_then(leading_integer)
        .filter(|n| *n > 0)
        .map(|n| usize::try_from(n).unwrap_or(usize::MAX))
}

/// Interpret a character id path segment.
pub fn parse_id(raw: &str) -> Option<i64> {
    leading_integer(raw)
}
