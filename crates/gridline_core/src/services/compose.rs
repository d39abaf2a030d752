//! Request composition.
//!
//! Turns a [`QueryState`] into a complete, deterministically ordered request
//! string. Pure: no network, no state, identical input yields an identical
//! string.

use crate::error::GridlineError;
use crate::models::QueryState;

use percent_encoding::{percent_encode, AsciiSet, NON_ALPHANUMERIC};
use url::Url;

/// RFC 3986 unreserved characters pass through; everything else is encoded.
const VALUE_SET: &AsciiSet =
    &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.').remove(b'~');

/// Percent-encode a value destined for a URL, defensively.
///
/// A valid `%XX` escape already present in the input is left intact instead
/// of having its `%` re-encoded, so values that arrive partially encoded
/// upstream are not corrupted. Encoding is therefore idempotent:
/// `safe_encode(safe_encode(v)) == safe_encode(v)`.
pub fn safe_encode(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut out = String::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            if i + 2 < bytes.len()
                && bytes[i + 1].is_ascii_hexdigit()
                && bytes[i + 2].is_ascii_hexdigit()
            {
                out.push_str(&raw[i..i + 3]);
                i += 3;
            } else {
                out.push_str("%25");
                i += 1;
            }
        } else {
            // Encode the run up to the next '%'. '%' is single-byte ASCII,
            // so these offsets are always char boundaries.
            let run_end = bytes[i..]
                .iter()
                .position(|&b| b == b'%')
                .map(|p| i + p)
                .unwrap_or(bytes.len());
            out.extend(percent_encode(&bytes[i..run_end], VALUE_SET));
            i = run_end;
        }
    }
    out
}

/// Compose the full request string for `state` against `base`.
///
/// Parameter order is fixed: `startTime`, `endTime`, scope keys, `filter`
/// (only when the pruned filter is non-empty), `sortField`, `sort`, `limit`
/// (only when positive), `period`.
pub fn compose(base: &str, state: &QueryState) -> Result<String, GridlineError> {
    // Validate the endpoint up front; the string itself is assembled by hand
    // to keep the parameter order fixed.
    Url::parse(base)?;

    let mut filters = state.filters.clone();
    filters.prune_empty();

    let mut pairs: Vec<(&'static str, String)> = Vec::new();
    pairs.push(("startTime", state.time_range.start_rfc3339()));
    pairs.push(("endTime", state.time_range.end_rfc3339()));

    for (key, value) in state.scope.entries() {
        pairs.push((key, safe_encode(value)));
    }

    if !filters.items.is_empty() {
        let json = filters
            .to_json()
            .map_err(|e| GridlineError::invalid_query(format!("unencodable filter: {e}")))?;
        pairs.push(("filter", safe_encode(&json)));
    }

    pairs.push(("sortField", state.sort.field.as_str().to_string()));
    pairs.push(("sort", state.sort.direction.as_str().to_string()));

    if state.limit > 0 {
        pairs.push(("limit", state.limit.to_string()));
    }

    pairs.push(("period", safe_encode(state.period.as_str())));

    let query: Vec<String> =
        pairs.into_iter().map(|(key, value)| format!("{key}={value}")).collect();
    let separator = if base.contains('?') { '&' } else { '?' };
    Ok(format!("{base}{separator}{}", query.join("&")))
}
