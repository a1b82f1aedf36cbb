//! Locale-tolerant price parsing
//!
//! Feed prices arrive as free-form strings: currency symbols, whitespace,
//! and either `.` or `,` as the decimal separator depending on the
//! merchant's locale ("1.234,56" vs "1,234.56").

/// Parse a raw price string into a decimal value.
///
/// Strips everything but digits, `.` and `,`, then treats whichever
/// separator occurs last as the decimal separator and drops the rest as
/// thousands separators. Total: returns `None` for anything that does not
/// parse, never panics.
///
/// Known heuristic limitation: a thousands-only value like "1,234" has no
/// decimal separator to disambiguate it and parses as 1.234. The existing
/// catalog was built with this behavior, so it is preserved rather than
/// guessed around.
pub fn parse_price(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | ','))
        .collect();

    if cleaned.is_empty() {
        return None;
    }

    let last_comma = cleaned.rfind(',');
    let last_dot = cleaned.rfind('.');

    let decimal_sep = match (last_comma, last_dot) {
        (Some(comma), Some(dot)) => {
            if comma > dot {
                Some(',')
            } else {
                Some('.')
            }
        }
        (Some(_), None) => Some(','),
        (None, Some(_)) => Some('.'),
        (None, None) => None,
    };

    let normalized: String = match decimal_sep {
        None => cleaned,
        Some(sep) => {
            // Keep only the final occurrence of the decimal separator;
            // every other separator is a thousands separator.
            let last_idx = cleaned.rfind(sep)?;
            cleaned
                .char_indices()
                .filter_map(|(i, c)| {
                    if c.is_ascii_digit() {
                        Some(c)
                    } else if i == last_idx {
                        Some('.')
                    } else {
                        None
                    }
                })
                .collect()
        }
    };

    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}
