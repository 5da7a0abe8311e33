//! Magnitude string parsing and formatting
//!
//! Counters on the page are human-compact strings such as "1.2K", "3,402" or
//! "4M". Three conversions exist and they are deliberately not merged:
//! [`parse_magnitude`] for ranking and averaging, [`format_magnitude`] for
//! display, and [`normalize_count`] for the CSV columns.

const THOUSAND: f64 = 1_000.0;
const MILLION: f64 = 1_000_000.0;

/// Longest leading `digits[.digits]` prefix as a float.
fn leading_float(s: &str) -> Option<f64> {
    let mut end = 0;
    let mut seen_dot = false;
    let mut seen_digit = false;
    for (i, c) in s.char_indices() {
        match c {
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end = i + c.len_utf8();
    }
    if !seen_digit {
        return None;
    }
    s[..end].trim_end_matches('.').parse().ok()
}

/// Longest leading run of digits as an integer.
fn leading_integer(s: &str) -> Option<u64> {
    let end = s
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map_or(s.len(), |(i, _)| i);
    s[..end].parse().ok()
}

/// The plain integer reading of a counter, ignoring any suffix: "1,500" is
/// 1500, "12K" is 12.
pub fn parse_plain_integer(text: &str) -> u64 {
    leading_integer(text.trim().replace(',', "").as_str()).unwrap_or(0)
}

/// Suffix letter found in `lowered` together with its multiplier. `k` is
/// checked before `m`.
fn scale_of(lowered: &str) -> Option<(char, f64)> {
    [('k', THOUSAND), ('m', MILLION)]
        .into_iter()
        .find(|(suffix, _)| lowered.contains(*suffix))
}

/// Parse a magnitude string into an integer. Unparseable input is 0.
///
/// "3.5k" reads the digits first and the suffix second, giving 3500.
pub fn parse_magnitude(text: &str) -> u64 {
    let cleaned = text.trim().to_lowercase().replace(',', "");

    if let Some((suffix, multiplier)) = scale_of(&cleaned) {
        let numeric = cleaned.replacen(suffix, "", 1);
        return leading_float(numeric.trim())
            .map(|value| (value * multiplier).round() as u64)
            .unwrap_or(0);
    }

    leading_integer(&cleaned).unwrap_or(0)
}

/// Compact display form: "2.0K", "1.5M", or the plain number below 1000.
/// Lossy, only meant for display.
pub fn format_magnitude(value: u64) -> String {
    let n = value as f64;
    if n >= MILLION {
        format!("{:.1}M", n / MILLION)
    } else if n >= THOUSAND {
        format!("{:.1}K", n / THOUSAND)
    } else {
        value.to_string()
    }
}

/// Expand a counter for the CSV columns: "1.2K" becomes "1200", "1,234"
/// becomes "1234". Anything else is only stripped of separators and trimmed.
pub fn normalize_count(text: &str) -> String {
    let lowered = text.to_lowercase();

    for (suffix, multiplier) in [('k', THOUSAND), ('m', MILLION)] {
        if !lowered.contains(suffix) {
            continue;
        }
        let numeric = lowered.replacen(suffix, "", 1).replace(',', "");
        if let Some(value) = leading_float(numeric.trim()) {
            return ((value * multiplier).round() as u64).to_string();
        }
    }

    text.replace(',', "").trim().to_string()
}
