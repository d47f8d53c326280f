use serde::{Deserialize, Serialize};

/// Page identifier as the dump parser hands it over. Usually a string, occasionally a JSON number.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawPageId {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Default for RawPageId {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

/// Integer page id carried by a normalized record.
///
/// `NotANumber` is kept for sources without a leading integer instead of rejecting the document.
/// JSON has no NaN, so it serializes as `null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<i64>", into = "Option<i64>")]
pub enum PageId {
    Id(i64),
    NotANumber,
}

impl From<Option<i64>> for PageId {
    fn from(value: Option<i64>) -> Self {
        value.map_or(Self::NotANumber, Self::Id)
    }
}

impl From<PageId> for Option<i64> {
    fn from(value: PageId) -> Self {
        value.as_i64()
    }
}

impl PageId {
    /// Coerces a raw page id the way `parseInt` does: leading whitespace is skipped, an optional sign
    /// and `0x` prefix are honored, and parsing stops at the first non-digit.
    pub fn coerce(raw: &RawPageId) -> Self {
        match raw {
            RawPageId::Integer(value) => Self::Id(*value),
            RawPageId::Float(value) => coerce_float(*value),
            RawPageId::Text(text) => parse_leading_integer(text),
        }
    }

    pub fn as_i64(self) -> Option<i64> {
        match self {
            Self::Id(value) => Some(value),
            Self::NotANumber => None,
        }
    }

    pub fn is_nan(self) -> bool {
        matches!(self, Self::NotANumber)
    }
}

fn coerce_float(value: f64) -> PageId {
    if !value.is_finite() {
        return PageId::NotANumber;
    }

    let truncated = value.trunc();
    if truncated < i64::MIN as f64 || truncated >= i64::MAX as f64 {
        return PageId::NotANumber;
    }

    PageId::Id(truncated as i64)
}

fn parse_leading_integer(text: &str) -> PageId {
    let trimmed = text.trim_start_matches(|ch: char| ch.is_whitespace() || ch == '\u{feff}');

    let (negative, unsigned) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let (radix, digits) = match unsigned
        .strip_prefix("0x")
        .or_else(|| unsigned.strip_prefix("0X"))
    {
        Some(hex) => (16, hex),
        None => (10, unsigned),
    };

    let mut value: i64 = 0;
    let mut consumed = 0_usize;
    for ch in digits.chars() {
        let Some(digit) = ch.to_digit(radix) else {
            break;
        };
        let signed_digit = if negative {
            -i64::from(digit)
        } else {
            i64::from(digit)
        };
        // Out-of-range ids fall back to the sentinel rather than a lossy float.
        let Some(next) = value
            .checked_mul(i64::from(radix))
            .and_then(|shifted| shifted.checked_add(signed_digit))
        else {
            return PageId::NotANumber;
        };
        value = next;
        consumed += 1;
    }

    if consumed == 0 {
        return PageId::NotANumber;
    }

    PageId::Id(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coerce_text(text: &str) -> PageId {
        PageId::coerce(&RawPageId::Text(text.to_string()))
    }

    #[test]
    fn coerces_plain_and_padded_strings() {
        assert_eq!(coerce_text("123"), PageId::Id(123));
        assert_eq!(coerce_text("  42"), PageId::Id(42));
        assert_eq!(coerce_text("\n+7"), PageId::Id(7));
        assert_eq!(coerce_text("-15"), PageId::Id(-15));
    }

    #[test]
    fn stops_at_first_non_digit() {
        assert_eq!(coerce_text("12abc"), PageId::Id(12));
        assert_eq!(coerce_text("3.9"), PageId::Id(3));
        assert_eq!(coerce_text("0x1A"), PageId::Id(26));
    }

    #[test]
    fn non_numeric_sources_become_sentinel() {
        assert_eq!(coerce_text(""), PageId::NotANumber);
        assert_eq!(coerce_text("abc"), PageId::NotANumber);
        assert_eq!(coerce_text("-"), PageId::NotANumber);
        assert_eq!(coerce_text("0x"), PageId::NotANumber);
        assert_eq!(coerce_text("99999999999999999999"), PageId::NotANumber);
    }

    #[test]
    fn numeric_sources_are_truncated() {
        assert_eq!(PageId::coerce(&RawPageId::Integer(55)), PageId::Id(55));
        assert_eq!(PageId::coerce(&RawPageId::Float(12.7)), PageId::Id(12));
        assert_eq!(
            PageId::coerce(&RawPageId::Float(f64::NAN)),
            PageId::NotANumber
        );
    }

    #[test]
    fn raw_page_id_accepts_strings_and_numbers() {
        let from_string: RawPageId = serde_json::from_str("\"123\"").unwrap();
        let from_int: RawPageId = serde_json::from_str("123").unwrap();
        let from_float: RawPageId = serde_json::from_str("123.5").unwrap();

        assert_eq!(from_string, RawPageId::Text("123".to_string()));
        assert_eq!(from_int, RawPageId::Integer(123));
        assert_eq!(from_float, RawPageId::Float(123.5));
    }

    #[test]
    fn sentinel_serializes_as_null() {
        assert_eq!(serde_json::to_string(&PageId::Id(9)).unwrap(), "9");
        assert_eq!(serde_json::to_string(&PageId::NotANumber).unwrap(), "null");

        let parsed: PageId = serde_json::from_str("null").unwrap();
        assert!(parsed.is_nan());
    }
}
