//! Locale handling and `{placeholder}` substitution for display texts.

use std::collections::HashMap;
use std::fmt::Write;

use chrono::{DateTime, FixedOffset};

use crate::warn;

/// Languages the platform serves, identified on the wire by their Windows LCID.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, uniffi::Enum)]
pub enum Locale {
    /// Thai, LCID 1054
    #[default]
    Thai,
    /// English, LCID 1033
    English,
}

impl Locale {
    /// LCID sent to the platform.
    #[must_use]
    pub const fn lcid(self) -> i32 {
        match self {
            Self::Thai => 1054,
            Self::English => 1033,
        }
    }

    /// Parses an LCID; `None` for languages the platform does not serve.
    #[must_use]
    pub const fn from_lcid(lcid: i32) -> Option<Self> {
        match lcid {
            1054 => Some(Self::Thai),
            1033 => Some(Self::English),
            _ => None,
        }
    }

    /// Two-letter language tag for `Accept-Language`.
    #[must_use]
    pub const fn language_tag(self) -> &'static str {
        match self {
            Self::Thai => "th",
            Self::English => "en",
        }
    }
}

/// Returns the LCID for `locale`.
#[uniffi::export]
#[must_use]
pub fn locale_lcid(locale: Locale) -> i32 {
    locale.lcid()
}

/// Replaces `{key}` placeholders in `template`.
///
/// Placeholders without a value, and unbalanced braces, are kept as written. Substituted values
/// are not scanned again.
///
/// ```rust
/// use loyalty::localization::substitute;
///
/// let text = substitute("Tracking no. {parcel_no} ({carrier})", &[("parcel_no", "TH123")]);
/// assert_eq!(text, "Tracking no. TH123 ({carrier})");
/// ```
#[must_use]
pub fn substitute(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after_open = &rest[open + 1..];
        let Some(close) = after_open.find('}') else {
            out.push_str(&rest[open..]);
            return out;
        };

        let key = &after_open[..close];
        if let Some(inner) = key.rfind('{') {
            out.push_str(&rest[open..=open + inner]);
            rest = &after_open[inner..];
            continue;
        }
        match values.iter().find(|(name, _)| *name == key) {
            Some((_, value)) => out.push_str(value),
            None => out.push_str(&rest[open..=open + 1 + close]),
        }
        rest = &after_open[close + 1..];
    }

    out.push_str(rest);
    out
}

/// Formats unix seconds as a local date at `utc_offset_minutes` with a `chrono` strftime
/// `format`.
///
/// `None` when the offset or timestamp is out of range, or when `format` holds an unknown
/// specifier.
pub(crate) fn format_local_date(
    timestamp: i64,
    utc_offset_minutes: i32,
    format: &str,
) -> Option<String> {
    let offset = FixedOffset::east_opt(utc_offset_minutes.saturating_mul(60))?;
    let date = DateTime::from_timestamp(timestamp, 0)?.with_timezone(&offset);
    let mut text = String::new();
    if write!(text, "{}", date.format(format)).is_err() {
        warn!("invalid date format {format:?}");
        return None;
    }
    Some(text)
}

/// Replaces `{key}` placeholders in `template` with entries of `values`.
#[uniffi::export]
#[must_use]
pub fn substitute_text(template: String, values: HashMap<String, String>) -> String {
    let pairs: Vec<(&str, &str)> = values
        .iter()
        .map(|(key, value)| (key.as_str(), value.as_str()))
        .collect();
    substitute(&template, &pairs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lcid_round_trip() {
        assert_eq!(Locale::from_lcid(1054), Some(Locale::Thai));
        assert_eq!(Locale::from_lcid(1033), Some(Locale::English));
        assert_eq!(Locale::from_lcid(1041), None);
        assert_eq!(Locale::English.lcid(), 1033);
        assert_eq!(Locale::Thai.language_tag(), "th");
    }

    #[test]
    fn test_substitute_multiple_placeholders() {
        let text = substitute(
            "{title}: {points} pts",
            &[("points", "+120"), ("title", "Coffee")],
        );
        assert_eq!(text, "Coffee: +120 pts");
    }

    #[test]
    fn test_substitute_keeps_unknown_and_unbalanced() {
        assert_eq!(substitute("Hi {name}", &[]), "Hi {name}");
        assert_eq!(substitute("open { brace", &[("x", "y")]), "open { brace");
        assert_eq!(substitute("no placeholders", &[("x", "y")]), "no placeholders");
    }

    #[test]
    fn test_substituted_values_are_not_rescanned() {
        let text = substitute("{a}", &[("a", "{b}"), ("b", "nope")]);
        assert_eq!(text, "{b}");
    }

    #[test]
    fn test_stray_brace_before_placeholder() {
        assert_eq!(substitute("a { b {x}", &[("x", "1")]), "a { b 1");
        assert_eq!(substitute("{{x}}", &[("x", "1")]), "{1}");
    }

    #[test]
    fn test_format_local_date() {
        // 2025-12-31T00:00:00Z
        assert_eq!(
            format_local_date(1_767_139_200, 420, "%d/%m/%Y %H:%M").as_deref(),
            Some("31/12/2025 07:00")
        );
        assert_eq!(format_local_date(1_767_139_200, 420, "%d %Q"), None);
        assert_eq!(format_local_date(1_767_139_200, 100_000, "%d"), None);
    }

    #[test]
    fn test_substitute_handles_thai_text() {
        let text = substitute("หมดอายุ {date}", &[("date", "31/12/2026")]);
        assert_eq!(text, "หมดอายุ 31/12/2026");
    }

    #[test]
    fn test_substitute_text_from_map() {
        let values = HashMap::from([("name".to_string(), "Jane".to_string())]);
        assert_eq!(substitute_text("Hello {name}".to_string(), values), "Hello Jane");
    }
}
