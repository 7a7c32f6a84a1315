//! Display projection of a [`PointLog`].

use std::sync::{Arc, PoisonError, RwLock};

use once_cell::sync::Lazy;

use crate::localization::{format_local_date, substitute, Locale};
use crate::wallet::PointLog;

const BANGKOK_UTC_OFFSET_MINUTES: i32 = 7 * 60;

/// What a point movement was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum PointLogKind {
    /// Points received
    Earn,
    /// Points spent
    Burn,
    /// Points lost to expiry
    Expire,
    /// Manual correction, either direction
    Adjust,
    /// Any other type
    Other,
}

impl PointLogKind {
    /// Parses the platform's `Type` field, case-insensitively.
    #[must_use]
    pub fn parse(kind: Option<&str>) -> Self {
        match kind.map(|k| k.trim().to_ascii_lowercase()).as_deref() {
            Some("earn") => Self::Earn,
            Some("burn") => Self::Burn,
            Some("expire") => Self::Expire,
            Some("adjust") => Self::Adjust,
            _ => Self::Other,
        }
    }
}

/// Title template and color of one kind.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct PointLogStyle {
    /// Title; may use `{title}` and `{points}`
    pub title_template: String,
    /// Hex color of the amount
    pub color: String,
}

impl PointLogStyle {
    fn new(title_template: &str, color: &str) -> Self {
        Self {
            title_template: title_template.to_string(),
            color: color.to_string(),
        }
    }
}

/// Every text and color the point-log extractor uses.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct PointLogExtractorConfig {
    /// [`PointLogKind::Earn`]
    pub earn: PointLogStyle,
    /// [`PointLogKind::Burn`]
    pub burn: PointLogStyle,
    /// [`PointLogKind::Expire`]
    pub expire: PointLogStyle,
    /// [`PointLogKind::Adjust`]
    pub adjust: PointLogStyle,
    /// [`PointLogKind::Other`]
    pub other: PointLogStyle,
    /// `chrono` format of the date line
    pub date_format: String,
    /// Offset from UTC used when formatting dates, in minutes
    pub utc_offset_minutes: i32,
}

impl PointLogExtractorConfig {
    /// Thai texts.
    #[must_use]
    pub fn thai() -> Self {
        Self {
            earn: PointLogStyle::new("{title}", "#2E7D32"),
            burn: PointLogStyle::new("{title}", "#C62828"),
            expire: PointLogStyle::new("คะแนนหมดอายุ {points} คะแนน", "#9E9E9E"),
            adjust: PointLogStyle::new("ปรับปรุงคะแนน", "#1565C0"),
            other: PointLogStyle::new("{title}", "#616161"),
            date_format: "%d/%m/%Y %H:%M".to_string(),
            utc_offset_minutes: BANGKOK_UTC_OFFSET_MINUTES,
        }
    }

    /// English texts.
    #[must_use]
    pub fn english() -> Self {
        Self {
            earn: PointLogStyle::new("{title}", "#2E7D32"),
            burn: PointLogStyle::new("{title}", "#C62828"),
            expire: PointLogStyle::new("{points} points expired", "#9E9E9E"),
            adjust: PointLogStyle::new("Points adjustment", "#1565C0"),
            other: PointLogStyle::new("{title}", "#616161"),
            date_format: "%d %b %Y %H:%M".to_string(),
            utc_offset_minutes: BANGKOK_UTC_OFFSET_MINUTES,
        }
    }

    /// Texts for an LCID; Thai for unsupported ones.
    #[must_use]
    pub fn default_for_locale(lcid: i32) -> Self {
        match Locale::from_lcid(lcid).unwrap_or_default() {
            Locale::Thai => Self::thai(),
            Locale::English => Self::english(),
        }
    }

    const fn style(&self, kind: PointLogKind) -> &PointLogStyle {
        match kind {
            PointLogKind::Earn => &self.earn,
            PointLogKind::Burn => &self.burn,
            PointLogKind::Expire => &self.expire,
            PointLogKind::Adjust => &self.adjust,
            PointLogKind::Other => &self.other,
        }
    }
}

impl Default for PointLogExtractorConfig {
    fn default() -> Self {
        Self::thai()
    }
}

/// Everything a point-log row shows.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct PointLogDisplay {
    /// Parsed movement type
    pub kind: PointLogKind,
    /// Title with placeholders substituted
    pub title: String,
    /// Signed amount, e.g. `+100` or `-50`
    pub amount_text: String,
    /// Hex color of the amount
    pub color: String,
    /// Formatted date, `None` when unknown
    pub date_text: Option<String>,
}

/// Whole numbers without decimals, everything else with two.
fn format_points(points: f64) -> String {
    if points.fract().abs() < f64::EPSILON {
        format!("{points:.0}")
    } else {
        format!("{points:.2}")
    }
}

fn signed_amount(kind: PointLogKind, points: f64) -> String {
    let magnitude = format_points(points.abs());
    let negative = match kind {
        PointLogKind::Earn => false,
        PointLogKind::Burn | PointLogKind::Expire => true,
        PointLogKind::Adjust | PointLogKind::Other => points < 0.0,
    };
    if negative {
        format!("-{magnitude}")
    } else {
        format!("+{magnitude}")
    }
}

fn date_text(log: &PointLog, config: &PointLogExtractorConfig) -> Option<String> {
    let timestamp = log.create_date.filter(|ts| *ts > 0)?;
    format_local_date(timestamp, config.utc_offset_minutes, &config.date_format)
}

/// Derives the display projection of `log`.
#[must_use]
pub fn extract(log: &PointLog, config: &PointLogExtractorConfig) -> PointLogDisplay {
    let kind = PointLogKind::parse(log.kind.as_deref());
    let style = config.style(kind);
    let points = log.points.unwrap_or_default();
    let title = log.title.as_deref().unwrap_or_default().trim();

    PointLogDisplay {
        kind,
        title: substitute(
            &style.title_template,
            &[("title", title), ("points", &format_points(points.abs()))],
        ),
        amount_text: signed_amount(kind, points),
        color: style.color.clone(),
        date_text: date_text(log, config),
    }
}

static POINT_LOG_EXTRACTOR_CONFIG: Lazy<RwLock<Arc<PointLogExtractorConfig>>> =
    Lazy::new(|| RwLock::new(Arc::new(PointLogExtractorConfig::default())));

pub(crate) fn current_config() -> Arc<PointLogExtractorConfig> {
    POINT_LOG_EXTRACTOR_CONFIG
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Replaces the process-wide point-log texts.
#[uniffi::export]
pub fn set_point_log_extractor_config(config: PointLogExtractorConfig) {
    *POINT_LOG_EXTRACTOR_CONFIG
        .write()
        .unwrap_or_else(PoisonError::into_inner) = Arc::new(config);
}

/// The process-wide point-log texts.
#[uniffi::export]
#[must_use]
pub fn point_log_extractor_config() -> PointLogExtractorConfig {
    current_config().as_ref().clone()
}

/// Restores the Thai defaults.
#[uniffi::export]
pub fn reset_point_log_extractor_config() {
    set_point_log_extractor_config(PointLogExtractorConfig::default());
}

/// Default point-log texts for an LCID.
#[uniffi::export]
#[must_use]
pub fn point_log_extractor_config_for_locale(lcid: i32) -> PointLogExtractorConfig {
    PointLogExtractorConfig::default_for_locale(lcid)
}

/// Derives the display projection of `log` with the process-wide config.
#[uniffi::export]
#[must_use]
pub fn extract_point_log_display(log: PointLog) -> PointLogDisplay {
    extract(&log, &current_config())
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    fn log(kind: &str, points: f64) -> PointLog {
        PointLog {
            kind: Some(kind.to_string()),
            title: Some("Latte at Siam".to_string()),
            points: Some(points),
            ..PointLog::default()
        }
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!(PointLogKind::parse(Some("earn")), PointLogKind::Earn);
        assert_eq!(PointLogKind::parse(Some("BURN")), PointLogKind::Burn);
        assert_eq!(PointLogKind::parse(Some(" Expire ")), PointLogKind::Expire);
        assert_eq!(PointLogKind::parse(Some("adjust")), PointLogKind::Adjust);
        assert_eq!(PointLogKind::parse(Some("transfer")), PointLogKind::Other);
        assert_eq!(PointLogKind::parse(None), PointLogKind::Other);
    }

    #[test]
    fn test_amounts_are_signed() {
        let config = PointLogExtractorConfig::english();
        assert_eq!(extract(&log("earn", 100.0), &config).amount_text, "+100");
        assert_eq!(extract(&log("burn", 50.0), &config).amount_text, "-50");
        assert_eq!(extract(&log("burn", -50.0), &config).amount_text, "-50");
        assert_eq!(extract(&log("expire", 12.5), &config).amount_text, "-12.50");
        assert_eq!(extract(&log("adjust", -3.0), &config).amount_text, "-3");
        assert_eq!(extract(&log("adjust", 3.0), &config).amount_text, "+3");
    }

    #[test]
    fn test_title_templates() {
        let config = PointLogExtractorConfig::english();

        let display = extract(&log("earn", 100.0), &config);
        assert_eq!(display.title, "Latte at Siam");
        assert_eq!(display.color, "#2E7D32");

        let display = extract(&log("expire", 20.0), &config);
        assert_eq!(display.title, "20 points expired");

        let display = extract(&log("expire", 20.0), &PointLogExtractorConfig::thai());
        assert_eq!(display.title, "คะแนนหมดอายุ 20 คะแนน");
    }

    #[test]
    fn test_date_text() {
        let mut entry = log("earn", 1.0);
        assert_eq!(extract(&entry, &PointLogExtractorConfig::thai()).date_text, None);

        entry.create_date = Some(1_767_139_200);
        assert_eq!(
            extract(&entry, &PointLogExtractorConfig::thai())
                .date_text
                .as_deref(),
            Some("31/12/2025 07:00")
        );
    }

    #[test]
    fn test_unknown_date_specifier_drops_date_text() {
        let mut entry = log("burn", 50.0);
        entry.create_date = Some(1_767_139_200);
        let mut config = PointLogExtractorConfig::english();
        config.date_format = "%Q".to_string();

        let display = extract(&entry, &config);

        assert_eq!(display.date_text, None);
        assert_eq!(display.amount_text, "-50");
    }

    #[test]
    #[serial]
    fn test_process_wide_config() {
        reset_point_log_extractor_config();
        assert_eq!(point_log_extractor_config(), PointLogExtractorConfig::thai());

        set_point_log_extractor_config(PointLogExtractorConfig::english());
        assert_eq!(
            extract_point_log_display(log("adjust", 5.0)).title,
            "Points adjustment"
        );

        reset_point_log_extractor_config();
        assert_eq!(
            point_log_extractor_config_for_locale(1054),
            point_log_extractor_config()
        );
    }
}
