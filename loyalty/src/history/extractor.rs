//! Display projection of a [`Purchase`].
//!
//! A purchase belongs to one of three families and, within the family, the first matching
//! status wins:
//!
//! | Family   | Selected when          | Status priority                               |
//! |----------|------------------------|-----------------------------------------------|
//! | Draw     | `campaign_type == 0`   | winner > not winner > waiting                 |
//! | Delivery | `delivered`            | shipped with tracking > shipped > preparing   |
//! | Voucher  | otherwise              | expired > used > redeemed                     |

use std::sync::{Arc, PoisonError, RwLock};

use once_cell::sync::Lazy;

use crate::history::Purchase;
use crate::localization::{format_local_date, substitute, Locale};

/// `Type` of a lucky-draw campaign.
pub const DRAW_CAMPAIGN_TYPE: i32 = 0;

const BANGKOK_UTC_OFFSET_MINUTES: i32 = 7 * 60;

/// Label and color of one status.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct StatusStyle {
    /// Text shown to the user. May contain placeholders.
    pub label: String,
    /// Hex color, e.g. `#2E7D32`
    pub color: String,
}

impl StatusStyle {
    fn new(label: &str, color: &str) -> Self {
        Self {
            label: label.to_string(),
            color: color.to_string(),
        }
    }
}

/// Every text and color the history extractor uses.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct HistoryExtractorConfig {
    /// Voucher past its expiry
    pub expired: StatusStyle,
    /// Voucher already used
    pub used: StatusStyle,
    /// Voucher redeemed and ready to use
    pub redeemed: StatusStyle,
    /// Lucky draw won
    pub winner: StatusStyle,
    /// Lucky draw announced, not won
    pub not_winner: StatusStyle,
    /// Lucky draw not announced yet
    pub waiting: StatusStyle,
    /// Shipped with a parcel number; the label may use `{parcel_no}`
    pub shipped_with_tracking: StatusStyle,
    /// Shipped without a parcel number
    pub shipped: StatusStyle,
    /// Not shipped yet
    pub preparing: StatusStyle,
    /// Label of [`HistoryButtonCatalog::UseCoupon`]
    pub use_coupon_button: String,
    /// Label of [`HistoryButtonCatalog::ViewCode`]
    pub view_code_button: String,
    /// Label of [`HistoryButtonCatalog::ClaimPrize`]
    pub claim_prize_button: String,
    /// Label of [`HistoryButtonCatalog::TrackParcel`]
    pub track_parcel_button: String,
    /// Expiry text for purchases that are still valid; uses `{date}`
    pub expire_template: String,
    /// Expiry text for expired purchases
    pub expired_text: String,
    /// `chrono` format of `{date}`
    pub date_format: String,
    /// Offset from UTC used when formatting dates, in minutes
    pub utc_offset_minutes: i32,
}

impl HistoryExtractorConfig {
    /// Thai texts.
    #[must_use]
    pub fn thai() -> Self {
        Self {
            expired: StatusStyle::new("หมดอายุ", "#9E9E9E"),
            used: StatusStyle::new("ใช้แล้ว", "#757575"),
            redeemed: StatusStyle::new("พร้อมใช้งาน", "#2E7D32"),
            winner: StatusStyle::new("ได้รับรางวัล", "#F9A825"),
            not_winner: StatusStyle::new("ไม่ได้รับรางวัล", "#757575"),
            waiting: StatusStyle::new("รอประกาศผล", "#1565C0"),
            shipped_with_tracking: StatusStyle::new("จัดส่งแล้ว เลขพัสดุ {parcel_no}", "#2E7D32"),
            shipped: StatusStyle::new("จัดส่งแล้ว", "#2E7D32"),
            preparing: StatusStyle::new("กำลังเตรียมจัดส่ง", "#EF6C00"),
            use_coupon_button: "ใช้คูปอง".to_string(),
            view_code_button: "ดูรหัส".to_string(),
            claim_prize_button: "รับรางวัล".to_string(),
            track_parcel_button: "ติดตามพัสดุ".to_string(),
            expire_template: "ใช้ได้ถึง {date}".to_string(),
            expired_text: "หมดอายุแล้ว".to_string(),
            date_format: "%d/%m/%Y".to_string(),
            utc_offset_minutes: BANGKOK_UTC_OFFSET_MINUTES,
        }
    }

    /// English texts.
    #[must_use]
    pub fn english() -> Self {
        Self {
            expired: StatusStyle::new("Expired", "#9E9E9E"),
            used: StatusStyle::new("Used", "#757575"),
            redeemed: StatusStyle::new("Ready to use", "#2E7D32"),
            winner: StatusStyle::new("You won", "#F9A825"),
            not_winner: StatusStyle::new("Not a winner", "#757575"),
            waiting: StatusStyle::new("Waiting for announcement", "#1565C0"),
            shipped_with_tracking: StatusStyle::new("Shipped, tracking no. {parcel_no}", "#2E7D32"),
            shipped: StatusStyle::new("Shipped", "#2E7D32"),
            preparing: StatusStyle::new("Preparing shipment", "#EF6C00"),
            use_coupon_button: "Use coupon".to_string(),
            view_code_button: "View code".to_string(),
            claim_prize_button: "Claim prize".to_string(),
            track_parcel_button: "Track parcel".to_string(),
            expire_template: "Valid until {date}".to_string(),
            expired_text: "Expired".to_string(),
            date_format: "%d %b %Y".to_string(),
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

    fn button_label(&self, button: HistoryButtonCatalog) -> Option<String> {
        let label = match button {
            HistoryButtonCatalog::UseCoupon => &self.use_coupon_button,
            HistoryButtonCatalog::ViewCode => &self.view_code_button,
            HistoryButtonCatalog::ClaimPrize => &self.claim_prize_button,
            HistoryButtonCatalog::TrackParcel => &self.track_parcel_button,
            HistoryButtonCatalog::None => return None,
        };
        Some(label.clone())
    }
}

impl Default for HistoryExtractorConfig {
    fn default() -> Self {
        Self::thai()
    }
}

/// Which status rules apply to a purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum HistoryFamily {
    /// Coupons and e-vouchers
    Voucher,
    /// Lucky draws
    Draw,
    /// Physical rewards
    Delivery,
}

/// The derived status of a purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum HistoryStatusKind {
    /// Voucher past its expiry
    Expired,
    /// Voucher already used
    Used,
    /// Voucher ready to use
    Redeemed,
    /// Draw won
    Winner,
    /// Draw announced, not won
    NotWinner,
    /// Draw not announced
    Waiting,
    /// Shipped with a parcel number
    ShippedWithTracking,
    /// Shipped without a parcel number
    Shipped,
    /// Not shipped yet
    Preparing,
}

/// Status kind plus its configured label and color.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct DisplayStatus {
    /// Derived status
    pub kind: HistoryStatusKind,
    /// Label with placeholders substituted
    pub label: String,
    /// Hex color
    pub color: String,
}

/// The action button shown on a history row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum HistoryButtonCatalog {
    /// Open the coupon to use it
    UseCoupon,
    /// Show the serial code of a used voucher
    ViewCode,
    /// Claim a lucky-draw prize
    ClaimPrize,
    /// Open the carrier's tracking page
    TrackParcel,
    /// No button
    None,
}

/// What tapping a history row should do.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Enum)]
pub enum HistoryNextStep {
    /// Open the coupon screen
    OpenCoupon {
        /// Key of the redemption
        redeem_key: String,
    },
    /// Show the serial code
    ShowSerial {
        /// The code
        serial: String,
    },
    /// Start the prize claim
    ClaimPrize {
        /// Key of the redemption
        redeem_key: String,
    },
    /// Open parcel tracking
    TrackShipment {
        /// Carrier tracking number
        parcel_no: String,
    },
    /// The draw is not announced yet
    WaitForAnnouncement,
    /// The reward has not arrived yet
    AwaitShipment,
    /// Nothing to do
    NoAction,
}

/// Everything a history row shows.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct HistoryDisplay {
    /// Status rules that applied
    pub family: HistoryFamily,
    /// Status label and color
    pub status: DisplayStatus,
    /// Action button
    pub button: HistoryButtonCatalog,
    /// Label of the action button, `None` without a button
    pub button_label: Option<String>,
    /// What tapping the row should do
    pub next_step: HistoryNextStep,
    /// Expiry line, `None` when the expiry is unknown
    pub expire_text: Option<String>,
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Family selection: draw campaigns first, then delivered rewards.
#[must_use]
pub fn family_of(purchase: &Purchase) -> HistoryFamily {
    if purchase.campaign_type == Some(DRAW_CAMPAIGN_TYPE) {
        HistoryFamily::Draw
    } else if purchase.delivered.unwrap_or(false) {
        HistoryFamily::Delivery
    } else {
        HistoryFamily::Voucher
    }
}

/// Whether the purchase is past its expiry at `now` (unix seconds).
#[must_use]
pub fn is_expired(purchase: &Purchase, now: i64) -> bool {
    let past_expire_date = purchase
        .voucher_expire_date
        .is_some_and(|expiry| expiry > 0 && expiry <= now);
    let negative_expire_in = purchase.expire_in.is_some_and(|expire_in| expire_in < 0);
    past_expire_date || negative_expire_in
}

fn status_kind(purchase: &Purchase, family: HistoryFamily, now: i64) -> HistoryStatusKind {
    match family {
        HistoryFamily::Voucher => {
            if is_expired(purchase, now) {
                HistoryStatusKind::Expired
            } else if purchase.is_used.unwrap_or(false) {
                HistoryStatusKind::Used
            } else {
                HistoryStatusKind::Redeemed
            }
        }
        HistoryFamily::Draw => {
            let has_winner = purchase.has_winner.unwrap_or(false);
            if has_winner && purchase.is_winner.unwrap_or(false) {
                HistoryStatusKind::Winner
            } else if has_winner {
                HistoryStatusKind::NotWinner
            } else {
                HistoryStatusKind::Waiting
            }
        }
        HistoryFamily::Delivery => {
            let shipped = purchase.is_shipped.unwrap_or(false);
            if shipped && non_blank(purchase.parcel_no.as_deref()).is_some() {
                HistoryStatusKind::ShippedWithTracking
            } else if shipped {
                HistoryStatusKind::Shipped
            } else {
                HistoryStatusKind::Preparing
            }
        }
    }
}

fn display_status(
    purchase: &Purchase,
    kind: HistoryStatusKind,
    config: &HistoryExtractorConfig,
) -> DisplayStatus {
    let style = match kind {
        HistoryStatusKind::Expired => &config.expired,
        HistoryStatusKind::Used => &config.used,
        HistoryStatusKind::Redeemed => &config.redeemed,
        HistoryStatusKind::Winner => &config.winner,
        HistoryStatusKind::NotWinner => &config.not_winner,
        HistoryStatusKind::Waiting => &config.waiting,
        HistoryStatusKind::ShippedWithTracking => &config.shipped_with_tracking,
        HistoryStatusKind::Shipped => &config.shipped,
        HistoryStatusKind::Preparing => &config.preparing,
    };

    let label = if kind == HistoryStatusKind::ShippedWithTracking {
        let parcel_no = purchase.parcel_no.as_deref().unwrap_or_default().trim();
        substitute(&style.label, &[("parcel_no", parcel_no)])
    } else {
        style.label.clone()
    };

    DisplayStatus {
        kind,
        label,
        color: style.color.clone(),
    }
}

fn button_of(purchase: &Purchase, kind: HistoryStatusKind) -> HistoryButtonCatalog {
    match kind {
        HistoryStatusKind::Redeemed => HistoryButtonCatalog::UseCoupon,
        HistoryStatusKind::Used if non_blank(purchase.serial.as_deref()).is_some() => {
            HistoryButtonCatalog::ViewCode
        }
        HistoryStatusKind::Winner => HistoryButtonCatalog::ClaimPrize,
        HistoryStatusKind::ShippedWithTracking => HistoryButtonCatalog::TrackParcel,
        _ => HistoryButtonCatalog::None,
    }
}

fn next_step_of(purchase: &Purchase, kind: HistoryStatusKind) -> HistoryNextStep {
    let redeem_key = non_blank(purchase.redeem_key.as_deref()).map(str::to_string);
    match kind {
        HistoryStatusKind::Redeemed => redeem_key
            .map_or(HistoryNextStep::NoAction, |redeem_key| {
                HistoryNextStep::OpenCoupon { redeem_key }
            }),
        HistoryStatusKind::Used => non_blank(purchase.serial.as_deref())
            .map_or(HistoryNextStep::NoAction, |serial| HistoryNextStep::ShowSerial {
                serial: serial.to_string(),
            }),
        HistoryStatusKind::Winner => redeem_key
            .map_or(HistoryNextStep::NoAction, |redeem_key| {
                HistoryNextStep::ClaimPrize { redeem_key }
            }),
        HistoryStatusKind::ShippedWithTracking => HistoryNextStep::TrackShipment {
            parcel_no: purchase
                .parcel_no
                .as_deref()
                .unwrap_or_default()
                .trim()
                .to_string(),
        },
        HistoryStatusKind::Waiting => HistoryNextStep::WaitForAnnouncement,
        HistoryStatusKind::Shipped | HistoryStatusKind::Preparing => HistoryNextStep::AwaitShipment,
        HistoryStatusKind::Expired | HistoryStatusKind::NotWinner => HistoryNextStep::NoAction,
    }
}

fn expire_text(purchase: &Purchase, config: &HistoryExtractorConfig, now: i64) -> Option<String> {
    if is_expired(purchase, now) {
        return Some(config.expired_text.clone());
    }

    let expiry = purchase.voucher_expire_date.filter(|expiry| *expiry > 0)?;
    let date = format_local_date(expiry, config.utc_offset_minutes, &config.date_format)?;
    Some(substitute(&config.expire_template, &[("date", &date)]))
}

/// Derives the display projection of `purchase` at `now` (unix seconds).
#[must_use]
pub fn extract(purchase: &Purchase, config: &HistoryExtractorConfig, now: i64) -> HistoryDisplay {
    let family = family_of(purchase);
    let kind = status_kind(purchase, family, now);
    let button = button_of(purchase, kind);

    HistoryDisplay {
        family,
        status: display_status(purchase, kind, config),
        button,
        button_label: config.button_label(button),
        next_step: next_step_of(purchase, kind),
        expire_text: expire_text(purchase, config, now),
    }
}

static HISTORY_EXTRACTOR_CONFIG: Lazy<RwLock<Arc<HistoryExtractorConfig>>> =
    Lazy::new(|| RwLock::new(Arc::new(HistoryExtractorConfig::default())));

/// The config used by `HistoryUseCase::list_display` and [`extract_history_display`].
pub(crate) fn current_config() -> Arc<HistoryExtractorConfig> {
    HISTORY_EXTRACTOR_CONFIG
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Replaces the process-wide history texts.
#[uniffi::export]
pub fn set_history_extractor_config(config: HistoryExtractorConfig) {
    *HISTORY_EXTRACTOR_CONFIG
        .write()
        .unwrap_or_else(PoisonError::into_inner) = Arc::new(config);
    crate::debug!("history extractor config replaced");
}

/// The process-wide history texts.
#[uniffi::export]
#[must_use]
pub fn history_extractor_config() -> HistoryExtractorConfig {
    current_config().as_ref().clone()
}

/// Restores the Thai defaults.
#[uniffi::export]
pub fn reset_history_extractor_config() {
    set_history_extractor_config(HistoryExtractorConfig::default());
}

/// Default history texts for an LCID.
#[uniffi::export]
#[must_use]
pub fn history_extractor_config_for_locale(lcid: i32) -> HistoryExtractorConfig {
    HistoryExtractorConfig::default_for_locale(lcid)
}

/// Derives the display projection of `purchase` with the process-wide config.
#[uniffi::export]
#[must_use]
pub fn extract_history_display(purchase: Purchase, now: i64) -> HistoryDisplay {
    extract(&purchase, &current_config(), now)
}
