use chrono::{DateTime, Local, TimeZone, Utc};
use opsbell_bridge::notification::NotificationKind;
use opsbell_bridge::toast::ToastKind;

/// Icon shown in front of a notification of the given kind.
pub fn icon(kind: NotificationKind) -> &'static str {
    match kind {
        NotificationKind::Order => "📦",
        NotificationKind::Assigned => "🚚",
        NotificationKind::Claimed => "✅",
        NotificationKind::Status => "📊",
        _ => "🔔",
    }
}

pub fn toast_label(kind: ToastKind) -> &'static str {
    match kind {
        ToastKind::Info => "info",
        ToastKind::Success => "ok",
        ToastKind::Warning => "warning",
        ToastKind::Error => "error",
    }
}

/// Formats a creation timestamp in the user's local time zone.
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    format_timestamp_in(timestamp, &Local)
}

fn format_timestamp_in<Tz: TimeZone>(timestamp: DateTime<Utc>, zone: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    timestamp
        .with_timezone(zone)
        .format("%d/%m/%Y, %H:%M:%S")
        .to_string()
}
