use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeZone, Utc};

/// Normalise a timestamp to RFC 3339 in UTC; unparseable input is returned unchanged.
///
/// Timestamps without an offset, as found in SAFE manifests, are taken as UTC.
pub fn normalise_timestamp(value: &str) -> String {
    let value = value.trim();

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return format_utc(timestamp.with_timezone(&Utc));
    }

    match NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        Ok(timestamp) => format_utc(Utc.from_utc_datetime(&timestamp)),
        Err(_) => value.to_string(),
    }
}

fn format_utc(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// The creation time stamp of a document, to the second.
pub fn update_timestamp(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}
