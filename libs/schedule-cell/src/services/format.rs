use chrono::{DateTime, NaiveDate, NaiveTime, Timelike};

/// 12-hour clock label: `8:00 AM`, `12:15 PM`, `12:00 AM` for midnight.
pub fn format_time_12h(time: NaiveTime) -> String {
    let hour = time.hour();
    let period = if hour >= 12 { "PM" } else { "AM" };
    let display_hour = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{}:{:02} {}", display_hour, time.minute(), period)
}

/// Short calendar label used by the date picker: `Mon, Jun 16`.
pub fn format_day_label(date: NaiveDate) -> String {
    date.format("%a, %b %-d").to_string()
}

/// Full calendar label: `Mon, Jun 16, 2025`.
pub fn format_date_label(date: NaiveDate) -> String {
    date.format("%a, %b %-d, %Y").to_string()
}

/// Time as stored on an appointment record. Values already carrying
/// AM/PM pass through; `HH:MM[:SS]` is converted; anything else is
/// returned untouched.
pub fn format_stored_time(raw: Option<&str>) -> String {
    let raw = match raw.map(str::trim) {
        Some(r) if !r.is_empty() => r,
        _ => return "N/A".to_string(),
    };

    if raw.contains("AM") || raw.contains("PM") {
        return raw.to_string();
    }

    let mut parts = raw.splitn(3, ':');
    match (parts.next(), parts.next()) {
        (Some(h), Some(m)) => match (h.parse::<u32>(), m.parse::<u32>()) {
            (Ok(h), Ok(m)) => NaiveTime::from_hms_opt(h, m, 0)
                .map(format_time_12h)
                .unwrap_or_else(|| raw.to_string()),
            _ => raw.to_string(),
        },
        _ => raw.to_string(),
    }
}

/// Date as stored on an appointment record (`YYYY-MM-DD` or RFC 3339).
pub fn format_stored_date(raw: Option<&str>) -> String {
    let raw = match raw.map(str::trim) {
        Some(r) if !r.is_empty() => r,
        _ => return "N/A".to_string(),
    };

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
        .map(format_date_label)
        .unwrap_or_else(|| "Invalid Date".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_twelve_hour_boundaries() {
        assert_eq!(format_time_12h(at(0, 0)), "12:00 AM");
        assert_eq!(format_time_12h(at(0, 45)), "12:45 AM");
        assert_eq!(format_time_12h(at(8, 0)), "8:00 AM");
        assert_eq!(format_time_12h(at(11, 59)), "11:59 AM");
        assert_eq!(format_time_12h(at(12, 0)), "12:00 PM");
        assert_eq!(format_time_12h(at(14, 15)), "2:15 PM");
        assert_eq!(format_time_12h(at(23, 5)), "11:05 PM");
    }

    #[test]
    fn test_date_labels() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 16).unwrap();
        assert_eq!(format_day_label(date), "Mon, Jun 16");
        assert_eq!(format_date_label(date), "Mon, Jun 16, 2025");
    }

    #[test]
    fn test_stored_time() {
        assert_eq!(format_stored_time(None), "N/A");
        assert_eq!(format_stored_time(Some("")), "N/A");
        assert_eq!(format_stored_time(Some("2:15 PM")), "2:15 PM");
        assert_eq!(format_stored_time(Some("14:15")), "2:15 PM");
        assert_eq!(format_stored_time(Some("00:30:00")), "12:30 AM");
        assert_eq!(format_stored_time(Some("Morning")), "Morning");
        assert_eq!(format_stored_time(Some("xx:10")), "xx:10");
    }

    #[test]
    fn test_stored_date() {
        assert_eq!(format_stored_date(None), "N/A");
        assert_eq!(format_stored_date(Some("2025-06-16")), "Mon, Jun 16, 2025");
        assert_eq!(format_stored_date(Some("2025-06-16T10:00:00Z")), "Mon, Jun 16, 2025");
        assert_eq!(format_stored_date(Some("yesterday")), "Invalid Date");
    }
}
