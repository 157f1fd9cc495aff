use chrono::{Datelike, Local, TimeZone, Timelike};

/// Render epoch milliseconds as `YYYY.MM.DD HH:MM` in local time.
pub fn format_datetime(timestamp_ms: i64) -> String {
    format_datetime_in(timestamp_ms, &Local)
}

/// Render epoch milliseconds as `YYYY.MM.DD HH:MM` in the given zone.
///
/// Timestamps outside the representable range render as an empty string.
pub fn format_datetime_in<Tz: TimeZone>(timestamp_ms: i64, tz: &Tz) -> String {
    let Some(dt) = tz.timestamp_millis_opt(timestamp_ms).earliest() else {
        return String::new();
    };
    format!(
        "{:04}.{:02}.{:02} {:02}:{:02}",
        dt.year(),
        dt.month(),
        dt.day(),
        dt.hour(),
        dt.minute()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    #[test]
    fn test_format_datetime_utc() {
        // 2024-03-05T07:04:09Z
        assert_eq!(format_datetime_in(1_709_622_249_000, &Utc), "2024.03.05 07:04");
        assert_eq!(format_datetime_in(0, &Utc), "1970.01.01 00:00");
    }

    #[test]
    fn test_format_datetime_uses_zone() {
        let seoul = FixedOffset::east_opt(9 * 3600).unwrap();
        assert_eq!(format_datetime_in(1_709_622_249_000, &seoul), "2024.03.05 16:04");
        assert_eq!(format_datetime_in(0, &seoul), "1970.01.01 09:00");
    }

    #[test]
    fn test_format_datetime_local_midnight() {
        let midnight = Local
            .with_ymd_and_hms(2024, 3, 1, 0, 0, 0)
            .earliest()
            .unwrap()
            .timestamp_millis();
        assert_eq!(format_datetime(midnight), "2024.03.01 00:00");
    }

    #[test]
    fn test_format_datetime_is_24_hour() {
        let evening = Utc
            .with_ymd_and_hms(2024, 12, 25, 23, 5, 0)
            .unwrap()
            .timestamp_millis();
        assert_eq!(format_datetime_in(evening, &Utc), "2024.12.25 23:05");
    }

    #[test]
    fn test_format_datetime_out_of_range() {
        assert_eq!(format_datetime_in(i64::MAX, &Utc), "");
    }
}
