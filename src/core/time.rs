use time::macros::format_description;
use time::{format_description::well_known::Rfc3339, OffsetDateTime, PrimitiveDateTime, UtcOffset};

pub(crate) fn primitive_now_utc() -> PrimitiveDateTime {
    let now = OffsetDateTime::now_utc();
    PrimitiveDateTime::new(now.date(), now.time())
}

pub(crate) fn to_primitive_utc(value: OffsetDateTime) -> PrimitiveDateTime {
    let utc = value.to_offset(UtcOffset::UTC);
    PrimitiveDateTime::new(utc.date(), utc.time())
}

pub(crate) fn format_primitive(value: PrimitiveDateTime) -> String {
    value.assume_utc().format(&Rfc3339).unwrap_or_else(|_| value.assume_utc().to_string())
}

/// Accepts RFC 3339, `datetime-local` values without a zone, and bare dates (midnight UTC).
pub(crate) fn parse_datetime_flexible(raw: &str) -> Option<PrimitiveDateTime> {
    let raw = raw.trim();
    if let Ok(value) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(to_primitive_utc(value));
    }

    if let Ok(value) =
        PrimitiveDateTime::parse(raw, &format_description!("[year]-[month]-[day]T[hour]:[minute]"))
    {
        return Some(value);
    }
    if let Ok(value) = PrimitiveDateTime::parse(
        raw,
        &format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    ) {
        return Some(value);
    }
    if let Ok(value) = time::Date::parse(raw, &format_description!("[year]-[month]-[day]")) {
        return Some(value.midnight());
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::{Date, Time};

    fn at(year: i32, month: time::Month, day: u8, h: u8, m: u8, s: u8) -> PrimitiveDateTime {
        PrimitiveDateTime::new(
            Date::from_calendar_date(year, month, day).unwrap(),
            Time::from_hms(h, m, s).unwrap(),
        )
    }

    #[test]
    fn format_primitive_outputs_utc_z() {
        let value = at(2025, time::Month::January, 2, 10, 20, 30);
        assert_eq!(format_primitive(value), "2025-01-02T10:20:30Z");
    }

    #[test]
    fn parse_flexible_normalizes_offsets_to_utc() {
        let parsed = parse_datetime_flexible("2025-01-02T13:20:30+03:00").unwrap();
        assert_eq!(parsed, at(2025, time::Month::January, 2, 10, 20, 30));
    }

    #[test]
    fn parse_flexible_accepts_local_and_date_only_forms() {
        assert_eq!(
            parse_datetime_flexible("2025-03-04T08:15").unwrap(),
            at(2025, time::Month::March, 4, 8, 15, 0)
        );
        assert_eq!(
            parse_datetime_flexible("2025-03-04").unwrap(),
            at(2025, time::Month::March, 4, 0, 0, 0)
        );
        assert!(parse_datetime_flexible("next tuesday").is_none());
    }
}
