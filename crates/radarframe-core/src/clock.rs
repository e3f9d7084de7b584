//! Server-supplied wall-clock time, parsed from the HTTP `Date` header.
//!
//! The device has no battery-backed calendar, so the response header is
//! the authoritative clock source for wake scheduling.

use crate::error::ErrorKind;

/// Locale-independent month table used by RFC 1123 dates.
const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Structured date/time from the response `Date` header.
///
/// The all-zero value is the "not received" sentinel.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ServerDateTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl ServerDateTime {
    pub const NONE: Self = Self {
        year: 0,
        month: 0,
        day: 0,
        hour: 0,
        minute: 0,
        second: 0,
    };

    pub fn is_none(&self) -> bool {
        *self == Self::NONE
    }
}

/// Parses an RFC 1123 `Date` header value, e.g.
/// `Tue, 15 Nov 1994 08:12:31 GMT`.
///
/// Only the fixed-length GMT form servers actually emit is accepted.
pub fn parse_http_date(value: &str) -> Result<ServerDateTime, ErrorKind> {
    // Strip the weekday; scheduling only needs date and time of day.
    let rest = value
        .split_once(", ")
        .map(|(_, rest)| rest)
        .unwrap_or(value)
        .trim();

    let mut fields = rest.split(' ').filter(|part| !part.is_empty());

    let day = parse_u16(fields.next().ok_or(ErrorKind::DateParse)?)?;
    let month_name = fields.next().ok_or(ErrorKind::DateParse)?;
    let year = parse_u16(fields.next().ok_or(ErrorKind::DateParse)?)?;
    let clock = fields.next().ok_or(ErrorKind::DateParse)?;

    let month = MONTHS
        .iter()
        .position(|name| *name == month_name)
        .ok_or(ErrorKind::DateParse)? as u8
        + 1;

    let mut clock_fields = clock.split(':');
    let hour = parse_u16(clock_fields.next().ok_or(ErrorKind::DateParse)?)?;
    let minute = parse_u16(clock_fields.next().ok_or(ErrorKind::DateParse)?)?;
    let second = parse_u16(clock_fields.next().ok_or(ErrorKind::DateParse)?)?;

    if day == 0 || day > 31 || hour > 23 || minute > 59 || second > 60 {
        return Err(ErrorKind::DateParse);
    }

    Ok(ServerDateTime {
        year,
        month,
        day: day as u8,
        hour: hour as u8,
        minute: minute as u8,
        second: second as u8,
    })
}

fn parse_u16(field: &str) -> Result<u16, ErrorKind> {
    field.parse::<u16>().map_err(|_| ErrorKind::DateParse)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rfc1123_date_parses() {
        let parsed = parse_http_date("Tue, 15 Nov 1994 08:12:31 GMT").unwrap();
        assert_eq!(
            parsed,
            ServerDateTime {
                year: 1994,
                month: 11,
                day: 15,
                hour: 8,
                minute: 12,
                second: 31,
            }
        );
        assert!(!parsed.is_none());
    }

    #[test]
    fn single_digit_day_parses() {
        let parsed = parse_http_date("Mon, 1 Jan 2024 23:59:59 GMT").unwrap();
        assert_eq!(parsed.day, 1);
        assert_eq!(parsed.month, 1);
        assert_eq!(parsed.hour, 23);
    }

    #[test]
    fn month_table_is_locale_independent() {
        for (index, name) in MONTHS.iter().enumerate() {
            let mut value = heapless::String::<40>::new();
            let _ = core::fmt::Write::write_fmt(
                &mut value,
                format_args!("Sun, 02 {name} 2025 06:00:00 GMT"),
            );
            let parsed = parse_http_date(&value).unwrap();
            assert_eq!(parsed.month as usize, index + 1);
        }
    }

    #[test]
    fn garbage_is_rejected() {
        assert_eq!(parse_http_date(""), Err(ErrorKind::DateParse));
        assert_eq!(parse_http_date("not a date"), Err(ErrorKind::DateParse));
        assert_eq!(
            parse_http_date("Tue, 15 Brumaire 1994 08:12:31 GMT"),
            Err(ErrorKind::DateParse)
        );
        assert_eq!(
            parse_http_date("Tue, 15 Nov 1994 25:12:31 GMT"),
            Err(ErrorKind::DateParse)
        );
    }

    #[test]
    fn zero_value_is_the_sentinel() {
        assert!(ServerDateTime::NONE.is_none());
    }
}
