//! Date helper functions

use chrono::{DateTime, FixedOffset, TimeZone};

use crate::config::DateSettings;

/// Parse a content-source timestamp such as `2021-03-25T19:25:28+0000`
pub fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z"))
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z"))
        .ok()
}

/// Format a date using a date-fns style pattern, localized
///
/// # Examples
/// ```ignore
/// format_date(&date, "dd MMMM yyyy", settings) // -> "25 março 2021"
/// ```
pub fn format_date<Tz: TimeZone>(
    date: &DateTime<Tz>,
    pattern: &str,
    settings: DateSettings,
) -> String {
    let chrono_format = date_fns_to_chrono_format(pattern);
    date.with_timezone(&settings.timezone)
        .format_localized(&chrono_format, settings.locale)
        .to_string()
}

/// Parse and format a raw timestamp, `None` when it is not a valid timestamp
pub fn format_timestamp(raw: &str, pattern: &str, settings: DateSettings) -> Option<String> {
    parse_timestamp(raw).map(|date| format_date(&date, pattern, settings))
}

/// Convert a date-fns format to a chrono format
///
/// Runs of the same letter form one token; text inside single quotes is
/// copied literally.
fn date_fns_to_chrono_format(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut result = String::with_capacity(pattern.len() * 2);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c == '\'' {
            // Quoted literal, '' is an escaped quote
            i += 1;
            while i < chars.len() {
                if chars[i] == '\'' {
                    if chars.get(i + 1) == Some(&'\'') {
                        result.push('\'');
                        i += 2;
                        continue;
                    }
                    break;
                }
                push_literal(&mut result, chars[i]);
                i += 1;
            }
            i += 1;
            continue;
        }

        let mut run = 1;
        while i + run < chars.len() && chars[i + run] == c {
            run += 1;
        }

        let directive = match (c, run) {
            ('y', 2) => Some("%y"),
            ('y', _) => Some("%Y"),
            ('M', 1) => Some("%-m"),
            ('M', 2) => Some("%m"),
            ('M', 3) => Some("%b"),
            ('M', _) => Some("%B"),
            ('d', 1) => Some("%-d"),
            ('d', _) => Some("%d"),
            ('E', 4) => Some("%A"),
            ('E', _) => Some("%a"),
            ('H', 1) => Some("%-H"),
            ('H', _) => Some("%H"),
            ('m', _) => Some("%M"),
            ('s', _) => Some("%S"),
            _ => None,
        };

        match directive {
            Some(directive) => result.push_str(directive),
            None => {
                for _ in 0..run {
                    push_literal(&mut result, c);
                }
            }
        }
        i += run;
    }

    result
}

fn push_literal(out: &mut String, c: char) {
    if c == '%' {
        out.push_str("%%");
    } else {
        out.push(c);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Locale;

    #[test]
    fn test_parse_timestamp() {
        assert!(parse_timestamp("2021-03-25T19:25:28+0000").is_some());
        assert!(parse_timestamp("2021-03-25T19:25:28+00:00").is_some());
        assert!(parse_timestamp("2021-03-25T19:25:28.123Z").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_date_fns_to_chrono() {
        assert_eq!(date_fns_to_chrono_format("dd MMM yyyy"), "%d %b %Y");
        assert_eq!(date_fns_to_chrono_format("dd MMMM yyyy"), "%d %B %Y");
        assert_eq!(date_fns_to_chrono_format("HH:mm:ss"), "%H:%M:%S");
        assert_eq!(date_fns_to_chrono_format("d 'de' MMMM"), "%-d de %B");
        assert_eq!(date_fns_to_chrono_format("100%"), "100%%");
    }

    #[test]
    fn test_format_timestamp_pt_br() {
        let settings = DateSettings::default();
        assert_eq!(
            format_timestamp("2021-03-25T19:25:28+0000", "dd MMMM yyyy", settings).as_deref(),
            Some("25 março 2021")
        );
        assert_eq!(
            format_timestamp("2021-03-05T19:25:28+0000", "dd MMM yyyy", settings).as_deref(),
            Some("05 mar 2021")
        );
    }

    #[test]
    fn test_format_timestamp_in_timezone() {
        let settings = DateSettings {
            locale: Locale::en_US,
            timezone: chrono_tz::America::Sao_Paulo,
        };
        // 01:00 UTC is still the previous day in Sao Paulo
        assert_eq!(
            format_timestamp("2021-03-25T01:00:00+0000", "dd MMMM yyyy", settings).as_deref(),
            Some("24 March 2021")
        );
    }
}
