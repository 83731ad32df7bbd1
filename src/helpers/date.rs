//! Date helper functions

use chrono::{DateTime, Locale, TimeZone};

use crate::content::PublishedAt;

/// Format a date using a date-fns style pattern in the given locale
///
/// # Examples
/// ```ignore
/// format_date(&date, "d MMM yyyy", Locale::pt_BR) // -> "25 mar 2021"
/// ```
pub fn format_date<Tz: TimeZone>(date: &DateTime<Tz>, pattern: &str, locale: Locale) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let chrono_format = date_fns_to_chrono_format(pattern);
    date.format_localized(&chrono_format, locale).to_string()
}

/// Format a publication date in `tz`, or return `fallback` when it is absent
pub fn format_published<Tz: TimeZone>(
    published: &PublishedAt,
    pattern: &str,
    tz: &Tz,
    locale: Locale,
    fallback: &str,
) -> String
where
    Tz::Offset: std::fmt::Display,
{
    match published.get() {
        Some(date) => format_date(&date.with_timezone(tz), pattern, locale),
        None => fallback.to_string(),
    }
}

/// Machine-readable value for a `<time datetime>` attribute; empty if absent
pub fn date_xml(published: &PublishedAt) -> String {
    published
        .get()
        .map(|d| d.format("%Y-%m-%dT%H:%M:%S%:z").to_string())
        .unwrap_or_default()
}

/// Map a language tag (`pt-BR`, `en`) to a chrono locale
pub fn locale_for(language: &str) -> Locale {
    match language.to_ascii_lowercase().replace('_', "-").as_str() {
        "pt" | "pt-br" => Locale::pt_BR,
        "pt-pt" => Locale::pt_PT,
        "es" | "es-es" => Locale::es_ES,
        "fr" | "fr-fr" => Locale::fr_FR,
        "de" | "de-de" => Locale::de_DE,
        "en-gb" => Locale::en_GB,
        _ => Locale::en_US,
    }
}

/// Convert date-fns tokens to a chrono strftime string.
/// Text in single quotes is literal; `''` is a quote.
fn date_fns_to_chrono_format(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c == '\'' {
            if chars.get(i + 1) == Some(&'\'') {
                out.push('\'');
                i += 2;
                continue;
            }
            i += 1;
            while i < chars.len() && chars[i] != '\'' {
                push_literal(&mut out, chars[i]);
                i += 1;
            }
            i += 1;
            continue;
        }

        let mut run = 1;
        while i + run < chars.len() && chars[i + run] == c {
            run += 1;
        }

        let token = match (c, run) {
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
            ('h', 1) => Some("%-I"),
            ('h', _) => Some("%I"),
            ('m', 1) => Some("%-M"),
            ('m', _) => Some("%M"),
            ('s', 1) => Some("%-S"),
            ('s', _) => Some("%S"),
            ('a', _) => Some("%p"),
            _ => None,
        };

        match token {
            Some(t) => out.push_str(t),
            None => {
                for _ in 0..run {
                    push_literal(&mut out, c);
                }
            }
        }
        i += run;
    }

    out
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
    use chrono::{FixedOffset, Utc};

    fn sample() -> PublishedAt {
        PublishedAt::parse(Some("2021-03-25T19:25:28+0000"))
    }

    #[test]
    fn test_format_date_pt_br() {
        let date = Utc.with_ymd_and_hms(2021, 3, 5, 10, 30, 0).unwrap();
        assert_eq!(format_date(&date, "d MMM yyyy", Locale::pt_BR), "5 mar 2021");
        assert_eq!(format_date(&date, "dd/MM/yyyy", Locale::pt_BR), "05/03/2021");
    }

    #[test]
    fn test_format_date_en() {
        let date = Utc.with_ymd_and_hms(2021, 3, 5, 10, 30, 0).unwrap();
        assert_eq!(
            format_date(&date, "MMMM d, yyyy", Locale::en_US),
            "March 5, 2021"
        );
    }

    #[test]
    fn test_format_published_in_timezone() {
        let late = PublishedAt::parse(Some("2021-03-26T01:00:00+0000"));
        let sao_paulo = FixedOffset::west_opt(3 * 3600).unwrap();
        assert_eq!(
            format_published(&late, "d MMM yyyy", &sao_paulo, Locale::pt_BR, "-"),
            "25 mar 2021"
        );
    }

    #[test]
    fn test_format_published_fallback() {
        assert_eq!(
            format_published(
                &PublishedAt::unknown(),
                "d MMM yyyy",
                &Utc,
                Locale::pt_BR,
                "date unavailable"
            ),
            "date unavailable"
        );
    }

    #[test]
    fn test_date_xml() {
        assert_eq!(date_xml(&sample()), "2021-03-25T19:25:28+00:00");
        assert_eq!(date_xml(&PublishedAt::unknown()), "");
    }

    #[test]
    fn test_date_fns_to_chrono() {
        assert_eq!(date_fns_to_chrono_format("d MMM yyyy"), "%-d %b %Y");
        assert_eq!(date_fns_to_chrono_format("yyyy-MM-dd HH:mm"), "%Y-%m-%d %H:%M");
        assert_eq!(date_fns_to_chrono_format("d 'de' MMMM"), "%-d de %B");
        assert_eq!(date_fns_to_chrono_format("100%"), "100%%");
    }

    #[test]
    fn test_locale_for() {
        assert_eq!(locale_for("pt-BR"), Locale::pt_BR);
        assert_eq!(locale_for("pt_br"), Locale::pt_BR);
        assert_eq!(locale_for("xx"), Locale::en_US);
    }
}
