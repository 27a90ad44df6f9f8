use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

/// Timestamp layouts the Badgr API uses for `createdAt`.
const TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%SZ", "%Y-%m-%dT%H:%M:%S%.fZ"];

/// Convert a camelCase API key to its snake_case name.
///
/// `issuerOpenBadgeId` becomes `issuer_open_badge_id`. A separator goes in
/// front of a capitalized word that follows any character, then in front of
/// an uppercase letter that follows a lowercase letter or digit, and the
/// result is lowercased. Not guaranteed to be reversible.
pub fn to_snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();

    // Pass 1: `(.)([A-Z][a-z]+)`, matched left to right without overlap
    let mut words: Vec<char> = Vec::with_capacity(chars.len() + 4);
    let mut i = 0;
    while i < chars.len() {
        let starts_word = i + 2 < chars.len()
            && chars[i + 1].is_ascii_uppercase()
            && chars[i + 2].is_ascii_lowercase();
        if starts_word {
            words.push(chars[i]);
            words.push('_');
            words.push(chars[i + 1]);
            let mut j = i + 2;
            while j < chars.len() && chars[j].is_ascii_lowercase() {
                words.push(chars[j]);
                j += 1;
            }
            i = j;
        } else {
            words.push(chars[i]);
            i += 1;
        }
    }

    // Pass 2: `([a-z0-9])([A-Z])`
    let mut out = String::with_capacity(words.len() + 4);
    let mut prev: Option<char> = None;
    for c in words {
        if c.is_ascii_uppercase() {
            if let Some(p) = prev {
                if p.is_ascii_lowercase() || p.is_ascii_digit() {
                    out.push('_');
                }
            }
        }
        out.push(c);
        prev = Some(c);
    }

    out.to_lowercase()
}

/// Parse a Badgr timestamp (`2019-09-04T19:03:24Z`, optionally with
/// fractional seconds) as UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    TIMESTAMP_FORMATS.iter().find_map(|format| {
        NaiveDateTime::parse_from_str(value, format)
            .ok()
            .map(|naive| Utc.from_utc_datetime(&naive))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_snake_case_api_keys() {
        assert_eq!(to_snake_case("issuerOpenBadgeId"), "issuer_open_badge_id");
        assert_eq!(to_snake_case("entityId"), "entity_id");
        assert_eq!(to_snake_case("createdAt"), "created_at");
        assert_eq!(to_snake_case("criteriaNarrative"), "criteria_narrative");
        assert_eq!(to_snake_case("openBadgeId"), "open_badge_id");
    }

    #[test]
    fn test_to_snake_case_without_capitals() {
        assert_eq!(to_snake_case("issuer"), "issuer");
        assert_eq!(to_snake_case("expires"), "expires");
        assert_eq!(to_snake_case("entity_id"), "entity_id");
        assert_eq!(to_snake_case(""), "");
    }

    #[test]
    fn test_to_snake_case_acronyms_and_digits() {
        assert_eq!(to_snake_case("getHTTPResponseCode"), "get_http_response_code");
        assert_eq!(to_snake_case("HTTPResponse"), "http_response");
        assert_eq!(to_snake_case("version2Id"), "version2_id");
        assert_eq!(to_snake_case("ID"), "id");
    }

    #[test]
    fn test_to_snake_case_leading_capital() {
        assert_eq!(to_snake_case("EntityId"), "entity_id");
        assert_eq!(to_snake_case("Name"), "name");
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let plain = parse_timestamp("2019-09-04T19:03:24Z").unwrap();
        let fractional = parse_timestamp("2019-09-04T19:03:24.000000Z").unwrap();
        assert_eq!(plain, fractional);
        assert_eq!(plain, Utc.with_ymd_and_hms(2019, 9, 4, 19, 3, 24).unwrap());
    }

    #[test]
    fn test_parse_timestamp_keeps_fraction() {
        let ts = parse_timestamp("2019-09-04T19:03:24.250000Z").unwrap();
        assert_eq!(ts.timestamp_subsec_micros(), 250_000);
    }

    #[test]
    fn test_parse_timestamp_rejects_other_layouts() {
        assert!(parse_timestamp("2019-09-04 19:03:24").is_none());
        assert!(parse_timestamp("2019-09-04T19:03:24+00:00").is_none());
        assert!(parse_timestamp("yesterday").is_none());
    }
}
