use std::time::Duration;

use jiff::SpanRelativeTo;

/// Accepts "30s", "5m", ISO 8601 ("PT1H30M") or a plain number of seconds.
pub fn parse_duration(input: &str) -> Result<Duration, String> {
    let signed = if let Ok(duration) = input.parse::<jiff::SignedDuration>() {
        duration
    } else if let Ok(duration) = input
        .parse::<jiff::Span>()
        .and_then(|span| span.to_duration(SpanRelativeTo::days_are_24_hours()))
    {
        duration
    } else if let Ok(seconds) = input.parse::<u64>() {
        return Ok(Duration::from_secs(seconds));
    } else if input.parse::<i64>().is_ok() {
        return Err(String::from("Duration must not be negative"));
    } else {
        return Err(String::from("Invalid duration"));
    };

    Duration::try_from(signed).map_err(|_| String::from("Duration must not be negative"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("30s"), Ok(Duration::from_secs(30)));
        assert_eq!(parse_duration("PT1M30S"), Ok(Duration::from_secs(90)));
        assert_eq!(parse_duration("3"), Ok(Duration::from_secs(3)));
        assert!(parse_duration("soon").is_err());
    }

    #[test]
    fn test_parse_negative_duration() {
        let negative = Err(String::from("Duration must not be negative"));

        assert_eq!(parse_duration("-5"), negative);
        assert_eq!(parse_duration("-5s"), negative);
        assert_eq!(parse_duration(&i64::MIN.to_string()), negative);
    }
}
