use crate::error::{CueError, CueResult};

const MS_PER_HOUR: u64 = 3_600_000;
const MS_PER_MINUTE: u64 = 60_000;
const MS_PER_SECOND: u64 = 1_000;

/// Render a seconds offset as `HH:MM:SS,mmm`, rounding half up to the millisecond.
pub fn encode(seconds: f64) -> CueResult<String> {
    Ok(format_srt_timestamp(seconds_to_ms(seconds)?))
}

/// Parse `HH:MM:SS,mmm` back into fractional seconds.
pub fn decode(text: &str) -> CueResult<f64> {
    Ok(ms_to_seconds(parse_srt_timestamp_ms(text)?))
}

pub fn seconds_to_ms(seconds: f64) -> CueResult<u64> {
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(CueError::InvalidDuration { seconds });
    }

    let ms = (seconds * 1000.0).round();
    if ms >= u64::MAX as f64 {
        return Err(CueError::InvalidDuration { seconds });
    }
    Ok(ms as u64)
}

pub fn ms_to_seconds(ms: u64) -> f64 {
    ms as f64 / 1000.0
}

pub fn format_srt_timestamp(ms: u64) -> String {
    let hour = ms / MS_PER_HOUR;
    let min = (ms % MS_PER_HOUR) / MS_PER_MINUTE;
    let sec = (ms % MS_PER_MINUTE) / MS_PER_SECOND;
    let milli = ms % MS_PER_SECOND;

    format!("{hour:02}:{min:02}:{sec:02},{milli:03}")
}

pub fn parse_srt_timestamp_ms(text: &str) -> CueResult<u64> {
    let malformed = |reason: &'static str| CueError::MalformedTimestamp {
        input: text.to_string(),
        reason,
    };

    let (hms, milli) = text
        .split_once(',')
        .ok_or_else(|| malformed("missing ',' before milliseconds"))?;

    let mut parts = hms.split(':');
    let (h, m, s) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(h), Some(m), Some(s), None) => (h, m, s),
        _ => return Err(malformed("expected HH:MM:SS before ','")),
    };

    let hours = digits(h, h.len().max(2)).ok_or_else(|| malformed("bad hours"))?;
    let minutes = digits(m, 2).ok_or_else(|| malformed("bad minutes"))?;
    let seconds = digits(s, 2).ok_or_else(|| malformed("bad seconds"))?;
    let millis = digits(milli, 3).ok_or_else(|| malformed("bad milliseconds"))?;

    if minutes >= 60 {
        return Err(malformed("minutes out of range"));
    }
    if seconds >= 60 {
        return Err(malformed("seconds out of range"));
    }

    hours
        .checked_mul(MS_PER_HOUR)
        .and_then(|ms| ms.checked_add(minutes * MS_PER_MINUTE + seconds * MS_PER_SECOND + millis))
        .ok_or_else(|| malformed("hours out of range"))
}

/// Parse a `start --> end` line into millisecond offsets.
pub fn parse_time_range_arrow(line: &str) -> CueResult<(u64, u64)> {
    let (a, b) = line
        .split_once("-->")
        .ok_or_else(|| CueError::MalformedTimestamp {
            input: line.to_string(),
            reason: "missing '-->' in time range",
        })?;
    let start = parse_srt_timestamp_ms(a.trim())?;
    let end = parse_srt_timestamp_ms(b.trim())?;
    Ok((start, end))
}

// Exactly `width` ASCII digits.
fn digits(raw: &str, width: usize) -> Option<u64> {
    if raw.len() != width || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[rstest]
    #[case::zero(0.0, "00:00:00,000")]
    #[case::sub_second(0.999, "00:00:00,999")]
    #[case::hour_minute_second(3725.4567, "01:02:05,457")]
    #[case::half_ms_rounds_up(1.0005, "00:00:01,001")]
    #[case::carries_into_seconds(59.9996, "00:01:00,000")]
    #[case::wide_hours(360_000.0, "100:00:00,000")]
    fn test_encode(#[case] seconds: f64, #[case] expected: &str) {
        assert_eq!(encode(seconds).unwrap(), expected);
    }

    #[rstest]
    #[case::negative(-0.001)]
    #[case::nan(f64::NAN)]
    #[case::infinite(f64::INFINITY)]
    fn test_encode_rejects_invalid_duration(#[case] seconds: f64) {
        assert!(matches!(
            encode(seconds),
            Err(CueError::InvalidDuration { .. })
        ));
    }

    #[rstest]
    #[case::millis_only("00:00:00,999", 0.999)]
    #[case::full("01:02:05,457", 3725.457)]
    #[case::wide_hours("123:00:00,000", 442_800.0)]
    fn test_decode(#[case] text: &str, #[case] expected: f64) {
        assert_relative_eq!(decode(text).unwrap(), expected);
    }

    #[rstest]
    #[case::dot_separator("00:00:01.000")]
    #[case::missing_hours("00:01,000")]
    #[case::extra_field("00:00:00:01,000")]
    #[case::short_millis("00:00:01,00")]
    #[case::long_millis("00:00:01,0000")]
    #[case::one_digit_hours("0:00:01,000")]
    #[case::minutes_overflow("00:60:00,000")]
    #[case::seconds_overflow("00:00:60,000")]
    #[case::signed("-1:00:00,000")]
    #[case::padded(" 00:00:01,000")]
    #[case::empty("")]
    fn test_decode_rejects_malformed(#[case] text: &str) {
        assert!(matches!(
            decode(text),
            Err(CueError::MalformedTimestamp { .. })
        ));
    }

    #[test]
    fn test_round_trip_is_stable_at_millisecond_granularity() {
        for t in [0.0, 0.0004, 0.0005, 1.2345, 61.001, 3599.9994, 86_400.123_456] {
            let expected = (t * 1000.0_f64).round() / 1000.0;
            assert_eq!(decode(&encode(t).unwrap()).unwrap(), expected, "t = {t}");
        }
    }

    #[test]
    fn test_parse_time_range_arrow() {
        let (start, end) = parse_time_range_arrow("00:00:01,500 --> 00:00:03,250").unwrap();
        assert_eq!((start, end), (1_500, 3_250));

        assert!(parse_time_range_arrow("00:00:01,500 00:00:03,250").is_err());
    }
}
