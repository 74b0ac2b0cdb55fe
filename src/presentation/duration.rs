const ZERO_DURATION: &str = "00:00";

/// Player clock format, `m:ss`.
pub fn format_time(total_seconds: u64) -> String {
    format!("{}:{:02}", total_seconds / 60, total_seconds % 60)
}

/// Recorder clock format, `mm:ss`.
pub fn format_clock(total_seconds: u64) -> String {
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}

fn total_seconds(minutes: &str, seconds: &str) -> Option<u64> {
    let m = minutes.trim().parse::<u64>().ok()?;
    let s = seconds.trim().parse::<u64>().ok()?;
    m.checked_mul(60)?.checked_add(s)
}

/// Seconds in a `mm:ss` string. Anything that is not two non-negative
/// integers around one colon (`"Infinity:NaN"`, `"undefined:undefined"`, `"42"`),
/// or that does not fit in a `u64` second count, is zero.
pub fn parse_duration(duration: &str) -> u64 {
    let mut parts = duration.split(':');
    let (Some(minutes), Some(seconds), None) = (parts.next(), parts.next(), parts.next()) else {
        return 0;
    };
    total_seconds(minutes, seconds).unwrap_or(0)
}

/// Display-safe duration: `^\d+:\d{2}$` padded to `mm:ss`, else `00:00`.
pub fn normalize_duration(raw: &str) -> String {
    let raw = raw.trim();
    let Some((minutes, seconds)) = raw.split_once(':') else {
        return ZERO_DURATION.to_string();
    };
    let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !digits(minutes) || !digits(seconds) || seconds.len() != 2 || total_seconds(minutes, seconds).is_none() {
        return ZERO_DURATION.to_string();
    }
    format!("{:0>2}:{}", minutes, seconds)
}
