use std::time::Duration;

/// Parses durations like `500ms`, `3s`, `1m`, `1h` or `1.5s`. A bare number is seconds.
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    // Two-letter units first so "ms" is not read as "s"
    const UNITS: &[(&str, u64)] = &[
        ("ns", 1),
        ("us", 1_000),
        ("ms", 1_000_000),
        ("s", 1_000_000_000),
        ("m", 60_000_000_000),
        ("h", 3_600_000_000_000),
    ];

    let (number, nanos_per_unit) = UNITS
        .iter()
        .find_map(|(suf, mul)| s.strip_suffix(suf).map(|n| (n, *mul)))
        .unwrap_or((s, 1_000_000_000));

    let value: f64 = number.trim().parse().ok()?;
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    Some(Duration::from_nanos((value * nanos_per_unit as f64).round() as u64))
}

/// Splits a comma-separated list, trimming items and dropping empty ones.
pub fn parse_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

/// Converts a Kubernetes CPU quantity (`250m`, `2`, `0.5`, `1500000n`) to millicores.
pub fn parse_cpu_to_millicores(q: &str) -> Option<i64> {
    let q = q.trim();
    if q.is_empty() {
        return None;
    }

    const INTEGER_UNITS: &[(char, i128)] = &[('n', 1_000_000), ('u', 1_000), ('m', 1)];
    for (suf, divisor) in INTEGER_UNITS {
        if let Some(stripped) = q.strip_suffix(*suf) {
            return stripped.parse::<i128>().ok().map(|v| (v / divisor) as i64);
        }
    }

    q.parse::<f64>().ok().map(|cores| (cores * 1000.0).round() as i64)
}

/// Converts a Kubernetes memory quantity (`128Mi`, `1G`, `512`, `1e3`,
/// `1500m`) to bytes, rounding fractional results.
pub fn parse_memory_to_bytes(q: &str) -> Option<i64> {
    let q = q.trim();
    if q.is_empty() {
        return None;
    }
    if let Ok(bytes) = q.parse::<i64>() {
        return Some(bytes);
    }

    // Decimal exponent form: 1e3, 1.5E9
    if let Some(v) = q.parse::<f64>().ok().filter(|v| v.is_finite()) {
        return Some(v.round() as i64);
    }
    if let Some(stripped) = q.strip_suffix('m') {
        return stripped.parse::<f64>().ok().map(|v| (v / 1000.0).round() as i64);
    }

    // Binary suffixes must be tried before their decimal prefixes
    const UNITS: &[(&str, i64)] = &[
        ("Ki", 1 << 10),
        ("Mi", 1 << 20),
        ("Gi", 1 << 30),
        ("Ti", 1 << 40),
        ("Pi", 1 << 50),
        ("Ei", 1 << 60),
        ("k", 1_000),
        ("K", 1_000),
        ("M", 1_000_000),
        ("G", 1_000_000_000),
        ("T", 1_000_000_000_000),
        ("P", 1_000_000_000_000_000),
        ("E", 1_000_000_000_000_000_000),
    ];

    for (suf, mul) in UNITS {
        if let Some(stripped) = q.strip_suffix(suf) {
            return stripped
                .parse::<f64>()
                .ok()
                .map(|v| (v * (*mul as f64)).round() as i64);
        }
    }

    None
}
