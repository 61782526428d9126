//! Human-readable byte sizes.

const KB: u64 = 1024;
const MB: u64 = 1024 * KB;
const GB: u64 = 1024 * MB;

/// Format a byte count, e.g. `64.0 MB`.
pub fn format_size(bytes: u64) -> String {
    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

/// Parse a size such as `512`, `64MB`, `1.5 GB` or `100k`.
///
/// Units are binary (1 KB = 1024 bytes) and case-insensitive.
pub fn parse_size(input: &str) -> Option<u64> {
    let s = input.trim().to_ascii_uppercase();
    let split = s
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(s.len());
    let (number, unit) = s.split_at(split);

    let multiplier = match unit.trim() {
        "" | "B" => 1,
        "K" | "KB" => KB,
        "M" | "MB" => MB,
        "G" | "GB" => GB,
        _ => return None,
    };

    if number.is_empty() {
        return None;
    }

    if multiplier == 1 {
        return number.parse::<u64>().ok();
    }

    let value: f64 = number.parse().ok()?;
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    Some((value * multiplier as f64).round() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 bytes");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(64 * MB), "64.0 MB");
        assert_eq!(format_size(3 * GB / 2), "1.5 GB");
    }

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("512"), Some(512));
        assert_eq!(parse_size("64MB"), Some(64 * MB));
        assert_eq!(parse_size("64mb"), Some(64 * MB));
        assert_eq!(parse_size("1.5 GB"), Some(3 * GB / 2));
        assert_eq!(parse_size("100k"), Some(100 * KB));
        assert_eq!(parse_size("2G"), Some(2 * GB));
    }

    #[test]
    fn test_parse_size_rejects_garbage() {
        assert_eq!(parse_size(""), None);
        assert_eq!(parse_size("MB"), None);
        assert_eq!(parse_size("12 TB"), None);
        assert_eq!(parse_size("1.5"), None);
        assert_eq!(parse_size("abc"), None);
    }
}
