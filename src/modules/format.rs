pub const DEFAULT_DECIMALS: usize = 2;

const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

/// Human-readable size in powers of 1024, e.g. `1536 -> "1.5 KB"`.
///
/// The mantissa is rounded to `decimals` places and trailing zeros are
/// dropped. Sizes past the terabyte range are still expressed in TB.
pub fn format_bytes(bytes: u64, decimals: usize) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut unit = 0;
    let mut scale = 1u64;
    while unit + 1 < UNITS.len() && bytes / scale >= 1024 {
        scale *= 1024;
        unit += 1;
    }

    let value = bytes as f64 / scale as f64;
    let mut number = format!("{:.*}", decimals, value);
    if number.contains('.') {
        let trimmed = number.trim_end_matches('0').trim_end_matches('.').len();
        number.truncate(trimmed);
    }
    format!("{number} {}", UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn zero_is_spelled_out() {
        assert_eq!(format_bytes(0, DEFAULT_DECIMALS), "0 Bytes");
        assert_eq!(format_bytes(0, 0), "0 Bytes");
    }

    #[test]
    fn documented_examples() {
        assert_eq!(format_bytes(1536, DEFAULT_DECIMALS), "1.5 KB");
        assert_eq!(format_bytes(1_073_741_824, 0), "1 GB");
    }

    #[test]
    fn picks_the_largest_unit_not_above_the_value() {
        assert_eq!(format_bytes(1, 2), "1 Bytes");
        assert_eq!(format_bytes(1023, 2), "1023 Bytes");
        assert_eq!(format_bytes(1024, 2), "1 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024 + 256 * 1024, 2), "5.25 MB");
        assert_eq!(format_bytes(3 * 1024_u64.pow(4), 2), "3 TB");
    }

    #[test]
    fn rounds_to_the_requested_places() {
        assert_eq!(format_bytes(1234, 0), "1 KB");
        assert_eq!(format_bytes(1234, 1), "1.2 KB");
        assert_eq!(format_bytes(1234, 3), "1.205 KB");
        assert_eq!(format_bytes(2560, 5), "2.5 KB");
    }

    #[test]
    fn values_past_terabytes_stay_in_tb() {
        assert_eq!(format_bytes(2 * 1024_u64.pow(5), 0), "2048 TB");
    }
}
