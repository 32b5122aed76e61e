//! Compact K/M/B rendering of download counts.

const THOUSAND: u64 = 1_000;
const MILLION: u64 = 1_000_000;
const BILLION: u64 = 1_000_000_000;

/// Render a count as a short display string such as `"950"`, `"12K"`, `"3M"` or `"2B"`.
///
/// Values are rounded to the nearest whole unit with ties going to the even neighbor,
/// so `1_500` becomes `"2K"` while `2_500_000_000` becomes `"2B"`. A value that rounds up to
/// a thousand units is promoted to the next suffix (`999_999` is `"1M"`).
#[must_use]
pub fn humanize(value: u64) -> String {
    if value < THOUSAND {
        return value.to_string();
    }

    if value < MILLION {
        return scaled(value, THOUSAND, "K", "1M");
    }

    if value < BILLION {
        return scaled(value, MILLION, "M", "1B");
    }

    format!("{}B", round_half_even(value, BILLION).max(1))
}

fn scaled(value: u64, unit: u64, suffix: &str, promoted: &str) -> String {
    let rounded = round_half_even(value, unit).max(1);
    if rounded >= THOUSAND {
        return promoted.to_string();
    }

    format!("{rounded}{suffix}")
}

/// Integer division of `value` by `unit`, rounded to nearest with ties to even.
const fn round_half_even(value: u64, unit: u64) -> u64 {
    let quotient = value / unit;
    let remainder = value % unit;

    // Compare 2 * remainder against unit without overflowing
    let half_up = remainder > unit - remainder;
    let tie = remainder == unit - remainder;

    if half_up || (tie && quotient % 2 == 1) {
        quotient + 1
    } else {
        quotient
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_values_are_unchanged() {
        assert_eq!(humanize(0), "0");
        assert_eq!(humanize(1), "1");
        assert_eq!(humanize(500), "500");
        assert_eq!(humanize(999), "999");
    }

    #[test]
    fn test_thousands() {
        assert_eq!(humanize(1_000), "1K");
        assert_eq!(humanize(1_499), "1K");
        assert_eq!(humanize(1_500), "2K");
        assert_eq!(humanize(12_345), "12K");
        assert_eq!(humanize(999_499), "999K");
    }

    #[test]
    fn test_thousands_promote_to_millions() {
        assert_eq!(humanize(999_500), "1M");
        assert_eq!(humanize(999_999), "1M");
    }

    #[test]
    fn test_millions() {
        assert_eq!(humanize(1_000_000), "1M");
        assert_eq!(humanize(1_500_000), "2M");
        assert_eq!(humanize(2_500_000), "2M");
        assert_eq!(humanize(3_500_000), "4M");
        assert_eq!(humanize(999_999_999), "1B");
    }

    #[test]
    fn test_billions() {
        assert_eq!(humanize(1_000_000_000), "1B");
        assert_eq!(humanize(1_500_000_000), "2B");
        assert_eq!(humanize(2_500_000_000), "2B");
        assert_eq!(humanize(2_500_000_001), "3B");
        assert_eq!(humanize(1_234_000_000_000), "1234B");
    }

    #[test]
    fn test_round_half_even() {
        assert_eq!(round_half_even(1_500, 1_000), 2);
        assert_eq!(round_half_even(2_500, 1_000), 2);
        assert_eq!(round_half_even(2_501, 1_000), 3);
        assert_eq!(round_half_even(2_499, 1_000), 2);
        assert_eq!(round_half_even(u64::MAX, BILLION), u64::MAX / BILLION + 1);
    }
}
