//! Pure formatting helpers over the decimal string of a generated ID.
//!
//! None of these touch generator state; they are plain transforms suitable
//! for building display strings, order numbers and the like.

/// Zero-pads the decimal form of `id` on the left to at least `width` digits.
/// IDs already that wide are returned unchanged.
pub fn pad(id: i64, width: usize) -> String {
    format!("{id:0width$}")
}

/// Prepends `prefix` to the decimal form of `id`.
pub fn with_prefix(id: i64, prefix: &str) -> String {
    format!("{prefix}{id}")
}

/// Keeps only the last `digits` digits of the decimal form of `id`.
/// Shorter IDs are returned whole; `digits == 0` yields an empty string.
pub fn truncate(id: i64, digits: usize) -> String {
    let s = id.to_string();
    let skip = s.len().saturating_sub(digits);
    s[skip..].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pad_widens_short_ids() {
        assert_eq!(pad(42, 6), "000042");
        assert_eq!(pad(1234567, 6), "1234567");
    }

    #[test]
    fn prefix_is_prepended_verbatim() {
        assert_eq!(with_prefix(42, "order-"), "order-42");
        assert_eq!(with_prefix(42, ""), "42");
    }

    #[test]
    fn truncate_keeps_the_low_digits() {
        assert_eq!(truncate(1234567, 3), "567");
        assert_eq!(truncate(42, 5), "42");
        assert_eq!(truncate(42, 0), "");
    }
}
