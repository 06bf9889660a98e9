//! National personal identification code validation.
//!
//! Codes are 11 ASCII digits; the last digit is a checksum over the first
//! ten using two weight vectors.

const FIRST_WEIGHTS: [u32; 10] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 1];
const SECOND_WEIGHTS: [u32; 10] = [3, 4, 5, 6, 7, 8, 9, 1, 2, 3];

/// Checks that `code` is an 11-digit personal code with a valid check digit.
///
/// The check digit is the weighted digit sum modulo 11 using the first
/// weight vector. A result of 10 is retried with the second vector, and a
/// second 10 becomes 0.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::validate_personal_code;
///
/// assert!(validate_personal_code("38001010009"));
/// assert!(!validate_personal_code("38001010001"));
/// assert!(!validate_personal_code("3800101000"));
/// assert!(!validate_personal_code("3800101000A"));
/// ```
pub fn validate_personal_code(code: &str) -> bool {
    let bytes = code.as_bytes();
    if bytes.len() != 11 || !bytes.iter().all(u8::is_ascii_digit) {
        return false;
    }

    let digits: Vec<u32> = bytes.iter().map(|b| u32::from(b - b'0')).collect();
    check_digit(&digits[..10]) == digits[10]
}

fn check_digit(digits: &[u32]) -> u32 {
    let weighted = |weights: &[u32; 10]| -> u32 {
        digits.iter().zip(weights).map(|(d, w)| d * w).sum::<u32>() % 11
    };

    match weighted(&FIRST_WEIGHTS) {
        10 => match weighted(&SECOND_WEIGHTS) {
            10 => 0,
            sum => sum,
        },
        sum => sum,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_code() {
        assert!(validate_personal_code("38001010009"));
        assert!(validate_personal_code("48001010005"));
        assert!(validate_personal_code("39005151236"));
    }

    #[test]
    fn test_wrong_check_digit() {
        assert!(!validate_personal_code("38001010001"));
    }

    #[test]
    fn test_second_weight_vector_is_used_when_first_sum_is_ten() {
        // First pass: 4+16+5+7 = 32 -> 10; second pass: 12+32+7+9 = 60 -> 5.
        assert!(validate_personal_code("48001010005"));
        assert!(!validate_personal_code("48001010000"));
        assert!(validate_personal_code("38001010015"));
    }

    #[test]
    fn test_both_sums_ten_gives_zero_check_digit() {
        // First pass: 54 -> 10; second pass: 76 -> 10.
        assert!(validate_personal_code("38001010250"));
        assert!(!validate_personal_code("38001010251"));
    }

    #[test]
    fn test_wrong_length_is_invalid() {
        assert!(!validate_personal_code(""));
        assert!(!validate_personal_code("3800101000"));
        assert!(!validate_personal_code("380010100090"));
    }

    #[test]
    fn test_non_digits_are_invalid() {
        assert!(!validate_personal_code("3800101000a"));
        assert!(!validate_personal_code("38001 10009"));
        assert!(!validate_personal_code("-3800101000"));
    }

    #[test]
    fn test_non_ascii_digits_are_invalid() {
        // Eleven characters but more than eleven bytes.
        assert!(!validate_personal_code("3800101000٩"));
    }
}
