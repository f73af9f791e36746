//! Identifier seed folding.

/// Fold an identifier into the signed 32-bit seed that drives the grid.
///
/// Each UTF-16 code unit `u` updates the accumulator as
/// `seed = seed * 31 + u`, wrapping on overflow. The empty identifier folds
/// to `0`.
///
/// # Example
///
/// ```
/// use cps_pattern::seed_hash;
///
/// assert_eq!(seed_hash(""), 0);
/// assert_eq!(seed_hash("A"), 65);
/// assert_eq!(seed_hash("AB"), 65 * 31 + 66);
/// ```
#[must_use]
pub fn seed_hash(identifier: &str) -> i32 {
    identifier.encode_utf16().fold(0_i32, |seed, unit| {
        seed.wrapping_mul(31).wrapping_add(i32::from(unit))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::empty("", 0)]
    #[case::single_letter("A", 65)]
    #[case::cps_number("CPS00000000", 453_326_726)]
    #[case::wraps_negative("CPS12345678", -234_086_390)]
    #[case::wraps_far_negative("CPS99999999", -1_377_399_802)]
    fn folds_identifiers_with_wrapping(#[case] identifier: &str, #[case] expected: i32) {
        assert_eq!(seed_hash(identifier), expected);
    }

    #[test]
    fn folds_utf16_code_units_for_astral_characters() {
        // U+1F35B is encoded as the surrogate pair D83C DF5B.
        let expected = 0xD83C_i32.wrapping_mul(31).wrapping_add(0xDF5B);
        assert_eq!(seed_hash("\u{1F35B}"), expected);
    }
}
