use thiserror::Error;

/// The widest bitmask that can be decoded.
pub const MAX_WIDTH: usize = u64::BITS as usize;

/// An error produced by bitmask conversion.
#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
#[non_exhaustive]
pub enum BitmaskError {
    /// The value to decode is negative.
    #[error("Invalid argument: bitmask value must be non-negative")]
    NegativeValue,
    /// The requested width exceeds [`MAX_WIDTH`].
    #[error("Invalid argument: bitmask width ({0}) is out of range ([0, {max}])", max = MAX_WIDTH)]
    WidthOutOfRange(usize),
    /// A digit other than `0` or `1` was found.
    #[error("Invalid argument: non-binary digit '{0}' in bitmask")]
    NonBinaryDigit(char),
}

/// Encodes an ordered sequence of flags into an integer.
///
/// The flag at position `i` contributes `2^i`, i.e. the first flag is the least significant bit.
/// Positions at or beyond [`MAX_WIDTH`] cannot be represented and are dropped.
///
/// # Examples
///
/// ```
/// use anc350_core::bitmask::encode;
///
/// assert_eq!(0, encode([]));
/// assert_eq!(2, encode([false, true]));
/// assert_eq!(5, encode([true, false, true]));
/// ```
#[must_use]
pub fn encode(flags: impl IntoIterator<Item = bool>) -> u64 {
    flags
        .into_iter()
        .enumerate()
        .filter(|&(_, flag)| flag)
        .fold(0, |acc, (i, _)| {
            if i >= MAX_WIDTH {
                tracing::warn!("Flag at position {} does not fit in a {}-bit mask", i, MAX_WIDTH);
                return acc;
            }
            acc | (1 << i)
        })
}

/// Encodes a string of binary digits, read from left to right.
///
/// `"0100"` encodes to 2, not 4.
pub fn encode_digits(digits: &str) -> Result<u64, BitmaskError> {
    let flags = digits
        .chars()
        .map(|c| match c {
            '0' => Ok(false),
            '1' => Ok(true),
            c => Err(BitmaskError::NonBinaryDigit(c)),
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(encode(flags))
}

/// The minimum number of bits that can represent `value`, `ceil(log2(value + 1))`.
#[must_use]
pub const fn inferred_width(value: u64) -> usize {
    (u64::BITS - value.leading_zeros()) as usize
}

/// Decodes an integer into an ordered sequence of flags.
///
/// If `width` is `None`, the width is inferred with [`inferred_width`]. Decoding 0 without a width yields `[false]` rather than an empty sequence.
///
/// Bits are assigned from the most significant position down by repeated subtraction of `2^i`, so a `width` narrower than the value saturates the low flags instead of truncating.
///
/// # Errors
///
/// Returns [`BitmaskError::NegativeValue`] if `value` is negative and [`BitmaskError::WidthOutOfRange`] if `width` exceeds [`MAX_WIDTH`].
///
/// # Examples
///
/// ```
/// use anc350_core::bitmask::decode;
///
/// assert_eq!(Ok(vec![true, false, true]), decode(5, None));
/// assert_eq!(Ok(vec![false]), decode(0, None));
/// assert_eq!(Ok(vec![false, true, false, false]), decode(2, Some(4)));
/// ```
pub fn decode(value: impl TryInto<u64>, width: Option<usize>) -> Result<Vec<bool>, BitmaskError> {
    let value: u64 = value
        .try_into()
        .map_err(|_| BitmaskError::NegativeValue)?;

    let width = match width {
        Some(width) if width > MAX_WIDTH => return Err(BitmaskError::WidthOutOfRange(width)),
        Some(width) => width,
        None if value == 0 => return Ok(vec![false]),
        None => inferred_width(value),
    };

    let mut remaining = value;
    let mut flags = vec![false; width];
    (0..width).rev().for_each(|i| {
        let bit = 1u64 << i;
        if remaining >= bit {
            flags[i] = true;
            remaining -= bit;
        }
    });
    Ok(flags)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rstest::rstest]
    #[case(0, vec![])]
    #[case(0, vec![false, false, false])]
    #[case(1, vec![true])]
    #[case(2, vec![false, true])]
    #[case(5, vec![true, false, true])]
    #[case(0b1010_0000, vec![false, false, false, false, false, true, false, true])]
    #[test]
    fn test_encode(#[case] expect: u64, #[case] flags: Vec<bool>) {
        assert_eq!(expect, encode(flags));
    }

    #[test]
    fn encode_drops_unrepresentable_positions() {
        let mut flags = vec![false; MAX_WIDTH + 1];
        flags[0] = true;
        flags[MAX_WIDTH] = true;
        assert_eq!(1, encode(flags));
    }

    #[rstest::rstest]
    #[case(Ok(0), "")]
    #[case(Ok(2), "0100")]
    #[case(Ok(1), "1")]
    #[case(Ok(0b1101), "1011")]
    #[case(Err(BitmaskError::NonBinaryDigit('2')), "0120")]
    #[case(Err(BitmaskError::NonBinaryDigit(' ')), "01 1")]
    #[test]
    fn test_encode_digits(#[case] expect: Result<u64, BitmaskError>, #[case] digits: &str) {
        assert_eq!(expect, encode_digits(digits));
    }

    #[rstest::rstest]
    #[case(0, 0)]
    #[case(1, 1)]
    #[case(2, 2)]
    #[case(3, 2)]
    #[case(4, 3)]
    #[case(5, 3)]
    #[case(8, 4)]
    #[case(64, u64::MAX)]
    #[test]
    fn test_inferred_width(#[case] expect: usize, #[case] value: u64) {
        assert_eq!(expect, inferred_width(value));
    }

    #[rstest::rstest]
    #[case(Ok(vec![false]), 0, None)]
    #[case(Ok(vec![]), 0, Some(0))]
    #[case(Ok(vec![false, false, false, false]), 0, Some(4))]
    #[case(Ok(vec![true]), 1, None)]
    #[case(Ok(vec![true, false, true]), 5, None)]
    #[case(Ok(vec![true, false, true, false, false]), 5, Some(5))]
    #[case(Ok(vec![true, true]), 5, Some(2))]
    #[case(Ok(vec![false, false, false, true]), 8, None)]
    #[case(Err(BitmaskError::NegativeValue), -1, None)]
    #[case(Err(BitmaskError::NegativeValue), -5, Some(3))]
    #[case(Err(BitmaskError::WidthOutOfRange(65)), 1, Some(65))]
    #[test]
    fn test_decode(
        #[case] expect: Result<Vec<bool>, BitmaskError>,
        #[case] value: i64,
        #[case] width: Option<usize>,
    ) {
        assert_eq!(expect, decode(value, width));
    }

    #[test]
    fn decode_full_width() -> anyhow::Result<()> {
        let flags = decode(u64::MAX, None)?;
        assert_eq!(MAX_WIDTH, flags.len());
        assert!(flags.into_iter().all(std::convert::identity));
        Ok(())
    }

    #[test]
    fn round_trip() -> anyhow::Result<()> {
        (0..=32usize).try_for_each(|len| {
            [0u64, 0x5555_5555_5555_5555, 0xAAAA_AAAA_AAAA_AAAA, 0x1234_5678_9ABC_DEF0, u64::MAX]
                .into_iter()
                .try_for_each(|pattern| {
                    let flags = (0..len).map(|i| (pattern >> i) & 1 == 1).collect::<Vec<_>>();
                    assert_eq!(flags, decode(encode(flags.iter().copied()), Some(len))?);
                    anyhow::Ok(())
                })
        })
    }
}
