use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{digit1, hex_digit1, multispace0},
    combinator::{all_consuming, map_res},
    multi::separated_list1,
    sequence::{delimited, preceded},
    IResult,
};

use crate::error::{Error, Result};

/// A byte written as decimal, `0x`-prefixed hex or `$`-prefixed hex
pub(crate) fn byte_value(input: &str) -> IResult<&str, u8> {
    alt((
        map_res(
            preceded(alt((tag("0x"), tag("0X"), tag("$"))), hex_digit1),
            |digits| u8::from_str_radix(digits, 16),
        ),
        map_res(digit1, str::parse::<u8>),
    ))(input)
}

pub(crate) fn usize_value(input: &str) -> IResult<&str, usize> {
    map_res(digit1, str::parse::<usize>)(input)
}

fn comma(input: &str) -> IResult<&str, &str> {
    delimited(multispace0, tag(","), multispace0)(input)
}

/// Parses a comma separated list of bytes such as `0x3f, 12, $07`
///
/// # Errors
///
/// [`Error::InvalidArgument`] if `input` is not a non-empty list of byte values
pub fn parse_byte_list(input: &str) -> Result<Vec<u8>> {
    all_consuming(separated_list1(comma, byte_value))(input.trim())
        .map(|(_, bytes)| bytes)
        .map_err(|e| Error::InvalidArgument(format!("invalid byte list {input:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_notations() {
        assert_eq!(byte_value("0x3F"), Ok(("", 0x3f)));
        assert_eq!(byte_value("$80,"), Ok((",", 0x80)));
        assert_eq!(byte_value("200"), Ok(("", 200)));
        assert!(byte_value("300").is_err());
    }

    #[test]
    fn byte_lists() {
        assert_eq!(parse_byte_list(" 0, 0x3f ,$07 ").unwrap(), vec![0, 63, 7]);
        assert!(parse_byte_list("").is_err());
        assert!(parse_byte_list("1,,2").is_err());
        assert!(parse_byte_list("1, 256").is_err());
    }
}
