//! `strtol`-family number parsing over erased strings.
//!
//! Parsing follows C: leading whitespace is skipped, an optional sign is
//! accepted, and parsing stops at the first unit that cannot continue the
//! number. Out-of-range values saturate and set `range_error`.

use retrofit_core::RefError;
use retrofit_erasure::Erasure;

use crate::string::{strlen, CodeUnit};

/// Outcome of a `strto*` call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Parsed<N> {
    /// The parsed value, saturated on overflow; zero when nothing parsed.
    pub value: N,
    /// Number of units consumed; zero when nothing parsed.
    pub end: usize,
    /// Whether the value was out of range (C's `ERANGE`).
    pub range_error: bool,
}

impl<N: Default> Parsed<N> {
    fn nothing() -> Self {
        Self {
            value: N::default(),
            end: 0,
            range_error: false,
        }
    }
}

/// Read the string into ASCII-or-zero units (non-ASCII maps to 0x80,
/// which never continues a number).
fn ascii_units<E>(s: &E) -> Result<Vec<u8>, RefError>
where
    E: Erasure,
    E::Target: CodeUnit,
{
    let len = strlen(s)?;
    (0..len as isize)
        .map(|i| {
            let unit = s.try_index(i)?.to_u32();
            Ok::<_, RefError>(u8::try_from(unit).ok().filter(u8::is_ascii).unwrap_or(0x80))
        })
        .collect()
}

fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | 0x0b | 0x0c | b'\r')
}

fn digit_value(b: u8) -> Option<u32> {
    (b as char).to_digit(36)
}

/// Magnitude, sign and extent of an integer prefix.
struct IntScan {
    negative: bool,
    magnitude: u64,
    overflow: bool,
    end: usize,
}

fn scan_integer(units: &[u8], base: u32) -> Option<IntScan> {
    if base == 1 || base > 36 {
        return None;
    }
    let mut i = 0;
    while units.get(i).copied().is_some_and(is_space) {
        i += 1;
    }
    let mut negative = false;
    if let Some(&sign @ (b'+' | b'-')) = units.get(i) {
        negative = sign == b'-';
        i += 1;
    }
    let hex_prefix = units.get(i) == Some(&b'0')
        && matches!(units.get(i + 1), Some(b'x' | b'X'))
        && units
            .get(i + 2)
            .and_then(|&b| digit_value(b))
            .is_some_and(|d| d < 16);
    let base = match base {
        0 if hex_prefix => 16,
        0 if units.get(i) == Some(&b'0') => 8,
        0 => 10,
        b => b,
    };
    if base == 16 && hex_prefix {
        i += 2;
    }

    let start = i;
    let mut magnitude: u64 = 0;
    let mut overflow = false;
    while let Some(d) = units.get(i).and_then(|&b| digit_value(b)).filter(|&d| d < base) {
        match magnitude
            .checked_mul(u64::from(base))
            .and_then(|m| m.checked_add(u64::from(d)))
        {
            Some(m) => magnitude = m,
            None => overflow = true,
        }
        i += 1;
    }
    if i == start {
        return None;
    }
    Some(IntScan {
        negative,
        magnitude,
        overflow,
        end: i,
    })
}

/// Parse a signed integer in `base` (0 or 2..=36; 0 detects `0x` and `0`
/// prefixes).
pub fn strtol<E>(s: &E, base: u32) -> Result<Parsed<i64>, RefError>
where
    E: Erasure,
    E::Target: CodeUnit,
{
    let units = ascii_units(s)?;
    let Some(scan) = scan_integer(&units, base) else {
        return Ok(Parsed::nothing());
    };
    let limit = if scan.negative {
        i64::MIN.unsigned_abs()
    } else {
        i64::MAX as u64
    };
    let (value, range_error) = if scan.overflow || scan.magnitude > limit {
        (if scan.negative { i64::MIN } else { i64::MAX }, true)
    } else if scan.negative {
        ((scan.magnitude as i64).wrapping_neg(), false)
    } else {
        (scan.magnitude as i64, false)
    };
    Ok(Parsed {
        value,
        end: scan.end,
        range_error,
    })
}

/// Parse an unsigned integer. As in C, a leading `-` negates the result
/// modulo 2^64.
pub fn strtoul<E>(s: &E, base: u32) -> Result<Parsed<u64>, RefError>
where
    E: Erasure,
    E::Target: CodeUnit,
{
    let units = ascii_units(s)?;
    let Some(scan) = scan_integer(&units, base) else {
        return Ok(Parsed::nothing());
    };
    let (value, range_error) = if scan.overflow {
        (u64::MAX, true)
    } else if scan.negative {
        (scan.magnitude.wrapping_neg(), false)
    } else {
        (scan.magnitude, false)
    };
    Ok(Parsed {
        value,
        end: scan.end,
        range_error,
    })
}

fn starts_with_ignore_case(units: &[u8], word: &str) -> bool {
    units.len() >= word.len() && units[..word.len()].eq_ignore_ascii_case(word.as_bytes())
}

/// Parse a decimal floating-point number, `inf`, `infinity` or `nan`.
pub fn strtod<E>(s: &E) -> Result<Parsed<f64>, RefError>
where
    E: Erasure,
    E::Target: CodeUnit,
{
    let units = ascii_units(s)?;
    let mut i = 0;
    while units.get(i).copied().is_some_and(is_space) {
        i += 1;
    }
    let sign_at = i;
    if matches!(units.get(i), Some(b'+' | b'-')) {
        i += 1;
    }
    let negative = units.get(sign_at) == Some(&b'-');

    let rest = &units[i..];
    for (word, value) in [
        ("infinity", f64::INFINITY),
        ("inf", f64::INFINITY),
        ("nan", f64::NAN),
    ] {
        if starts_with_ignore_case(rest, word) {
            return Ok(Parsed {
                value: if negative { -value } else { value },
                end: i + word.len(),
                range_error: false,
            });
        }
    }

    let mantissa_start = i;
    let mut digits = 0;
    let mut nonzero = false;
    while let Some(b) = units.get(i).filter(|b| b.is_ascii_digit()) {
        nonzero |= *b != b'0';
        digits += 1;
        i += 1;
    }
    if units.get(i) == Some(&b'.') {
        i += 1;
        while let Some(b) = units.get(i).filter(|b| b.is_ascii_digit()) {
            nonzero |= *b != b'0';
            digits += 1;
            i += 1;
        }
    }
    if digits == 0 {
        return Ok(Parsed::nothing());
    }
    if matches!(units.get(i), Some(b'e' | b'E')) {
        let mut j = i + 1;
        if matches!(units.get(j), Some(b'+' | b'-')) {
            j += 1;
        }
        if units.get(j).is_some_and(u8::is_ascii_digit) {
            while units.get(j).is_some_and(u8::is_ascii_digit) {
                j += 1;
            }
            i = j;
        }
    }

    let text: String = units[mantissa_start..i].iter().map(|&b| b as char).collect();
    let magnitude: f64 = text.parse().unwrap_or(0.0);
    let range_error = magnitude.is_infinite() || (magnitude == 0.0 && nonzero);
    Ok(Parsed {
        value: if negative { -magnitude } else { magnitude },
        end: i,
        range_error,
    })
}
