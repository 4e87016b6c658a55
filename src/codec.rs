// This file is part of the uutils coreutils package.
//
// For the full copyright and license information, please view the LICENSE
// file that was distributed with this source code.

// spell-checker:ignore exta extb ispeed ospeed cflag iflag lflag oflag tcflag

//! Textual codecs: C-style integers, baud rates, control-character
//! arguments, the caret/meta notation, and the `-g` save string.

use nix::libc::tcflag_t;
use nix::sys::termios::{
    ControlFlags, InputFlags, LocalFlags, OutputFlags, Termios,
};
use std::fmt::Write;

#[cfg(not(bsd))]
use crate::flags::BAUD_RATES;
use crate::flags::VDISABLE;
#[cfg(not(bsd))]
use nix::sys::termios::BaudRate;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IntegerArgError {
    /// Not a C-style integer at all.
    Invalid,
    /// Syntactically fine but out of range for the target field.
    TooLarge,
}

/// Parses an unsigned integer the way `strtoul(arg, _, 0)` would: `0x` or
/// `0X` selects hex, a leading `0` selects octal, anything else is decimal.
/// A trailing `b` or `B` multiplies the result by 512 (block count).
pub fn parse_integer(arg: &str) -> Result<u64, IntegerArgError> {
    match parse_with_radix(arg) {
        Err(IntegerArgError::Invalid) => {
            // "0x1b" is all hex digits; the suffix only applies when the
            // bare string is not a number by itself.
            let digits = arg
                .strip_suffix(['b', 'B'])
                .ok_or(IntegerArgError::Invalid)?;
            parse_with_radix(digits)?
                .checked_mul(512)
                .ok_or(IntegerArgError::TooLarge)
        }
        result => result,
    }
}

fn parse_with_radix(digits: &str) -> Result<u64, IntegerArgError> {
    let (digits, radix) = if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        (hex, 16)
    } else if digits.len() > 1 && digits.starts_with('0') {
        (&digits[1..], 8)
    } else {
        (digits, 10)
    };
    if digits.is_empty() || digits.starts_with(['+', '-']) {
        return Err(IntegerArgError::Invalid);
    }
    u64::from_str_radix(digits, radix).map_err(|e| {
        if *e.kind() == std::num::IntErrorKind::PosOverflow {
            IntegerArgError::TooLarge
        } else {
            IntegerArgError::Invalid
        }
    })
}

/// Parses a decimal baud rate, allowing a fractional part that is rounded
/// half to even ("134.5" is a real historical rate and rounds to 134).
pub fn parse_baud_value(arg: &str) -> Option<u64> {
    let arg = arg.trim_start_matches(' ');
    let (int_part, frac_part) = match arg.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (arg, None),
    };
    if int_part.starts_with(['+', '-']) {
        return None;
    }
    if int_part.is_empty() && frac_part.is_none() {
        return None;
    }
    let mut value = if int_part.is_empty() {
        0
    } else {
        int_part.parse::<u64>().ok()?
    };
    if let Some(frac) = frac_part {
        if frac.bytes().any(|b| !b.is_ascii_digit()) {
            return None;
        }
        let mut digits = frac.bytes().map(|b| b - b'0');
        match digits.next() {
            None | Some(0..=4) => {}
            Some(6..) => value += 1,
            Some(5) => {
                // exactly half: round to even, more than half: round up
                if digits.any(|d| d != 0) {
                    value += 1;
                } else {
                    value += value & 1;
                }
            }
        }
    }
    Some(value)
}

#[cfg(not(bsd))]
pub fn string_to_baud(arg: &str) -> Option<BaudRate> {
    // historical aliases for the highest V7 rates
    match arg {
        "exta" => return Some(BaudRate::B19200),
        "extb" => return Some(BaudRate::B38400),
        _ => {}
    }
    let value = parse_baud_value(arg)?;
    BAUD_RATES.iter().find(|(_, v)| *v == value).map(|(b, _)| *b)
}

// On the BSDs the speed fields hold the numeric rate itself.
#[cfg(bsd)]
pub fn string_to_baud(arg: &str) -> Option<u32> {
    match arg {
        "exta" => return Some(19200),
        "extb" => return Some(38400),
        _ => {}
    }
    parse_baud_value(arg).and_then(|v| u32::try_from(v).ok())
}

#[cfg(not(bsd))]
pub fn baud_to_value(baud: BaudRate) -> u64 {
    BAUD_RATES
        .iter()
        .find(|(b, _)| *b == baud)
        .map_or(0, |(_, v)| *v)
}

#[cfg(bsd)]
pub fn baud_to_value(baud: u32) -> u64 {
    u64::from(baud)
}

/// Parses a control-character argument. A single byte stands for itself,
/// `^-` and `undef` disable the slot, `^X` is the usual caret notation,
/// and anything longer is taken as a C-style integer. The "min" and
/// "time" slots skip the literal forms and always parse as integers.
pub fn parse_control_char(name: &str, arg: &str) -> Result<u8, IntegerArgError> {
    if name == "min" || name == "time" {
        return integer_control_char(arg);
    }
    match arg.as_bytes() {
        [] => Ok(0),
        [b] => Ok(*b),
        _ if arg == "^-" || arg == "undef" => Ok(VDISABLE),
        // trailing junk after ^X is ignored
        [b'^', b'?', ..] => Ok(127),
        [b'^', b, ..] => Ok(*b & !0x60),
        _ => integer_control_char(arg),
    }
}

fn integer_control_char(arg: &str) -> Result<u8, IntegerArgError> {
    let value = parse_integer(arg)?;
    u8::try_from(value).map_err(|_| IntegerArgError::TooLarge)
}

/// Renders a control character for display: `<undef>` for the disabled
/// slot, caret notation for controls, `M-` prefixes for the meta range.
pub fn visible(ch: u8) -> String {
    match ch {
        VDISABLE => String::from("<undef>"),
        0..=31 => format!("^{}", (ch + 64) as char),
        32..=126 => format!("{}", ch as char),
        127 => String::from("^?"),
        128..=159 => format!("M-^{}", (ch - 64) as char),
        160..=254 => format!("M-{}", (ch - 128) as char),
        255 => String::from("M-^?"),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecoverError {
    /// Wrong number of colon-separated fields for this platform.
    FieldCount,
    /// A field is not a hexadecimal integer.
    InvalidHex,
}

/// Encodes the four flag words and the control characters as the
/// colon-separated lowercase-hex string printed by `-g`.
pub fn encode_save(termios: &Termios) -> String {
    let mut out = format!(
        "{:x}:{:x}:{:x}:{:x}",
        termios.input_flags.bits(),
        termios.output_flags.bits(),
        termios.control_flags.bits(),
        termios.local_flags.bits(),
    );
    for cc in &termios.control_chars {
        // unused result of write! on String is infallible
        let _ = write!(out, ":{cc:x}");
    }
    out
}

/// Decodes a `-g` save string into `termios`, leaving the speed fields and
/// the line discipline alone. Flag words and control characters are
/// truncated to the platform width, so save strings carrying bits this
/// platform does not know are still accepted.
pub fn recover_mode(arg: &str, termios: &mut Termios) -> Result<(), RecoverError> {
    let expected = 4 + termios.control_chars.len();
    let fields: Vec<&str> = arg.split(':').collect();
    if fields.len() != expected {
        return Err(RecoverError::FieldCount);
    }
    let mut words = [0 as tcflag_t; 4];
    for (word, field) in words.iter_mut().zip(&fields[..4]) {
        *word = parse_hex_field(field)? as tcflag_t;
    }
    let mut chars = termios.control_chars;
    for (cc, field) in chars.iter_mut().zip(&fields[4..]) {
        *cc = parse_hex_field(field)? as u8;
    }
    termios.input_flags = InputFlags::from_bits_truncate(words[0]);
    termios.output_flags = OutputFlags::from_bits_truncate(words[1]);
    termios.control_flags = ControlFlags::from_bits_truncate(words[2]);
    termios.local_flags = LocalFlags::from_bits_truncate(words[3]);
    termios.control_chars = chars;
    Ok(())
}

fn parse_hex_field(field: &str) -> Result<u64, RecoverError> {
    if field.starts_with(['+', '-']) {
        return Err(RecoverError::InvalidHex);
    }
    match u64::from_str_radix(field, 16) {
        Ok(v) => Ok(v),
        Err(e) if *e.kind() == std::num::IntErrorKind::PosOverflow => Ok(u64::MAX),
        Err(_) => Err(RecoverError::InvalidHex),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("0", 0)]
    #[case("42", 42)]
    #[case("0x1f", 31)]
    #[case("0X1F", 31)]
    #[case("017", 15)]
    #[case("2b", 1024)]
    #[case("1B", 512)]
    fn integers(#[case] arg: &str, #[case] expected: u64) {
        assert_eq!(parse_integer(arg), Ok(expected));
    }

    #[rstest]
    #[case("")]
    #[case("x")]
    #[case("0x")]
    #[case("-1")]
    #[case("+1")]
    #[case("12 ")]
    #[case("098")]
    fn bad_integers(#[case] arg: &str) {
        assert_eq!(parse_integer(arg), Err(IntegerArgError::Invalid));
    }

    #[test]
    fn integer_overflow_is_distinct() {
        assert_eq!(
            parse_integer("99999999999999999999999"),
            Err(IntegerArgError::TooLarge)
        );
        assert_eq!(
            parse_integer("0xffffffffffffffffb"),
            Err(IntegerArgError::TooLarge)
        );
    }

    #[rstest]
    #[case("134", 134)]
    #[case("134.5", 134)] // half rounds to even
    #[case("135.5", 136)]
    #[case("136.5", 136)]
    #[case("134.51", 135)] // more than half rounds up
    #[case("134.500", 134)]
    #[case("134.4999", 134)]
    #[case(".5", 0)]
    #[case("  75", 75)]
    fn baud_values(#[case] arg: &str, #[case] expected: u64) {
        assert_eq!(parse_baud_value(arg), Some(expected));
    }

    #[rstest]
    #[case("")]
    #[case("-75")]
    #[case("75x")]
    #[case("75.x")]
    #[case("7 5")]
    fn bad_baud_values(#[case] arg: &str) {
        assert_eq!(parse_baud_value(arg), None);
    }

    #[cfg(not(bsd))]
    #[test]
    fn baud_identifiers() {
        use nix::sys::termios::BaudRate;
        assert_eq!(string_to_baud("9600"), Some(BaudRate::B9600));
        assert_eq!(string_to_baud("exta"), Some(BaudRate::B19200));
        assert_eq!(string_to_baud("extb"), Some(BaudRate::B38400));
        // a legal number that is not a discrete rate
        assert_eq!(string_to_baud("135.5"), None);
        assert_eq!(baud_to_value(BaudRate::B134), 134);
    }

    #[cfg(not(bsd))]
    #[test]
    fn every_known_rate_round_trips() {
        for (baud, value) in BAUD_RATES {
            assert_eq!(string_to_baud(&value.to_string()), Some(*baud));
            assert_eq!(baud_to_value(*baud), *value);
        }
    }

    #[rstest]
    #[case("intr", "^C", 3)]
    #[case("intr", "^c", 3)]
    #[case("intr", "^?", 127)]
    #[case("intr", "^-", 0)]
    #[case("intr", "undef", 0)]
    #[case("erase", "a", b'a')]
    #[case("erase", "^", b'^')]
    #[case("erase", "", 0)]
    #[case("eof", "^Dx", 4)] // junk after caret form is ignored
    #[case("intr", "127", 127)]
    #[case("intr", "0x7f", 127)]
    #[case("min", "4", 4)]
    #[case("time", "0x1f", 31)]
    fn control_char_args(#[case] name: &str, #[case] arg: &str, #[case] expected: u8) {
        assert_eq!(parse_control_char(name, arg), Ok(expected));
    }

    #[test]
    fn min_and_time_skip_the_literal_forms() {
        assert_eq!(
            parse_control_char("min", "^"),
            Err(IntegerArgError::Invalid)
        );
        assert_eq!(
            parse_control_char("time", "undef"),
            Err(IntegerArgError::Invalid)
        );
    }

    #[test]
    fn control_char_out_of_range() {
        assert_eq!(
            parse_control_char("min", "300"),
            Err(IntegerArgError::TooLarge)
        );
    }

    #[rstest]
    #[case(0, "<undef>")]
    #[case(3, "^C")]
    #[case(31, "^_")]
    #[case(b'a', "a")]
    #[case(127, "^?")]
    #[case(128 + 3, "M-^C")]
    #[case(128 + b'a', "M-a")]
    #[case(255, "M-^?")]
    fn visible_rendering(#[case] ch: u8, #[case] expected: &str) {
        assert_eq!(visible(ch), expected);
    }

    fn scratch() -> Termios {
        crate::zeroed_termios()
    }

    #[test]
    fn save_string_round_trips() {
        let mut termios = scratch();
        termios.input_flags = InputFlags::ICRNL | InputFlags::IXON;
        termios.output_flags = OutputFlags::OPOST;
        termios.local_flags = LocalFlags::ISIG | LocalFlags::ICANON;
        termios.control_chars[0] = 3;
        let save = encode_save(&termios);

        let mut recovered = scratch();
        recover_mode(&save, &mut recovered).unwrap();
        assert_eq!(recovered.input_flags, termios.input_flags);
        assert_eq!(recovered.output_flags, termios.output_flags);
        assert_eq!(recovered.local_flags, termios.local_flags);
        assert_eq!(recovered.control_chars, termios.control_chars);
    }

    #[test]
    fn save_string_accepts_unknown_high_bits() {
        let mut termios = scratch();
        let save = encode_save(&termios);
        let mut fields: Vec<String> = save.split(':').map(str::to_string).collect();
        fields[0] = format!("{:x}", 1u64 << 63);
        assert_eq!(recover_mode(&fields.join(":"), &mut termios), Ok(()));
    }

    #[test]
    fn save_string_accepts_uppercase_hex() {
        let mut termios = scratch();
        termios.local_flags = LocalFlags::ISIG | LocalFlags::ECHO;
        let save = encode_save(&termios).to_ascii_uppercase();
        let mut recovered = scratch();
        recover_mode(&save, &mut recovered).unwrap();
        assert_eq!(recovered.local_flags, termios.local_flags);
    }

    #[test]
    fn save_string_field_count_is_strict() {
        let mut termios = scratch();
        let save = encode_save(&termios);
        assert_eq!(
            recover_mode("1:2:3:4", &mut termios),
            Err(RecoverError::FieldCount)
        );
        assert_eq!(
            recover_mode(&format!("{save}:0"), &mut termios),
            Err(RecoverError::FieldCount)
        );
        let truncated = save.rsplit_once(':').map(|(head, _)| head.to_string());
        assert_eq!(
            recover_mode(&truncated.unwrap(), &mut termios),
            Err(RecoverError::FieldCount)
        );
    }

    #[test]
    fn save_string_rejects_malformed_hex() {
        let mut termios = scratch();
        let save = encode_save(&termios);
        let mut fields: Vec<String> = save.split(':').map(str::to_string).collect();
        fields[1] = "zz".into();
        assert_eq!(
            recover_mode(&fields.join(":"), &mut termios),
            Err(RecoverError::InvalidHex)
        );
        assert_eq!(
            recover_mode(&format!("{save} "), &mut termios),
            Err(RecoverError::InvalidHex)
        );
    }
}
