// This file is part of the uutils coreutils package.
//
// For the full copyright and license information, please view the LICENSE
// file that was distributed with this source code.

// spell-checker:ignore evenp oddp litout cbreak decctlq icanon icrnl inlcr igncr onlcr ocrnl onlret opost istrip parenb parodd ixany isig iexten echoe echok noflsh ixon ignbrk brkint ignpar imaxbel

//! Combination settings: single names that expand to a bundle of flag and
//! control-character edits, like `raw`, `sane` or `dec`.

use crate::flags::{self, CERASE, CINTR, CKILL};
use crate::TermiosFlag;
use nix::sys::termios::{
    ControlFlags as C, InputFlags as I, LocalFlags as L, OutputFlags as O,
    SpecialCharacterIndices as V, Termios,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Combination {
    Evenp,
    Parity,
    Oddp,
    Nl,
    Ek,
    Sane,
    Cooked,
    Raw,
    Pass8,
    Litout,
    Cbreak,
    Decctlq,
    Tabs,
    Crt,
    Dec,
}

fn set_char(termios: &mut Termios, index: V, value: u8) {
    termios.control_chars[index as usize] = value;
}

/// Expands one combination setting into `termios`. Whether a name may be
/// negated at all is recorded in the settings table; by the time we get
/// here a reversed non-reversible name has already been rejected.
pub fn apply_combination(mode: Combination, reversed: bool, termios: &mut Termios) {
    use Combination::*;
    match (mode, reversed) {
        (Evenp | Parity, false) => {
            termios.control_flags.remove(C::PARODD | C::CSIZE);
            termios.control_flags.insert(C::PARENB | C::CS7);
        }
        // -evenp, -parity and -oddp all mean "no parity, 8 bits"
        (Evenp | Parity | Oddp, true) => {
            termios.control_flags.remove(C::PARENB | C::CSIZE);
            termios.control_flags.insert(C::CS8);
        }
        (Oddp, false) => {
            termios.control_flags.remove(C::CSIZE);
            termios.control_flags.insert(C::PARENB | C::PARODD | C::CS7);
        }
        (Nl, false) => {
            termios.input_flags.remove(I::ICRNL);
            termios.output_flags.remove(O::ONLCR);
        }
        (Nl, true) => {
            termios.input_flags.insert(I::ICRNL);
            termios.input_flags.remove(I::INLCR | I::IGNCR);
            termios.output_flags.insert(O::ONLCR);
            termios.output_flags.remove(O::OCRNL | O::ONLRET);
        }
        (Ek, _) => {
            set_char(termios, V::VERASE, CERASE);
            set_char(termios, V::VKILL, CKILL);
        }
        (Sane, _) => sane_mode(termios),
        (Raw, false) | (Cooked, true) => {
            termios.input_flags = I::empty();
            termios.output_flags.remove(O::OPOST);
            termios.local_flags.remove(L::ISIG | L::ICANON);
            set_char(termios, V::VMIN, 1);
            set_char(termios, V::VTIME, 0);
        }
        (Raw, true) | (Cooked, false) => {
            termios
                .input_flags
                .insert(I::BRKINT | I::IGNPAR | I::ISTRIP | I::ICRNL | I::IXON);
            termios.output_flags.insert(O::OPOST);
            termios.local_flags.insert(L::ISIG | L::ICANON);
        }
        (Cbreak, false) => termios.local_flags.remove(L::ICANON),
        (Cbreak, true) => termios.local_flags.insert(L::ICANON),
        (Pass8, false) => {
            termios.control_flags.remove(C::PARENB | C::CSIZE);
            termios.control_flags.insert(C::CS8);
            termios.input_flags.remove(I::ISTRIP);
        }
        (Pass8, true) => {
            termios.control_flags.remove(C::CSIZE);
            termios.control_flags.insert(C::PARENB | C::CS7);
            termios.input_flags.insert(I::ISTRIP);
        }
        (Litout, false) => {
            apply_combination(Pass8, false, termios);
            termios.output_flags.remove(O::OPOST);
        }
        (Litout, true) => {
            apply_combination(Pass8, true, termios);
            termios.output_flags.insert(O::OPOST);
        }
        (Decctlq, false) => termios.input_flags.remove(I::IXANY),
        (Decctlq, true) => termios.input_flags.insert(I::IXANY),
        (Tabs, _) => {
            #[cfg(not(bsd))]
            {
                termios.output_flags.remove(O::TABDLY);
                termios
                    .output_flags
                    .insert(if reversed { O::TAB3 } else { O::TAB0 });
            }
            #[cfg(bsd)]
            if reversed {
                termios.output_flags.insert(O::OXTABS);
            } else {
                termios.output_flags.remove(O::OXTABS);
            }
        }
        (Crt, _) => {
            termios
                .local_flags
                .insert(L::ECHOE | L::ECHOCTL | L::ECHOKE);
        }
        (Dec, _) => {
            apply_combination(Crt, false, termios);
            set_char(termios, V::VINTR, CINTR);
            set_char(termios, V::VERASE, CERASE);
            set_char(termios, V::VKILL, CKILL);
            termios.input_flags.remove(I::IXANY);
        }
    }
}

/// Resets every flag that has a canonical value, and every control
/// character, to its canonical setting. Flags without an opinion (most of
/// the control-flag word) and the speed fields are left alone.
pub fn sane_mode(termios: &mut Termios) {
    for flag in flags::CONTROL_FLAGS {
        apply_sane(flag, termios);
    }
    for flag in flags::INPUT_FLAGS {
        apply_sane(flag, termios);
    }
    for flag in flags::OUTPUT_FLAGS {
        apply_sane(flag, termios);
    }
    for flag in flags::LOCAL_FLAGS {
        apply_sane(flag, termios);
    }
    for cc in flags::CONTROL_CHARS {
        termios.control_chars[cc.index as usize] = cc.sane;
    }
}

fn apply_sane<T: TermiosFlag>(flag: &crate::Flag<T>, termios: &mut Termios) {
    if flag.no_set_attr {
        return;
    }
    if let Some(value) = flag.sane {
        flag.apply(termios, value);
    }
}
