// This file is part of the uutils coreutils package.
//
// For the full copyright and license information, please view the LICENSE
// file that was distributed with this source code.

// spell-checker:ignore parenb parodd cmspar hupcl cstopb cread clocal crtscts CSIZE
// spell-checker:ignore ignbrk brkint ignpar parmrk inpck istrip inlcr igncr icrnl ixoff ixon iuclc ixany imaxbel iutf
// spell-checker:ignore opost olcuc ocrnl onlcr onocr onlret ofill ofdel nldly crdly tabdly bsdly vtdly ffdly oxtabs
// spell-checker:ignore isig icanon iexten echoe crterase echok echonl noflsh xcase tostop echoprt prterase echoctl ctlecho echoke crtkill flusho extproc
// spell-checker:ignore lnext rprnt werase dsusp evenp oddp litout cbreak decctlq

use crate::combination::Combination;
use crate::Flag;
#[cfg(not(bsd))]
use nix::sys::termios::BaudRate;
use nix::sys::termios::SpecialCharacterIndices as V;
use nix::sys::termios::{ControlFlags as C, InputFlags as I, LocalFlags as L, OutputFlags as O};

/// The POSIX disabling value for a control character slot.
pub const VDISABLE: u8 = 0;

const fn control(c: u8) -> u8 {
    c & 0x1f
}

// Canonical ("sane") values for the control characters.
pub const CINTR: u8 = control(b'c');
pub const CQUIT: u8 = 28;
pub const CERASE: u8 = 127;
pub const CKILL: u8 = control(b'u');
pub const CEOF: u8 = control(b'd');
pub const CEOL: u8 = VDISABLE;
pub const CSTART: u8 = control(b'q');
pub const CSTOP: u8 = control(b's');
pub const CSUSP: u8 = control(b'z');
pub const CRPRNT: u8 = control(b'r');
pub const CWERASE: u8 = control(b'w');
pub const CLNEXT: u8 = control(b'v');
pub const CFLUSHO: u8 = control(b'o');
#[cfg(bsd)]
pub const CDSUSP: u8 = control(b'y');
#[cfg(bsd)]
pub const CSTATUS: u8 = control(b't');

/// One named control-character slot.
#[derive(Clone, Copy, Debug)]
pub struct ControlChar {
    pub name: &'static str,
    pub sane: u8,
    pub index: V,
    pub show: bool,
}

impl ControlChar {
    pub const fn new(name: &'static str, sane: u8, index: V) -> Self {
        Self {
            name,
            sane,
            index,
            show: true,
        }
    }

    pub const fn hidden(mut self) -> Self {
        self.show = false;
        self
    }
}

// "min" and "time" must stay last: they take the numeric-argument path when
// parsed and the display routines slice them off the end of this table.
#[cfg(not(bsd))]
pub const CONTROL_CHARS: &[ControlChar] = &[
    ControlChar::new("intr", CINTR, V::VINTR),
    ControlChar::new("quit", CQUIT, V::VQUIT),
    ControlChar::new("erase", CERASE, V::VERASE),
    ControlChar::new("kill", CKILL, V::VKILL),
    ControlChar::new("eof", CEOF, V::VEOF),
    ControlChar::new("eol", CEOL, V::VEOL),
    ControlChar::new("eol2", VDISABLE, V::VEOL2),
    ControlChar::new("swtch", VDISABLE, V::VSWTC),
    ControlChar::new("start", CSTART, V::VSTART),
    ControlChar::new("stop", CSTOP, V::VSTOP),
    ControlChar::new("susp", CSUSP, V::VSUSP),
    ControlChar::new("rprnt", CRPRNT, V::VREPRINT),
    ControlChar::new("werase", CWERASE, V::VWERASE),
    ControlChar::new("lnext", CLNEXT, V::VLNEXT),
    // deprecated compat alias for "discard"
    ControlChar::new("flush", CFLUSHO, V::VDISCARD).hidden(),
    ControlChar::new("discard", CFLUSHO, V::VDISCARD),
    ControlChar::new("min", 1, V::VMIN),
    ControlChar::new("time", 0, V::VTIME),
];

#[cfg(bsd)]
pub const CONTROL_CHARS: &[ControlChar] = &[
    ControlChar::new("intr", CINTR, V::VINTR),
    ControlChar::new("quit", CQUIT, V::VQUIT),
    ControlChar::new("erase", CERASE, V::VERASE),
    ControlChar::new("kill", CKILL, V::VKILL),
    ControlChar::new("eof", CEOF, V::VEOF),
    ControlChar::new("eol", CEOL, V::VEOL),
    ControlChar::new("eol2", VDISABLE, V::VEOL2),
    ControlChar::new("start", CSTART, V::VSTART),
    ControlChar::new("stop", CSTOP, V::VSTOP),
    ControlChar::new("susp", CSUSP, V::VSUSP),
    ControlChar::new("dsusp", CDSUSP, V::VDSUSP),
    ControlChar::new("rprnt", CRPRNT, V::VREPRINT),
    ControlChar::new("werase", CWERASE, V::VWERASE),
    ControlChar::new("lnext", CLNEXT, V::VLNEXT),
    ControlChar::new("flush", CFLUSHO, V::VDISCARD).hidden(),
    ControlChar::new("discard", CFLUSHO, V::VDISCARD),
    ControlChar::new("status", CSTATUS, V::VSTATUS),
    ControlChar::new("min", 1, V::VMIN),
    ControlChar::new("time", 0, V::VTIME),
];

/// The control-character slots displayed by the literal/caret path, i.e.
/// everything but the trailing "min"/"time" pair.
pub fn displayed_control_chars() -> &'static [ControlChar] {
    &CONTROL_CHARS[..CONTROL_CHARS.len() - 2]
}

#[cfg(not(bsd))]
pub const CONTROL_FLAGS: &[Flag<C>] = &[
    Flag::new("parenb", C::PARENB),
    Flag::new("parodd", C::PARODD),
    Flag::new("cmspar", C::CMSPAR),
    Flag::new("cs5", C::CS5).group(C::CSIZE),
    Flag::new("cs6", C::CS6).group(C::CSIZE),
    Flag::new("cs7", C::CS7).group(C::CSIZE),
    Flag::new("cs8", C::CS8).group(C::CSIZE),
    Flag::new("hupcl", C::HUPCL),
    Flag::new("hup", C::HUPCL).hidden(),
    Flag::new("cstopb", C::CSTOPB),
    Flag::new("cread", C::CREAD).sane(),
    Flag::new("clocal", C::CLOCAL),
    Flag::new("crtscts", C::CRTSCTS),
];

#[cfg(bsd)]
pub const CONTROL_FLAGS: &[Flag<C>] = &[
    Flag::new("parenb", C::PARENB),
    Flag::new("parodd", C::PARODD),
    Flag::new("cs5", C::CS5).group(C::CSIZE),
    Flag::new("cs6", C::CS6).group(C::CSIZE),
    Flag::new("cs7", C::CS7).group(C::CSIZE),
    Flag::new("cs8", C::CS8).group(C::CSIZE),
    Flag::new("hupcl", C::HUPCL),
    Flag::new("hup", C::HUPCL).hidden(),
    Flag::new("cstopb", C::CSTOPB),
    Flag::new("cread", C::CREAD).sane(),
    Flag::new("clocal", C::CLOCAL),
    Flag::new("crtscts", C::CRTSCTS),
];

#[cfg(not(bsd))]
pub const INPUT_FLAGS: &[Flag<I>] = &[
    Flag::new("ignbrk", I::IGNBRK).sane_unset(),
    Flag::new("brkint", I::BRKINT).sane(),
    Flag::new("ignpar", I::IGNPAR),
    Flag::new("parmrk", I::PARMRK),
    Flag::new("inpck", I::INPCK),
    Flag::new("istrip", I::ISTRIP),
    Flag::new("inlcr", I::INLCR).sane_unset(),
    Flag::new("igncr", I::IGNCR).sane_unset(),
    Flag::new("icrnl", I::ICRNL).sane(),
    Flag::new("ixon", I::IXON),
    Flag::new("ixoff", I::IXOFF).sane_unset(),
    Flag::new("tandem", I::IXOFF).hidden(),
    // "iuclc" needs IUCLC, which the termios binding does not expose
    Flag::new("ixany", I::IXANY).sane_unset(),
    Flag::new("imaxbel", I::IMAXBEL).sane(),
    Flag::new("iutf8", I::IUTF8).sane_unset(),
];

#[cfg(bsd)]
pub const INPUT_FLAGS: &[Flag<I>] = &[
    Flag::new("ignbrk", I::IGNBRK).sane_unset(),
    Flag::new("brkint", I::BRKINT).sane(),
    Flag::new("ignpar", I::IGNPAR),
    Flag::new("parmrk", I::PARMRK),
    Flag::new("inpck", I::INPCK),
    Flag::new("istrip", I::ISTRIP),
    Flag::new("inlcr", I::INLCR).sane_unset(),
    Flag::new("igncr", I::IGNCR).sane_unset(),
    Flag::new("icrnl", I::ICRNL).sane(),
    Flag::new("ixon", I::IXON),
    Flag::new("ixoff", I::IXOFF).sane_unset(),
    Flag::new("tandem", I::IXOFF).hidden(),
    Flag::new("ixany", I::IXANY).sane_unset(),
    Flag::new("imaxbel", I::IMAXBEL).sane(),
];

#[cfg(not(bsd))]
pub const OUTPUT_FLAGS: &[Flag<O>] = &[
    Flag::new("opost", O::OPOST).sane(),
    Flag::new("olcuc", O::OLCUC).sane_unset(),
    Flag::new("ocrnl", O::OCRNL).sane_unset(),
    Flag::new("onlcr", O::ONLCR).sane(),
    Flag::new("onocr", O::ONOCR).sane_unset(),
    Flag::new("onlret", O::ONLRET).sane_unset(),
    // "ofill" needs OFILL, which the termios binding does not expose
    Flag::new("ofdel", O::OFDEL).sane_unset(),
    Flag::new("nl1", O::NL1).group(O::NLDLY).sane_unset(),
    Flag::new("nl0", O::NL0).group(O::NLDLY).sane(),
    Flag::new("cr3", O::CR3).group(O::CRDLY).sane_unset(),
    Flag::new("cr2", O::CR2).group(O::CRDLY).sane_unset(),
    Flag::new("cr1", O::CR1).group(O::CRDLY).sane_unset(),
    Flag::new("cr0", O::CR0).group(O::CRDLY).sane(),
    Flag::new("tab3", O::TAB3).group(O::TABDLY).sane_unset(),
    Flag::new("tab2", O::TAB2).group(O::TABDLY).sane_unset(),
    Flag::new("tab1", O::TAB1).group(O::TABDLY).sane_unset(),
    Flag::new("tab0", O::TAB0).group(O::TABDLY).sane(),
    Flag::new("bs1", O::BS1).group(O::BSDLY).sane_unset(),
    Flag::new("bs0", O::BS0).group(O::BSDLY).sane(),
    Flag::new("vt1", O::VT1).group(O::VTDLY).sane_unset(),
    Flag::new("vt0", O::VT0).group(O::VTDLY).sane(),
    Flag::new("ff1", O::FF1).group(O::FFDLY).sane_unset(),
    Flag::new("ff0", O::FF0).group(O::FFDLY).sane(),
];

#[cfg(bsd)]
pub const OUTPUT_FLAGS: &[Flag<O>] = &[
    Flag::new("opost", O::OPOST).sane(),
    Flag::new("ocrnl", O::OCRNL).sane_unset(),
    Flag::new("onlcr", O::ONLCR).sane(),
    Flag::new("onocr", O::ONOCR).sane_unset(),
    Flag::new("onlret", O::ONLRET).sane_unset(),
    Flag::new("tab3", O::OXTABS).sane_unset(),
];

#[cfg(not(bsd))]
pub const LOCAL_FLAGS: &[Flag<L>] = &[
    Flag::new("isig", L::ISIG).sane(),
    Flag::new("icanon", L::ICANON).sane(),
    Flag::new("iexten", L::IEXTEN).sane(),
    Flag::new("echo", L::ECHO).sane(),
    Flag::new("echoe", L::ECHOE).sane(),
    Flag::new("crterase", L::ECHOE).hidden(),
    Flag::new("echok", L::ECHOK).sane(),
    Flag::new("echonl", L::ECHONL).sane_unset(),
    Flag::new("noflsh", L::NOFLSH).sane_unset(),
    // "xcase" needs XCASE, which the termios binding does not expose
    Flag::new("tostop", L::TOSTOP).sane_unset(),
    Flag::new("echoprt", L::ECHOPRT).sane_unset(),
    Flag::new("prterase", L::ECHOPRT).hidden(),
    Flag::new("echoctl", L::ECHOCTL).sane(),
    Flag::new("ctlecho", L::ECHOCTL).hidden(),
    Flag::new("echoke", L::ECHOKE).sane(),
    Flag::new("crtkill", L::ECHOKE).hidden(),
    Flag::new("flusho", L::FLUSHO).sane_unset(),
    Flag::new("extproc", L::EXTPROC).sane_unset(),
];

#[cfg(bsd)]
pub const LOCAL_FLAGS: &[Flag<L>] = &[
    Flag::new("isig", L::ISIG).sane(),
    Flag::new("icanon", L::ICANON).sane(),
    Flag::new("iexten", L::IEXTEN).sane(),
    Flag::new("echo", L::ECHO).sane(),
    Flag::new("echoe", L::ECHOE).sane(),
    Flag::new("crterase", L::ECHOE).hidden(),
    Flag::new("echok", L::ECHOK).sane(),
    Flag::new("echonl", L::ECHONL).sane_unset(),
    Flag::new("noflsh", L::NOFLSH).sane_unset(),
    Flag::new("tostop", L::TOSTOP).sane_unset(),
    Flag::new("echoprt", L::ECHOPRT).sane_unset(),
    Flag::new("prterase", L::ECHOPRT).hidden(),
    Flag::new("echoctl", L::ECHOCTL).sane(),
    Flag::new("ctlecho", L::ECHOCTL).hidden(),
    Flag::new("echoke", L::ECHOKE).sane(),
    Flag::new("crtkill", L::ECHOKE).hidden(),
    Flag::new("flusho", L::FLUSHO).sane_unset(),
    // The BSD interface to "extproc" is the TIOCEXT ioctl, not tcsetattr.
    Flag::new("extproc", L::EXTPROC).sane_unset().no_set_attr(),
];

/// A combination setting: a named bundle of edits resolved to a
/// [`Combination`] variant when the table is built, not at apply time.
#[derive(Clone, Copy, Debug)]
pub struct Combo {
    pub name: &'static str,
    pub mode: Combination,
    pub reversible: bool,
}

impl Combo {
    const fn new(name: &'static str, mode: Combination) -> Self {
        Self {
            name,
            mode,
            reversible: true,
        }
    }

    const fn no_negate(mut self) -> Self {
        self.reversible = false;
        self
    }
}

pub const COMBINATION_SETTINGS: &[Combo] = &[
    Combo::new("evenp", Combination::Evenp),
    Combo::new("parity", Combination::Parity),
    Combo::new("oddp", Combination::Oddp),
    Combo::new("nl", Combination::Nl),
    Combo::new("ek", Combination::Ek).no_negate(),
    Combo::new("sane", Combination::Sane).no_negate(),
    Combo::new("cooked", Combination::Cooked),
    Combo::new("raw", Combination::Raw),
    Combo::new("pass8", Combination::Pass8),
    Combo::new("litout", Combination::Litout),
    Combo::new("cbreak", Combination::Cbreak),
    Combo::new("decctlq", Combination::Decctlq),
    Combo::new("tabs", Combination::Tabs),
    Combo::new("crt", Combination::Crt).no_negate(),
    Combo::new("dec", Combination::Dec).no_negate(),
];

// BSDs pass the numeric rate straight through to the kernel; everything else
// uses the termios baud-rate identifiers paired with their numeric values.
#[cfg(any(target_os = "linux", target_os = "android"))]
pub const BAUD_RATES: &[(BaudRate, u64)] = &[
    (BaudRate::B0, 0),
    (BaudRate::B50, 50),
    (BaudRate::B75, 75),
    (BaudRate::B110, 110),
    (BaudRate::B134, 134),
    (BaudRate::B150, 150),
    (BaudRate::B200, 200),
    (BaudRate::B300, 300),
    (BaudRate::B600, 600),
    (BaudRate::B1200, 1200),
    (BaudRate::B1800, 1800),
    (BaudRate::B2400, 2400),
    (BaudRate::B4800, 4800),
    (BaudRate::B9600, 9600),
    (BaudRate::B19200, 19200),
    (BaudRate::B38400, 38400),
    (BaudRate::B57600, 57600),
    (BaudRate::B115200, 115_200),
    (BaudRate::B230400, 230_400),
    (BaudRate::B460800, 460_800),
    (BaudRate::B500000, 500_000),
    (BaudRate::B576000, 576_000),
    (BaudRate::B921600, 921_600),
    (BaudRate::B1000000, 1_000_000),
    (BaudRate::B1152000, 1_152_000),
    (BaudRate::B1500000, 1_500_000),
    (BaudRate::B2000000, 2_000_000),
    (BaudRate::B2500000, 2_500_000),
    (BaudRate::B3000000, 3_000_000),
    (BaudRate::B3500000, 3_500_000),
    (BaudRate::B4000000, 4_000_000),
];

#[cfg(all(not(bsd), not(any(target_os = "linux", target_os = "android"))))]
pub const BAUD_RATES: &[(BaudRate, u64)] = &[
    (BaudRate::B0, 0),
    (BaudRate::B50, 50),
    (BaudRate::B75, 75),
    (BaudRate::B110, 110),
    (BaudRate::B134, 134),
    (BaudRate::B150, 150),
    (BaudRate::B200, 200),
    (BaudRate::B300, 300),
    (BaudRate::B600, 600),
    (BaudRate::B1200, 1200),
    (BaudRate::B1800, 1800),
    (BaudRate::B2400, 2400),
    (BaudRate::B4800, 4800),
    (BaudRate::B9600, 9600),
    (BaudRate::B19200, 19200),
    (BaudRate::B38400, 38400),
];

pub fn find_combination(name: &str) -> Option<&'static Combo> {
    COMBINATION_SETTINGS.iter().find(|c| c.name == name)
}

pub fn find_control_char(name: &str) -> Option<&'static ControlChar> {
    CONTROL_CHARS.iter().find(|c| c.name == name)
}
