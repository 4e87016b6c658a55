// This file is part of the uutils coreutils package.
//
// For the full copyright and license information, please view the LICENSE
// file that was distributed with this source code.

// spell-checker:ignore clocal tcgetattr tcsetattr tcsadrain tcsanow tiocgwinsz tiocswinsz tiocext
// spell-checker:ignore cfgetispeed cfgetospeed cfsetispeed cfsetospeed ushort vmin vtime ixon ispeed ospeed

mod codec;
mod combination;
mod display;
mod flags;

use clap::{crate_version, Arg, ArgAction, ArgMatches, Command};
use nix::libc::{c_ushort, O_NONBLOCK, TIOCGWINSZ, TIOCSWINSZ};
use nix::sys::termios::{
    cfgetispeed, cfgetospeed, cfsetispeed, cfsetospeed, tcgetattr, tcsetattr, ControlFlags,
    InputFlags, LocalFlags, OutputFlags, SetArg, Termios,
};
use nix::{ioctl_read_bad, ioctl_write_ptr_bad};
use std::ffi::OsStr;
use std::fs::File;
use std::io::{self, Stdin};
use std::os::fd::{AsFd, BorrowedFd};
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::{AsRawFd, RawFd};
use uucore::display::Quotable;
use uucore::error::{FromIo, UError, UResult, USimpleError};
use uucore::{format_usage, help_about, help_usage, show_error};

use codec::RecoverError;
use combination::apply_combination;
use flags::{CONTROL_FLAGS, INPUT_FLAGS, LOCAL_FLAGS, OUTPUT_FLAGS};

const USAGE: &str = help_usage!("stty.md");
const SUMMARY: &str = help_about!("stty.md");

#[derive(Clone, Copy, Debug)]
pub struct Flag<T> {
    name: &'static str,
    flag: T,
    show: bool,
    /// `Some(true)` if `sane` sets this flag, `Some(false)` if it clears
    /// it, `None` if `sane` has no opinion.
    sane: Option<bool>,
    group: Option<T>,
    /// Applied through a device ioctl rather than `tcsetattr`.
    no_set_attr: bool,
}

// The `Copy` bound keeps `Option<T>` free of drop glue, which the const
// builders need to reassign `group`.
impl<T: Copy> Flag<T> {
    pub const fn new(name: &'static str, flag: T) -> Self {
        Self {
            name,
            flag,
            show: true,
            sane: None,
            group: None,
            no_set_attr: false,
        }
    }

    pub const fn group(mut self, group: T) -> Self {
        self.group = Some(group);
        self
    }

    pub const fn hidden(mut self) -> Self {
        self.show = false;
        self
    }

    pub const fn sane(mut self) -> Self {
        self.sane = Some(true);
        self
    }

    pub const fn sane_unset(mut self) -> Self {
        self.sane = Some(false);
        self
    }

    #[cfg_attr(not(bsd), allow(dead_code))]
    pub const fn no_set_attr(mut self) -> Self {
        self.no_set_attr = true;
        self
    }
}

impl<T: TermiosFlag> Flag<T> {
    fn is_in(&self, termios: &Termios) -> bool {
        self.flag.is_in(termios, self.group)
    }

    /// When setting a grouped flag, the other bits of the group are
    /// cleared first.
    fn apply(&self, termios: &mut Termios, val: bool) {
        if val {
            if let Some(group) = self.group {
                group.apply(termios, false);
            }
        }
        self.flag.apply(termios, val);
    }
}

trait TermiosFlag: Copy {
    fn is_in(&self, termios: &Termios, group: Option<Self>) -> bool;
    fn apply(&self, termios: &mut Termios, val: bool);
}

mod options {
    pub const ALL: &str = "all";
    pub const SAVE: &str = "save";
    pub const FILE: &str = "file";
    pub const DEBUG: &str = "debug";
    pub const SETTINGS: &str = "settings";
}

struct Options<'a> {
    all: bool,
    save: bool,
    debug: bool,
    file: Option<&'a str>,
    settings: Vec<&'a str>,
}

impl<'a> Options<'a> {
    fn from(matches: &'a ArgMatches) -> UResult<Self> {
        let files: Vec<&String> = matches
            .get_many::<String>(options::FILE)
            .map(|v| v.collect())
            .unwrap_or_default();
        if files.len() > 1 {
            return Err(USimpleError::new(1, "only one device may be specified"));
        }
        Ok(Self {
            all: matches.get_flag(options::ALL),
            save: matches.get_flag(options::SAVE),
            debug: matches.get_flag(options::DEBUG),
            file: files.first().map(|s| s.as_str()),
            settings: matches
                .get_many::<String>(options::SETTINGS)
                .map(|v| v.map(String::as_str).collect())
                .unwrap_or_default(),
        })
    }

    fn device_name(&self) -> &str {
        self.file.unwrap_or("standard input")
    }
}

enum Device {
    File(File),
    Stdin(Stdin),
}

impl AsFd for Device {
    fn as_fd(&self) -> BorrowedFd<'_> {
        match self {
            Self::File(f) => f.as_fd(),
            Self::Stdin(stdin) => stdin.as_fd(),
        }
    }
}

impl AsRawFd for Device {
    fn as_raw_fd(&self) -> RawFd {
        match self {
            Self::File(f) => f.as_raw_fd(),
            Self::Stdin(stdin) => stdin.as_raw_fd(),
        }
    }
}

impl Device {
    fn open(file: Option<&str>) -> UResult<Self> {
        match file {
            // Two notes here:
            // 1. O_NONBLOCK is needed because according to GNU docs, a
            //    POSIX tty can block waiting for carrier-detect if the
            //    "clocal" flag is not set. If your TTY is not connected
            //    to a modem, it is probably not relevant though.
            // 2. We never close the FD that we open here, but the OS
            //    will clean up the FD for us on exit, so it doesn't
            //    matter. The alternative would be to have an enum of
            //    BorrowedFd/OwnedFd to handle both cases.
            Some(f) => Ok(Self::File(
                std::fs::OpenOptions::new()
                    .read(true)
                    .custom_flags(O_NONBLOCK)
                    .open(f)
                    .map_err_context(|| f.maybe_quote().to_string())?,
            )),
            None => Ok(Self::Stdin(io::stdin())),
        }
    }
}

// Needs to be repr(C) because we pass it to the ioctl calls.
#[repr(C)]
#[derive(Default, Debug)]
pub struct TermSize {
    rows: c_ushort,
    columns: c_ushort,
    x: c_ushort,
    y: c_ushort,
}

ioctl_read_bad!(
    /// Get terminal window size
    tiocgwinsz,
    TIOCGWINSZ,
    TermSize
);

ioctl_write_ptr_bad!(
    /// Set terminal window size
    tiocswinsz,
    TIOCSWINSZ,
    TermSize
);

#[cfg(bsd)]
ioctl_write_ptr_bad!(
    /// Switch external-processing mode on or off
    tiocext,
    nix::libc::TIOCEXT,
    nix::libc::c_int
);

/// What a run of settings asks of the terminal afterwards.
struct AppliedSettings {
    /// At least one setting went through the termios structure.
    require_set_attr: bool,
    /// `drain`/`-drain` choose whether pending output is flushed first.
    set_arg: SetArg,
}

#[uucore::main]
pub fn uumain(args: impl uucore::Args) -> UResult<()> {
    // Manually fix this edge case:
    //
    // stty -- -ixon
    let end_of_options_os_str = OsStr::new("--");

    // Ignore the end of options delimiter ("--") and everything after, as GNU Core Utilities does
    let fixed_args = args.take_while(|os| os.as_os_str() != end_of_options_os_str);

    let matches = uu_app().try_get_matches_from(fixed_args)?;

    let opts = Options::from(&matches)?;

    stty(&opts)
}

fn stty(opts: &Options) -> UResult<()> {
    if opts.save && opts.all {
        return Err(USimpleError::new(
            1,
            "the options for verbose and stty-readable output styles are mutually exclusive",
        ));
    }

    // drain/-drain tune how a write happens; on their own they are not
    // mode-setting arguments.
    let have_mode_args = opts
        .settings
        .iter()
        .any(|s| !matches!(*s, "drain" | "-drain"));

    if have_mode_args && (opts.save || opts.all) {
        return Err(USimpleError::new(
            1,
            "when specifying an output style, modes may not be set",
        ));
    }

    // Validate every setting against a blank mode before the device is
    // even opened, so a bad trailing argument cannot leave the terminal
    // half-changed.
    if !opts.settings.is_empty() {
        let mut scratch = zeroed_termios();
        apply_settings(&mut scratch, opts, true, None)?;
    }

    let device = Device::open(opts.file)?;
    let mut termios = tcgetattr(device.as_fd()).map_err(|e| device_error(opts, e))?;

    if !have_mode_args {
        return print_settings(&termios, opts, &device);
    }

    let outcome = apply_settings(&mut termios, opts, false, Some(&device))?;
    if outcome.require_set_attr {
        tcsetattr(device.as_fd(), outcome.set_arg, &termios)
            .map_err(|e| device_error(opts, e))?;

        // POSIX allows tcsetattr to return successfully if it performed
        // *any* of the requested operations, so read the state back and
        // make sure everything stuck.
        let applied = tcgetattr(device.as_fd()).map_err(|e| device_error(opts, e))?;
        if !eq_mode(&termios, &applied) {
            if opts.debug {
                dump_termios_diff(&termios, &applied);
            }
            return Err(USimpleError::new(
                1,
                format!(
                    "{}: unable to perform all requested operations",
                    opts.device_name().maybe_quote()
                ),
            ));
        }
    }

    Ok(())
}

/// Walks the settings list once. With `checking` the list is only
/// validated: nothing is printed, no ioctl runs, and the scratch mode is
/// thrown away. The second walk over the real mode can then only fail on
/// device errors.
fn apply_settings(
    termios: &mut Termios,
    opts: &Options,
    checking: bool,
    device: Option<&Device>,
) -> UResult<AppliedSettings> {
    let mut outcome = AppliedSettings {
        require_set_attr: false,
        set_arg: SetArg::TCSADRAIN,
    };
    let mut ibaud: Option<u64> = None;
    let mut obaud: Option<u64> = None;

    let mut iter = opts.settings.iter().copied();
    while let Some(setting) = iter.next() {
        // drain/-drain choose how tcsetattr is called and are not modes
        match setting {
            "drain" => {
                outcome.set_arg = SetArg::TCSADRAIN;
                continue;
            }
            "-drain" => {
                outcome.set_arg = SetArg::TCSANOW;
                continue;
            }
            _ => {}
        }

        let (reversed, name) = match setting.strip_prefix('-') {
            Some(st) => (true, st),
            None => (false, setting),
        };

        #[cfg(bsd)]
        if name == "extproc" {
            if !checking {
                if let Some(device) = device {
                    let value: nix::libc::c_int = i32::from(!reversed);
                    unsafe { tiocext(device.as_raw_fd(), &value) }
                        .map_err(|e| device_error(opts, e))?;
                }
            }
            continue;
        }

        if apply_flag(termios, CONTROL_FLAGS, name, reversed, &mut outcome)
            || apply_flag(termios, INPUT_FLAGS, name, reversed, &mut outcome)
            || apply_flag(termios, OUTPUT_FLAGS, name, reversed, &mut outcome)
            || apply_flag(termios, LOCAL_FLAGS, name, reversed, &mut outcome)
        {
            continue;
        }

        if let Some(combo) = flags::find_combination(name) {
            if reversed && !combo.reversible {
                return Err(invalid_argument(setting));
            }
            apply_combination(combo.mode, reversed, termios);
            outcome.require_set_attr = true;
            continue;
        }

        if !reversed {
            if let Some(cc) = flags::find_control_char(setting) {
                let arg = iter.next().ok_or_else(|| missing_argument(setting))?;
                let value = codec::parse_control_char(cc.name, arg)
                    .map_err(|_| invalid_integer_argument(arg))?;
                termios.control_chars[cc.index as usize] = value;
                outcome.require_set_attr = true;
                continue;
            }

            match setting {
                "ispeed" | "ospeed" => {
                    let arg = iter.next().ok_or_else(|| missing_argument(setting))?;
                    let baud = codec::string_to_baud(arg).ok_or_else(|| {
                        USimpleError::new(1, format!("invalid {setting} {}", arg.quote()))
                    })?;
                    let result = if setting == "ispeed" {
                        ibaud = Some(codec::baud_to_value(baud));
                        cfsetispeed(termios, baud)
                    } else {
                        obaud = Some(codec::baud_to_value(baud));
                        cfsetospeed(termios, baud)
                    };
                    result.map_err(baud_error)?;
                    outcome.require_set_attr = true;
                    continue;
                }
                #[cfg(any(target_os = "linux", target_os = "android"))]
                "line" => {
                    let arg = iter.next().ok_or_else(|| missing_argument(setting))?;
                    let value = match codec::parse_integer(arg) {
                        Ok(v) => v,
                        Err(codec::IntegerArgError::Invalid) => {
                            return Err(invalid_integer_argument(arg));
                        }
                        Err(codec::IntegerArgError::TooLarge) => u64::from(u8::MAX) + 1,
                    };
                    let line = u8::try_from(value).map_err(|_| {
                        USimpleError::new(
                            1,
                            format!("invalid line discipline {}", arg.quote()),
                        )
                    })?;
                    set_line_discipline(termios, line);
                    outcome.require_set_attr = true;
                    continue;
                }
                "speed" => {
                    if !checking {
                        let mut w = display::ColumnWriter::new(screen_columns());
                        display::display_speed(
                            codec::baud_to_value(cfgetispeed(termios)),
                            codec::baud_to_value(cfgetospeed(termios)),
                            false,
                            &mut w,
                        );
                        print!("{}", w.finish());
                    }
                    continue;
                }
                "size" => {
                    if !checking {
                        if let Some(device) = device {
                            let size = window_size(device).map_err(|_| {
                                USimpleError::new(
                                    1,
                                    format!(
                                        "{}: no size information for this device",
                                        opts.device_name().maybe_quote()
                                    ),
                                )
                            })?;
                            println!("{} {}", size.rows, size.columns);
                        }
                    }
                    continue;
                }
                "rows" | "cols" | "columns" => {
                    let arg = iter.next().ok_or_else(|| missing_argument(setting))?;
                    let value = codec::parse_integer(arg)
                        .ok()
                        .and_then(|v| c_ushort::try_from(v).ok())
                        .ok_or_else(|| invalid_integer_argument(arg))?;
                    if !checking {
                        if let Some(device) = device {
                            let (rows, cols) = if setting == "rows" {
                                (Some(value), None)
                            } else {
                                (None, Some(value))
                            };
                            set_window_size(device, rows, cols)
                                .map_err(|e| device_error(opts, e))?;
                        }
                    }
                    continue;
                }
                _ => {}
            }

            if let Some(baud) = codec::string_to_baud(setting) {
                let value = codec::baud_to_value(baud);
                ibaud = Some(value);
                obaud = Some(value);
                cfsetispeed(termios, baud).map_err(baud_error)?;
                cfsetospeed(termios, baud).map_err(baud_error)?;
                outcome.require_set_attr = true;
                continue;
            }

            match codec::recover_mode(setting, termios) {
                Ok(()) => {
                    outcome.require_set_attr = true;
                    continue;
                }
                Err(RecoverError::InvalidHex) => {
                    return Err(invalid_integer_argument(setting));
                }
                // wrong field count: not a save string at all
                Err(RecoverError::FieldCount) => {}
            }
        }

        return Err(invalid_argument(setting));
    }

    if checking {
        if let (Some(i), Some(o)) = (ibaud, obaud) {
            if i != o {
                return Err(USimpleError::new(
                    1,
                    format!("asymmetric input ({i}), output ({o}) speeds not supported"),
                ));
            }
        }
    }

    Ok(outcome)
}

/// Tries one flag table. Returns whether the name was consumed; a
/// reversed grouped flag (like `-cs8`) matches nothing and falls through
/// to the invalid-argument error.
fn apply_flag<T: TermiosFlag>(
    termios: &mut Termios,
    table: &[Flag<T>],
    name: &str,
    reversed: bool,
    outcome: &mut AppliedSettings,
) -> bool {
    for flag in table {
        if flag.name == name {
            // Flags within a group can only be exchanged, not removed
            if reversed && flag.group.is_some() {
                return false;
            }
            flag.apply(termios, !reversed);
            outcome.require_set_attr = true;
            return true;
        }
    }
    false
}

fn print_settings(termios: &Termios, opts: &Options, device: &Device) -> UResult<()> {
    if opts.save {
        println!("{}", codec::encode_save(termios));
        return Ok(());
    }

    let ispeed = codec::baud_to_value(cfgetispeed(termios));
    let ospeed = codec::baud_to_value(cfgetospeed(termios));
    let line = line_discipline(termios);

    let mut w = display::ColumnWriter::new(screen_columns());
    if opts.all {
        let window = window_size(device).ok().map(|s| (s.rows, s.columns));
        display::display_all(termios, ispeed, ospeed, window, line, &mut w);
    } else {
        display::display_changed(termios, ispeed, ospeed, line, &mut w);
    }
    print!("{}", w.finish());

    Ok(())
}

fn window_size(device: &Device) -> nix::Result<TermSize> {
    let mut size = TermSize::default();
    unsafe { tiocgwinsz(device.as_raw_fd(), &mut size) }?;
    Ok(size)
}

fn set_window_size(
    device: &Device,
    rows: Option<c_ushort>,
    columns: Option<c_ushort>,
) -> nix::Result<()> {
    let mut size = window_size(device)?;
    if let Some(rows) = rows {
        size.rows = rows;
    }
    if let Some(columns) = columns {
        size.columns = columns;
    }
    unsafe { tiocswinsz(device.as_raw_fd(), &size) }?;
    Ok(())
}

/// The wrap width: the terminal we print to, then $COLUMNS, then the
/// traditional 80.
fn screen_columns() -> usize {
    if let Some((terminal_size::Width(width), _)) = terminal_size::terminal_size() {
        if width > 0 {
            return usize::from(width);
        }
    }
    if let Ok(columns) = std::env::var("COLUMNS") {
        if let Ok(n) = columns.parse::<usize>() {
            if n > 0 {
                return n;
            }
        }
    }
    80
}

#[cfg(any(target_os = "linux", target_os = "android"))]
fn line_discipline(termios: &Termios) -> Option<u8> {
    // The nix Termios struct does not expose the line discipline, so we
    // go through the underlying libc struct.
    let inner: nix::libc::termios = termios.clone().into();
    Some(inner.c_line)
}

#[cfg(not(any(target_os = "linux", target_os = "android")))]
fn line_discipline(_termios: &Termios) -> Option<u8> {
    None
}

#[cfg(any(target_os = "linux", target_os = "android"))]
fn set_line_discipline(termios: &mut Termios, line: u8) {
    let mut inner: nix::libc::termios = termios.clone().into();
    inner.c_line = line;
    *termios = inner.into();
}

/// Shows which fields the terminal refused, for `--debug`.
fn dump_termios_diff(expected: &Termios, applied: &Termios) {
    let words = [
        ("input flags", expected.input_flags.bits(), applied.input_flags.bits()),
        ("output flags", expected.output_flags.bits(), applied.output_flags.bits()),
        ("control flags", expected.control_flags.bits(), applied.control_flags.bits()),
        ("local flags", expected.local_flags.bits(), applied.local_flags.bits()),
    ];
    for (name, wanted, got) in words {
        if wanted != got {
            show_error!("{name}: expected {wanted:x}, got {got:x}");
        }
    }
    for (i, (wanted, got)) in expected
        .control_chars
        .iter()
        .zip(&applied.control_chars)
        .enumerate()
    {
        if wanted != got {
            show_error!("control character {i}: expected {wanted:x}, got {got:x}");
        }
    }
    let (wanted, got) = (line_discipline(expected), line_discipline(applied));
    if wanted != got {
        show_error!("line discipline: expected {wanted:?}, got {got:?}");
    }
    for (name, wanted, got) in [
        (
            "input speed",
            codec::baud_to_value(cfgetispeed(expected)),
            codec::baud_to_value(cfgetispeed(applied)),
        ),
        (
            "output speed",
            codec::baud_to_value(cfgetospeed(expected)),
            codec::baud_to_value(cfgetospeed(applied)),
        ),
    ] {
        if wanted != got {
            show_error!("{name}: expected {wanted}, got {got}");
        }
    }
}

/// Field-wise comparison of everything we can set through tcsetattr.
fn eq_mode(a: &Termios, b: &Termios) -> bool {
    a.input_flags == b.input_flags
        && a.output_flags == b.output_flags
        && a.control_flags == b.control_flags
        && a.local_flags == b.local_flags
        && a.control_chars == b.control_chars
        && line_discipline(a) == line_discipline(b)
        && cfgetispeed(a) == cfgetispeed(b)
        && cfgetospeed(a) == cfgetospeed(b)
}

pub(crate) fn zeroed_termios() -> Termios {
    // All-zero is a valid (if useless) termios value on every platform we
    // build for; it only ever serves as scratch space.
    let inner: nix::libc::termios = unsafe { std::mem::zeroed() };
    inner.into()
}

fn device_error(opts: &Options, err: nix::Error) -> Box<dyn UError> {
    USimpleError::new(
        1,
        format!("{}: {}", opts.device_name().maybe_quote(), err.desc()),
    )
}

fn baud_error(err: nix::Error) -> Box<dyn UError> {
    USimpleError::new(1, format!("failed to set baud rate: {}", err.desc()))
}

fn invalid_argument(setting: &str) -> Box<dyn UError> {
    USimpleError::new(1, format!("invalid argument {}", setting.quote()))
}

fn invalid_integer_argument(arg: &str) -> Box<dyn UError> {
    USimpleError::new(1, format!("invalid integer argument {}", arg.quote()))
}

fn missing_argument(setting: &str) -> Box<dyn UError> {
    USimpleError::new(1, format!("missing argument to {}", setting.quote()))
}

pub fn uu_app() -> Command {
    Command::new(uucore::util_name())
        .version(crate_version!())
        .override_usage(format_usage(USAGE))
        .about(SUMMARY)
        .infer_long_args(true)
        .arg(
            Arg::new(options::ALL)
                .short('a')
                .long(options::ALL)
                .help("print all current settings in human-readable form")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new(options::SAVE)
                .short('g')
                .long(options::SAVE)
                .help("print all current settings in a stty-readable form")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new(options::DEBUG)
                .long(options::DEBUG)
                .hide(true)
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new(options::FILE)
                .short('F')
                .long(options::FILE)
                .action(ArgAction::Append)
                .value_hint(clap::ValueHint::FilePath)
                .value_name("DEVICE")
                .help("open and use the specified DEVICE instead of stdin"),
        )
        .arg(
            Arg::new(options::SETTINGS)
                .action(ArgAction::Append)
                // Allows e.g. "stty -ixon" to work
                .allow_hyphen_values(true)
                .help("settings to change"),
        )
}

impl TermiosFlag for ControlFlags {
    fn is_in(&self, termios: &Termios, group: Option<Self>) -> bool {
        termios.control_flags.contains(*self)
            && group.map_or(true, |g| !termios.control_flags.intersects(g - *self))
    }

    fn apply(&self, termios: &mut Termios, val: bool) {
        termios.control_flags.set(*self, val);
    }
}

impl TermiosFlag for InputFlags {
    fn is_in(&self, termios: &Termios, group: Option<Self>) -> bool {
        termios.input_flags.contains(*self)
            && group.map_or(true, |g| !termios.input_flags.intersects(g - *self))
    }

    fn apply(&self, termios: &mut Termios, val: bool) {
        termios.input_flags.set(*self, val);
    }
}

impl TermiosFlag for OutputFlags {
    fn is_in(&self, termios: &Termios, group: Option<Self>) -> bool {
        termios.output_flags.contains(*self)
            && group.map_or(true, |g| !termios.output_flags.intersects(g - *self))
    }

    fn apply(&self, termios: &mut Termios, val: bool) {
        termios.output_flags.set(*self, val);
    }
}

impl TermiosFlag for LocalFlags {
    fn is_in(&self, termios: &Termios, group: Option<Self>) -> bool {
        termios.local_flags.contains(*self)
            && group.map_or(true, |g| !termios.local_flags.intersects(g - *self))
    }

    fn apply(&self, termios: &mut Termios, val: bool) {
        termios.local_flags.set(*self, val);
    }
}
