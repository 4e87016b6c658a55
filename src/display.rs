// This file is part of the uutils coreutils package.
//
// For the full copyright and license information, please view the LICENSE
// file that was distributed with this source code.

// spell-checker:ignore ispeed ospeed icanon

//! Rendering of the three output styles: changed-only (the default),
//! verbose (`-a`) and the recoverable save string (`-g`, in [`crate::codec`]).

use crate::codec::visible;
use crate::flags;
use crate::{Flag, TermiosFlag};
use nix::sys::termios::{LocalFlags, SpecialCharacterIndices as V, Termios};

/// Accumulates space-separated words, breaking lines so no word starts
/// past the column limit.
pub struct ColumnWriter {
    out: String,
    max_col: usize,
    col: usize,
}

impl ColumnWriter {
    pub fn new(max_col: usize) -> Self {
        Self {
            out: String::new(),
            max_col,
            col: 0,
        }
    }

    /// Emits one word, preceded by a space or a line break.
    pub fn wrapf(&mut self, word: &str) {
        if self.col > 0 {
            if self.max_col.saturating_sub(self.col) < word.len() {
                self.out.push('\n');
                self.col = 0;
            } else {
                self.out.push(' ');
                self.col += 1;
            }
        }
        self.out.push_str(word);
        self.col += word.len();
    }

    /// Unconditionally terminates the current line.
    fn hard_break(&mut self) {
        self.out.push('\n');
        self.col = 0;
    }

    fn write_line(&mut self, line: &str) {
        self.out.push_str(line);
        self.hard_break();
    }

    pub fn finish(self) -> String {
        self.out
    }
}

/// The default output: only settings that differ from their canonical
/// values, plus the speed and line discipline header.
pub fn display_changed(
    termios: &Termios,
    ispeed: u64,
    ospeed: u64,
    line: Option<u8>,
    w: &mut ColumnWriter,
) {
    display_speed(ispeed, ospeed, true, w);
    if let Some(line) = line {
        w.wrapf(&format!("line = {line};"));
    }
    w.hard_break();

    let mut printed = false;
    for cc in flags::displayed_control_chars() {
        if !cc.show {
            continue;
        }
        let current = termios.control_chars[cc.index as usize];
        if current == cc.sane {
            continue;
        }
        w.wrapf(&format!("{} = {};", cc.name, visible(current)));
        printed = true;
    }
    let icanon = termios.local_flags.contains(LocalFlags::ICANON);
    if !icanon {
        w.wrapf(&min_time_word(termios));
        printed = true;
    }
    if printed {
        w.hard_break();
    }

    changed_flags(w, flags::CONTROL_FLAGS, termios);
    changed_flags(w, flags::INPUT_FLAGS, termios);
    changed_flags(w, flags::OUTPUT_FLAGS, termios);
    changed_flags(w, flags::LOCAL_FLAGS, termios);
}

/// The `-a` output: everything, including settings at their defaults.
pub fn display_all(
    termios: &Termios,
    ispeed: u64,
    ospeed: u64,
    window: Option<(u16, u16)>,
    line: Option<u8>,
    w: &mut ColumnWriter,
) {
    display_speed(ispeed, ospeed, true, w);
    if let Some((rows, columns)) = window {
        w.wrapf(&format!("rows {rows}; columns {columns};"));
    }
    if let Some(line) = line {
        w.wrapf(&format!("line = {line};"));
    }
    w.hard_break();

    for cc in flags::displayed_control_chars() {
        if !cc.show {
            continue;
        }
        let current = termios.control_chars[cc.index as usize];
        w.wrapf(&format!("{} = {};", cc.name, visible(current)));
    }
    w.wrapf(&min_time_word(termios));
    w.hard_break();

    all_flags(w, flags::CONTROL_FLAGS, termios);
    all_flags(w, flags::INPUT_FLAGS, termios);
    all_flags(w, flags::OUTPUT_FLAGS, termios);
    all_flags(w, flags::LOCAL_FLAGS, termios);
}

/// `speed N baud;` when both directions agree (or input is "same as
/// output"), the ispeed/ospeed pair otherwise. The non-fancy form is the
/// bare number printed for the `speed` setting.
pub fn display_speed(ispeed: u64, ospeed: u64, fancy: bool, w: &mut ColumnWriter) {
    if ispeed == 0 || ispeed == ospeed {
        if fancy {
            w.wrapf(&format!("speed {ospeed} baud;"));
        } else {
            w.write_line(&format!("{ospeed}"));
        }
    } else if fancy {
        w.wrapf(&format!("ispeed {ispeed} baud; ospeed {ospeed} baud;"));
    } else {
        w.write_line(&format!("{ispeed} {ospeed}"));
    }
}

fn min_time_word(termios: &Termios) -> String {
    format!(
        "min = {}; time = {};",
        termios.control_chars[V::VMIN as usize],
        termios.control_chars[V::VTIME as usize]
    )
}

fn changed_flags<T: TermiosFlag>(w: &mut ColumnWriter, table: &[Flag<T>], termios: &Termios) {
    let mut printed = false;
    for flag in table {
        if !flag.show {
            continue;
        }
        if flag.is_in(termios) {
            if flag.sane == Some(false) {
                w.wrapf(flag.name);
                printed = true;
            }
        } else if flag.sane == Some(true) && flag.group.is_none() {
            w.wrapf(&format!("-{}", flag.name));
            printed = true;
        }
    }
    if printed {
        w.hard_break();
    }
}

fn all_flags<T: TermiosFlag>(w: &mut ColumnWriter, table: &[Flag<T>], termios: &Termios) {
    for flag in table {
        if !flag.show {
            continue;
        }
        if flag.is_in(termios) {
            w.wrapf(flag.name);
        } else if flag.group.is_none() {
            w.wrapf(&format!("-{}", flag.name));
        }
    }
    w.hard_break();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combination::sane_mode;
    use crate::zeroed_termios;
    use nix::sys::termios::{ControlFlags, InputFlags};

    fn sane() -> Termios {
        let mut termios = zeroed_termios();
        sane_mode(&mut termios);
        termios
    }

    fn changed(termios: &Termios) -> String {
        let mut w = ColumnWriter::new(80);
        display_changed(termios, 9600, 9600, Some(0), &mut w);
        w.finish()
    }

    #[test]
    fn sane_state_prints_only_the_header() {
        assert_eq!(changed(&sane()), "speed 9600 baud; line = 0;\n");
    }

    #[test]
    fn changed_control_char_is_reported() {
        let mut termios = sane();
        termios.control_chars[V::VINTR as usize] = 1;
        assert_eq!(
            changed(&termios),
            "speed 9600 baud; line = 0;\nintr = ^A;\n"
        );
    }

    #[test]
    fn cleared_sane_flag_is_reported_negated() {
        let mut termios = sane();
        termios.local_flags.remove(LocalFlags::ECHO);
        assert_eq!(changed(&termios), "speed 9600 baud; line = 0;\n-echo\n");
    }

    #[test]
    fn set_nonsane_flag_is_reported_plain() {
        let mut termios = sane();
        termios.input_flags.insert(InputFlags::IGNBRK);
        assert_eq!(changed(&termios), "speed 9600 baud; line = 0;\nignbrk\n");
    }

    #[test]
    fn flag_with_no_canonical_value_never_shows_as_changed() {
        let mut termios = sane();
        termios.control_flags.insert(ControlFlags::CLOCAL);
        assert_eq!(changed(&termios), "speed 9600 baud; line = 0;\n");
    }

    #[test]
    fn min_and_time_appear_without_icanon() {
        let mut termios = sane();
        termios.local_flags.remove(LocalFlags::ICANON);
        let out = changed(&termios);
        assert!(out.contains("min = 1; time = 0;"));
        assert!(out.contains("-icanon"));
    }

    #[test]
    fn split_speeds_use_the_pair_form() {
        let mut w = ColumnWriter::new(80);
        display_speed(75, 9600, true, &mut w);
        assert_eq!(w.finish(), "ispeed 75 baud; ospeed 9600 baud;");

        let mut w = ColumnWriter::new(80);
        display_speed(0, 9600, true, &mut w);
        assert_eq!(w.finish(), "speed 9600 baud;");

        let mut w = ColumnWriter::new(80);
        display_speed(9600, 9600, false, &mut w);
        assert_eq!(w.finish(), "9600\n");
    }

    #[test]
    fn verbose_output_lists_one_character_size() {
        let termios = sane();
        let mut w = ColumnWriter::new(80);
        display_all(&termios, 9600, 9600, Some((24, 80)), Some(0), &mut w);
        let out = w.finish();

        assert!(out.starts_with("speed 9600 baud; rows 24; columns 80; line = 0;\n"));
        assert!(out.contains("intr = ^C;"));
        assert!(out.contains("erase = ^?;"));
        assert!(out.contains("min = 1; time = 0;"));
        // exactly one character size, never a negated one
        let words: Vec<&str> = out.split_whitespace().collect();
        let sizes: Vec<&str> = words
            .iter()
            .copied()
            .filter(|w| {
                matches!(
                    *w,
                    "cs5" | "cs6" | "cs7" | "cs8" | "-cs5" | "-cs6" | "-cs7" | "-cs8"
                )
            })
            .collect();
        assert_eq!(sizes.len(), 1);
        assert!(!sizes[0].starts_with('-'));
        // deprecated aliases stay hidden
        assert!(!words.contains(&"hup") && !words.contains(&"-hup"));
        assert!(!out.contains("flush ="));
        assert!(words.contains(&"icanon"));
        assert!(words.contains(&"-parenb"));
    }

    #[test]
    fn words_wrap_at_the_column_limit() {
        let mut w = ColumnWriter::new(10);
        w.wrapf("aaaa");
        w.wrapf("bbbb");
        w.wrapf("cc");
        assert_eq!(w.finish(), "aaaa bbbb\ncc");
    }

    #[test]
    fn a_word_exactly_filling_the_line_fits() {
        let mut w = ColumnWriter::new(10);
        w.wrapf("aaaa");
        w.wrapf("bbbbb");
        assert_eq!(w.finish(), "aaaa bbbbb");
    }
}
