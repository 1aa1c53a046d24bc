//! Minimal RTF to plain text conversion.
//!
//! Shortcuts wraps its answer in an RTF document (font table, color table,
//! paragraph formatting). Only the visible text is kept:
//! - control words are dropped; `\par` and `\line` become line breaks
//! - destination groups (`\fonttbl`, `\colortbl`, `\*\...`) are skipped
//! - `\'hh` (Windows-1252) and `\uN` escapes are decoded
//!
//! Input that does not start with `{\rtf` is returned with whitespace
//! collapsed.

/// Control words whose group holds no visible text
const DESTINATIONS: &[&str] = &[
    "fonttbl",
    "colortbl",
    "stylesheet",
    "info",
    "expandedcolortbl",
    "listtable",
    "listoverridetable",
    "pict",
    "header",
    "footer",
];

/// Convert `input` to plain text with runs of whitespace collapsed to a
/// single space.
pub fn to_plain_text(input: &str) -> String {
    let trimmed = input.trim_start();
    if !trimmed.starts_with("{\\rtf") {
        return collapse_whitespace(input);
    }
    collapse_whitespace(&strip(trimmed))
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[derive(Clone, Copy)]
struct Group {
    skip: bool,
    /// Characters to drop after a `\uN` escape
    uc: usize,
}

fn strip(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut stack: Vec<Group> = Vec::new();
    let mut current = Group { skip: false, uc: 1 };
    let mut pending_skip = 0usize;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '{' => {
                stack.push(current);
                i += 1;
            }
            '}' => {
                current = stack.pop().unwrap_or(Group { skip: false, uc: 1 });
                i += 1;
            }
            '\\' => {
                i += 1;
                let Some(&next) = chars.get(i) else { break };
                match next {
                    '\\' | '{' | '}' => {
                        emit(&mut out, current, &mut pending_skip, next);
                        i += 1;
                    }
                    '*' => {
                        current.skip = true;
                        i += 1;
                    }
                    '\'' => {
                        let hex: String = chars.iter().skip(i + 1).take(2).collect();
                        i += 1 + hex.len();
                        if let Ok(byte) = u8::from_str_radix(&hex, 16) {
                            emit(&mut out, current, &mut pending_skip, cp1252(byte));
                        }
                    }
                    '~' => {
                        emit(&mut out, current, &mut pending_skip, ' ');
                        i += 1;
                    }
                    '\n' | '\r' => {
                        emit(&mut out, current, &mut pending_skip, '\n');
                        i += 1;
                    }
                    c if c.is_ascii_alphabetic() => {
                        let (word, param, consumed) = control_word(&chars[i..]);
                        i += consumed;
                        apply_control_word(&word, param, &mut current, &mut out, &mut pending_skip);
                    }
                    _ => {
                        // Other control symbols (\-, \_, \|) carry no text
                        i += 1;
                    }
                }
            }
            '\r' | '\n' => {
                i += 1;
            }
            _ => {
                emit(&mut out, current, &mut pending_skip, c);
                i += 1;
            }
        }
    }

    out
}

fn emit(out: &mut String, group: Group, pending_skip: &mut usize, c: char) {
    if *pending_skip > 0 {
        *pending_skip -= 1;
        return;
    }
    if !group.skip {
        out.push(c);
    }
}

/// Parse `word[-]digits[ ]`, returning the word, its parameter and the
/// number of characters consumed.
fn control_word(chars: &[char]) -> (String, Option<i32>, usize) {
    let mut i = 0;
    let mut word = String::new();
    while i < chars.len() && chars[i].is_ascii_alphabetic() {
        word.push(chars[i]);
        i += 1;
    }

    let mut digits = String::new();
    if i < chars.len() && chars[i] == '-' {
        digits.push('-');
        i += 1;
    }
    while i < chars.len() && chars[i].is_ascii_digit() {
        digits.push(chars[i]);
        i += 1;
    }
    let param = digits.parse::<i32>().ok();

    // A single space delimits the control word and is not text
    if i < chars.len() && chars[i] == ' ' {
        i += 1;
    }

    (word, param, i)
}

fn apply_control_word(
    word: &str,
    param: Option<i32>,
    current: &mut Group,
    out: &mut String,
    pending_skip: &mut usize,
) {
    match word {
        w if DESTINATIONS.contains(&w) => current.skip = true,
        "par" | "line" | "row" => emit(out, *current, pending_skip, '\n'),
        "tab" | "cell" => emit(out, *current, pending_skip, '\t'),
        "uc" => current.uc = param.unwrap_or(1).max(0) as usize,
        "u" => {
            if let Some(code) = param {
                // Negative values encode code points above 0x7FFF
                let code = (if code < 0 { code + 65536 } else { code }) as u32;
                if let Some(ch) = char::from_u32(code) {
                    emit(out, *current, pending_skip, ch);
                }
                *pending_skip = current.uc;
            }
        }
        "emdash" => emit(out, *current, pending_skip, '\u{2014}'),
        "endash" => emit(out, *current, pending_skip, '\u{2013}'),
        "lquote" => emit(out, *current, pending_skip, '\u{2018}'),
        "rquote" => emit(out, *current, pending_skip, '\u{2019}'),
        "ldblquote" => emit(out, *current, pending_skip, '\u{201C}'),
        "rdblquote" => emit(out, *current, pending_skip, '\u{201D}'),
        "bullet" => emit(out, *current, pending_skip, '\u{2022}'),
        _ => {}
    }
}

/// Decode a Windows-1252 byte
fn cp1252(byte: u8) -> char {
    const HIGH: [char; 32] = [
        '\u{20AC}', '\u{FFFD}', '\u{201A}', '\u{0192}', '\u{201E}', '\u{2026}', '\u{2020}', '\u{2021}',
        '\u{02C6}', '\u{2030}', '\u{0160}', '\u{2039}', '\u{0152}', '\u{FFFD}', '\u{017D}', '\u{FFFD}',
        '\u{FFFD}', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}', '\u{2022}', '\u{2013}', '\u{2014}',
        '\u{02DC}', '\u{2122}', '\u{0161}', '\u{203A}', '\u{0153}', '\u{FFFD}', '\u{017E}', '\u{0178}',
    ];
    match byte {
        0x80..=0x9F => HIGH[(byte - 0x80) as usize],
        _ => byte as char,
    }
}
