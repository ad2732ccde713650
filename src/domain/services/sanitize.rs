#[cfg(test)]
#[path = "sanitize_test.rs"]
mod tests;

use std::iter::Peekable;
use std::str::Chars;

const ESC: char = '\u{1b}';
const BEL: char = '\u{07}';
const CSI: char = '\u{9b}';

fn skip_csi(chars: &mut Peekable<Chars>) {
    // Parameters and intermediates run until a final byte in @..~.
    for c in chars.by_ref() {
        if ('\u{40}'..='\u{7e}').contains(&c) {
            return;
        }
    }
}

fn skip_string_sequence(chars: &mut Peekable<Chars>) {
    // OSC, DCS and friends end with BEL or ESC \.
    while let Some(c) = chars.next() {
        if c == BEL {
            return;
        }
        if c == ESC {
            if chars.peek() == Some(&'\\') {
                chars.next();
            }
            return;
        }
    }
}

fn skip_escape(chars: &mut Peekable<Chars>) {
    match chars.next() {
        Some('[') => skip_csi(chars),
        Some(']') | Some('P') | Some('X') | Some('^') | Some('_') => {
            skip_string_sequence(chars);
        }
        _ => (),
    }
}

/// Makes model output safe to print to a terminal. Escape sequences and
/// control characters are removed so generated text cannot move the cursor,
/// retitle the window or restyle the screen. Newlines survive, `\r\n` is
/// folded to `\n` and tabs become two spaces.
pub fn sanitize(text: &str) -> String {
    let mut res = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\n' => res.push('\n'),
            '\t' => res.push_str("  "),
            '\r' => {
                if chars.peek() != Some(&'\n') {
                    res.push('\n');
                }
            }
            ESC => skip_escape(&mut chars),
            CSI => skip_csi(&mut chars),
            c if c.is_control() => (),
            c => res.push(c),
        }
    }

    return res;
}
