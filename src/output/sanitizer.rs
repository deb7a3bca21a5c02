//! Output sanitization for snapshot text.
//!
//! Stripping runs three passes in order:
//!
//! 1. **Controls** (VTE parser): drops CSI, OSC (BEL or `ESC \`
//!    terminated), DCS and other escape sequences, BEL, CR, TAB and every
//!    other C0 control, DEL and C1 controls. `\n` survives.
//! 2. **Title fragments**: drops `digits ; rest-of-line` when the digits
//!    start a line or follow whitespace. These are what remains of an OSC
//!    title whose introducer was cut off.
//! 3. **URL schemes** ([`StripMode::Plain`] only): drops `file://`,
//!    `http://`, `https://` and their `%3A%2F%2F` spellings, through the
//!    next whitespace.
//!
//! Each pass only ever removes text, and never removes a `\n`, so running
//! the whole thing twice gives the same result as running it once.

use vte::{Params, Parser, Perform};

/// How aggressive a strip should be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StripMode {
    /// Control sequences and title fragments.
    #[default]
    Ansi,
    /// Also residual URL schemes.
    Plain,
}

const URL_SCHEMES: [&str; 6] = [
    "file://",
    "http://",
    "https://",
    "file%3a%2f%2f",
    "http%3a%2f%2f",
    "https%3a%2f%2f",
];

/// Output sanitizer using VTE parser.
pub struct OutputSanitizer;

impl OutputSanitizer {
    /// Strip ANSI escape codes from raw bytes.
    ///
    /// Returns clean UTF-8 text with all control sequences removed.
    pub fn strip_ansi(input: &[u8]) -> String {
        let mut extractor = PlainTextExtractor::new();
        let mut parser = Parser::new();

        parser.advance(&mut extractor, input);

        extractor.into_string()
    }

    /// Strip ANSI codes from a string.
    pub fn strip_ansi_str(input: &str) -> String {
        Self::strip_ansi(input.as_bytes())
    }

    /// Run every pass `mode` calls for.
    pub fn strip(input: &str, mode: StripMode) -> String {
        let text = Self::strip_ansi_str(input);
        let text = remove_title_fragments(&text);
        match mode {
            StripMode::Ansi => text,
            StripMode::Plain => remove_url_schemes(&text),
        }
    }

    /// Strip an optional line. Absent input stays absent; `""` stays `""`.
    pub fn strip_optional(input: Option<&str>, mode: StripMode) -> Option<String> {
        input.map(|s| Self::strip(s, mode))
    }
}

/// Remove `digits;...` runs that start a line or follow whitespace.
fn remove_title_fragments(input: &str) -> String {
    input
        .split('\n')
        .map(strip_fragment_from_line)
        .collect::<Vec<_>>()
        .join("\n")
}

fn strip_fragment_from_line(line: &str) -> &str {
    let mut prev_is_boundary = true;
    for (i, c) in line.char_indices() {
        if prev_is_boundary && c.is_ascii_digit() && is_fragment(&line[i..]) {
            return &line[..i];
        }
        prev_is_boundary = c.is_whitespace();
    }
    line
}

/// One or more ASCII digits followed by `;`.
fn is_fragment(s: &str) -> bool {
    let digits = s.bytes().take_while(u8::is_ascii_digit).count();
    digits > 0 && s.as_bytes().get(digits) == Some(&b';')
}

/// Remove each URL scheme and everything up to the next whitespace.
fn remove_url_schemes(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while !rest.is_empty() {
        match find_scheme(rest) {
            Some(start) => {
                out.push_str(&rest[..start]);
                let tail = &rest[start..];
                let end = tail.find(char::is_whitespace).unwrap_or(tail.len());
                rest = &tail[end..];
            }
            None => {
                out.push_str(rest);
                break;
            }
        }
    }

    out
}

/// Byte offset of the earliest scheme match, case-insensitive.
fn find_scheme(s: &str) -> Option<usize> {
    let lower = s.to_ascii_lowercase();
    URL_SCHEMES
        .iter()
        .filter_map(|scheme| lower.find(scheme))
        .min()
}

/// VTE performer that extracts plain text.
struct PlainTextExtractor {
    output: String,
}

impl PlainTextExtractor {
    fn new() -> Self {
        Self {
            output: String::new(),
        }
    }

    fn into_string(self) -> String {
        self.output
    }
}

impl Perform for PlainTextExtractor {
    fn print(&mut self, c: char) {
        // C1 controls arrive here as decoded code points
        if !c.is_control() {
            self.output.push(c);
        }
    }

    fn execute(&mut self, byte: u8) {
        // Newline is the only control that survives
        if byte == b'\n' {
            self.output.push('\n');
        }
    }

    fn hook(&mut self, _params: &Params, _intermediates: &[u8], _ignore: bool, _action: char) {}

    fn put(&mut self, _byte: u8) {}

    fn unhook(&mut self) {}

    fn osc_dispatch(&mut self, _params: &[&[u8]], _bell_terminated: bool) {}

    fn csi_dispatch(
        &mut self,
        _params: &Params,
        _intermediates: &[u8],
        _ignore: bool,
        _action: char,
    ) {
    }

    fn esc_dispatch(&mut self, _intermediates: &[u8], _ignore: bool, _byte: u8) {}
}
