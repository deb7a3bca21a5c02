//! Escape-sequence state machine driving the screen buffer.
//!
//! The parser walks each chunk one `char` at a time. Printable characters
//! and the C0 controls that move the cursor are applied to the
//! [`ScreenBuffer`]; CSI sequences are collected and, when their command
//! is one we model, applied as cursor moves or erases; OSC sequences are
//! swallowed whole.
//!
//! ## Chunk boundaries
//!
//! With [`BoundaryPolicy::Carry`] the state survives between chunks, so a
//! sequence split across two reads is reassembled. CSI parameters are
//! capped at [`MAX_CSI_PARAMS`] bytes and OSC payloads at
//! [`MAX_OSC_PAYLOAD`] bytes; a sequence that outgrows its cap is
//! abandoned and the parser falls back to literal text.
//!
//! [`BoundaryPolicy::Discard`] drops any partial sequence at the end of
//! every chunk instead.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::buffer::ScreenBuffer;

/// Longest CSI parameter string kept before the sequence is abandoned.
pub const MAX_CSI_PARAMS: usize = 64;

/// Longest OSC payload kept before the sequence is abandoned.
pub const MAX_OSC_PAYLOAD: usize = 4096;

/// Numeric CSI parameters saturate here.
const MAX_PARAM_VALUE: u32 = 65535;

const ESC: char = '\x1b';
const BEL: char = '\x07';
const DEL: char = '\x7f';

/// What happens to an unterminated sequence when a chunk ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryPolicy {
    /// Keep the partial sequence and continue it with the next chunk.
    #[default]
    Carry,
    /// Forget the partial sequence.
    Discard,
}

/// Scanner state between characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParserState {
    /// Plain text and C0 controls.
    #[default]
    Literal,
    /// Saw ESC, waiting for the introducer.
    AfterEsc,
    /// Inside `ESC [`, collecting parameter bytes.
    CsiParams,
    /// Inside `ESC [`, past the first intermediate byte.
    CsiIntermediate,
    /// Inside `ESC ]`, collecting the payload.
    Osc,
    /// Saw ESC inside an OSC; a `\` completes the string terminator.
    OscEsc,
}

/// Tally of what a single chunk contained.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkSummary {
    /// Visible characters written.
    pub printed: usize,
    /// C0 controls executed or ignored.
    pub controls: usize,
    /// CSI sequences completed, recognized or not.
    pub csi: usize,
    /// OSC sequences completed.
    pub osc: usize,
    /// Other two-character escapes.
    pub escapes: usize,
    /// Sequences dropped for overflow, interruption or chunk end.
    pub abandoned: usize,
    /// Latest window title set by OSC 0 or OSC 2.
    pub title: Option<String>,
}

impl ChunkSummary {
    /// True when the chunk held nothing but complete OSC sequences.
    pub fn is_osc_only(&self) -> bool {
        self.osc > 0
            && self.printed == 0
            && self.controls == 0
            && self.csi == 0
            && self.escapes == 0
            && self.abandoned == 0
    }
}

/// Streaming escape-sequence parser.
#[derive(Debug, Clone, Default)]
pub struct Parser {
    state: ParserState,
    params: String,
    has_intermediates: bool,
    malformed: bool,
    payload: String,
    policy: BoundaryPolicy,
}

impl Parser {
    pub fn new(policy: BoundaryPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn state(&self) -> ParserState {
        self.state
    }

    pub fn policy(&self) -> BoundaryPolicy {
        self.policy
    }

    /// Return to `Literal`, dropping any partial sequence.
    pub fn reset(&mut self) {
        self.state = ParserState::Literal;
        self.params.clear();
        self.payload.clear();
        self.has_intermediates = false;
        self.malformed = false;
    }

    /// Feed one chunk through the state machine, mutating `screen`.
    pub fn advance(&mut self, screen: &mut ScreenBuffer, chunk: &str) -> ChunkSummary {
        let mut summary = ChunkSummary::default();

        for c in chunk.chars() {
            self.step(screen, c, &mut summary);
        }

        if self.policy == BoundaryPolicy::Discard && self.state != ParserState::Literal {
            debug!(state = ?self.state, "discarding partial sequence at chunk end");
            self.abandon(&mut summary);
        }

        summary
    }

    fn step(&mut self, screen: &mut ScreenBuffer, c: char, summary: &mut ChunkSummary) {
        match self.state {
            ParserState::Literal => self.literal(screen, c, summary),
            ParserState::AfterEsc => self.after_esc(screen, c, summary),
            ParserState::CsiParams | ParserState::CsiIntermediate => {
                self.csi(screen, c, summary)
            }
            ParserState::Osc => match c {
                BEL => self.finish_osc(summary),
                ESC => self.state = ParserState::OscEsc,
                _ => self.collect_payload(c, summary),
            },
            ParserState::OscEsc => {
                if c == '\\' {
                    self.finish_osc(summary);
                } else {
                    // ESC interrupted the OSC and begins a new sequence.
                    self.abandon(summary);
                    self.state = ParserState::AfterEsc;
                    self.after_esc(screen, c, summary);
                }
            }
        }
    }

    fn literal(&mut self, screen: &mut ScreenBuffer, c: char, summary: &mut ChunkSummary) {
        match c {
            ESC => self.state = ParserState::AfterEsc,
            c if c < ' ' => self.execute(screen, c, summary),
            // DEL and C1 controls have no glyph
            c if c == DEL || ('\u{80}'..='\u{9f}').contains(&c) => summary.controls += 1,
            c => {
                screen.put_char(c);
                summary.printed += 1;
            }
        }
    }

    fn after_esc(&mut self, screen: &mut ScreenBuffer, c: char, summary: &mut ChunkSummary) {
        match c {
            '[' => {
                self.params.clear();
                self.has_intermediates = false;
                self.malformed = false;
                self.state = ParserState::CsiParams;
            }
            ']' => {
                self.payload.clear();
                self.state = ParserState::Osc;
            }
            ESC => {}
            c if c < ' ' => self.execute(screen, c, summary),
            _ => {
                summary.escapes += 1;
                self.state = ParserState::Literal;
            }
        }
    }

    fn csi(&mut self, screen: &mut ScreenBuffer, c: char, summary: &mut ChunkSummary) {
        match c {
            ESC => {
                self.abandon(summary);
                self.state = ParserState::AfterEsc;
            }
            DEL => {}
            c if c < ' ' => self.execute(screen, c, summary),
            '0'..='?' => {
                if self.state == ParserState::CsiIntermediate {
                    self.malformed = true;
                } else if self.params.len() >= MAX_CSI_PARAMS {
                    debug!(len = self.params.len(), "CSI parameters over limit, abandoning");
                    self.abandon(summary);
                } else {
                    self.params.push(c);
                }
            }
            ' '..='/' => {
                self.has_intermediates = true;
                self.state = ParserState::CsiIntermediate;
            }
            command => {
                self.dispatch_csi(screen, command);
                summary.csi += 1;
                self.state = ParserState::Literal;
            }
        }
    }

    fn dispatch_csi(&self, screen: &mut ScreenBuffer, command: char) {
        if self.malformed || self.has_intermediates {
            trace!(%command, params = %self.params, "ignoring CSI with intermediates");
            return;
        }

        match command {
            'A' => screen.cursor_up(self.count(0)),
            'B' => screen.cursor_down(self.count(0)),
            'C' => screen.cursor_forward(self.count(0)),
            'D' => screen.cursor_back(self.count(0)),
            'H' | 'f' => screen.set_position(self.count(0) - 1, self.count(1) - 1),
            'J' => {
                if self.param(0) == Some(2) {
                    screen.clear_all();
                }
            }
            'K' => match self.param(0).unwrap_or(0) {
                0 => screen.erase_to_end(),
                1 => screen.erase_to_start(),
                2 => screen.erase_line(),
                _ => {}
            },
            _ => trace!(%command, params = %self.params, "unhandled CSI command"),
        }
    }

    /// C0 control outside a string sequence.
    fn execute(&self, screen: &mut ScreenBuffer, c: char, summary: &mut ChunkSummary) {
        summary.controls += 1;
        match c {
            '\x08' => screen.backspace(),
            '\t' => screen.tab(),
            '\n' | '\x0b' | '\x0c' => screen.line_feed(),
            '\r' => screen.carriage_return(),
            // BEL and the rest are silent
            _ => {}
        }
    }

    fn collect_payload(&mut self, c: char, summary: &mut ChunkSummary) {
        if self.payload.len() >= MAX_OSC_PAYLOAD {
            debug!(len = self.payload.len(), "OSC payload over limit, abandoning");
            self.abandon(summary);
            return;
        }
        self.payload.push(c);
    }

    fn finish_osc(&mut self, summary: &mut ChunkSummary) {
        summary.osc += 1;
        if let Some((code, text)) = self.payload.split_once(';') {
            if code == "0" || code == "2" {
                summary.title = Some(text.to_string());
            }
        }
        self.payload.clear();
        self.state = ParserState::Literal;
    }

    fn abandon(&mut self, summary: &mut ChunkSummary) {
        summary.abandoned += 1;
        self.reset();
    }

    /// Numeric value of parameter `index`; `None` when absent or not a number.
    fn param(&self, index: usize) -> Option<u32> {
        let raw = self.params.split(';').nth(index)?;
        let digits = raw.trim_start_matches(['?', '<', '=', '>']);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        Some(digits.bytes().fold(0u32, |acc, b| {
            (acc * 10 + u32::from(b - b'0')).min(MAX_PARAM_VALUE)
        }))
    }

    /// Repeat count for parameter `index`: missing, non-numeric and 0 all mean 1.
    fn count(&self, index: usize) -> usize {
        match self.param(index) {
            Some(n) if n > 0 => n as usize,
            _ => 1,
        }
    }
}
