//! CEA-608 (Line 21) closed caption decoder.
//!
//! CEA-608 is the analog closed caption standard used in North American
//! television broadcasts. It encodes caption data in the vertical blanking
//! interval (VBI) line 21 of the NTSC video signal; digital streams carry the
//! same byte pairs in `cc_data` triples.
//!
//! # Format Overview
//!
//! - Two-byte control codes and character pairs
//! - Roll-up, pop-on, paint-on and text modes
//! - Basic styling (italics, underline, colors)
//! - 32 columns x 15 rows display area
//!
//! The decoder keeps three caption memories. Whenever the displayed memory
//! changes visibly it composes all 15 rows and hands them to a
//! [`DisplayListener`].

mod code;
mod memory;

pub use code::{
    basic_char, extended_char, special_char, ByteTriple, Cea608Color, ControlCode, Pac,
    StyleCode, Token, TRANSPARENT_SPACE,
};
pub use memory::{
    Cell, Cursor, DisplayRows, Line, Memory, Span, SpanKind, StyledRow, LINE_WIDTH, MAX_COLS,
    MAX_ROWS,
};

use tracing::{debug, trace, warn};

use crate::error::{CaptionError, Result};
use crate::types::CaptionStyle;

/// Receives composed caption rows.
pub trait DisplayListener {
    /// Called whenever the displayed memory changes.
    fn on_display_changed(&mut self, rows: DisplayRows);

    /// Caption preferences used while composing rows.
    fn caption_style(&self) -> CaptionStyle {
        CaptionStyle::default()
    }
}

impl<T: DisplayListener + ?Sized> DisplayListener for &mut T {
    fn on_display_changed(&mut self, rows: DisplayRows) {
        (**self).on_display_changed(rows)
    }

    fn caption_style(&self) -> CaptionStyle {
        (**self).caption_style()
    }
}

/// Collects every display update.
impl DisplayListener for Vec<DisplayRows> {
    fn on_display_changed(&mut self, rows: DisplayRows) {
        self.push(rows);
    }
}

/// CEA-608 caption mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Mode {
    /// Paint-on captions (displayed character by character)
    #[default]
    PaintOn,
    /// Roll-up captions with a 2-4 row window
    RollUp(u8),
    /// Pop-on captions (displayed all at once)
    PopOn,
    /// Text service
    Text,
}

/// Decoder configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cea608Config {
    /// Drop the odd-parity bit of both data bytes before decoding.
    pub strip_parity: bool,
}

impl Default for Cea608Config {
    fn default() -> Self {
        Self { strip_parity: true }
    }
}

impl Cea608Config {
    pub fn with_strip_parity(mut self, strip_parity: bool) -> Self {
        self.strip_parity = strip_parity;
        self
    }
}

/// CEA-608 decoder state
#[derive(Debug)]
pub struct Cea608Decoder<L> {
    config: Cea608Config,
    listener: L,
    mode: Mode,
    /// Last control code, for duplicate detection
    prev_control: Option<ControlCode>,
    display: Memory,
    non_display: Memory,
    text: Memory,
}

impl<L: DisplayListener> Cea608Decoder<L> {
    /// Create a decoder with the default configuration.
    pub fn new(listener: L) -> Self {
        Self::with_config(listener, Cea608Config::default())
    }

    pub fn with_config(listener: L, config: Cea608Config) -> Self {
        Cea608Decoder {
            config,
            listener,
            mode: Mode::default(),
            prev_control: None,
            display: Memory::new(),
            non_display: Memory::new(),
            text: Memory::new(),
        }
    }

    pub fn config(&self) -> &Cea608Config {
        &self.config
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn listener(&self) -> &L {
        &self.listener
    }

    pub fn listener_mut(&mut self) -> &mut L {
        &mut self.listener
    }

    pub fn into_listener(self) -> L {
        self.listener
    }

    /// Compose the displayed memory without notifying the listener.
    pub fn display_rows(&self) -> DisplayRows {
        self.display
            .styled_rows(self.listener.caption_style().background_color)
    }

    /// Compose the text-mode memory.
    pub fn text_rows(&self) -> DisplayRows {
        self.text
            .styled_rows(self.listener.caption_style().background_color)
    }

    /// Return to the initial state. The listener is kept.
    pub fn reset(&mut self) {
        self.mode = Mode::default();
        self.prev_control = None;
        self.display = Memory::new();
        self.non_display = Memory::new();
        self.text = Memory::new();
    }

    /// Decode a payload of `(type, data1, data2)` triples.
    ///
    /// A trailing partial triple is ignored.
    pub fn parse(&mut self, data: &[u8]) {
        if data.len() % 3 != 0 {
            warn!(
                len = data.len(),
                "CEA-608 payload has {} trailing bytes, ignoring them",
                data.len() % 3
            );
        }
        for triple in ByteTriple::iter(data) {
            self.process_triple(triple);
        }
    }

    /// Decode a payload, rejecting it untouched unless it is whole triples.
    pub fn parse_strict(&mut self, data: &[u8]) -> Result<()> {
        if data.len() % 3 != 0 {
            return Err(CaptionError::IncompleteTriple { len: data.len() });
        }
        self.parse(data);
        Ok(())
    }

    /// Process a single triple.
    pub fn process_triple(&mut self, triple: ByteTriple) {
        let triple = if self.config.strip_parity {
            triple.without_parity()
        } else {
            triple
        };
        let token = triple.token();
        trace!(cc_type = triple.cc_type, "{}", token);

        let Token::Control(code) = token else {
            self.prev_control = None;
            self.handle_token(token);
            return;
        };

        // control codes are sent twice; a third copy counts again
        if self.prev_control == Some(code) {
            self.prev_control = None;
            return;
        }
        if self.handle_control(code) {
            self.prev_control = Some(code);
        } else {
            self.prev_control = None;
        }
    }

    fn handle_token(&mut self, token: Token) {
        match token {
            Token::Control(code) => {
                self.handle_control(code);
            }
            Token::Tab(columns) => self.memory_mut().tab(columns),
            Token::Pac(pac) => {
                if let Mode::RollUp(rows) = self.mode {
                    self.memory_mut()
                        .move_baseline_to(pac.row as usize, rows as usize);
                }
                self.memory_mut().write_pac(pac);
            }
            Token::MidRow(style) => self.memory_mut().write_mid_row(style),
            Token::Basic(first, second) => {
                let memory = self.memory_mut();
                memory.write_char(first);
                if let Some(second) = second {
                    memory.write_char(second);
                }
                self.after_write();
            }
            Token::Special(c) => {
                self.memory_mut().write_char(c);
                self.after_write();
            }
            Token::Extended(c) => {
                // extended characters replace the basic fallback sent before them
                let memory = self.memory_mut();
                memory.backspace();
                memory.write_char(c);
                self.after_write();
            }
            Token::Unrecognized => {}
        }
    }

    /// Returns false for control codes the decoder does not act on.
    fn handle_control(&mut self, code: ControlCode) -> bool {
        match code {
            ControlCode::RCL => self.set_mode(Mode::PopOn),
            ControlCode::BS => self.memory_mut().backspace(),
            ControlCode::DER => self.memory_mut().delete_to_end_of_row(),
            ControlCode::RU2 | ControlCode::RU3 | ControlCode::RU4 => {
                let rows = code.roll_up_rows().unwrap_or(4);
                if !matches!(self.mode, Mode::RollUp(_)) {
                    debug!("entering roll-up, erasing memories");
                    self.display.erase();
                    self.non_display.erase();
                }
                self.set_mode(Mode::RollUp(rows));
            }
            ControlCode::FON => debug!("flash on"),
            ControlCode::RDC => self.set_mode(Mode::PaintOn),
            ControlCode::TR => {
                self.set_mode(Mode::Text);
                self.text.erase();
            }
            ControlCode::RTD => self.set_mode(Mode::Text),
            ControlCode::EDM => {
                self.display.erase();
                self.update_display();
            }
            ControlCode::CR => match self.mode {
                Mode::RollUp(rows) => {
                    self.memory_mut().roll_up(rows as usize);
                    self.update_display();
                }
                _ => self.memory_mut().carriage_return(),
            },
            ControlCode::ENM => self.non_display.erase(),
            ControlCode::EOC => {
                std::mem::swap(&mut self.display, &mut self.non_display);
                self.set_mode(Mode::PopOn);
                self.update_display();
            }
            ControlCode::AOF | ControlCode::AON => return false,
        }
        true
    }

    fn set_mode(&mut self, mode: Mode) {
        if self.mode != mode {
            debug!(from = ?self.mode, to = ?mode, "caption mode change");
            self.mode = mode;
        }
    }

    /// Memory targeted by writes in the current mode
    fn memory_mut(&mut self) -> &mut Memory {
        match self.mode {
            Mode::PopOn => &mut self.non_display,
            Mode::Text => &mut self.text,
            Mode::PaintOn | Mode::RollUp(_) => &mut self.display,
        }
    }

    fn after_write(&mut self) {
        if matches!(self.mode, Mode::PaintOn | Mode::RollUp(_)) {
            self.update_display();
        }
    }

    fn update_display(&mut self) {
        let style = self.listener.caption_style();
        let rows = self.display.styled_rows(style.background_color);
        self.listener.on_display_changed(rows);
    }
}
