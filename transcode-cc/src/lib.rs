//! # transcode-cc
//!
//! Closed caption decoding for the two caption formats carried in video
//! elementary stream user data.
//!
//! ## Features
//!
//! - CEA-608 (line 21) decoding with paint-on, roll-up, pop-on and text modes
//! - Composed 15-row display with italic, underline, color and background spans
//! - CEA-708 (DTVCC) service block decoding into typed caption events
//! - EUC-KR and UTF-16 decoding of 16-bit CEA-708 characters
//! - Lenient parsing that never fails, plus strict variants that report
//!   truncated input
//!
//! Both decoders hand their output to a listener synchronously while
//! `parse()` runs.
//!
//! ## Quick Start
//!
//! ### CEA-608
//!
//! ```rust
//! use transcode_cc::cea608::Cea608Decoder;
//!
//! let mut decoder = Cea608Decoder::new(Vec::new());
//!
//! // RCL, PAC row 1, "HELLO", EOC
//! decoder.parse(&[
//!     0x04, 0x14, 0x20, 0x04, 0x11, 0x40, 0x04, b'H', b'E', 0x04, b'L', b'L',
//!     0x04, b'O', 0x00, 0x04, 0x14, 0x2F,
//! ]);
//!
//! let updates = decoder.into_listener();
//! let row = updates[0][0].as_ref().map(|row| row.trimmed_text());
//! assert_eq!(row.as_deref(), Some("HELLO"));
//! ```
//!
//! ### CEA-708
//!
//! ```rust
//! use transcode_cc::cea708::{CaptionEvent, Cea708Decoder, PenLocation};
//!
//! let mut decoder = Cea708Decoder::new(Vec::new());
//! decoder.parse(b"AB\x92\x02\x03CD");
//!
//! assert_eq!(
//!     decoder.listener().as_slice(),
//!     &[
//!         CaptionEvent::Buffer("AB".into()),
//!         CaptionEvent::SPL(PenLocation { row: 2, column: 3 }),
//!         CaptionEvent::Buffer("CD".into()),
//!     ]
//! );
//! ```

pub mod cea608;
pub mod cea708;
pub mod error;
pub mod types;

// Re-export commonly used types at the crate root
pub use cea608::{Cea608Config, Cea608Decoder, DisplayRows, StyledRow};
pub use cea708::{CaptionEvent, Cea708Config, Cea708Decoder, P16Charset};
pub use error::{CaptionError, Result};
pub use types::{CaptionStyle, Color, EdgeType, StyledText, TextStyle};

/// Prelude module for convenient imports.
///
/// ```rust
/// use transcode_cc::prelude::*;
/// ```
pub mod prelude {
    pub use crate::cea608::{
        self, Cea608Config, Cea608Decoder, DisplayListener as Cea608Listener, DisplayRows,
        StyledRow,
    };
    pub use crate::cea708::{
        self, CaptionEvent, Cea708Config, Cea708Decoder, DisplayListener as Cea708Listener,
        P16Charset,
    };
    pub use crate::error::{CaptionError, Result};
    pub use crate::types::{CaptionStyle, Color, EdgeType, StyledText, TextStyle};
}

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_same_pair_through_both_decoders() {
        // 0x14 0x20 is RCL to CEA-608 but a one-operand C0 code to CEA-708
        let mut decoder = Cea608Decoder::new(Vec::new());
        decoder.parse(&[0x04, 0x14, 0x20]);
        assert_eq!(decoder.mode(), cea608::Mode::PopOn);

        let mut decoder = Cea708Decoder::new(Vec::new());
        decoder.parse(&[0x14, 0x20, b'a']);
        assert_eq!(decoder.listener(), &vec![CaptionEvent::Buffer("a".into())]);
    }

    #[test]
    fn test_styled_text_from_display() {
        let mut decoder = Cea608Decoder::new(Vec::new());
        // PAC row 1 italics, "Hi"
        decoder.parse(&[0x04, 0x11, 0x4E, 0x04, b'H', b'i']);
        let rows = decoder.display_rows();
        let segments = rows[0].as_ref().map(StyledRow::to_styled_text).unwrap_or_default();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].text, "Hi");
        assert!(segments[0].style.italic);
        assert_eq!(segments[0].style.background_color, Some(Color::BLACK));
    }
}
