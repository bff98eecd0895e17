#![no_main]

//! Fuzz target for the closed caption decoders.
//!
//! Feeds arbitrary payloads to both decoders, split into calls the way a
//! demuxer hands them over, with strict and lenient parsing mixed.

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use transcode_cc::cea608::{Cea608Config, Cea608Decoder, DisplayRows};
use transcode_cc::cea708::{CaptionEvent, Cea708Config, Cea708Decoder, P16Charset};

#[derive(Arbitrary, Debug)]
struct CaptionInput {
    chunks: Vec<Chunk>,
    strip_parity: bool,
    utf16: bool,
}

#[derive(Arbitrary, Debug)]
struct Chunk {
    data: Vec<u8>,
    strict: bool,
    reset: bool,
}

fuzz_target!(|input: CaptionInput| {
    let config = Cea608Config::default().with_strip_parity(input.strip_parity);
    let mut cea608 = Cea608Decoder::with_config(Vec::<DisplayRows>::new(), config);

    let charset = if input.utf16 {
        P16Charset::Utf16
    } else {
        P16Charset::EucKr
    };
    let config = Cea708Config::default().with_p16_charset(charset);
    let mut cea708 = Cea708Decoder::with_config(Vec::<CaptionEvent>::new(), config);

    for chunk in &input.chunks {
        if chunk.reset {
            cea608.reset();
            cea708.reset();
        }
        if chunk.strict {
            let _ = cea608.parse_strict(&chunk.data);
            let _ = cea708.parse_strict(&chunk.data);
        } else {
            cea608.parse(&chunk.data);
            cea708.parse(&chunk.data);
        }
        let _ = cea608.display_rows();
        let _ = cea608.text_rows();
    }
});
