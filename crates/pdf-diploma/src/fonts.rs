//! Standard PDF base fonts and their metrics
//!
//! Text is drawn with the non-embedded base fonts every PDF reader ships,
//! so centering math must use the same advance widths the reader will use.
//! Widths come from the Adobe AFM files, in 1/1000 em.

use crate::types::{DiplomaError, Result};
use std::fmt;
use std::str::FromStr;
use unicode_normalization::UnicodeNormalization;

/// The fixed catalog of text fonts a layout may name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
    HelveticaBoldOblique,
    TimesRoman,
    TimesBold,
    TimesItalic,
    TimesBoldItalic,
    Courier,
    CourierBold,
    CourierOblique,
    CourierBoldOblique,
}

impl StandardFont {
    pub const ALL: [StandardFont; 12] = [
        StandardFont::Helvetica,
        StandardFont::HelveticaBold,
        StandardFont::HelveticaOblique,
        StandardFont::HelveticaBoldOblique,
        StandardFont::TimesRoman,
        StandardFont::TimesBold,
        StandardFont::TimesItalic,
        StandardFont::TimesBoldItalic,
        StandardFont::Courier,
        StandardFont::CourierBold,
        StandardFont::CourierOblique,
        StandardFont::CourierBoldOblique,
    ];

    /// PDF `BaseFont` name
    pub fn pdf_name(self) -> &'static str {
        match self {
            StandardFont::Helvetica => "Helvetica",
            StandardFont::HelveticaBold => "Helvetica-Bold",
            StandardFont::HelveticaOblique => "Helvetica-Oblique",
            StandardFont::HelveticaBoldOblique => "Helvetica-BoldOblique",
            StandardFont::TimesRoman => "Times-Roman",
            StandardFont::TimesBold => "Times-Bold",
            StandardFont::TimesItalic => "Times-Italic",
            StandardFont::TimesBoldItalic => "Times-BoldItalic",
            StandardFont::Courier => "Courier",
            StandardFont::CourierBold => "Courier-Bold",
            StandardFont::CourierOblique => "Courier-Oblique",
            StandardFont::CourierBoldOblique => "Courier-BoldOblique",
        }
    }

    /// Width of `text` in points when set at `size`.
    pub fn string_width(self, text: &str, size: f32) -> f32 {
        let units: u32 = text.chars().map(|ch| self.glyph(ch).1 as u32).sum();
        units as f32 * size / 1000.0
    }

    /// WinAnsiEncoding bytes for `text`, substituting `?` for anything the
    /// font has no metrics for.
    pub fn encode_win_ansi(self, text: &str) -> Vec<u8> {
        text.chars().map(|ch| self.glyph(ch).0).collect()
    }

    fn metrics(self) -> Metrics {
        match self {
            StandardFont::Helvetica | StandardFont::HelveticaOblique => Metrics::Table(0),
            StandardFont::HelveticaBold | StandardFont::HelveticaBoldOblique => {
                Metrics::Table(1)
            }
            StandardFont::TimesRoman => Metrics::Table(2),
            StandardFont::TimesBold => Metrics::Table(3),
            StandardFont::TimesItalic => Metrics::Table(4),
            StandardFont::TimesBoldItalic => Metrics::Table(5),
            StandardFont::Courier
            | StandardFont::CourierBold
            | StandardFont::CourierOblique
            | StandardFont::CourierBoldOblique => Metrics::Monospace,
        }
    }

    /// Resolve a character to its encoded byte and advance width.
    fn glyph(self, ch: char) -> (u8, u16) {
        match (win_ansi_byte(ch), self.char_width(ch)) {
            (Some(byte), Some(width)) => (byte, width),
            _ => (b'?', self.char_width('?').unwrap_or(500)),
        }
    }

    fn char_width(self, ch: char) -> Option<u16> {
        let table = match self.metrics() {
            Metrics::Monospace => return win_ansi_byte(ch).map(|_| COURIER_WIDTH),
            Metrics::Table(idx) => idx,
        };

        if (' '..='~').contains(&ch) {
            return Some(ASCII_WIDTHS[table][ch as usize - 32]);
        }

        if let Some((_, widths)) = EXTRA_WIDTHS.iter().find(|(c, _)| *c == ch) {
            return Some(widths[table]);
        }

        // Accented Latin-1 letters share the advance of their base letter,
        // except Helvetica's accented i which is built on the wider dotless i.
        let mut decomposed = ch.nfd();
        let base = decomposed.next()?;
        if decomposed.next().is_none() || !base.is_ascii_alphabetic() {
            return None;
        }
        if base == 'i' {
            return Some(DOTLESS_I_WIDTHS[table]);
        }
        Some(ASCII_WIDTHS[table][base as usize - 32])
    }
}

impl fmt::Display for StandardFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.pdf_name())
    }
}

impl FromStr for StandardFont {
    type Err = DiplomaError;

    fn from_str(s: &str) -> Result<Self> {
        StandardFont::ALL
            .into_iter()
            .find(|font| font.pdf_name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DiplomaError::Config(format!("Unknown font '{}'", s)))
    }
}

enum Metrics {
    Table(usize),
    Monospace,
}

const COURIER_WIDTH: u16 = 600;

/// WinAnsiEncoding code for `ch`, if the encoding has one.
fn win_ansi_byte(ch: char) -> Option<u8> {
    match ch {
        ' '..='~' | '\u{A0}'..='\u{FF}' => Some(ch as u32 as u8),
        '\u{20AC}' => Some(0x80),
        '\u{201A}' => Some(0x82),
        '\u{0192}' => Some(0x83),
        '\u{201E}' => Some(0x84),
        '\u{2020}' => Some(0x86),
        '\u{2021}' => Some(0x87),
        '\u{02C6}' => Some(0x88),
        '\u{2030}' => Some(0x89),
        '\u{0160}' => Some(0x8A),
        '\u{2039}' => Some(0x8B),
        '\u{0152}' => Some(0x8C),
        '\u{017D}' => Some(0x8E),
        '\u{02DC}' => Some(0x98),
        '\u{2122}' => Some(0x99),
        '\u{0161}' => Some(0x9A),
        '\u{203A}' => Some(0x9B),
        '\u{0153}' => Some(0x9C),
        '\u{017E}' => Some(0x9E),
        '\u{0178}' => Some(0x9F),
        '\u{2018}' => Some(0x91),
        '\u{2019}' => Some(0x92),
        '\u{201C}' => Some(0x93),
        '\u{201D}' => Some(0x94),
        '\u{2022}' => Some(0x95),
        '\u{2013}' => Some(0x96),
        '\u{2014}' => Some(0x97),
        '\u{2026}' => Some(0x85),
        _ => None,
    }
}

// Table order: Helvetica, Helvetica-Bold, Times-Roman, Times-Bold,
// Times-Italic, Times-BoldItalic. Oblique variants share the upright widths.

const DOTLESS_I_WIDTHS: [u16; 6] = [278, 278, 278, 278, 278, 278];

#[rustfmt::skip]
const EXTRA_WIDTHS: &[(char, [u16; 6])] = &[
    ('\u{A0}', [278, 278, 250, 250, 250, 250]),   // no-break space
    ('\u{A1}', [333, 333, 333, 333, 389, 389]),   // ¡
    ('\u{A2}', [556, 556, 500, 500, 500, 500]),   // ¢
    ('\u{A3}', [556, 556, 500, 500, 500, 500]),   // £
    ('\u{A4}', [556, 556, 500, 500, 500, 500]),   // ¤
    ('\u{A5}', [556, 556, 500, 500, 500, 500]),   // ¥
    ('\u{A6}', [260, 280, 200, 220, 275, 220]),   // ¦
    ('\u{A7}', [556, 556, 500, 500, 500, 500]),   // §
    ('\u{A8}', [333, 333, 333, 333, 333, 333]),   // ¨
    ('\u{A9}', [737, 737, 760, 747, 760, 747]),   // ©
    ('\u{AC}', [584, 584, 564, 570, 675, 606]),   // ¬
    ('\u{AD}', [333, 333, 333, 333, 333, 333]),   // soft hyphen
    ('\u{AE}', [737, 737, 760, 747, 760, 747]),   // ®
    ('\u{AF}', [333, 333, 333, 333, 333, 333]),   // ¯
    ('\u{B1}', [584, 584, 564, 570, 675, 570]),   // ±
    ('\u{B2}', [333, 333, 300, 300, 300, 300]),   // ²
    ('\u{B3}', [333, 333, 300, 300, 300, 300]),   // ³
    ('\u{B4}', [333, 333, 333, 333, 333, 333]),   // ´
    ('\u{B5}', [556, 611, 500, 556, 500, 576]),   // µ
    ('\u{B6}', [537, 556, 453, 540, 523, 500]),   // ¶
    ('\u{B8}', [333, 333, 333, 333, 333, 333]),   // ¸
    ('\u{B9}', [333, 333, 300, 300, 300, 300]),   // ¹
    ('\u{BC}', [834, 834, 750, 750, 750, 750]),   // ¼
    ('\u{BD}', [834, 834, 750, 750, 750, 750]),   // ½
    ('\u{BE}', [834, 834, 750, 750, 750, 750]),   // ¾
    ('\u{D0}', [722, 722, 722, 722, 722, 722]),   // Ð
    ('\u{D7}', [584, 584, 564, 570, 675, 570]),   // ×
    ('\u{DE}', [667, 667, 556, 611, 611, 611]),   // Þ
    ('\u{F0}', [556, 611, 500, 500, 500, 500]),   // ð
    ('\u{F7}', [584, 584, 564, 570, 675, 570]),   // ÷
    ('\u{FE}', [556, 611, 500, 556, 500, 500]),   // þ
    ('\u{0152}', [1000, 1000, 889, 1000, 944, 944]), // Œ
    ('\u{0153}', [944, 944, 722, 722, 667, 722]), // œ
    ('\u{0192}', [556, 556, 500, 500, 500, 500]), // ƒ
    ('\u{02C6}', [333, 333, 333, 333, 333, 333]), // ˆ
    ('\u{02DC}', [333, 333, 333, 333, 333, 333]), // ˜
    ('\u{201A}', [222, 278, 333, 333, 333, 333]), // ‚
    ('\u{201E}', [333, 500, 444, 500, 556, 500]), // „
    ('\u{2020}', [556, 556, 500, 500, 500, 500]), // †
    ('\u{2021}', [556, 556, 500, 500, 500, 500]), // ‡
    ('\u{2030}', [1000, 1000, 1000, 1000, 1000, 1000]), // ‰
    ('\u{2039}', [333, 333, 333, 333, 333, 333]), // ‹
    ('\u{203A}', [333, 333, 333, 333, 333, 333]), // ›
    ('\u{20AC}', [556, 556, 500, 500, 500, 500]), // €
    ('\u{2122}', [1000, 1000, 980, 1000, 980, 1000]), // ™
    ('\u{AB}', [556, 556, 500, 500, 500, 500]),   // «
    ('\u{B0}', [400, 400, 400, 400, 400, 400]),   // °
    ('\u{AA}', [370, 370, 276, 300, 276, 266]),   // ª
    ('\u{B7}', [278, 278, 250, 250, 250, 250]),   // ·
    ('\u{BA}', [365, 365, 310, 330, 310, 300]),   // º
    ('\u{BB}', [556, 556, 500, 500, 500, 500]),   // »
    ('\u{BF}', [611, 611, 444, 500, 500, 500]),   // ¿
    ('\u{C6}', [1000, 1000, 889, 1000, 889, 944]), // Æ
    ('\u{D8}', [778, 778, 722, 778, 722, 722]),   // Ø
    ('\u{DF}', [611, 611, 500, 556, 500, 500]),   // ß
    ('\u{E6}', [889, 889, 667, 722, 667, 722]),   // æ
    ('\u{F8}', [611, 611, 500, 500, 500, 500]),   // ø
    ('\u{2018}', [222, 278, 333, 333, 333, 333]), // ‘
    ('\u{2019}', [222, 278, 333, 333, 333, 333]), // ’
    ('\u{201C}', [333, 500, 444, 500, 556, 500]), // “
    ('\u{201D}', [333, 500, 444, 500, 556, 500]), // ”
    ('\u{2022}', [350, 350, 350, 350, 350, 350]), // •
    ('\u{2013}', [556, 556, 500, 500, 500, 500]), // –
    ('\u{2014}', [1000, 1000, 1000, 1000, 889, 1000]), // —
    ('\u{2026}', [1000, 1000, 1000, 1000, 889, 1000]), // …
];

/// Advance widths for codes 32..=126.
#[rustfmt::skip]
const ASCII_WIDTHS: [[u16; 95]; 6] = [
    // Helvetica
    [
        278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
        556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
        278, 278, 584, 584, 584, 556, 1015,
        667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,
        722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
        278, 278, 278, 469, 556, 333,
        556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,
        556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,
        334, 260, 334, 584,
    ],
    // Helvetica-Bold
    [
        278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
        556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
        333, 333, 584, 584, 584, 611, 975,
        722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,
        722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
        333, 278, 333, 584, 556, 333,
        556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,
        611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
        389, 280, 389, 584,
    ],
    // Times-Roman
    [
        250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278,
        500, 500, 500, 500, 500, 500, 500, 500, 500, 500,
        278, 278, 564, 564, 564, 444, 921,
        722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889,
        722, 722, 556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611,
        333, 278, 333, 469, 500, 333,
        444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778,
        500, 500, 500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444,
        480, 200, 480, 541,
    ],
    // Times-Bold
    [
        250, 333, 555, 500, 500, 1000, 833, 278, 333, 333, 500, 570, 250, 333, 250, 278,
        500, 500, 500, 500, 500, 500, 500, 500, 500, 500,
        333, 333, 570, 570, 570, 500, 930,
        722, 667, 722, 722, 667, 611, 778, 778, 389, 500, 778, 667, 944,
        722, 778, 611, 778, 722, 556, 667, 722, 722, 1000, 722, 722, 667,
        333, 278, 333, 581, 500, 333,
        500, 556, 444, 556, 444, 333, 500, 556, 278, 333, 556, 278, 833,
        556, 500, 556, 556, 444, 389, 333, 556, 500, 722, 500, 500, 444,
        394, 220, 394, 520,
    ],
    // Times-Italic
    [
        250, 333, 420, 500, 500, 833, 778, 214, 333, 333, 500, 675, 250, 333, 250, 278,
        500, 500, 500, 500, 500, 500, 500, 500, 500, 500,
        333, 333, 675, 675, 675, 500, 920,
        611, 611, 667, 722, 611, 611, 722, 722, 333, 444, 667, 556, 833,
        667, 722, 611, 722, 611, 500, 556, 722, 611, 833, 611, 556, 556,
        389, 278, 389, 422, 500, 333,
        500, 500, 444, 500, 444, 278, 500, 500, 278, 278, 444, 278, 722,
        500, 500, 500, 500, 389, 389, 278, 500, 444, 667, 444, 444, 389,
        400, 275, 400, 541,
    ],
    // Times-BoldItalic
    [
        250, 389, 555, 500, 500, 833, 778, 278, 333, 333, 500, 570, 250, 333, 250, 278,
        500, 500, 500, 500, 500, 500, 500, 500, 500, 500,
        333, 333, 570, 570, 570, 500, 832,
        667, 667, 667, 722, 667, 667, 722, 778, 389, 500, 667, 611, 889,
        722, 722, 611, 722, 667, 556, 611, 722, 667, 889, 667, 611, 611,
        333, 278, 333, 570, 500, 333,
        500, 500, 444, 500, 444, 333, 500, 556, 278, 278, 500, 278, 778,
        556, 500, 500, 500, 389, 389, 278, 556, 444, 667, 500, 444, 389,
        348, 220, 348, 570,
    ],
];
