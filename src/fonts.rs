//! The two standard fonts all drawing is done with.
//!
//! Both are PDF standard 14 fonts, so nothing but a font dictionary has to be
//! written. Text is encoded with `WinAnsiEncoding`.

use lopdf::{Document, Object, ObjectId};

/// Resource name under which the regular face is registered on a page.
pub const REGULAR_FONT_NAME: &str = "SFHelv";
/// Resource name under which the bold face is registered on a page.
pub const BOLD_FONT_NAME: &str = "SFHelvBold";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontFace {
    Regular,
    Bold,
}

impl FontFace {
    pub fn resource_name(self) -> &'static str {
        match self {
            FontFace::Regular => REGULAR_FONT_NAME,
            FontFace::Bold => BOLD_FONT_NAME,
        }
    }

    fn base_font(self) -> &'static str {
        match self {
            FontFace::Regular => "Helvetica",
            FontFace::Bold => "Helvetica-Bold",
        }
    }
}

/// Object ids of the font dictionaries, shared by every page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmbeddedFonts {
    pub regular: ObjectId,
    pub bold: ObjectId,
}

impl EmbeddedFonts {
    pub fn embed(document: &mut Document) -> Self {
        EmbeddedFonts {
            regular: document.add_object(font_dictionary(FontFace::Regular)),
            bold: document.add_object(font_dictionary(FontFace::Bold)),
        }
    }

    pub fn object_id(&self, face: FontFace) -> ObjectId {
        match face {
            FontFace::Regular => self.regular,
            FontFace::Bold => self.bold,
        }
    }
}

fn font_dictionary(face: FontFace) -> lopdf::Dictionary {
    use lopdf::Object::*;
    lopdf::Dictionary::from_iter(vec![
        ("Type", Name("Font".as_bytes().to_vec())),
        ("Subtype", Name("Type1".as_bytes().to_vec())),
        ("BaseFont", Name(face.base_font().as_bytes().to_vec())),
        ("Encoding", Name("WinAnsiEncoding".as_bytes().to_vec())),
    ])
}

/// Encode text for a `WinAnsiEncoding` font. Unmappable characters become `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars().map(win_ansi_byte).collect()
}

/// PDF string operand for `Tj`.
pub fn text_operand(text: &str) -> Object {
    Object::String(encode_win_ansi(text), lopdf::StringFormat::Literal)
}

fn win_ansi_byte(c: char) -> u8 {
    match c {
        '\u{20}'..='\u{7e}' => c as u8,
        '\u{a0}'..='\u{ff}' => c as u8,
        '\t' | '\n' | '\r' => b' ',
        '\u{20ac}' => 0x80,
        '\u{201a}' => 0x82,
        '\u{0192}' => 0x83,
        '\u{201e}' => 0x84,
        '\u{2026}' => 0x85,
        '\u{2020}' => 0x86,
        '\u{2021}' => 0x87,
        '\u{02c6}' => 0x88,
        '\u{2030}' => 0x89,
        '\u{0160}' => 0x8a,
        '\u{2039}' => 0x8b,
        '\u{0152}' => 0x8c,
        '\u{017d}' => 0x8e,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201c}' => 0x93,
        '\u{201d}' => 0x94,
        '\u{2022}' => 0x95,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '\u{02dc}' => 0x98,
        '\u{2122}' => 0x99,
        '\u{0161}' => 0x9a,
        '\u{203a}' => 0x9b,
        '\u{0153}' => 0x9c,
        '\u{017e}' => 0x9e,
        '\u{0178}' => 0x9f,
        _ => b'?',
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_and_latin1_pass_through() {
        assert_eq!(encode_win_ansi("Signed <a@b.c>"), b"Signed <a@b.c>".to_vec());
        assert_eq!(encode_win_ansi("café"), vec![b'c', b'a', b'f', 0xe9]);
    }

    #[test]
    fn typographic_characters_map_to_win_ansi() {
        assert_eq!(encode_win_ansi("\u{2022} x"), vec![0x95, b' ', b'x']);
        assert_eq!(encode_win_ansi("a \u{2014} b"), vec![b'a', b' ', 0x97, b' ', b'b']);
    }

    #[test]
    fn unmappable_characters_are_replaced() {
        assert_eq!(encode_win_ansi("名前"), b"??".to_vec());
    }

    #[test]
    fn fonts_are_added_once() {
        let mut document = Document::with_version("1.5");
        let fonts = EmbeddedFonts::embed(&mut document);
        assert_eq!(document.objects.len(), 2);
        let bold = document.get_object(fonts.bold).unwrap().as_dict().unwrap();
        assert_eq!(bold.get(b"BaseFont").unwrap().as_name().unwrap(), b"Helvetica-Bold");
    }
}
