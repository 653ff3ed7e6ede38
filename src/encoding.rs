//! Text decoding for chart and song.ini files
//!
//! Charts in the wild come as UTF-8 (with or without BOM), UTF-16, UTF-32 or
//! Windows-1252. Unicode encodings are recognised by their byte order mark;
//! anything else that is not valid UTF-8 is treated as Windows-1252.

/// Detected text encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    Utf8Bom,
    Utf16Le,
    Utf16Be,
    Utf32Le,
    Utf32Be,
    Windows1252,
}

impl TextEncoding {
    /// Length of the byte order mark for this encoding
    fn bom_len(self) -> usize {
        match self {
            TextEncoding::Utf8 | TextEncoding::Windows1252 => 0,
            TextEncoding::Utf8Bom => 3,
            TextEncoding::Utf16Le | TextEncoding::Utf16Be => 2,
            TextEncoding::Utf32Le | TextEncoding::Utf32Be => 4,
        }
    }
}

/// Guess the encoding of `data`.
///
/// UTF-32 LE must be checked before UTF-16 LE since their marks share a prefix.
pub fn detect(data: &[u8]) -> TextEncoding {
    if data.starts_with(&[0xFF, 0xFE, 0x00, 0x00]) {
        TextEncoding::Utf32Le
    } else if data.starts_with(&[0x00, 0x00, 0xFE, 0xFF]) {
        TextEncoding::Utf32Be
    } else if data.starts_with(&[0xEF, 0xBB, 0xBF]) {
        TextEncoding::Utf8Bom
    } else if data.starts_with(&[0xFF, 0xFE]) {
        TextEncoding::Utf16Le
    } else if data.starts_with(&[0xFE, 0xFF]) {
        TextEncoding::Utf16Be
    } else if std::str::from_utf8(data).is_ok() {
        TextEncoding::Utf8
    } else {
        TextEncoding::Windows1252
    }
}

/// Decode `data` to a string, replacing invalid sequences
pub fn decode(data: &[u8]) -> String {
    let encoding = detect(data);
    let body = &data[encoding.bom_len()..];
    match encoding {
        TextEncoding::Utf8 | TextEncoding::Utf8Bom => String::from_utf8_lossy(body).into_owned(),
        TextEncoding::Utf16Le => decode_utf16(body, u16::from_le_bytes),
        TextEncoding::Utf16Be => decode_utf16(body, u16::from_be_bytes),
        TextEncoding::Utf32Le => decode_utf32(body, u32::from_le_bytes),
        TextEncoding::Utf32Be => decode_utf32(body, u32::from_be_bytes),
        TextEncoding::Windows1252 => body.iter().map(|&b| windows_1252_char(b)).collect(),
    }
}

fn decode_utf16(body: &[u8], unit: fn([u8; 2]) -> u16) -> String {
    let units = body.chunks_exact(2).map(|pair| unit([pair[0], pair[1]]));
    char::decode_utf16(units)
        .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

fn decode_utf32(body: &[u8], unit: fn([u8; 4]) -> u32) -> String {
    body.chunks_exact(4)
        .map(|quad| unit([quad[0], quad[1], quad[2], quad[3]]))
        .map(|code| char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

/// Windows-1252 differs from Latin-1 only in 0x80..=0x9F
const WINDOWS_1252_HIGH: [char; 32] = [
    '\u{20AC}', '\u{0081}', '\u{201A}', '\u{0192}', '\u{201E}', '\u{2026}', '\u{2020}', '\u{2021}',
    '\u{02C6}', '\u{2030}', '\u{0160}', '\u{2039}', '\u{0152}', '\u{008D}', '\u{017D}', '\u{008F}',
    '\u{0090}', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}', '\u{2022}', '\u{2013}', '\u{2014}',
    '\u{02DC}', '\u{2122}', '\u{0161}', '\u{203A}', '\u{0153}', '\u{009D}', '\u{017E}', '\u{0178}',
];

fn windows_1252_char(b: u8) -> char {
    match b {
        0x80..=0x9F => WINDOWS_1252_HIGH[(b - 0x80) as usize],
        _ => b as char,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8() {
        assert_eq!(detect("Résolution".as_bytes()), TextEncoding::Utf8);
        assert_eq!(decode("[Song]".as_bytes()), "[Song]");
    }

    #[test]
    fn test_utf8_bom_stripped() {
        let data = [0xEF, 0xBB, 0xBF, b'[', b'S', b']'];
        assert_eq!(detect(&data), TextEncoding::Utf8Bom);
        assert_eq!(decode(&data), "[S]");
    }

    #[test]
    fn test_utf16() {
        let le = [0xFF, 0xFE, b'N', 0, b'=', 0];
        assert_eq!(decode(&le), "N=");
        let be = [0xFE, 0xFF, 0, b'N', 0, b'='];
        assert_eq!(decode(&be), "N=");
    }

    #[test]
    fn test_utf32_not_mistaken_for_utf16() {
        let le = [0xFF, 0xFE, 0, 0, b'B', 0, 0, 0];
        assert_eq!(detect(&le), TextEncoding::Utf32Le);
        assert_eq!(decode(&le), "B");
        let be = [0, 0, 0xFE, 0xFF, 0, 0, 0, b'B'];
        assert_eq!(decode(&be), "B");
    }

    #[test]
    fn test_windows_1252_fallback() {
        // "Beyoncé – Halo" with an en dash
        let data = b"Beyonc\xE9 \x96 Halo";
        assert_eq!(detect(data), TextEncoding::Windows1252);
        assert_eq!(decode(data), "Beyoncé – Halo");
    }
}
