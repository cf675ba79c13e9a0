use std::borrow::Cow;

/// Device names Windows reserves regardless of extension.
const WINDOWS_DEVICE_FILES: [&str; 22] = [
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// First code point covered by [`LATIN_ASCII`].
const LATIN_START: u32 = 0x00A0;

/// ASCII part of the NFKD form of U+00A0..=U+017F (Latin-1 Supplement and
/// Latin Extended-A). Empty entries have no ASCII decomposition.
const LATIN_ASCII: [&str; 224] = [
    " ", "", "", "", "", "", "", "", // U+00A0
    " ", "", "a", "", "", "", "", " ", // U+00A8
    "", "", "2", "3", " ", "", "", "", // U+00B0
    " ", "1", "o", "", "14", "12", "34", "", // U+00B8
    "A", "A", "A", "A", "A", "A", "", "C", // U+00C0
    "E", "E", "E", "E", "I", "I", "I", "I", // U+00C8
    "", "N", "O", "O", "O", "O", "O", "", // U+00D0
    "", "U", "U", "U", "U", "Y", "", "", // U+00D8
    "a", "a", "a", "a", "a", "a", "", "c", // U+00E0
    "e", "e", "e", "e", "i", "i", "i", "i", // U+00E8
    "", "n", "o", "o", "o", "o", "o", "", // U+00F0
    "", "u", "u", "u", "u", "y", "", "y", // U+00F8
    "A", "a", "A", "a", "A", "a", "C", "c", // U+0100
    "C", "c", "C", "c", "C", "c", "D", "d", // U+0108
    "", "", "E", "e", "E", "e", "E", "e", // U+0110
    "E", "e", "E", "e", "G", "g", "G", "g", // U+0118
    "G", "g", "G", "g", "H", "h", "", "", // U+0120
    "I", "i", "I", "i", "I", "i", "I", "i", // U+0128
    "I", "", "IJ", "ij", "J", "j", "K", "k", // U+0130
    "", "L", "l", "L", "l", "L", "l", "L", // U+0138
    "l", "", "", "N", "n", "N", "n", "N", // U+0140
    "n", "n", "", "", "O", "o", "O", "o", // U+0148
    "O", "o", "", "", "R", "r", "R", "r", // U+0150
    "R", "r", "S", "s", "S", "s", "S", "s", // U+0158
    "S", "s", "T", "t", "T", "t", "", "", // U+0160
    "U", "u", "U", "u", "U", "u", "U", "u", // U+0168
    "U", "u", "U", "u", "W", "w", "Y", "y", // U+0170
    "Y", "Z", "z", "Z", "z", "Z", "z", "s", // U+0178
];

#[ocrhub_derive::ocrhub_error]
pub enum FilenameError {
    #[error("Unusable file name{}: {original:?}", format_context(.context))]
    Empty { original: String, context: Option<Cow<'static, str>> },
}

/// Turns a client-supplied file name into one that is safe to join onto a directory.
///
/// Characters from the Latin-1 Supplement and Latin Extended-A blocks are reduced
/// to the ASCII of their NFKD form (`č` to `c`, `ĳ` to `ij`, `½` to `12`), every
/// other non-ASCII character is dropped, path separators become spaces, whitespace
/// runs are joined with `_`, and only `[A-Za-z0-9_.-]` survives. Leading and
/// trailing `.`/`_` are stripped so the result can never be `..` or a hidden file. Windows device names get a `_` prefix.
///
/// # Errors
/// Returns [`FilenameError::Empty`] when nothing usable is left.
///
/// # Example
/// ```rust
/// use ocrhub_kernel::security::secure_filename;
///
/// assert_eq!(secure_filename("My cool scan.PNG").unwrap(), "My_cool_scan.PNG");
/// assert_eq!(secure_filename("../../etc/passwd").unwrap(), "etc_passwd");
/// assert!(secure_filename("../").is_err());
/// ```
pub fn secure_filename(name: &str) -> Result<String, FilenameError> {
    let mut ascii = String::with_capacity(name.len());
    for ch in name.chars() {
        match ch {
            '/' | '\\' => ascii.push(' '),
            c if c.is_ascii() => ascii.push(c),
            c => ascii.push_str(fold_latin(c)),
        }
    }

    let joined = ascii.split_ascii_whitespace().collect::<Vec<_>>().join("_");
    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();
    let trimmed = kept.trim_matches(|c| c == '.' || c == '_');

    if trimmed.is_empty() {
        return Err(FilenameError::Empty { original: name.to_owned(), context: None });
    }

    let stem = trimmed.split('.').next().unwrap_or_default();
    if WINDOWS_DEVICE_FILES.iter().any(|dev| dev.eq_ignore_ascii_case(stem)) {
        return Ok(format!("_{trimmed}"));
    }

    Ok(trimmed.to_owned())
}

/// ASCII left of `c` after NFKD, for the Latin blocks in [`LATIN_ASCII`].
fn fold_latin(c: char) -> &'static str {
    u32::from(c)
        .checked_sub(LATIN_START)
        .and_then(|offset| usize::try_from(offset).ok())
        .and_then(|offset| LATIN_ASCII.get(offset))
        .copied()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_plain_names() {
        assert_eq!(secure_filename("invoice-2024.pdf").unwrap(), "invoice-2024.pdf");
    }

    #[test]
    fn folds_spanish_accents() {
        assert_eq!(secure_filename("facturación año.jpg").unwrap(), "facturacion_ano.jpg");
        assert_eq!(secure_filename("ÁRBOL.png").unwrap(), "ARBOL.png");
    }

    #[test]
    fn drops_other_non_ascii() {
        assert_eq!(secure_filename("скан 1.png").unwrap(), "1.png");
        assert_eq!(secure_filename("€ø.bmp").unwrap(), "bmp");
    }

    #[test]
    fn folds_latin_extended_letters() {
        assert_eq!(secure_filename("Počet.pdf").unwrap(), "Pocet.pdf");
        assert_eq!(secure_filename("Łódź Żółć.png").unwrap(), "odz_Zoc.png");
        assert_eq!(secure_filename("ĳssel½.tiff").unwrap(), "ijssel12.tiff");
    }

    #[test]
    fn no_break_space_separates_words() {
        assert_eq!(secure_filename("scan\u{a0}final.png").unwrap(), "scan_final.png");
    }

    #[test]
    fn table_covers_both_latin_blocks() {
        assert_eq!(fold_latin('\u{9f}'), "");
        assert_eq!(fold_latin('À'), "A");
        assert_eq!(fold_latin('ſ'), "s");
        assert_eq!(fold_latin('\u{180}'), "");
    }
}
