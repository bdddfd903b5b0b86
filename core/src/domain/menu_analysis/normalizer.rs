use std::sync::LazyLock;

use regex::Regex;

use crate::domain::menu_analysis::entities::{Failure, OcrResult};

static HORIZONTAL_WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\S\n]+").expect("whitespace pattern is valid"));

/// Clean OCR text before structuring.
///
/// Control characters are removed (tabs become spaces), runs of spaces are
/// collapsed, each line is trimmed and blank lines are dropped. Line breaks are
/// kept because menus are laid out one dish per line.
pub fn normalize_ocr_text(ocr_result: &OcrResult) -> Result<String, Failure> {
    let cleaned: String = ocr_result
        .text
        .replace("\r\n", "\n")
        .chars()
        .filter_map(|c| match c {
            '\n' => Some('\n'),
            '\r' | '\t' => Some(' '),
            c if c.is_control() => None,
            c => Some(c),
        })
        .collect();

    let normalized = cleaned
        .lines()
        .map(|line| HORIZONTAL_WHITESPACE.replace_all(line, " ").trim().to_string())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    if normalized.is_empty() {
        return Err(Failure::missing_ocr_text());
    }

    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::menu_analysis::entities::ErrorCode;

    fn ocr(text: &str) -> OcrResult {
        OcrResult::new(text, Some(0.9))
    }

    #[test]
    fn test_empty_and_blank_text_is_rejected() {
        for text in ["", "   ", "\n\t \r\n", "\u{0007}\u{0000}"] {
            let err = normalize_ocr_text(&ocr(text)).unwrap_err();
            assert_eq!(err.code, ErrorCode::MissingOcrText, "input {:?}", text);
        }
    }

    #[test]
    fn test_whitespace_is_collapsed_per_line() {
        let text = "  Salmon \t\t $32  \r\n\n\n   Burger    $18\u{0008}\n";
        assert_eq!(
            normalize_ocr_text(&ocr(text)).unwrap(),
            "Salmon $32\nBurger $18"
        );
    }

    #[test]
    fn test_unicode_text_survives() {
        let text = "Crème brûlée   €9,90";
        assert_eq!(normalize_ocr_text(&ocr(text)).unwrap(), "Crème brûlée €9,90");
    }
}
