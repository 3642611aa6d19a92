//! Letters that OCR commonly reads in place of digits.

/// Digit a confusable character most likely stands for.
pub fn confusable_digit(c: char) -> Option<char> {
    match c {
        'o' | 'O' | 'D' => Some('0'),
        'l' | 'I' | '|' | 'i' => Some('1'),
        'z' | 'Z' => Some('2'),
        's' | 'S' => Some('5'),
        'b' | 'B' | 'G' => Some('6'),
        'q' | 'g' => Some('9'),
        _ => None,
    }
}

/// Convert one character of a digit run: digits pass, confusables map, anything else is dropped.
pub fn to_digit(c: char) -> Option<char> {
    if c.is_ascii_digit() {
        Some(c)
    } else {
        confusable_digit(c)
    }
}

/// Global 0/1 substitution used before looking for the RT code.
///
/// Coarser than [`confusable_digit`]: it rewrites every `o O l I |` in the
/// text, labels included, so it must only feed the RT patterns.
pub fn normalize_zero_one(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            'o' | 'O' => '0',
            'l' | 'I' | '|' => '1',
            other => other,
        })
        .collect()
}
