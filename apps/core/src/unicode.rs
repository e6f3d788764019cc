// Classifiers take a raw u32 and are total: surrogates and out-of-range values
// are neither printable, alphanumeric nor cased.

fn sequence_len(lead: u8) -> usize {
    match lead {
        0x00..=0x7F => 1,
        0xC2..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF4 => 4,
        _ => 0,
    }
}

// Never reads past `bytes.len()`; truncated sequences yield `None`.
pub fn decode(bytes: &[u8]) -> Option<(char, usize)> {
    let lead = *bytes.first()?;
    let len = sequence_len(lead);
    if len == 0 || bytes.len() < len {
        return None;
    }
    let ch = std::str::from_utf8(&bytes[..len]).ok()?.chars().next()?;
    Some((ch, len))
}

// Indices inside a scalar value snap to that scalar's boundaries.
pub fn next_boundary(text: &str, index: usize) -> usize {
    if index >= text.len() {
        return text.len();
    }
    (index + 1..=text.len())
        .find(|&offset| text.is_char_boundary(offset))
        .unwrap_or(text.len())
}

pub fn prev_boundary(text: &str, index: usize) -> usize {
    let index = index.min(text.len());
    if !text.is_char_boundary(index) {
        return (0..index)
            .rev()
            .find(|&offset| text.is_char_boundary(offset))
            .unwrap_or(0);
    }
    text[..index]
        .char_indices()
        .next_back()
        .map(|(offset, _)| offset)
        .unwrap_or(0)
}

pub fn scalar_len(text: &str) -> usize {
    text.chars().count()
}

pub fn is_print(cp: u32) -> bool {
    char::from_u32(cp).is_some_and(|ch| !ch.is_control())
}

pub fn is_space(cp: u32) -> bool {
    char::from_u32(cp).is_some_and(char::is_whitespace)
}

pub fn is_alnum(cp: u32) -> bool {
    char::from_u32(cp).is_some_and(char::is_alphanumeric)
}

pub fn is_upper(cp: u32) -> bool {
    char::from_u32(cp).is_some_and(char::is_uppercase)
}

pub fn is_lower(cp: u32) -> bool {
    char::from_u32(cp).is_some_and(char::is_lowercase)
}

pub fn fold(ch: char) -> char {
    let mut lower = ch.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(single), None) => single,
        _ => ch,
    }
}

pub fn eq_ignore_case(a: char, b: char) -> bool {
    a == b || fold(a) == fold(b)
}

// Byte offset of the first match; an empty needle is found at 0.
pub fn find_ignore_case(haystack: &str, needle: &str) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    haystack
        .char_indices()
        .map(|(offset, _)| offset)
        .find(|&offset| starts_with_ignore_case(&haystack[offset..], needle))
}

pub fn find_char_ignore_case(haystack: &str, wanted: char) -> Option<usize> {
    let wanted = fold(wanted);
    haystack
        .char_indices()
        .find(|&(_, ch)| fold(ch) == wanted)
        .map(|(offset, _)| offset)
}

pub fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    let mut text_chars = text.chars();
    prefix.chars().all(|expected| {
        text_chars
            .next()
            .is_some_and(|actual| eq_ignore_case(actual, expected))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_treats_multibyte_sequences_as_one_unit() {
        let bytes = "€x".as_bytes();
        assert_eq!(decode(bytes), Some(('€', 3)));
        assert_eq!(decode(&bytes[3..]), Some(('x', 1)));
    }

    #[test]
    fn decode_rejects_truncated_and_malformed_input() {
        let bytes = "€".as_bytes();
        assert_eq!(decode(&bytes[..2]), None);
        assert_eq!(decode(&[0xFF, 0x41]), None);
        assert_eq!(decode(&[0x80]), None);
        assert_eq!(decode(&[]), None);
    }

    #[test]
    fn boundaries_step_whole_scalars() {
        let text = "aé€b";
        assert_eq!(next_boundary(text, 0), 1);
        assert_eq!(next_boundary(text, 1), 3);
        assert_eq!(next_boundary(text, 3), 6);
        assert_eq!(next_boundary(text, 7), 7);
        assert_eq!(prev_boundary(text, 6), 3);
        assert_eq!(prev_boundary(text, 3), 1);
        assert_eq!(prev_boundary(text, 0), 0);
    }

    #[test]
    fn boundaries_snap_indices_inside_a_scalar() {
        assert_eq!(next_boundary("é", 1), 2);
        assert_eq!(next_boundary("a€b", 2), 4);
        assert_eq!(prev_boundary("é", 1), 0);
        assert_eq!(prev_boundary("a€b", 3), 1);
    }

    #[test]
    fn classification_is_total_over_u32() {
        for cp in [0xD800_u32, 0xDFFF, 0x11_0000, u32::MAX] {
            assert!(!is_print(cp));
            assert!(!is_alnum(cp));
            assert!(!is_upper(cp));
            assert!(!is_lower(cp));
            assert!(!is_space(cp));
        }
        assert!(is_print(' ' as u32));
        assert!(!is_print('\n' as u32));
        assert!(is_alnum('ß' as u32));
        assert!(is_upper('Ä' as u32));
        assert!(is_lower('ä' as u32));
    }

    #[test]
    fn case_insensitive_search_returns_byte_offsets() {
        assert_eq!(find_ignore_case("Grüße Welt", "WELT"), Some(8));
        assert_eq!(find_ignore_case("Firefox", "fox"), Some(4));
        assert_eq!(find_ignore_case("Firefox", "dog"), None);
        assert_eq!(find_char_ignore_case("ÖL", 'l'), Some(2));
        assert_eq!(find_char_ignore_case("abc", 'z'), None);
    }

    #[test]
    fn fold_keeps_scalars_with_multi_scalar_lowercase() {
        assert_eq!(fold('A'), 'a');
        assert_eq!(fold('İ'), 'İ');
    }
}
