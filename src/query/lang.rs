/// True when CJK ideographs outnumber ASCII letters.
///
/// Only the range `U+4E00..=U+9FA5` counts as Chinese, so kana-only text is
/// never Chinese and digits or punctuation do not count on either side.
pub fn is_chinese_text(text: &str) -> bool {
    let (chinese, latin) = text.chars().fold((0usize, 0usize), |(zh, en), c| match c {
        '\u{4E00}'..='\u{9FA5}' => (zh + 1, en),
        c if c.is_ascii_alphabetic() => (zh, en + 1),
        _ => (zh, en),
    });
    chinese > latin
}

/// Source order the backend is expected to try for an `auto` keyword search.
///
/// The request never carries this; it only feeds diagnostics.
pub fn expected_auto_route(text: &str) -> [&'static str; 2] {
    if is_chinese_text(text) {
        ["tmdb", "imdb"]
    } else {
        ["imdb", "tmdb"]
    }
}
