//! URL slugs derived from display names.
//!
//! Slugs are trimmed, non-empty identifiers composed of lowercase ASCII
//! letters, digits, and single hyphens. Names are transliterated first, so
//! accented and non-Latin text keeps its letters.

use deunicode::deunicode_char;

/// Symbols spelled out as words instead of being dropped.
const SYMBOL_WORDS: &[(char, &str)] = &[
    ('&', "and"),
    ('|', "or"),
    ('<', "less"),
    ('>', "greater"),
    ('$', "dollar"),
    ('%', "percent"),
    ('€', "euro"),
    ('£', "pound"),
    ('¥', "yen"),
    ('¢', "cent"),
];

fn symbol_word(ch: char) -> Option<&'static str> {
    SYMBOL_WORDS
        .iter()
        .find_map(|(symbol, word)| (*symbol == ch).then_some(*word))
}

/// Accumulates slug characters, collapsing separators into single dashes.
#[derive(Default)]
struct SlugBuilder {
    slug: String,
    pending_dash: bool,
}

impl SlugBuilder {
    fn push_text(&mut self, text: &str) {
        for ch in text.chars() {
            if ch.is_ascii_alphanumeric() {
                if self.pending_dash && !self.slug.is_empty() {
                    self.slug.push('-');
                }
                self.pending_dash = false;
                self.slug.push(ch.to_ascii_lowercase());
            } else {
                self.pending_dash = true;
            }
        }
    }

    fn push_word(&mut self, word: &str) {
        self.pending_dash = true;
        self.push_text(word);
        self.pending_dash = true;
    }
}

/// Derive a slug: transliterate to ASCII, lower-case, and collapse runs of
/// anything else to `-`.
///
/// # Examples
/// ```
/// use devcamper::domain::slugify;
///
/// assert_eq!(slugify("Devworks Bootcamp"), "devworks-bootcamp");
/// assert_eq!(slugify("  UI/UX -- Codemasters! "), "ui-ux-codemasters");
/// assert_eq!(slugify("Café & Code"), "cafe-and-code");
/// ```
pub fn slugify(name: &str) -> String {
    let mut builder = SlugBuilder::default();
    for ch in name.chars() {
        if let Some(word) = symbol_word(ch) {
            builder.push_word(word);
        } else if ch.is_ascii() {
            builder.push_text(ch.encode_utf8(&mut [0; 4]));
        } else {
            builder.push_text(deunicode_char(ch).unwrap_or(" "));
        }
    }
    builder.slug
}

/// Return `true` when `value` is a valid slug.
pub(crate) fn is_valid_slug(value: &str) -> bool {
    !value.is_empty()
        && !value.starts_with('-')
        && !value.ends_with('-')
        && !value.contains("--")
        && value
            .chars()
            .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-')
}
