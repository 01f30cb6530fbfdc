//! URL slug derivation
//!
//! Turns a human-entered title into a stable, URL-safe identifier. The
//! function is total and idempotent but makes no uniqueness promise; the
//! service layer checks collisions against persisted pages.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Letters with no canonical decomposition, folded to ASCII by hand.
fn transliterate(c: char) -> Option<&'static str> {
    let folded = match c {
        'ı' => "i",
        'ß' => "ss",
        'ø' | 'Ø' => "o",
        'æ' | 'Æ' => "ae",
        'œ' | 'Œ' => "oe",
        'ł' | 'Ł' => "l",
        'đ' | 'Đ' | 'ð' | 'Ð' => "d",
        'þ' | 'Þ' => "th",
        _ => return None,
    };
    Some(folded)
}

/// Convert text to a URL-safe slug.
///
/// Lowercases, strips diacritics, and collapses every run of whitespace or
/// non-word characters into a single dash. Word characters are ASCII letters,
/// digits and `_`. Leading and trailing dashes are removed.
///
/// # Examples
///
/// ```rust
/// use schoolsite_core::utils::slugify;
///
/// assert_eq!(slugify("Çiçekli Okul Bahçesi"), "cicekli-okul-bahcesi");
/// assert_eq!(slugify("A--B  C"), "a-b-c");
/// assert_eq!(slugify("   "), "");
/// ```
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut slug = SlugBuilder::with_capacity(text.len());

    for c in text.nfd() {
        if is_combining_mark(c) {
            continue;
        }

        if let Some(folded) = transliterate(c) {
            folded.chars().for_each(|f| slug.push_word_char(f));
            continue;
        }

        for lower in c.to_lowercase() {
            if lower.is_ascii_alphanumeric() || lower == '_' {
                slug.push_word_char(lower);
            } else {
                slug.separate();
            }
        }
    }

    slug.finish()
}

/// Accumulates word characters, emitting at most one dash between words.
struct SlugBuilder {
    out: String,
    pending_dash: bool,
}

impl SlugBuilder {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            out: String::with_capacity(capacity),
            pending_dash: false,
        }
    }

    fn push_word_char(&mut self, c: char) {
        // A dash before the first word would be a leading dash
        if self.pending_dash && !self.out.is_empty() {
            self.out.push('-');
        }
        self.pending_dash = false;
        self.out.push(c);
    }

    fn separate(&mut self) {
        self.pending_dash = true;
    }

    fn finish(self) -> String {
        self.out
    }
}

/// Append a numeric disambiguator to a slug (`about` + 2 → `about-2`)
#[must_use]
pub fn with_suffix(slug: &str, n: usize) -> String {
    format!("{slug}-{n}")
}
