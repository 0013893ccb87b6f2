//! Slug derivation and validation.

use crate::model::SLUG_MAX_LENGTH;

/// Derive a URL slug from a note title
/// (e.g. "Запись 1" -> "zapis-1", "Hello World!" -> "hello-world").
///
/// Cyrillic letters are transliterated, everything else that is not ASCII
/// alphanumeric collapses into single dashes. The result is truncated to
/// [`SLUG_MAX_LENGTH`] and may be empty.
pub fn slugify(title: &str) -> String {
    let mut ascii = String::with_capacity(title.len());
    for c in title.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() {
            ascii.push(c);
        } else if let Some(latin) = transliterate(c) {
            ascii.push_str(latin);
        } else {
            ascii.push('-');
        }
    }

    let slug = ascii
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<&str>>()
        .join("-");

    let truncated: String = slug.chars().take(SLUG_MAX_LENGTH).collect();
    truncated.trim_end_matches('-').to_string()
}

/// Whether `slug` only contains letters, digits, underscores and hyphens.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn transliterate(c: char) -> Option<&'static str> {
    let latin = match c {
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' => "g",
        'д' => "d",
        'е' => "e",
        'ё' => "e",
        'ж' => "zh",
        'з' => "z",
        'и' => "i",
        'й' => "i",
        'к' => "k",
        'л' => "l",
        'м' => "m",
        'н' => "n",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'у' => "u",
        'ф' => "f",
        'х' => "kh",
        'ц' => "ts",
        'ч' => "ch",
        'ш' => "sh",
        'щ' => "shch",
        'ъ' => "",
        'ы' => "y",
        'ь' => "",
        'э' => "e",
        'ю' => "iu",
        'я' => "ia",
        _ => return None,
    };
    Some(latin)
}
