use std::cmp::Ordering;

// Locale-aware label comparison, close to the root collation used by
// desktop file managers: case and accents only break ties, punctuation
// sorts before digits, digits before letters.

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum CharClass {
    Separator,
    Digit,
    Letter,
    Other,
}

fn class(c: char) -> CharClass {
    if c.is_numeric() {
        CharClass::Digit
    } else if c.is_alphabetic() {
        CharClass::Letter
    } else if c.is_whitespace() || c.is_ascii_punctuation() {
        CharClass::Separator
    } else {
        CharClass::Other
    }
}

fn fold_accent(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => 'a',
        'ç' | 'ć' | 'č' => 'c',
        'ď' | 'đ' => 'd',
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ė' | 'ę' | 'ě' => 'e',
        'ì' | 'í' | 'î' | 'ï' | 'ī' | 'į' => 'i',
        'ł' | 'ľ' => 'l',
        'ñ' | 'ń' | 'ň' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ő' => 'o',
        'ř' => 'r',
        'ś' | 'š' | 'ş' => 's',
        'ť' | 'ţ' => 't',
        'ù' | 'ú' | 'û' | 'ü' | 'ū' | 'ů' | 'ű' => 'u',
        'ý' | 'ÿ' => 'y',
        'ź' | 'ż' | 'ž' => 'z',
        c => c,
    }
}

fn lower(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

fn primary(c: char) -> (CharClass, char) {
    let base = fold_accent(lower(c));
    (class(base), base)
}

/// Compare two labels the way a person expects them listed
///
/// Total: labels that collate equal fall back to code point order, so
/// sorting is deterministic.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    a.chars()
        .map(primary)
        .cmp(b.chars().map(primary))
        // accents
        .then_with(|| {
            a.chars()
                .map(|c| fold_accent(lower(c)) != lower(c))
                .cmp(b.chars().map(|c| fold_accent(lower(c)) != lower(c)))
        })
        // lowercase before uppercase
        .then_with(|| {
            a.chars()
                .map(char::is_uppercase)
                .cmp(b.chars().map(char::is_uppercase))
        })
        .then_with(|| a.cmp(b))
}
