//! Static name data used when live resolution has nothing to offer.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Lowercase foreign family name → (given, family) in Russian.
const NAME_EXCEPTIONS: &[(&str, &str, &str)] = &[
    ("antetokounmpo", "Яннис", "Адетокунбо"),
    ("jokic", "Никола", "Йокич"),
    ("doncic", "Лука", "Дончич"),
    ("gilgeous-alexander", "Шей", "Гилджес-Александер"),
    ("wembanyama", "Виктор", "Вембаньяма"),
    ("embiid", "Джоэл", "Эмбиид"),
    ("sabonis", "Домантас", "Сабонис"),
    ("valanciunas", "Йонас", "Валанчюнас"),
    ("porzingis", "Кристапс", "Порзингис"),
    ("nurkic", "Юсуф", "Нуркич"),
    ("bogdanovic", "Богдан", "Богданович"),
    ("vucevic", "Никола", "Вучевич"),
    ("siakam", "Паскаль", "Сиакам"),
    ("mitchell", "Донован", "Митчелл"),
    ("haliburton", "Тайриз", "Халибертон"),
    ("shamet", "Лэндри", "Шамет"),
    ("sengun", "Альперен", "Шенгюн"),
    ("kuminga", "Джонатан", "Куминга"),
    ("mikhailiuk", "Святослав", "Михайлюк"),
    ("len", "Алекс", "Лень"),
];

/// First Latin letter of a given name → Russian initial.
const INITIALS: &[(char, &str)] = &[
    ('A', "А"),
    ('B', "Б"),
    ('C', "К"),
    ('D', "Д"),
    ('E', "Э"),
    ('F', "Ф"),
    ('G', "Г"),
    ('H', "Х"),
    ('I', "И"),
    ('J', "Дж"),
    ('K', "К"),
    ('L', "Л"),
    ('M', "М"),
    ('N', "Н"),
    ('O', "О"),
    ('P', "П"),
    ('Q', "К"),
    ('R', "Р"),
    ('S', "С"),
    ('T', "Т"),
    ('U', "Ю"),
    ('V', "В"),
    ('W', "У"),
    ('X', "К"),
    ('Y', "Й"),
    ('Z', "З"),
];

/// Tokens that belong to the family name when they trail a full name.
const GENERATIONAL_SUFFIXES: &[&str] = &[
    "jr.", "jr", "sr.", "sr", "ii", "iii", "iv", "мл.", "младший", "ст.", "старший",
];

/// Looked up by lowercase family name with diacritics stripped.
pub fn name_exception(family_foreign: &str) -> Option<(&'static str, &'static str)> {
    let key: String = family_foreign
        .trim()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase();
    NAME_EXCEPTIONS
        .iter()
        .find(|(foreign, _, _)| *foreign == key)
        .map(|(_, given, family)| (*given, *family))
}

/// Russian initial for the first letter of a Latin given name.
pub fn latin_initial(given_foreign: &str) -> Option<&'static str> {
    let first = given_foreign.trim().chars().next()?.to_ascii_uppercase();
    INITIALS
        .iter()
        .find(|(letter, _)| *letter == first)
        .map(|(_, initial)| *initial)
}

pub fn is_generational_suffix(token: &str) -> bool {
    let folded = token.trim().to_lowercase();
    GENERATIONAL_SUFFIXES.contains(&folded.as_str())
}
