//! Character reference decoding.
//!
//! The tokenizer hands the text between `&` and `;` to a
//! [`CharRefResolver`]. Returning `None` leaves the `&` in the output
//! untouched, which is also what happens for unknown names.

/// Decodes the body of a character reference (`amp`, `#38`, `#x26`).
pub trait CharRefResolver {
    fn resolve(&self, entity: &str) -> Option<String>;
}

/// Numeric references plus a table of common named entities.
#[derive(Copy, Clone, Debug, Default)]
pub struct HtmlEntities;

impl CharRefResolver for HtmlEntities {
    fn resolve(&self, entity: &str) -> Option<String> {
        if let Some(numeric) = entity.strip_prefix('#') {
            let code = match numeric.strip_prefix(['x', 'X']) {
                Some(hex) if is_all(hex, |b| b.is_ascii_hexdigit()) => {
                    u32::from_str_radix(hex, 16).ok()?
                }
                None if is_all(numeric, |b| b.is_ascii_digit()) => numeric.parse().ok()?,
                _ => return None,
            };
            // NUL, surrogates and out-of-range code points decode to U+FFFD.
            let ch = char::from_u32(code).filter(|&c| c != '\0');
            return Some(ch.unwrap_or(char::REPLACEMENT_CHARACTER).to_string());
        }
        if !is_all(entity, |b| b.is_ascii_alphanumeric()) {
            return None;
        }
        NAMED
            .binary_search_by(|(name, _)| name.cmp(&entity))
            .ok()
            .map(|i| NAMED[i].1.to_owned())
    }
}

/// Decodes nothing. Used in codemod mode so the output can be printed
/// back byte-for-byte.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoEntities;

impl CharRefResolver for NoEntities {
    fn resolve(&self, _entity: &str) -> Option<String> {
        None
    }
}

fn is_all(text: &str, pred: impl Fn(u8) -> bool) -> bool {
    !text.is_empty() && text.bytes().all(pred)
}

/// Sorted by name (byte order) for binary search.
static NAMED: &[(&str, &str)] = &[
    ("AElig", "\u{C6}"),
    ("Aacute", "\u{C1}"),
    ("Agrave", "\u{C0}"),
    ("Alpha", "\u{391}"),
    ("Beta", "\u{392}"),
    ("Ccedil", "\u{C7}"),
    ("Delta", "\u{394}"),
    ("Eacute", "\u{C9}"),
    ("Gamma", "\u{393}"),
    ("Ntilde", "\u{D1}"),
    ("Omega", "\u{3A9}"),
    ("Ouml", "\u{D6}"),
    ("Uuml", "\u{DC}"),
    ("aacute", "\u{E1}"),
    ("acute", "\u{B4}"),
    ("aelig", "\u{E6}"),
    ("agrave", "\u{E0}"),
    ("alpha", "\u{3B1}"),
    ("amp", "&"),
    ("apos", "'"),
    ("auml", "\u{E4}"),
    ("beta", "\u{3B2}"),
    ("brvbar", "\u{A6}"),
    ("bull", "\u{2022}"),
    ("ccedil", "\u{E7}"),
    ("cent", "\u{A2}"),
    ("check", "\u{2713}"),
    ("copy", "\u{A9}"),
    ("darr", "\u{2193}"),
    ("deg", "\u{B0}"),
    ("delta", "\u{3B4}"),
    ("divide", "\u{F7}"),
    ("eacute", "\u{E9}"),
    ("egrave", "\u{E8}"),
    ("emsp", "\u{2003}"),
    ("ensp", "\u{2002}"),
    ("euml", "\u{EB}"),
    ("euro", "\u{20AC}"),
    ("frac12", "\u{BD}"),
    ("frac14", "\u{BC}"),
    ("frac34", "\u{BE}"),
    ("gamma", "\u{3B3}"),
    ("ge", "\u{2265}"),
    ("gt", ">"),
    ("harr", "\u{2194}"),
    ("hearts", "\u{2665}"),
    ("hellip", "\u{2026}"),
    ("iacute", "\u{ED}"),
    ("iexcl", "\u{A1}"),
    ("infin", "\u{221E}"),
    ("iquest", "\u{BF}"),
    ("laquo", "\u{AB}"),
    ("larr", "\u{2190}"),
    ("ldquo", "\u{201C}"),
    ("le", "\u{2264}"),
    ("lsaquo", "\u{2039}"),
    ("lsquo", "\u{2018}"),
    ("lt", "<"),
    ("mdash", "\u{2014}"),
    ("micro", "\u{B5}"),
    ("middot", "\u{B7}"),
    ("nbsp", "\u{A0}"),
    ("ndash", "\u{2013}"),
    ("ne", "\u{2260}"),
    ("not", "\u{AC}"),
    ("ntilde", "\u{F1}"),
    ("oacute", "\u{F3}"),
    ("omega", "\u{3C9}"),
    ("ouml", "\u{F6}"),
    ("para", "\u{B6}"),
    ("pi", "\u{3C0}"),
    ("plusmn", "\u{B1}"),
    ("pound", "\u{A3}"),
    ("quot", "\""),
    ("raquo", "\u{BB}"),
    ("rarr", "\u{2192}"),
    ("rdquo", "\u{201D}"),
    ("reg", "\u{AE}"),
    ("rsaquo", "\u{203A}"),
    ("rsquo", "\u{2019}"),
    ("sect", "\u{A7}"),
    ("shy", "\u{AD}"),
    ("sup2", "\u{B2}"),
    ("szlig", "\u{DF}"),
    ("thinsp", "\u{2009}"),
    ("times", "\u{D7}"),
    ("trade", "\u{2122}"),
    ("uacute", "\u{FA}"),
    ("uarr", "\u{2191}"),
    ("uuml", "\u{FC}"),
    ("yen", "\u{A5}"),
    ("zwj", "\u{200D}"),
    ("zwnj", "\u{200C}"),
];
