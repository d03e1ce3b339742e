use std::str::FromStr;

use crate::model::types::Element;

/// Infers the element from a CIF type symbol or atom label.
///
/// Tolerates the decorations found in real files: charge suffixes
/// (`"Zn2+"`), label numbering (`"O12"`, `"C1A"`), and all-caps symbols
/// (`"ZN"`). Tries the two-letter reading before the one-letter one.
pub fn guess_element_symbol(token: &str) -> Option<Element> {
    let letters: String = token.chars().take_while(|c| c.is_ascii_alphabetic()).collect();
    if letters.is_empty() {
        return None;
    }

    let mut chars = letters.chars();
    let first = chars.next()?.to_ascii_uppercase();
    let second = chars.next().map(|c| c.to_ascii_lowercase());

    if let Some(second) = second {
        let two: String = [first, second].iter().collect();
        if let Ok(element) = Element::from_str(&two) {
            return Some(element);
        }
    }

    Element::from_str(&first.to_string()).ok()
}

/// Strips a trailing standard-uncertainty suffix: `"1.234(5)"` → `"1.234"`.
pub fn strip_esd(value: &str) -> &str {
    match value.find('(') {
        Some(idx) => &value[..idx],
        None => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_symbols() {
        assert_eq!(guess_element_symbol("Zn"), Some(Element::Zn));
        assert_eq!(guess_element_symbol("O"), Some(Element::O));
        assert_eq!(guess_element_symbol("C"), Some(Element::C));
    }

    #[test]
    fn charged_and_labeled_symbols() {
        assert_eq!(guess_element_symbol("Zn2+"), Some(Element::Zn));
        assert_eq!(guess_element_symbol("O1-"), Some(Element::O));
        assert_eq!(guess_element_symbol("C12"), Some(Element::C));
        assert_eq!(guess_element_symbol("Cu1A"), Some(Element::Cu));
    }

    #[test]
    fn case_insensitive_symbols() {
        assert_eq!(guess_element_symbol("ZN"), Some(Element::Zn));
        assert_eq!(guess_element_symbol("fe"), Some(Element::Fe));
    }

    #[test]
    fn one_letter_fallback() {
        // "Ow" is a water oxygen label, not a known two-letter element.
        assert_eq!(guess_element_symbol("OW"), Some(Element::O));
        assert_eq!(guess_element_symbol("Hx"), Some(Element::H));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(guess_element_symbol(""), None);
        assert_eq!(guess_element_symbol("123"), None);
        assert_eq!(guess_element_symbol("??"), None);
    }

    #[test]
    fn esd_stripping() {
        assert_eq!(strip_esd("1.234(5)"), "1.234");
        assert_eq!(strip_esd("10.5"), "10.5");
        assert_eq!(strip_esd("90"), "90");
    }
}
