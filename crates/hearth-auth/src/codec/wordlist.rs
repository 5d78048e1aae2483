//! Word lists for mnemonic encoding.

use bip39::Language;

/// BIP-39 languages selectable by name.
const LANGUAGES: &[(&str, Language)] = &[
    ("english", Language::English),
    ("czech", Language::Czech),
    ("french", Language::French),
    ("italian", Language::Italian),
    ("japanese", Language::Japanese),
    ("korean", Language::Korean),
    ("portuguese", Language::Portuguese),
    ("spanish", Language::Spanish),
    ("chinese-simplified", Language::SimplifiedChinese),
    ("chinese-traditional", Language::TraditionalChinese),
];

/// One of the published BIP-39 word lists.
///
/// Phrases can be checked by any BIP-39 implementation. The list only
/// decides how new phrases are spelled: decoding also accepts phrases
/// written in any other BIP-39 language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wordlist {
    name: &'static str,
    language: Language,
}

impl Default for Wordlist {
    fn default() -> Self {
        Self::english()
    }
}

impl Wordlist {
    /// The BIP-39 English list.
    #[must_use]
    pub fn english() -> Self {
        Self {
            name: "english",
            language: Language::English,
        }
    }

    /// Look up a BIP-39 list by lowercase name (`english`, `french`,
    /// `chinese-simplified`, ...).
    #[must_use]
    pub fn by_name(name: &str) -> Option<Self> {
        LANGUAGES
            .iter()
            .find(|(n, _)| *n == name)
            .map(|&(name, language)| Self { name, language })
    }

    /// Names accepted by [`Wordlist::by_name`].
    pub fn language_names() -> impl Iterator<Item = &'static str> {
        LANGUAGES.iter().map(|(n, _)| *n)
    }

    /// Name of this list.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The underlying BIP-39 language.
    #[must_use]
    pub fn language(&self) -> Language {
        self.language
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn english_is_default() {
        let list = Wordlist::default();
        assert_eq!(list.name(), "english");
        assert_eq!(list.language(), Language::English);
        assert_eq!(list.language().word_list()[2047], "zoo");
    }

    #[test]
    fn every_named_language_loads() {
        for name in Wordlist::language_names() {
            let list = Wordlist::by_name(name).unwrap();
            assert_eq!(list.name(), name);
        }
        assert_eq!(
            Wordlist::by_name("french").unwrap().language(),
            Language::French
        );
        assert!(Wordlist::by_name("klingon").is_none());
        assert!(Wordlist::by_name("English").is_none());
    }
}
