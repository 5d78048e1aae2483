//! Byte string <-> mnemonic phrase conversion on top of the `bip39` crate.
//!
//! 16..=32 byte inputs (multiples of 4) map to 12..=24 words. Input phrases
//! are lowercased and NFKD-normalized before lookup, so accented words typed
//! in composed form match the published lists.

use bip39::Mnemonic;
use thiserror::Error;
use tracing::debug;
use zeroize::Zeroizing;

use super::wordlist::Wordlist;

/// Errors raised while encoding or decoding a mnemonic.
///
/// Messages never include the words themselves.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MnemonicError {
    /// A word is not in the word list.
    #[error("word {position} is not in the word list")]
    UnknownWord {
        /// 1-based position of the offending word.
        position: usize,
    },

    /// The phrase has an unsupported number of words.
    #[error("expected 12, 15, 18, 21 or 24 words, got {0}")]
    WordCount(usize),

    /// The embedded checksum does not match.
    #[error("checksum mismatch")]
    Checksum,

    /// The phrase decodes to a different length than expected.
    #[error("phrase encodes {actual} bytes, expected {expected}")]
    EntropyLength {
        /// Expected length in bytes.
        expected: usize,
        /// Decoded length in bytes.
        actual: usize,
    },

    /// The byte string cannot be encoded (must be 16..=32 bytes, multiple of 4).
    #[error("cannot encode {0} bytes")]
    UnsupportedLength(usize),

    /// The words fit more than one word list.
    #[error("phrase matches several word lists")]
    AmbiguousLanguage,
}

impl From<bip39::Error> for MnemonicError {
    fn from(err: bip39::Error) -> Self {
        match err {
            bip39::Error::BadWordCount(n) => Self::WordCount(n),
            bip39::Error::UnknownWord(i) => Self::UnknownWord {
                position: i.saturating_add(1),
            },
            bip39::Error::BadEntropyBitCount(bits) => Self::UnsupportedLength(bits / 8),
            bip39::Error::InvalidChecksum => Self::Checksum,
            bip39::Error::AmbiguousLanguages(_) => Self::AmbiguousLanguage,
        }
    }
}

impl Wordlist {
    /// Encode `entropy` as a space-separated phrase.
    ///
    /// # Errors
    ///
    /// Returns [`MnemonicError::UnsupportedLength`] unless `entropy` is
    /// 16, 20, 24, 28 or 32 bytes long.
    pub fn encode(&self, entropy: &[u8]) -> Result<String, MnemonicError> {
        let mnemonic = Mnemonic::from_entropy_in(self.language(), entropy)?;
        Ok(mnemonic.to_string())
    }

    /// Decode a phrase of any supported length.
    ///
    /// Words are matched case-insensitively and may be separated by any
    /// whitespace. A phrase spelled in another BIP-39 language is accepted
    /// too, so changing the configured list does not strand issued phrases.
    ///
    /// # Errors
    ///
    /// Returns a [`MnemonicError`] if the word count is unsupported, a word
    /// is unknown, or the checksum does not match.
    pub fn decode(&self, phrase: &str) -> Result<Zeroizing<Vec<u8>>, MnemonicError> {
        let phrase = Zeroizing::new(phrase.to_lowercase());
        let mnemonic = match Mnemonic::parse_in(self.language(), phrase.as_str()) {
            Ok(mnemonic) => mnemonic,
            Err(bip39::Error::UnknownWord(i)) => {
                let mnemonic = Mnemonic::parse(phrase.as_str()).map_err(|e| match e {
                    bip39::Error::UnknownWord(_) | bip39::Error::AmbiguousLanguages(_) => {
                        MnemonicError::UnknownWord {
                            position: i.saturating_add(1),
                        }
                    },
                    other => other.into(),
                })?;
                debug!(
                    configured = self.name(),
                    detected = %mnemonic.language(),
                    "Decoded phrase spelled in another word list"
                );
                mnemonic
            },
            Err(e) => return Err(e.into()),
        };
        Ok(entropy_of(&mnemonic))
    }

    /// Decode a phrase that must encode exactly `expected_len` bytes.
    ///
    /// # Errors
    ///
    /// As [`decode`](Self::decode), plus [`MnemonicError::EntropyLength`] on
    /// a length mismatch.
    pub fn decode_exact(
        &self,
        phrase: &str,
        expected_len: usize,
    ) -> Result<Zeroizing<Vec<u8>>, MnemonicError> {
        let bytes = self.decode(phrase)?;
        if bytes.len() != expected_len {
            return Err(MnemonicError::EntropyLength {
                expected: expected_len,
                actual: bytes.len(),
            });
        }
        Ok(bytes)
    }
}

/// Entropy bytes behind a parsed, checksum-verified phrase.
///
/// `Mnemonic::to_entropy` re-detects the language from the words and panics
/// when they all appear in a second list (common between the two Chinese
/// lists), so the word indices are unpacked here.
// At most 24 words of 11 bits pass through a 19-bit accumulator.
#[allow(clippy::arithmetic_side_effects)]
fn entropy_of(mnemonic: &Mnemonic) -> Zeroizing<Vec<u8>> {
    let len = mnemonic.word_count() / 3 * 4;
    let mut entropy = Zeroizing::new(Vec::with_capacity(len + 1));
    let mut acc = 0u32;
    let mut held = 0u32;
    for index in mnemonic.word_indices() {
        acc = (acc << 11) | u32::try_from(index).unwrap_or_default();
        held += 11;
        while held >= 8 {
            held -= 8;
            entropy.push(u8::try_from((acc >> held) & 0xFF).unwrap_or_default());
        }
        acc &= (1 << held) - 1;
    }
    entropy.truncate(len);
    entropy
}

#[cfg(test)]
mod tests {
    use super::*;

    fn french() -> Wordlist {
        Wordlist::by_name("french").unwrap()
    }

    #[test]
    fn bip39_reference_vector() {
        // BIP-39 test vector: 16 zero bytes.
        let list = Wordlist::english();
        let phrase = list.encode(&[0u8; 16]).unwrap();
        assert_eq!(
            phrase,
            "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about"
        );
        assert_eq!(*list.decode(&phrase).unwrap(), vec![0u8; 16]);
    }

    #[test]
    fn recovery_length_encodes_to_eighteen_words() {
        let list = Wordlist::english();
        let entropy: Vec<u8> = (0u8..24).map(|b| b.wrapping_mul(37)).collect();
        let phrase = list.encode(&entropy).unwrap();
        assert_eq!(phrase.split(' ').count(), 18);
        let parsed = Mnemonic::parse_in(bip39::Language::English, phrase.as_str()).unwrap();
        assert_eq!(parsed.to_entropy(), entropy);
    }

    #[test]
    fn unpacked_entropy_matches_bip39_crate() {
        for name in ["english", "french", "japanese", "chinese-simplified"] {
            let list = Wordlist::by_name(name).unwrap();
            for len in [16usize, 20, 24, 28, 32] {
                let entropy: Vec<u8> =
                    (0..len).map(|i| u8::try_from(i * 53 % 256).unwrap()).collect();
                let mnemonic = Mnemonic::from_entropy_in(list.language(), &entropy).unwrap();
                assert_eq!(*entropy_of(&mnemonic), entropy, "{name}/{len}");
                assert_eq!(*list.decode(&mnemonic.to_string()).unwrap(), entropy);
            }
        }
    }

    #[test]
    fn decode_is_case_and_whitespace_tolerant() {
        let list = Wordlist::english();
        let entropy = [0xA5u8; 24];
        let phrase = list.encode(&entropy).unwrap();
        let messy = format!("  {}\n", phrase.to_uppercase().replace(' ', "\t "));
        assert_eq!(*list.decode(&messy).unwrap(), entropy.to_vec());
    }

    #[test]
    fn composed_accents_decode() {
        let list = french();
        let (entropy, phrase) = (0u8..=255)
            .map(|b| [b; 24])
            .map(|e| (e, list.encode(&e).unwrap()))
            .find(|(_, p)| p.contains("e\u{301}"))
            .unwrap();

        // What a keyboard produces: precomposed e-acute.
        let typed = phrase.replace("e\u{301}", "\u{e9}");
        assert_ne!(typed, phrase);
        assert_eq!(*list.decode(&typed).unwrap(), entropy.to_vec());
        assert_eq!(
            *list.decode(&typed.to_uppercase()).unwrap(),
            entropy.to_vec()
        );
    }

    #[test]
    fn phrase_in_other_language_decodes() {
        let entropy = [0x3Cu8; 24];
        let phrase = french().encode(&entropy).unwrap();
        assert_eq!(
            *Wordlist::english().decode(&phrase).unwrap(),
            entropy.to_vec()
        );
    }

    #[test]
    fn unknown_word_reports_position() {
        let list = Wordlist::english();
        let phrase = list.encode(&[1u8; 24]).unwrap();
        let mut words: Vec<&str> = phrase.split(' ').collect();
        words[4] = "notaword";
        assert_eq!(
            list.decode(&words.join(" ")),
            Err(MnemonicError::UnknownWord { position: 5 })
        );
    }

    #[test]
    fn wrong_word_count_is_rejected() {
        let list = Wordlist::english();
        assert_eq!(list.decode(""), Err(MnemonicError::WordCount(0)));
        assert_eq!(
            list.decode("abandon abandon abandon"),
            Err(MnemonicError::WordCount(3))
        );
    }

    #[test]
    fn altered_word_breaks_checksum() {
        let list = Wordlist::english();
        // "abandon" x12 is a valid word sequence with the wrong checksum.
        let phrase = ["abandon"; 12].join(" ");
        assert_eq!(list.decode(&phrase), Err(MnemonicError::Checksum));
    }

    #[test]
    fn decode_exact_checks_length() {
        let list = Wordlist::english();
        let phrase = list.encode(&[9u8; 16]).unwrap();
        assert_eq!(
            list.decode_exact(&phrase, 24),
            Err(MnemonicError::EntropyLength {
                expected: 24,
                actual: 16
            })
        );
        assert!(list.decode_exact(&phrase, 16).is_ok());
    }

    #[test]
    fn encode_rejects_odd_lengths() {
        let list = Wordlist::english();
        assert_eq!(
            list.encode(&[0u8; 15]),
            Err(MnemonicError::UnsupportedLength(15))
        );
        assert_eq!(
            list.encode(&[0u8; 33]),
            Err(MnemonicError::UnsupportedLength(33))
        );
    }
}
