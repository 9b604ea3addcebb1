use crate::SeqshardError;

/// The 26-letter extended protein alphabet used by [`Vocabulary::extended_protein`].
///
/// Covers the 20 standard amino acids plus the extended IUPAC codes
/// (B, X, Z, J, U, O).
pub const EXTENDED_PROTEIN_ALPHABET: &str = "ACDEFGHIKLMNPQRSTVWYBXZJUO";

/// Code reserved for padding and for symbols outside the alphabet.
pub const PAD_CODE: u32 = 0;

/// Case-insensitive symbol-to-code mapping for sequence encoding.
///
/// Each alphabet letter maps to `index_in_alphabet + 1` in both its upper- and
/// lower-case forms, so codes are a bijection onto `[1, alphabet length]`.
/// Code `0` is never produced for an alphabet letter; it is reserved for
/// padding and unknown symbols. Built once and immutable afterward; share it
/// across workers behind an `Arc`.
///
/// # Examples
///
/// ```rust
/// use seqshard::Vocabulary;
///
/// # fn main() -> seqshard::Result<()> {
/// let vocab = Vocabulary::new("AB")?;
/// assert_eq!(vocab.encode("AbBa"), vec![1, 2, 2, 1]);
///
/// // Out-of-alphabet symbols encode to the reserved zero code
/// assert_eq!(vocab.encode("A-B"), vec![1, 0, 2]);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Vocabulary {
    /// Byte-indexed code table, zero for anything outside the alphabet
    codes: [u32; 256],

    /// Alphabet the table was built from, as given
    alphabet: String,
}

#[allow(clippy::len_without_is_empty)]
impl Vocabulary {
    /// Builds a vocabulary from an alphabet string.
    ///
    /// # Errors
    ///
    /// Returns an error if the alphabet contains a non-ASCII character, or if
    /// two letters collide after case folding (e.g. `"Aa"`), since the later
    /// letter would silently overwrite the earlier mapping.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use seqshard::{SeqshardError, Vocabulary};
    ///
    /// assert!(Vocabulary::new("ACGT").is_ok());
    /// assert!(matches!(
    ///     Vocabulary::new("ACGa"),
    ///     Err(SeqshardError::DuplicateSymbol { symbol: 'a' })
    /// ));
    /// ```
    pub fn new(alphabet: &str) -> crate::Result<Self> {
        let mut seen = [false; 256];
        for symbol in alphabet.chars() {
            if !symbol.is_ascii() {
                return Err(SeqshardError::NonAsciiSymbol { symbol });
            }
            let folded = (symbol as u8).to_ascii_uppercase();
            if seen[folded as usize] {
                return Err(SeqshardError::DuplicateSymbol { symbol });
            }
            seen[folded as usize] = true;
        }
        Ok(Self::from_alphabet(alphabet))
    }

    /// Builds the default vocabulary over [`EXTENDED_PROTEIN_ALPHABET`].
    ///
    /// The default alphabet is repeat-free, so this constructor cannot fail.
    pub fn extended_protein() -> Self {
        Self::from_alphabet(EXTENDED_PROTEIN_ALPHABET)
    }

    /// Table construction for an alphabet already known to be ASCII and
    /// repeat-free.
    fn from_alphabet(alphabet: &str) -> Self {
        let mut codes = [PAD_CODE; 256];
        for (i, byte) in alphabet.bytes().enumerate() {
            let code = (i + 1) as u32;
            codes[byte.to_ascii_uppercase() as usize] = code;
            codes[byte.to_ascii_lowercase() as usize] = code;
        }
        Self {
            codes,
            alphabet: alphabet.to_string(),
        }
    }

    /// Returns the code for a single symbol, `0` if outside the alphabet.
    pub fn code(&self, symbol: u8) -> u32 {
        self.codes[symbol as usize]
    }

    /// Encodes a residue string, mapping unknown symbols to `0`.
    pub fn encode(&self, residues: &str) -> Vec<u32> {
        residues.bytes().map(|b| self.codes[b as usize]).collect()
    }

    /// Number of letters in the alphabet.
    pub fn len(&self) -> usize {
        self.alphabet.len()
    }

    /// The alphabet this vocabulary was built from.
    pub fn alphabet(&self) -> &str {
        &self.alphabet
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::extended_protein()
    }
}

impl std::fmt::Debug for Vocabulary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Vocabulary")
            .field("alphabet", &self.alphabet)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_letter_alphabet() {
        let vocab = Vocabulary::new("AB").unwrap();
        assert_eq!(vocab.code(b'A'), 1);
        assert_eq!(vocab.code(b'B'), 2);
        assert_eq!(vocab.code(b'a'), 1);
        assert_eq!(vocab.code(b'b'), 2);
        assert_eq!(vocab.encode("AB"), vec![1, 2]);
    }

    #[test]
    fn test_case_folding_matches() {
        let vocab = Vocabulary::extended_protein();
        for byte in EXTENDED_PROTEIN_ALPHABET.bytes() {
            assert_eq!(
                vocab.code(byte.to_ascii_uppercase()),
                vocab.code(byte.to_ascii_lowercase())
            );
        }
    }

    #[test]
    fn test_codes_are_bijective() {
        let vocab = Vocabulary::extended_protein();
        let mut codes: Vec<u32> = EXTENDED_PROTEIN_ALPHABET
            .bytes()
            .map(|b| vocab.code(b))
            .collect();
        codes.sort_unstable();

        let expected: Vec<u32> = (1..=26).collect();
        assert_eq!(codes, expected);
        assert_eq!(vocab.len(), 26);
    }

    #[test]
    fn test_unknown_symbols_encode_to_zero() {
        let vocab = Vocabulary::extended_protein();
        // Not part of the extended protein alphabet
        assert_eq!(vocab.code(b'-'), PAD_CODE);
        assert_eq!(vocab.code(b'*'), PAD_CODE);
        assert_eq!(vocab.code(b'1'), PAD_CODE);
        assert_eq!(vocab.encode("A*C"), vec![1, 0, 2]);
    }

    #[test]
    fn test_duplicate_letter_rejected() {
        let result = Vocabulary::new("ACDA");
        assert!(matches!(
            result,
            Err(SeqshardError::DuplicateSymbol { symbol: 'A' })
        ));

        // Case-folded repeats collide too
        let result = Vocabulary::new("ACDa");
        assert!(matches!(
            result,
            Err(SeqshardError::DuplicateSymbol { symbol: 'a' })
        ));
    }

    #[test]
    fn test_non_ascii_rejected() {
        let result = Vocabulary::new("ACß");
        assert!(matches!(
            result,
            Err(SeqshardError::NonAsciiSymbol { symbol: 'ß' })
        ));
    }

    #[test]
    fn test_empty_alphabet_encodes_everything_to_zero() {
        let vocab = Vocabulary::new("").unwrap();
        assert_eq!(vocab.len(), 0);
        assert_eq!(vocab.encode("ACDE"), vec![0, 0, 0, 0]);
    }

    #[test]
    fn test_default_is_extended_protein() {
        let vocab = Vocabulary::default();
        assert_eq!(vocab.alphabet(), EXTENDED_PROTEIN_ALPHABET);
        assert_eq!(vocab.len(), 26);
    }
}
