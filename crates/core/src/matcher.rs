//! Text matcher - decides whether a free-text guess denotes an answer
//!
//! Guesses and answer texts are both passed through [`normalize`] and then
//! compared for exact equality. Normalization is tuned for Arabic input:
//!
//! - the whole string is put in canonical decomposition (NFD), so hamza and
//!   madda carriers split into base letter plus mark, and precomposed latin
//!   letters compare equal to their decomposed spelling
//! - tashkeel (vowel marks) and tatweel (elongation) are removed
//! - letter families that players spell interchangeably are folded:
//!   alef forms → `ا`, yeh / alef maksura → `ي`, teh marbuta → `ه`,
//!   hamza-waw → `و`
//! - whitespace runs collapse to one space, ends are trimmed
//! - everything is lowercased (relevant for latin text)
//!
//! There is no edit-distance tolerance: `"سياره"` matches `"سيارة"` because
//! teh marbuta folds to heh, not because the strings are "close".

use unicode_normalization::UnicodeNormalization;

use crate::types::Answer;

/// Normalize a string for comparison.
///
/// Deterministic and idempotent: `normalize(&normalize(s)) == normalize(s)`.
pub fn normalize(input: &str) -> String {
    let mut folded = String::with_capacity(input.len());
    folded.extend(input.trim().nfd().filter_map(fold_char));

    let mut out = String::with_capacity(folded.len());
    for word in folded.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(&word.to_lowercase());
    }
    out
}

/// Whether `guess` names `answer` (its canonical text or any synonym).
///
/// Always false for guesses that normalize to nothing.
pub fn matches(guess: &str, answer: &Answer) -> bool {
    let guess = normalize(guess);
    if guess.is_empty() {
        return false;
    }
    if guess == normalize(&answer.text) {
        return true;
    }
    answer.synonyms.iter().any(|syn| guess == normalize(syn))
}

/// An answer with its accepted spellings normalized once up front.
///
/// The round engine builds one per slot when a question starts so each guess
/// costs a single normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerKey {
    accepted: Vec<String>,
}

impl AnswerKey {
    pub fn new(answer: &Answer) -> Self {
        let mut accepted = Vec::with_capacity(1 + answer.synonyms.len());
        for form in std::iter::once(&answer.text).chain(answer.synonyms.iter()) {
            let n = normalize(form);
            if !n.is_empty() && !accepted.contains(&n) {
                accepted.push(n);
            }
        }
        Self { accepted }
    }

    /// Check an already-normalized guess.
    pub fn accepts_normalized(&self, guess: &str) -> bool {
        !guess.is_empty() && self.accepted.iter().any(|a| a == guess)
    }

    pub fn accepts(&self, guess: &str) -> bool {
        self.accepts_normalized(&normalize(guess))
    }
}

fn fold_char(ch: char) -> Option<char> {
    if is_stripped_mark(ch) {
        return None;
    }
    // Hamza carriers never reach here; NFD already split them.
    Some(match ch {
        'ى' => 'ي',
        'ة' => 'ه',
        c => c,
    })
}

/// Arabic marks removed before comparison (honorific signs, harakat,
/// Quranic annotation marks, tatweel).
fn is_stripped_mark(ch: char) -> bool {
    matches!(
        ch,
        '\u{0610}'..='\u{061A}' | '\u{064B}'..='\u{065F}' | '\u{0670}'..='\u{06ED}' | '\u{0640}'
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_blank_normalize_to_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   \t "), "");
        assert_eq!(normalize("ـــ"), "");
    }

    #[test]
    fn alef_forms_fold_to_bare_alef() {
        assert_eq!(normalize("أحمد"), normalize("احمد"));
        assert_eq!(normalize("إسلام"), normalize("اسلام"));
        assert_eq!(normalize("آمال"), normalize("امال"));
    }

    #[test]
    fn yeh_heh_waw_families_fold() {
        assert_eq!(normalize("مصطفى"), normalize("مصطفي"));
        assert_eq!(normalize("سيارة"), normalize("سياره"));
        assert_eq!(normalize("مؤمن"), normalize("مومن"));
        assert_eq!(normalize("طائرة"), normalize("طايره"));
    }

    #[test]
    fn diacritics_and_tatweel_are_stripped() {
        assert_eq!(normalize("سَيّارة"), normalize("سيارة"));
        assert_eq!(normalize("كـــتاب"), normalize("كتاب"));
    }

    #[test]
    fn decomposed_and_precomposed_hamza_agree() {
        // alef + combining hamza above vs precomposed alef-with-hamza
        assert_eq!(normalize("\u{0627}\u{0654}حمد"), normalize("أحمد"));
    }

    #[test]
    fn precomposed_and_decomposed_latin_agree() {
        assert_eq!(normalize("Café"), normalize("Cafe\u{301}"));
        assert!(matches("café", &Answer::new("Cafe\u{301}", 10)));
        assert!(!matches("cafe", &Answer::new("Café", 10)));
    }

    #[test]
    fn whitespace_collapses_and_case_folds() {
        assert_eq!(normalize("  Hello \t  World "), "hello world");
        assert_eq!(normalize("ABC"), normalize("abc"));
    }

    #[test]
    fn normalize_is_idempotent() {
        for s in ["  أَحْمَد  ", "سيارة", "Mixed  Case ة", "ـ a ـ", "مؤمن  ئ"] {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "not idempotent for {s:?}");
        }
    }

    #[test]
    fn matches_text_and_synonyms() {
        let answer = Answer::new("سيارة", 50).with_synonyms(["السيارة", "موتر", "عربة"]);
        assert!(matches("سيارة", &answer));
        assert!(matches("سياره", &answer));
        assert!(matches(" موتر ", &answer));
        assert!(!matches("طيارة", &answer));
        assert!(!matches("", &answer));
        assert!(!matches("   ", &answer));
    }

    #[test]
    fn no_partial_matching() {
        let answer = Answer::new("قطار", 20);
        assert!(!matches("قطا", &answer));
        assert!(!matches("قطارات", &answer));
    }

    #[test]
    fn answer_key_agrees_with_matches() {
        let answer = Answer::new("معلم", 50).with_synonyms(["أستاذ", "مدرس"]);
        let key = AnswerKey::new(&answer);
        for guess in ["معلم", "استاذ", "أُستاذ", "مدرس", "طالب", ""] {
            assert_eq!(key.accepts(guess), matches(guess, &answer), "guess {guess:?}");
        }
    }
}
