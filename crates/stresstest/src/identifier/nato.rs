use super::IdentifierSource;
use crate::{RandSource, Result, ThreadRandom};

/// The NATO phonetic alphabet, using the ICAO spellings.
pub const NATO_ALPHABET: [&str; 26] = [
    "alfa", "bravo", "charlie", "delta", "echo", "foxtrot", "golf", "hotel", "india", "juliett",
    "kilo", "lima", "mike", "november", "oscar", "papa", "quebec", "romeo", "sierra", "tango",
    "uniform", "victor", "whiskey", "xray", "yankee", "zulu",
];

/// Built-in identifier source that joins randomly drawn NATO words with `.`.
///
/// With the default of three words per identifier there are 26^3 distinct
/// candidates, which is effectively inexhaustible for a load run.
#[derive(Debug, Clone)]
pub struct Nato<R = ThreadRandom> {
    rand: R,
    words: usize,
}

impl<R: RandSource<u64>> Nato<R> {
    pub const DEFAULT_WORDS: usize = 3;

    pub const fn new(rand: R) -> Self {
        Self::with_words(rand, Self::DEFAULT_WORDS)
    }

    /// A source whose identifiers are `words` long. `words` is clamped to at
    /// least one.
    pub const fn with_words(rand: R, words: usize) -> Self {
        Self {
            rand,
            words: if words == 0 { 1 } else { words },
        }
    }

    /// How many distinct identifiers this source can produce, saturating.
    pub fn distinct(&self) -> usize {
        let words = u32::try_from(self.words).unwrap_or(u32::MAX);
        NATO_ALPHABET.len().saturating_pow(words)
    }

    fn word(&self) -> &'static str {
        let idx = (self.rand.rand() % NATO_ALPHABET.len() as u64) as usize;
        NATO_ALPHABET[idx]
    }
}

impl Default for Nato<ThreadRandom> {
    fn default() -> Self {
        Self::new(ThreadRandom)
    }
}

impl<R: RandSource<u64>> IdentifierSource for Nato<R> {
    fn get(&mut self) -> Result<String> {
        let mut id = String::with_capacity(self.words * 8);
        for i in 0..self.words {
            if i > 0 {
                id.push('.');
            }
            id.push_str(self.word());
        }
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct Sequence(Cell<u64>);

    impl RandSource<u64> for Sequence {
        fn rand(&self) -> u64 {
            let n = self.0.get();
            self.0.set(n + 1);
            n
        }
    }

    #[test]
    fn joins_drawn_words_with_dots() {
        let mut nato = Nato::new(Sequence(Cell::new(0)));
        assert_eq!(nato.get().unwrap(), "alfa.bravo.charlie");
        assert_eq!(nato.get().unwrap(), "delta.echo.foxtrot");
    }

    #[test]
    fn wraps_random_values_onto_the_alphabet() {
        let mut nato = Nato::with_words(Sequence(Cell::new(25)), 2);
        assert_eq!(nato.get().unwrap(), "zulu.alfa");
    }

    #[test]
    fn zero_words_is_clamped_to_one() {
        let mut nato = Nato::with_words(Sequence(Cell::new(10)), 0);
        assert_eq!(nato.get().unwrap(), "kilo");
        assert_eq!(nato.distinct(), 26);
    }

    #[test]
    fn default_source_covers_three_words() {
        let mut nato: Nato = Nato::default();
        assert_eq!(nato.distinct(), 26 * 26 * 26);

        let id = nato.get().unwrap();
        let parts: Vec<_> = id.split('.').collect();
        assert_eq!(parts.len(), 3);
        assert!(parts.iter().all(|p| NATO_ALPHABET.contains(p)));
    }
}
