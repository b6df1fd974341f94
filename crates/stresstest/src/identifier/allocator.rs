use super::IdentifierSource;
use crate::Result;
use std::collections::HashSet;
use std::sync::Arc;

/// Tracks which identifiers have been assigned and hands out only new ones.
///
/// [`allocate`](Self::allocate) loops until the source produces a candidate
/// that has not been assigned before. A source that cannot supply as many
/// distinct values as are requested will make it loop forever; callers must
/// size the run to the source.
#[derive(Debug, Default)]
pub struct IdentifierAllocator {
    assigned: HashSet<Arc<str>>,
}

impl IdentifierAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draws candidates from `source` until an unassigned one turns up, then
    /// records and returns it.
    ///
    /// # Errors
    ///
    /// Propagates the first error returned by `source`.
    pub fn allocate<S: IdentifierSource + ?Sized>(&mut self, source: &mut S) -> Result<Arc<str>> {
        loop {
            let candidate = source.get()?;
            if self.assigned.contains(candidate.as_str()) {
                tracing::trace!(%candidate, "identifier already assigned, drawing again");
                continue;
            }
            let id: Arc<str> = Arc::from(candidate);
            self.assigned.insert(Arc::clone(&id));
            return Ok(id);
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.assigned.contains(id)
    }

    pub fn len(&self) -> usize {
        self.assigned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assigned.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, FileSource, Nato, RandSource};
    use std::cell::Cell;
    use std::io::Cursor;

    struct Scripted(Vec<&'static str>);

    impl IdentifierSource for Scripted {
        fn get(&mut self) -> Result<String> {
            if self.0.is_empty() {
                return Err(Error::SourceExhausted);
            }
            Ok(self.0.remove(0).to_owned())
        }
    }

    #[test]
    fn skips_duplicates_from_source() {
        let mut source = Scripted(vec!["a", "a", "b", "a", "b", "c"]);
        let mut allocator = IdentifierAllocator::new();

        let ids: Vec<_> = (0..3)
            .map(|_| allocator.allocate(&mut source).unwrap())
            .collect();

        assert_eq!(ids.iter().map(|s| &**s).collect::<Vec<_>>(), ["a", "b", "c"]);
        assert_eq!(allocator.len(), 3);
        assert!(allocator.contains("b"));
    }

    #[test]
    fn propagates_source_exhaustion() {
        let mut source = FileSource::from_reader(Cursor::new("x\nx\n")).unwrap();
        let mut allocator = IdentifierAllocator::new();

        assert_eq!(&*allocator.allocate(&mut source).unwrap(), "x");
        assert!(matches!(
            allocator.allocate(&mut source),
            Err(Error::SourceExhausted)
        ));
        assert_eq!(allocator.len(), 1);
    }

    #[test]
    fn never_assigns_twice_from_small_random_vocabulary() {
        // Two-word NATO identifiers drawn from a skewed generator that repeats
        // itself often.
        struct Skewed(Cell<u64>);
        impl RandSource<u64> for Skewed {
            fn rand(&self) -> u64 {
                let n = self.0.get();
                self.0.set(n.wrapping_mul(6364136223846793005).wrapping_add(1));
                (n >> 33) % 7
            }
        }

        let mut source = Nato::with_words(Skewed(Cell::new(42)), 2);
        let mut allocator = IdentifierAllocator::new();
        let mut seen = HashSet::new();

        for _ in 0..20 {
            let id = allocator.allocate(&mut source).unwrap();
            assert!(seen.insert(id.to_string()), "duplicate identifier {id}");
        }
        assert_eq!(allocator.len(), 20);
    }
}
