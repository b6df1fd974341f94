//! Sources of client identifiers and their deduplicating allocator.
//!
//! An [`IdentifierSource`] hands out candidate names one call at a time and
//! makes no uniqueness promise. The [`IdentifierAllocator`] owned by the fleet
//! keeps asking until it sees a name it has not assigned yet.

mod allocator;
mod file;
mod nato;

pub use allocator::IdentifierAllocator;
pub use file::FileSource;
pub use nato::{NATO_ALPHABET, Nato};

use crate::Result;

/// A supplier of candidate client identifiers.
///
/// # Example
/// ```
/// use stresstest::{IdentifierSource, Result};
///
/// struct Counter(u32);
/// impl IdentifierSource for Counter {
///     fn get(&mut self) -> Result<String> {
///         self.0 += 1;
///         Ok(format!("client-{}", self.0))
///     }
/// }
///
/// let mut source = Counter(0);
/// assert_eq!(source.get().unwrap(), "client-1");
/// ```
pub trait IdentifierSource {
    /// Returns the next candidate identifier.
    ///
    /// # Errors
    ///
    /// Finite sources return [`Error::SourceExhausted`] once they run dry.
    ///
    /// [`Error::SourceExhausted`]: crate::Error::SourceExhausted
    fn get(&mut self) -> Result<String>;
}

impl<S: IdentifierSource + ?Sized> IdentifierSource for Box<S> {
    fn get(&mut self) -> Result<String> {
        (**self).get()
    }
}

impl<S: IdentifierSource + ?Sized> IdentifierSource for &mut S {
    fn get(&mut self) -> Result<String> {
        (**self).get()
    }
}
