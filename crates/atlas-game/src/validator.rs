//! The validity-set collaborator.
//!
//! Atlas doesn't own the geographic reference dataset. It defines the
//! [`Validator`] trait — one async lookup from a normalized answer to
//! "is this a place?" — and the engine calls it during submission. A
//! database-backed implementation lives with whoever owns the data; tests
//! and the console demo use the in-memory [`PlaceSet`].

use std::collections::HashSet;

use atlas_protocol::normalize;

/// The lookup itself failed: the answer was never judged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidatorError {
    /// The backing store could not be reached or the query failed.
    #[error("validator unavailable: {0}")]
    Unavailable(String),
}

/// Decides whether a normalized answer belongs to the validity set.
///
/// `Send + Sync + 'static` because one validator is shared by every
/// session, and sessions run concurrently. The returned future is `Send`
/// so a submission can be driven from any runtime thread.
///
/// # Example
///
/// ```rust
/// use atlas_game::{Validator, ValidatorError};
///
/// /// Only Atlantis exists.
/// struct Legend;
///
/// impl Validator for Legend {
///     async fn is_valid(&self, normalized: &str) -> Result<bool, ValidatorError> {
///         Ok(normalized == "atlantis")
///     }
/// }
/// ```
pub trait Validator: Send + Sync + 'static {
    /// Looks up `normalized`, which is always the output of
    /// [`normalize`](atlas_protocol::normalize).
    ///
    /// # Returns
    /// - `Ok(true)` — a known place
    /// - `Ok(false)` — not a known place
    /// - `Err(ValidatorError)` — the lookup could not be done
    fn is_valid(
        &self,
        normalized: &str,
    ) -> impl std::future::Future<Output = Result<bool, ValidatorError>> + Send;
}

// ---------------------------------------------------------------------------
// PlaceSet
// ---------------------------------------------------------------------------

/// An in-memory validity set of normalized place names.
#[derive(Debug, Clone, Default)]
pub struct PlaceSet {
    places: HashSet<String>,
}

impl PlaceSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a place, normalizing it first. Returns `false` if it was
    /// already present or normalizes to nothing.
    pub fn insert(&mut self, name: &str) -> bool {
        let normalized = normalize(name);
        if normalized.is_empty() {
            return false;
        }
        self.places.insert(normalized)
    }

    /// Removes a place. Returns `true` if it was present.
    pub fn remove(&mut self, name: &str) -> bool {
        self.places.remove(&normalize(name))
    }

    /// Returns `true` if the (normalized) name is in the set.
    pub fn contains(&self, name: &str) -> bool {
        self.places.contains(&normalize(name))
    }

    /// Number of distinct places.
    pub fn len(&self) -> usize {
        self.places.len()
    }

    /// Returns `true` if the set holds no places.
    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for PlaceSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        for name in iter {
            set.insert(name.as_ref());
        }
        set
    }
}

impl Validator for PlaceSet {
    async fn is_valid(&self, normalized: &str) -> Result<bool, ValidatorError> {
        Ok(self.places.contains(normalized))
    }
}
