//! Persistent vectors backed by a relaxed radix balanced trie.
//!
//! [`Vector`] is an immutable sequence with cheap clones: clones share the
//! trie holding most of their elements, and only copy two small buffers at the
//! ends. Appending goes through the tail buffer, which is attached to the trie
//! as a leaf once it fills up. Random access takes `O(log n)` time, with a
//! logarithm base of `N` (32 by default).
//!
//! Vectors come in two modes. A [`Vector`] is *forked*: it can be shared
//! freely, and every modification returns a new vector. A [`LinearVector`] is
//! *linear*: it has exclusive access to its buffers and to every trie node
//! that isn't shared with some other vector, and it modifies them in place.
//! Switching between the two modes consumes the old handle:
//!
//! ```rust
//! # use rrb_vector::Vector;
//! let forked: Vector<u32> = (0..100).collect();
//! let mut linear = forked.clone().into_linear();
//! for i in 100..200 {
//!     linear.push(i);
//! }
//! let extended = linear.into_forked();
//!
//! assert_eq!(forked.len(), 100);
//! assert_eq!(extended.len(), 200);
//! assert_eq!(extended.get(150), Some(&150));
//! ```

// Vectors only grow: there is no removal, slicing or concatenation.

mod error;
mod node;
pub mod vector;

pub use error::{Error, Result};
pub use vector::{LinearVector, Vector};

/// [`Vector`] takes a "branching factor" parameter, which must be a
/// reasonably-sized power of two. We use this trait to enforce that.
pub trait ValidBranchingConstant {}
pub struct Const<const N: usize> {}

impl ValidBranchingConstant for Const<2> {}
impl ValidBranchingConstant for Const<4> {}
impl ValidBranchingConstant for Const<8> {}
impl ValidBranchingConstant for Const<16> {}
impl ValidBranchingConstant for Const<32> {}
impl ValidBranchingConstant for Const<64> {}
impl ValidBranchingConstant for Const<128> {}

/// Whether a vector may modify its storage in place.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Exclusively owned; modified in place.
    Linear,
    /// Shareable; every modification produces a new vector.
    Forked,
}

/// A finite sequence with random access.
pub trait Sequence<T> {
    /// The number of elements.
    fn size(&self) -> usize;

    /// The element at `idx`, or [`Error::OutOfRange`] if there isn't one.
    fn nth(&self, idx: usize) -> Result<&T>;

    /// The element at `idx`, or `default` if `idx` is out of range.
    ///
    /// Note that index zero counts as out of range here, so it always yields
    /// `default`.
    fn nth_or_default<'a>(&'a self, idx: usize, default: &'a T) -> &'a T {
        if idx == 0 || idx >= self.size() {
            return default;
        }
        self.nth(idx).unwrap_or(default)
    }
}
