use std::{
    fmt,
    iter::{FusedIterator, Rev},
    mem,
    ops::Index,
    rc::Rc,
    slice,
};

use imbl_sized_chunks::Chunk;

use crate::{
    node::{self, Node, Side},
    Const, Error, Mode, Result, Sequence, ValidBranchingConstant,
};

/// The storage behind both vector modes: a trie of committed leaves, with a
/// buffer of not-yet-committed elements at either end.
///
/// Logically, the elements are the head buffer, then the trie, then the tail
/// buffer. Cloning copies both buffers and shares the trie.
#[derive(Clone, Debug)]
struct Buffered<T, const N: usize> {
    root: Rc<Node<T, N>>,
    // Filled back-to-front: the first element of the vector is the last
    // element of `head`.
    head: Vec<T>,
    tail: Vec<T>,
}

/// Makes room for one more element in a head or tail buffer. Buffers start
/// with room for two elements and double until they can hold a whole chunk.
fn reserve_buffer<T, const N: usize>(buf: &mut Vec<T>) {
    if buf.len() == buf.capacity() {
        let target = (buf.capacity() * 2).clamp(2, N);
        buf.reserve_exact(target - buf.len());
    }
}

impl<T, const N: usize> Buffered<T, N>
where
    Const<N>: ValidBranchingConstant,
{
    fn new() -> Self {
        Buffered {
            root: Rc::new(Node::empty()),
            head: Vec::new(),
            tail: Vec::new(),
        }
    }

    fn len(&self) -> usize {
        self.head.len() + self.root.len() + self.tail.len()
    }

    fn nth(&self, idx: usize) -> Result<&T> {
        let len = self.len();
        if idx >= len {
            return Err(Error::OutOfRange { index: idx, len });
        }

        let head_len = self.head.len();
        if idx < head_len {
            return Ok(&self.head[head_len - 1 - idx]);
        }

        let idx = idx - head_len;
        let root_len = self.root.len();
        if idx < root_len {
            Ok(self.root.get(idx))
        } else {
            Ok(&self.tail[idx - root_len])
        }
    }

    fn push(&mut self, elt: T) {
        reserve_buffer::<T, N>(&mut self.tail);
        self.tail.push(elt);

        if self.tail.len() == N {
            let chunk: Chunk<T, N> = mem::take(&mut self.tail).into_iter().collect();
            Node::push_chunk(&mut self.root, Side::Back, Rc::new(chunk));
        }
    }

    fn push_front(&mut self, elt: T) {
        reserve_buffer::<T, N>(&mut self.head);
        self.head.push(elt);

        if self.head.len() == N {
            let chunk: Chunk<T, N> = mem::take(&mut self.head).into_iter().rev().collect();
            Node::push_chunk(&mut self.root, Side::Front, Rc::new(chunk));
        }
    }

    fn iter(&self) -> Iter<'_, T, N> {
        Iter {
            head: self.head.iter().rev(),
            trie: self.root.iter(),
            tail: self.tail.iter(),
            remaining: self.len(),
        }
    }

    fn check_invariants(&self) {
        assert_eq!(self.root.check_invariants(), self.root.len());
        assert!(self.head.len() < N);
        assert!(self.tail.len() < N);
        assert_eq!(self.iter().count(), self.len());
    }
}

/// A persistent vector.
///
/// Cloning a `Vector` is cheap: the clone shares the trie and only copies the
/// (short) buffers at either end. Modifications return a new vector and leave
/// the receiver untouched. For a burst of modifications, convert to a
/// [`LinearVector`] with [`Vector::into_linear`].
///
/// This is implemented internally as a tree, and the parameter `N` controls its
/// branching factor. For performance, it should always be a power of 2. Values
/// between `8` and `64` are pretty reasonable.
#[derive(Clone)]
pub struct Vector<T, const N: usize = 32>
where
    Const<N>: ValidBranchingConstant,
{
    inner: Buffered<T, N>,
}

/// A vector that modifies its storage in place.
///
/// A `LinearVector` can't be cloned, and converting to and from a [`Vector`]
/// consumes the old handle, so nobody else can observe its modifications.
/// Trie nodes that it shares with other vectors are copied before they are
/// modified.
pub struct LinearVector<T, const N: usize = 32>
where
    Const<N>: ValidBranchingConstant,
{
    inner: Buffered<T, N>,
}

impl<T, const N: usize> Vector<T, N>
where
    Const<N>: ValidBranchingConstant,
{
    pub fn new() -> Self {
        Vector {
            inner: Buffered::new(),
        }
    }

    pub fn mode(&self) -> Mode {
        Mode::Forked
    }

    /// The number of elements in this vector.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use rrb_vector::Vector;
    /// let vec: Vector<i32> = Vector::from_iter([0, 1, 2, 3, 4, 5]);
    /// assert_eq!(vec.len(), 6);
    /// ```
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Gets the element at a given index, or an error if `idx` is out-of-bounds.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use rrb_vector::{Error, Vector};
    /// let vec: Vector<i32> = Vector::from_iter([1, 2, 3]);
    /// assert_eq!(vec.nth(2), Ok(&3));
    /// assert_eq!(vec.nth(3), Err(Error::OutOfRange { index: 3, len: 3 }));
    /// ```
    pub fn nth(&self, idx: usize) -> Result<&T> {
        self.inner.nth(idx)
    }

    /// Gets the element at a given index, or `None` if `idx` is out-of-bounds.
    pub fn get(&self, idx: usize) -> Option<&T> {
        self.nth(idx).ok()
    }

    pub fn iter(&self) -> Iter<'_, T, N> {
        self.inner.iter()
    }

    /// Opens this vector for in-place modification.
    pub fn into_linear(self) -> LinearVector<T, N> {
        LinearVector { inner: self.inner }
    }

    /// A vector is already forked, so this does nothing.
    pub fn into_forked(self) -> Self {
        self
    }

    /// Returns true if every node of the trie can be indexed without searching.
    pub fn is_strict(&self) -> bool {
        self.inner.root.is_strict()
    }

    pub fn check_invariants(&self) {
        self.inner.check_invariants();
    }
}

impl<T: Clone, const N: usize> Vector<T, N>
where
    Const<N>: ValidBranchingConstant,
{
    /// Returns a new vector with `elt` added at the end.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use rrb_vector::Vector;
    /// let vec: Vector<i32> = Vector::from_iter([1, 2, 3]);
    /// let longer = vec.push_back(4);
    /// assert_eq!(vec.len(), 3);
    /// assert_eq!(longer.get(3), Some(&4));
    /// ```
    pub fn push_back(&self, elt: T) -> Self {
        let mut inner = self.inner.clone();
        inner.push(elt);
        Vector { inner }
    }

    /// Returns a new vector with `elt` added at the beginning.
    pub fn push_front(&self, elt: T) -> Self {
        let mut inner = self.inner.clone();
        inner.push_front(elt);
        Vector { inner }
    }
}

impl<T, const N: usize> LinearVector<T, N>
where
    Const<N>: ValidBranchingConstant,
{
    /// An empty vector, open for in-place modification.
    pub fn new() -> Self {
        LinearVector {
            inner: Buffered::new(),
        }
    }

    pub fn mode(&self) -> Mode {
        Mode::Linear
    }

    /// The number of elements in this vector.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Gets the element at a given index, or an error if `idx` is out-of-bounds.
    pub fn nth(&self, idx: usize) -> Result<&T> {
        self.inner.nth(idx)
    }

    /// Gets the element at a given index, or `None` if `idx` is out-of-bounds.
    pub fn get(&self, idx: usize) -> Option<&T> {
        self.nth(idx).ok()
    }

    /// Iterates over the elements, from first to last.
    pub fn iter(&self) -> Iter<'_, T, N> {
        self.inner.iter()
    }

    /// Adds an element to the end of this vector.
    ///
    /// Runs in amortized constant time, apart from copying any trie nodes
    /// along the right edge that are shared with another vector.
    pub fn push(&mut self, elt: T) {
        self.inner.push(elt);
    }

    /// Adds an element to the beginning of this vector.
    pub fn push_front(&mut self, elt: T) {
        self.inner.push_front(elt);
    }

    /// Seals this vector so that it can be shared.
    pub fn into_forked(self) -> Vector<T, N> {
        Vector { inner: self.inner }
    }

    /// A linear vector is already linear, so this does nothing.
    pub fn into_linear(self) -> Self {
        self
    }

    /// Returns true if every node of the trie can be indexed without searching.
    pub fn is_strict(&self) -> bool {
        self.inner.root.is_strict()
    }

    pub fn check_invariants(&self) {
        self.inner.check_invariants();
    }
}

/// Iterates over the elements of a vector, from first to last.
#[derive(Debug)]
pub struct Iter<'a, T, const N: usize> {
    head: Rev<slice::Iter<'a, T>>,
    trie: node::Iter<'a, T, N>,
    tail: slice::Iter<'a, T>,
    remaining: usize,
}

impl<T, const N: usize> Clone for Iter<'_, T, N> {
    fn clone(&self) -> Self {
        Iter {
            head: self.head.clone(),
            trie: self.trie.clone(),
            tail: self.tail.clone(),
            remaining: self.remaining,
        }
    }
}

impl<'a, T, const N: usize> Iterator for Iter<'a, T, N> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let ret = self
            .head
            .next()
            .or_else(|| self.trie.next())
            .or_else(|| self.tail.next())?;
        self.remaining -= 1;
        Some(ret)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T, const N: usize> ExactSizeIterator for Iter<'_, T, N> {}

impl<T, const N: usize> FusedIterator for Iter<'_, T, N> {}

impl<'a, T, const N: usize> IntoIterator for &'a Vector<T, N>
where
    Const<N>: ValidBranchingConstant,
{
    type Item = &'a T;
    type IntoIter = Iter<'a, T, N>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T, const N: usize> IntoIterator for &'a LinearVector<T, N>
where
    Const<N>: ValidBranchingConstant,
{
    type Item = &'a T;
    type IntoIter = Iter<'a, T, N>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T, const N: usize> Default for Vector<T, N>
where
    Const<N>: ValidBranchingConstant,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> Default for LinearVector<T, N>
where
    Const<N>: ValidBranchingConstant,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> Extend<T> for LinearVector<T, N>
where
    Const<N>: ValidBranchingConstant,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for elt in iter {
            self.push(elt);
        }
    }
}

impl<T, const N: usize> FromIterator<T> for LinearVector<T, N>
where
    Const<N>: ValidBranchingConstant,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut ret = LinearVector::new();
        ret.extend(iter);
        ret
    }
}

impl<T, const N: usize> FromIterator<T> for Vector<T, N>
where
    Const<N>: ValidBranchingConstant,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        iter.into_iter().collect::<LinearVector<T, N>>().into_forked()
    }
}

impl<T, const N: usize> Index<usize> for Vector<T, N>
where
    Const<N>: ValidBranchingConstant,
{
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        match self.nth(index) {
            Ok(elt) => elt,
            Err(e) => panic!("{e}"),
        }
    }
}

impl<T, const N: usize> Index<usize> for LinearVector<T, N>
where
    Const<N>: ValidBranchingConstant,
{
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        match self.nth(index) {
            Ok(elt) => elt,
            Err(e) => panic!("{e}"),
        }
    }
}

impl<T, const N: usize> Sequence<T> for Vector<T, N>
where
    Const<N>: ValidBranchingConstant,
{
    fn size(&self) -> usize {
        self.len()
    }

    fn nth(&self, idx: usize) -> Result<&T> {
        self.inner.nth(idx)
    }
}

impl<T, const N: usize> Sequence<T> for LinearVector<T, N>
where
    Const<N>: ValidBranchingConstant,
{
    fn size(&self) -> usize {
        self.len()
    }

    fn nth(&self, idx: usize) -> Result<&T> {
        self.inner.nth(idx)
    }
}

impl<T: PartialEq, const N: usize> PartialEq for Vector<T, N>
where
    Const<N>: ValidBranchingConstant,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Eq, const N: usize> Eq for Vector<T, N> where Const<N>: ValidBranchingConstant {}

impl<T: fmt::Debug, const N: usize> fmt::Debug for Vector<T, N>
where
    Const<N>: ValidBranchingConstant,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self).finish()
    }
}

impl<T: fmt::Debug, const N: usize> fmt::Debug for LinearVector<T, N>
where
    Const<N>: ValidBranchingConstant,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self).finish()
    }
}
