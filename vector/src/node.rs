use std::{rc::Rc, slice};

use imbl_sized_chunks::Chunk;

use crate::{Const, ValidBranchingConstant};

/// A run of elements at the bottom of the trie.
///
/// Leaves are immutable once they are attached to a node, so they are shared
/// between every trie that contains them.
pub(crate) type Leaf<T, const N: usize> = Rc<Chunk<T, N>>;

/// The end of the trie that an operation grows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Side {
    Front,
    Back,
}

impl Side {
    fn opposite(self) -> Self {
        match self {
            Side::Front => Side::Back,
            Side::Back => Side::Front,
        }
    }
}

/// A child of a [`Node`].
///
/// Which variant we find in a slot is determined by the shift of the node
/// holding it: nodes at the leaf-adjacent shift hold leaves, every other node
/// holds nodes exactly one level down.
#[derive(Debug)]
pub(crate) enum Slot<T, const N: usize> {
    Leaf(Leaf<T, N>),
    Node(Rc<Node<T, N>>),
}

// Hand-written so that cloning a slot (or a node) doesn't require `T: Clone`:
// we only ever bump reference counts.
impl<T, const N: usize> Clone for Slot<T, N> {
    fn clone(&self) -> Self {
        match self {
            Slot::Leaf(chunk) => Slot::Leaf(Rc::clone(chunk)),
            Slot::Node(node) => Slot::Node(Rc::clone(node)),
        }
    }
}

impl<T, const N: usize> Slot<T, N>
where
    Const<N>: ValidBranchingConstant,
{
    fn len(&self) -> usize {
        match self {
            Slot::Leaf(chunk) => chunk.len(),
            Slot::Node(node) => node.len(),
        }
    }
}

/// An interior node of a relaxed radix balanced trie.
///
/// A node at shift `s` has children that each hold at most `1 << s` elements.
/// The leaf-adjacent level has shift `log2(N)`, and every level above adds
/// another `log2(N)`.
///
/// A node is *strict* if every child except possibly the last one is
/// completely full. In that case, the child holding a given index can be read
/// off from the index bits. Otherwise, the node is *relaxed* and we have to
/// search the cumulative offsets.
///
/// Nodes are shared between vectors through `Rc`. All mutation goes through
/// `Rc::make_mut` on the spine being modified, so a node that is reachable
/// from some other vector gets copied before it is changed.
#[derive(Debug)]
pub(crate) struct Node<T, const N: usize> {
    shift: u32,
    strict: bool,
    slots: Vec<Slot<T, N>>,
    // `offsets[i]` is the total number of elements in `slots[..=i]`.
    offsets: Vec<usize>,
}

impl<T, const N: usize> Clone for Node<T, N> {
    fn clone(&self) -> Self {
        Node {
            shift: self.shift,
            strict: self.strict,
            slots: self.slots.clone(),
            offsets: self.offsets.clone(),
        }
    }
}

impl<T, const N: usize> Node<T, N>
where
    Const<N>: ValidBranchingConstant,
{
    /// The number of index bits consumed by each level of the trie.
    pub(crate) const BITS: u32 = N.ilog2();
    const MASK: usize = N - 1;

    /// Creates a node with no children at the given shift.
    pub(crate) fn new(shift: u32) -> Self {
        Node {
            shift,
            strict: true,
            slots: Vec::with_capacity(2),
            offsets: Vec::with_capacity(2),
        }
    }

    /// An empty trie of height one.
    pub(crate) fn empty() -> Self {
        Self::new(Self::BITS)
    }

    fn from_slot(shift: u32, slot: Slot<T, N>) -> Self {
        let mut node = Self::new(shift);
        node.insert(Side::Back, slot);
        node
    }

    /// A leaf-adjacent node holding a single chunk.
    #[allow(dead_code)]
    pub(crate) fn from_chunk(chunk: Leaf<T, N>) -> Self {
        Self::from_slot(Self::BITS, Slot::Leaf(chunk))
    }

    #[cfg(test)]
    pub(crate) fn shift(&self) -> u32 {
        self.shift
    }

    /// The number of elements in this subtree.
    pub(crate) fn len(&self) -> usize {
        self.offsets.last().copied().unwrap_or(0)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// The number of elements in the slots before `idx`.
    fn offset(&self, idx: usize) -> usize {
        if idx == 0 {
            0
        } else {
            self.offsets[idx - 1]
        }
    }

    fn compute_strict(&self) -> bool {
        let count = self.slots.len();
        count <= 1
            || (count - 1)
                .checked_shl(self.shift)
                .is_some_and(|packed| packed == self.offset(count - 1))
    }

    fn update_strict(&mut self) {
        self.strict = self.compute_strict();
    }

    // Doubles the backing storage for slots and offsets.
    fn grow(&mut self) {
        let extra = self.slots.capacity().max(1);
        self.slots.reserve_exact(extra);
        self.offsets.reserve_exact(extra);
    }

    fn edge(&self, side: Side) -> Option<&Slot<T, N>> {
        match side {
            Side::Front => self.slots.first(),
            Side::Back => self.slots.last(),
        }
    }

    fn edge_mut(&mut self, side: Side) -> Option<&mut Slot<T, N>> {
        match side {
            Side::Front => self.slots.first_mut(),
            Side::Back => self.slots.last_mut(),
        }
    }

    /// Adds a slot directly to this node, which must have room for it.
    fn insert(&mut self, side: Side, slot: Slot<T, N>) {
        debug_assert!(self.slots.len() < N);

        if self.slots.len() == self.slots.capacity() {
            self.grow();
        }

        let len = slot.len();
        match side {
            Side::Back => {
                self.offsets.push(self.len() + len);
                self.slots.push(slot);
            }
            Side::Front => {
                for offset in &mut self.offsets {
                    *offset += len;
                }
                self.offsets.insert(0, len);
                self.slots.insert(0, slot);
            }
        }
        self.update_strict();
    }

    /// The shift of the lowest node on the `side` spine, no lower than
    /// `floor`, that has room for another slot. `None` if the whole spine is
    /// full.
    fn spare_shift(&self, side: Side, floor: u32) -> Option<u32> {
        let below = match self.edge(side) {
            Some(Slot::Node(child)) if self.shift > floor => child.spare_shift(side, floor),
            _ => None,
        };
        below.or_else(|| (self.slots.len() < N).then_some(self.shift))
    }

    /// Puts `slot` on the `side` spine, into the node at shift `target`, which
    /// must have room for it. The slot belongs in a node at shift `floor`; if
    /// `target` is higher than that, it gets wrapped in a chain of single-child
    /// nodes.
    fn splice(&mut self, side: Side, target: u32, floor: u32, slot: Slot<T, N>) {
        if self.shift > target {
            let len = slot.len();
            let Some(Slot::Node(child)) = self.edge_mut(side) else {
                unreachable!();
            };
            Rc::make_mut(child).splice(side, target, floor, slot);

            match side {
                Side::Back => {
                    if let Some(last) = self.offsets.last_mut() {
                        *last += len;
                    }
                }
                Side::Front => {
                    for offset in &mut self.offsets {
                        *offset += len;
                    }
                }
            }
            self.update_strict();
        } else {
            let mut slot = slot;
            let mut shift = floor;
            while shift < self.shift {
                slot = Slot::Node(Rc::new(Node::from_slot(shift, slot)));
                shift += Self::BITS;
            }
            self.insert(side, slot);
        }
    }

    /// Replaces `root` by a new node one level up, with the old root as its
    /// only child.
    fn add_level(root: &mut Rc<Self>) {
        let shift = root.shift + Self::BITS;
        log::trace!("growing trie to shift {shift}");

        let old_root = Rc::clone(root);
        *root = Rc::new(Node::from_slot(shift, Slot::Node(old_root)));
    }

    fn graft(root: &mut Rc<Self>, side: Side, floor: u32, slot: Slot<T, N>) {
        let target = match root.spare_shift(side, floor) {
            Some(target) => target,
            None => {
                Self::add_level(root);
                root.shift
            }
        };
        Rc::make_mut(root).splice(side, target, floor, slot);
    }

    /// Attaches a leaf chunk as the new first or last leaf of the trie rooted
    /// at `root`, increasing the trie's height if that spine is full.
    pub(crate) fn push_chunk(root: &mut Rc<Self>, side: Side, chunk: Leaf<T, N>) {
        if chunk.is_empty() {
            return;
        }
        Self::graft(root, side, Self::BITS, Slot::Leaf(chunk));
    }

    /// Attaches a whole subtree to one end of the trie rooted at `root`.
    ///
    /// The subtree doesn't need to be full, so the nodes along the modified
    /// spine may become relaxed.
    // The vector itself only ever attaches leaf chunks; this is the building
    // block for concatenating two tries.
    #[allow(dead_code)]
    pub(crate) fn attach(root: &mut Rc<Self>, side: Side, subtree: Rc<Self>) {
        if subtree.is_empty() {
            return;
        }
        if root.is_empty() && root.shift <= subtree.shift {
            *root = subtree;
            return;
        }

        if root.shift < subtree.shift {
            log::trace!(
                "attached subtree (shift {}) is taller than the receiver (shift {}), swapping",
                subtree.shift,
                root.shift
            );
            let receiver = std::mem::replace(root, subtree);
            Self::attach(root, side.opposite(), receiver);
        } else if root.shift == subtree.shift {
            let old_root = Rc::clone(root);
            let (first, second) = match side {
                Side::Back => (old_root, subtree),
                Side::Front => (subtree, old_root),
            };
            let mut parent = Node::new(first.shift + Self::BITS);
            parent.insert(Side::Back, Slot::Node(first));
            parent.insert(Side::Back, Slot::Node(second));
            *root = Rc::new(parent);
        } else {
            let floor = subtree.shift + Self::BITS;
            Self::graft(root, side, floor, Slot::Node(subtree));
        }
    }

    /// Which of our slots holds the element at `idx`, relative to the start of
    /// this node.
    fn index_of(&self, idx: usize) -> usize {
        // Every child holds at most `1 << shift` elements, so this is exact for
        // strict nodes and a lower bound otherwise. Shifting by the full width
        // of `usize` (or more) would overflow; such a deep node can only hold
        // `idx` in its first slot anyway.
        let estimate = idx
            .checked_shr(self.shift)
            .map_or(0, |bucket| bucket & Self::MASK);
        if self.strict {
            estimate
        } else {
            estimate + self.offsets[estimate..].partition_point(|&offset| offset <= idx)
        }
    }

    /// Gets the element at `idx`, which must be less than `self.len()`.
    ///
    /// Strictness is a property of each node, not of the whole trie, so every
    /// level decides for itself whether it needs to search its offsets.
    pub(crate) fn get(&self, mut idx: usize) -> &T {
        let mut node = self;
        loop {
            let slot_idx = node.index_of(idx);
            idx -= node.offset(slot_idx);
            match &node.slots[slot_idx] {
                Slot::Leaf(chunk) => return &chunk[idx],
                Slot::Node(child) => node = child.as_ref(),
            }
        }
    }

    /// Returns true if this node and all of its descendants are strict.
    pub(crate) fn is_strict(&self) -> bool {
        self.strict
            && self.slots.iter().all(|slot| match slot {
                Slot::Leaf(_) => true,
                Slot::Node(child) => child.is_strict(),
            })
    }

    /// Panics if this subtree is malformed. Returns the number of elements.
    pub(crate) fn check_invariants(&self) -> usize {
        assert!(self.slots.len() <= N);
        assert_eq!(self.slots.len(), self.offsets.len());
        assert!(self.shift >= Self::BITS);
        assert_eq!(self.shift % Self::BITS, 0);

        let mut total = 0;
        for (slot, &offset) in self.slots.iter().zip(&self.offsets) {
            let len = match slot {
                Slot::Leaf(chunk) => {
                    assert_eq!(self.shift, Self::BITS, "leaf above the leaf-adjacent level");
                    chunk.len()
                }
                Slot::Node(child) => {
                    assert_eq!(child.shift + Self::BITS, self.shift);
                    child.check_invariants()
                }
            };
            assert!(len > 0, "empty child");
            total += len;
            assert_eq!(offset, total);
        }

        assert_eq!(self.strict, self.compute_strict());
        total
    }

    pub(crate) fn iter(&self) -> Iter<'_, T, N> {
        Iter {
            stack: vec![self.slots.iter()],
            leaf: [].iter(),
        }
    }
}

/// Iterates over the elements of a trie in position order.
#[derive(Debug)]
pub(crate) struct Iter<'a, T, const N: usize> {
    stack: Vec<slice::Iter<'a, Slot<T, N>>>,
    leaf: slice::Iter<'a, T>,
}

impl<T, const N: usize> Clone for Iter<'_, T, N> {
    fn clone(&self) -> Self {
        Iter {
            stack: self.stack.clone(),
            leaf: self.leaf.clone(),
        }
    }
}

impl<'a, T, const N: usize> Iterator for Iter<'a, T, N> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(ret) = self.leaf.next() {
                return Some(ret);
            }

            let next = loop {
                let iter = self.stack.last_mut()?;
                match iter.next() {
                    Some(next) => break next,
                    None => {
                        self.stack.pop();
                    }
                }
            };

            match next {
                Slot::Leaf(chunk) => self.leaf = chunk.iter(),
                Slot::Node(child) => self.stack.push(child.slots.iter()),
            }
        }
    }
}
