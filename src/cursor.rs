//! Iterator machinery (Section 4.7) shared by the AVL, red-black and
//! left-leaning red-black engines.
//!
//! All three engines are plain binary search trees with a `parent`
//! back-link; the in-order successor/predecessor walk is identical across
//! them, so it lives here once behind a small [`Linked`] accessor trait
//! instead of being re-derived per engine.

/// Gives the generic successor/predecessor walk read-only access to one
/// engine's node shape, without caring about keys, values, heights or
/// colors.
pub(crate) trait Linked {
    type Id: Copy + Eq;

    fn left(&self, id: Self::Id) -> Option<Self::Id>;
    fn right(&self, id: Self::Id) -> Option<Self::Id>;
    fn parent(&self, id: Self::Id) -> Option<Self::Id>;
}

/// Descends to the leftmost descendant of `id`, inclusive of `id` itself.
pub(crate) fn leftmost<T: Linked>(tree: &T, mut id: T::Id) -> T::Id {
    while let Some(left) = tree.left(id) {
        id = left;
    }
    id
}

/// Descends to the rightmost descendant of `id`, inclusive of `id` itself.
pub(crate) fn rightmost<T: Linked>(tree: &T, mut id: T::Id) -> T::Id {
    while let Some(right) = tree.right(id) {
        id = right;
    }
    id
}

/// In-order successor of `id`, or `None` if `id` holds the maximum key.
///
/// If `id` has a right child, the successor is the leftmost node of that
/// subtree. Otherwise walk up through parents until arriving at a node
/// from its left child: that ancestor is the successor, or there is none
/// if the walk reaches the root from its right side.
pub(crate) fn successor<T: Linked>(tree: &T, id: T::Id) -> Option<T::Id> {
    if let Some(right) = tree.right(id) {
        return Some(leftmost(tree, right));
    }
    let mut child = id;
    let mut parent = tree.parent(id);
    while let Some(p) = parent {
        if tree.left(p) == Some(child) {
            return Some(p);
        }
        child = p;
        parent = tree.parent(p);
    }
    None
}

/// In-order predecessor of `id`, symmetric to [`successor`].
pub(crate) fn predecessor<T: Linked>(tree: &T, id: T::Id) -> Option<T::Id> {
    if let Some(left) = tree.left(id) {
        return Some(rightmost(tree, left));
    }
    let mut child = id;
    let mut parent = tree.parent(id);
    while let Some(p) = parent {
        if tree.right(p) == Some(child) {
            return Some(p);
        }
        child = p;
        parent = tree.parent(p);
    }
    None
}
