//! Left-leaning red-black tree engine (Section 4.4).
//!
//! A red-black variant (Sedgewick) that represents every 2-3 tree 3-node as
//! a black node with a single red *left* child, never a red right child.
//! Three primitives (rotate left, straighten a right-leaning red; rotate
//! right, split two consecutive left-reds; and color flip, split a
//! 4-node) are applied top-down on the way back up from both insertion
//! and deletion, which is what keeps the implementation short relative to
//! the standard red-black engine's bottom-up case analysis.

use std::cmp::Ordering;

use crate::cursor::{self, Linked};
use crate::slab::Slab;

type Id<K, V> = crate::slab::Id<Node<K, V>>;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Color {
    Red,
    Black,
}

struct Node<K, V> {
    key: K,
    value: V,
    /// Color of the link from this node's parent to this node.
    color: Color,
    parent: Option<Id<K, V>>,
    left: Option<Id<K, V>>,
    right: Option<Id<K, V>>,
}

/// A left-leaning red-black ordered map.
///
/// ```
/// use ordinal::LlrbTree;
/// let mut tree = LlrbTree::new();
/// tree.insert(10, "ten");
/// tree.insert(20, "twenty");
/// assert!(tree.contains_key(&10));
/// ```
pub struct LlrbTree<K: Ord, V> {
    nodes: Slab<Node<K, V>>,
    root: Option<Id<K, V>>,
    len: usize,
}

impl<K: Ord, V> LlrbTree<K, V> {
    pub fn new() -> Self {
        LlrbTree {
            nodes: Slab::new(),
            root: None,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn node(&self, id: Id<K, V>) -> &Node<K, V> {
        self.nodes.get(id)
    }

    fn node_mut(&mut self, id: Id<K, V>) -> &mut Node<K, V> {
        self.nodes.get_mut(id)
    }

    fn is_red(&self, id: Option<Id<K, V>>) -> bool {
        id.map(|i| self.node(i).color == Color::Red).unwrap_or(false)
    }

    fn find_id(&self, key: &K) -> Option<Id<K, V>> {
        let mut cur = self.root;
        while let Some(id) = cur {
            cur = match key.cmp(&self.node(id).key) {
                Ordering::Equal => return Some(id),
                Ordering::Less => self.node(id).left,
                Ordering::Greater => self.node(id).right,
            };
        }
        None
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.find_id(key).is_some()
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.find_id(key).map(|id| &self.node(id).value)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let id = self.find_id(key)?;
        Some(&mut self.node_mut(id).value)
    }

    pub fn insert(&mut self, key: K, value: V) -> bool {
        self.insert_impl(key, value, false).0
    }

    pub fn replace(&mut self, key: K, value: V) -> Option<V> {
        self.insert_impl(key, value, true).1
    }

    fn insert_impl(&mut self, key: K, value: V, upsert: bool) -> (bool, Option<V>) {
        let mut inserted = false;
        let mut previous = None;
        let new_root = self.put(self.root, None, key, value, upsert, &mut inserted, &mut previous);
        self.node_mut(new_root).color = Color::Black;
        self.node_mut(new_root).parent = None;
        self.root = Some(new_root);
        if inserted {
            self.len += 1;
        }
        (inserted, previous)
    }

    fn put(
        &mut self,
        h: Option<Id<K, V>>,
        parent: Option<Id<K, V>>,
        key: K,
        value: V,
        upsert: bool,
        inserted: &mut bool,
        previous: &mut Option<V>,
    ) -> Id<K, V> {
        let h = match h {
            None => {
                *inserted = true;
                return self.nodes.insert(Node {
                    key,
                    value,
                    color: Color::Red,
                    parent,
                    left: None,
                    right: None,
                });
            }
            Some(h) => h,
        };
        match key.cmp(&self.node(h).key) {
            Ordering::Less => {
                let l = self.node(h).left;
                let new_l = self.put(l, Some(h), key, value, upsert, inserted, previous);
                self.node_mut(h).left = Some(new_l);
            }
            Ordering::Greater => {
                let r = self.node(h).right;
                let new_r = self.put(r, Some(h), key, value, upsert, inserted, previous);
                self.node_mut(h).right = Some(new_r);
            }
            Ordering::Equal => {
                if upsert {
                    *previous = Some(std::mem::replace(&mut self.node_mut(h).value, value));
                }
            }
        }
        self.balance(h)
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        if !self.contains_key(key) {
            return None;
        }
        let root = self.root.expect("contains_key found a match");
        if !self.is_red(self.node(root).left) && !self.is_red(self.node(root).right) {
            self.node_mut(root).color = Color::Red;
        }
        let mut removed = None;
        let new_root = self.delete(root, key, &mut removed);
        self.root = new_root;
        if let Some(r) = self.root {
            self.node_mut(r).color = Color::Black;
            self.node_mut(r).parent = None;
        }
        if removed.is_some() {
            self.len -= 1;
        }
        removed
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.len = 0;
    }

    fn delete(&mut self, h: Id<K, V>, key: &K, removed: &mut Option<V>) -> Option<Id<K, V>> {
        let mut hh = h;
        if *key < self.node(hh).key {
            let left_red = self.is_red(self.node(hh).left);
            let left_left_red = self
                .node(hh)
                .left
                .map(|l| self.is_red(self.node(l).left))
                .unwrap_or(false);
            if !left_red && !left_left_red {
                hh = self.move_red_left(hh);
            }
            let l = self.node(hh).left.expect("descending left implies a left child");
            let new_l = self.delete(l, key, removed);
            self.node_mut(hh).left = new_l;
        } else {
            if self.is_red(self.node(hh).left) {
                hh = self.rotate_right(hh);
            }
            if key == &self.node(hh).key && self.node(hh).right.is_none() {
                *removed = Some(self.nodes.remove(hh).value);
                return None;
            }
            let right_red = self.is_red(self.node(hh).right);
            let right_left_red = self
                .node(hh)
                .right
                .map(|r| self.is_red(self.node(r).left))
                .unwrap_or(false);
            if !right_red && !right_left_red {
                hh = self.move_red_right(hh);
            }
            if key == &self.node(hh).key {
                let r = self.node(hh).right.expect("key matched and right child exists");
                let succ = cursor::leftmost(self, r);
                self.swap_contents(hh, succ);
                let r = self.node(hh).right.expect("right child still exists after swap");
                let new_r = self.delete_min(r, removed);
                self.node_mut(hh).right = new_r;
            } else {
                let r = self.node(hh).right.expect("key exceeds hh, right child must exist");
                let new_r = self.delete(r, key, removed);
                self.node_mut(hh).right = new_r;
            }
        }
        Some(self.balance(hh))
    }

    /// Removes the minimum node of the subtree rooted at `h`, capturing its
    /// value into `removed`. Used to physically delete the in-order
    /// successor after [`Self::swap_contents`] has relocated its key/value
    /// onto the node the caller actually wants gone.
    fn delete_min(&mut self, h: Id<K, V>, removed: &mut Option<V>) -> Option<Id<K, V>> {
        let mut hh = h;
        if self.node(hh).left.is_none() {
            *removed = Some(self.nodes.remove(hh).value);
            return None;
        }
        let left_red = self.is_red(self.node(hh).left);
        let left_left_red = self
            .node(hh)
            .left
            .map(|l| self.is_red(self.node(l).left))
            .unwrap_or(false);
        if !left_red && !left_left_red {
            hh = self.move_red_left(hh);
        }
        let l = self.node(hh).left.expect("descending left implies a left child");
        let new_l = self.delete_min(l, removed);
        self.node_mut(hh).left = new_l;
        Some(self.balance(hh))
    }

    fn swap_contents(&mut self, a: Id<K, V>, b: Id<K, V>) {
        let (na, nb) = self.nodes.get2_mut(a, b);
        std::mem::swap(&mut na.key, &mut nb.key);
        std::mem::swap(&mut na.value, &mut nb.value);
    }

    /// Restores "current-or-left-child is red" before descending left, by
    /// borrowing red-ness from the right sibling subtree.
    fn move_red_left(&mut self, mut h: Id<K, V>) -> Id<K, V> {
        self.flip_colors(h);
        let r = self.node(h).right.expect("move_red_left needs a right child");
        if self.is_red(self.node(r).left) {
            let new_r = self.rotate_right(r);
            self.node_mut(h).right = Some(new_r);
            h = self.rotate_left(h);
            self.flip_colors(h);
        }
        h
    }

    /// Symmetric to [`Self::move_red_left`], for descending right.
    fn move_red_right(&mut self, mut h: Id<K, V>) -> Id<K, V> {
        self.flip_colors(h);
        let l = self.node(h).left.expect("move_red_right needs a left child");
        if self.is_red(self.node(l).left) {
            h = self.rotate_right(h);
            self.flip_colors(h);
        }
        h
    }

    /// The three top-down rules applied on the way back up from both
    /// insertion and deletion: straighten a right-leaning red, split two
    /// consecutive left-reds, and split a 4-node.
    fn balance(&mut self, mut h: Id<K, V>) -> Id<K, V> {
        if self.is_red(self.node(h).right) && !self.is_red(self.node(h).left) {
            h = self.rotate_left(h);
        }
        if self.is_red(self.node(h).left) {
            let l = self.node(h).left.expect("just checked is_red(left)");
            if self.is_red(self.node(l).left) {
                h = self.rotate_right(h);
            }
        }
        if self.is_red(self.node(h).left) && self.is_red(self.node(h).right) {
            self.flip_colors(h);
        }
        h
    }

    fn toggle_color(&mut self, id: Id<K, V>) {
        let c = self.node(id).color;
        self.node_mut(id).color = if c == Color::Red {
            Color::Black
        } else {
            Color::Red
        };
    }

    fn flip_colors(&mut self, h: Id<K, V>) {
        self.toggle_color(h);
        if let Some(l) = self.node(h).left {
            self.toggle_color(l);
        }
        if let Some(r) = self.node(h).right {
            self.toggle_color(r);
        }
    }

    fn rotate_left(&mut self, y: Id<K, V>) -> Id<K, V> {
        let x = self.node(y).right.expect("rotate_left needs a right child");
        let x_left = self.node(x).left;
        self.node_mut(y).right = x_left;
        if let Some(b) = x_left {
            self.node_mut(b).parent = Some(y);
        }
        let y_parent = self.node(y).parent;
        self.node_mut(x).parent = y_parent;
        self.attach_to_parent(y, y_parent, x);
        self.node_mut(x).left = Some(y);
        self.node_mut(y).parent = Some(x);
        self.node_mut(x).color = self.node(y).color;
        self.node_mut(y).color = Color::Red;
        x
    }

    fn rotate_right(&mut self, y: Id<K, V>) -> Id<K, V> {
        let x = self.node(y).left.expect("rotate_right needs a left child");
        let x_right = self.node(x).right;
        self.node_mut(y).left = x_right;
        if let Some(b) = x_right {
            self.node_mut(b).parent = Some(y);
        }
        let y_parent = self.node(y).parent;
        self.node_mut(x).parent = y_parent;
        self.attach_to_parent(y, y_parent, x);
        self.node_mut(x).right = Some(y);
        self.node_mut(y).parent = Some(x);
        self.node_mut(x).color = self.node(y).color;
        self.node_mut(y).color = Color::Red;
        x
    }

    fn attach_to_parent(&mut self, old: Id<K, V>, parent: Option<Id<K, V>>, new: Id<K, V>) {
        match parent {
            None => self.root = Some(new),
            Some(p) => {
                if self.node(p).left == Some(old) {
                    self.node_mut(p).left = Some(new);
                } else {
                    self.node_mut(p).right = Some(new);
                }
            }
        }
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        let done = self.root.is_none();
        Iter {
            tree: self,
            front: self.root.map(|r| cursor::leftmost(self, r)),
            back: self.root.map(|r| cursor::rightmost(self, r)),
            done,
        }
    }
}

impl<K: Ord, V> Linked for LlrbTree<K, V> {
    type Id = Id<K, V>;
    fn left(&self, id: Self::Id) -> Option<Self::Id> {
        self.node(id).left
    }
    fn right(&self, id: Self::Id) -> Option<Self::Id> {
        self.node(id).right
    }
    fn parent(&self, id: Self::Id) -> Option<Self::Id> {
        self.node(id).parent
    }
}

impl<K: Ord, V> Default for LlrbTree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, K: Ord, V> IntoIterator for &'a LlrbTree<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Bidirectional in-order cursor (Section 4.7).
pub struct Iter<'a, K: Ord, V> {
    tree: &'a LlrbTree<K, V>,
    front: Option<Id<K, V>>,
    back: Option<Id<K, V>>,
    done: bool,
}

impl<'a, K: Ord, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let id = self.front?;
        let node = self.tree.node(id);
        if Some(id) == self.back {
            self.done = true;
        } else {
            self.front = cursor::successor(self.tree, id);
        }
        Some((&node.key, &node.value))
    }
}

impl<'a, K: Ord, V> DoubleEndedIterator for Iter<'a, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let id = self.back?;
        let node = self.tree.node(id);
        if Some(id) == self.front {
            self.done = true;
        } else {
            self.back = cursor::predecessor(self.tree, id);
        }
        Some((&node.key, &node.value))
    }
}
