//! Red-black tree engine (Section 4.3).
//!
//! A binary search tree with one bit of color per node, red or black,
//! constrained so that no root-to-leaf path is more than twice as long as
//! any other. Insertion repairs the tree by alternating recoloring (red
//! uncle) and a single rotate+recolor (black uncle); deletion tracks a
//! conceptual "double-black" token up the tree until a recolor or rotation
//! absorbs it.

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
    color: Color,
    parent: Option<Id<K, V>>,
    left: Option<Id<K, V>>,
    right: Option<Id<K, V>>,
}

/// A red-black ordered map.
///
/// ```
/// use ordinal::RbTree;
/// let mut tree = RbTree::new();
/// tree.insert(1, "one");
/// tree.insert(2, "two");
/// assert_eq!(tree.remove(&1), Some("one"));
/// ```
pub struct RbTree<K: Ord, V> {
    nodes: Slab<Node<K, V>>,
    root: Option<Id<K, V>>,
    len: usize,
}

impl<K: Ord, V> RbTree<K, V> {
    pub fn new() -> Self {
        RbTree {
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

    fn color(&self, id: Id<K, V>) -> Color {
        self.node(id).color
    }

    /// Nil (`None`) links are conceptually black, per the usual
    /// sentinel-free red-black convention.
    fn color_of(&self, id: Option<Id<K, V>>) -> Color {
        id.map(|i| self.color(i)).unwrap_or(Color::Black)
    }

    fn set_color(&mut self, id: Id<K, V>, color: Color) {
        self.node_mut(id).color = color;
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
        let root = match self.root {
            None => {
                let id = self.nodes.insert(Node {
                    key,
                    value,
                    color: Color::Black,
                    parent: None,
                    left: None,
                    right: None,
                });
                self.root = Some(id);
                self.len = 1;
                return (true, None);
            }
            Some(root) => root,
        };

        let mut cur = root;
        loop {
            match key.cmp(&self.node(cur).key) {
                Ordering::Equal => {
                    if upsert {
                        let old = std::mem::replace(&mut self.node_mut(cur).value, value);
                        return (false, Some(old));
                    }
                    return (false, None);
                }
                Ordering::Less => match self.node(cur).left {
                    Some(l) => cur = l,
                    None => {
                        let id = self.new_red(key, value, Some(cur));
                        self.node_mut(cur).left = Some(id);
                        self.len += 1;
                        self.fixup_insert(id);
                        return (true, None);
                    }
                },
                Ordering::Greater => match self.node(cur).right {
                    Some(r) => cur = r,
                    None => {
                        let id = self.new_red(key, value, Some(cur));
                        self.node_mut(cur).right = Some(id);
                        self.len += 1;
                        self.fixup_insert(id);
                        return (true, None);
                    }
                },
            }
        }
    }

    fn new_red(&mut self, key: K, value: V, parent: Option<Id<K, V>>) -> Id<K, V> {
        self.nodes.insert(Node {
            key,
            value,
            color: Color::Red,
            parent,
            left: None,
            right: None,
        })
    }

    /// RB-INSERT-FIXUP: while the parent is red, either recolor through
    /// the grandparent (red uncle) or rotate once and stop (black uncle).
    fn fixup_insert(&mut self, mut z: Id<K, V>) {
        while let Some(p) = self.node(z).parent {
            if self.color(p) == Color::Black {
                break;
            }
            let gp = self.node(p).parent.expect(
                "a red node's parent cannot be the root, since the root is always black",
            );
            if Some(p) == self.node(gp).left {
                let uncle = self.node(gp).right;
                if self.color_of(uncle) == Color::Red {
                    self.set_color(p, Color::Black);
                    self.set_color(uncle.unwrap(), Color::Black);
                    self.set_color(gp, Color::Red);
                    z = gp;
                } else {
                    if Some(z) == self.node(p).right {
                        z = p;
                        self.rotate_left(z);
                    }
                    let p2 = self.node(z).parent.unwrap();
                    let gp2 = self.node(p2).parent.unwrap();
                    self.set_color(p2, Color::Black);
                    self.set_color(gp2, Color::Red);
                    self.rotate_right(gp2);
                    break;
                }
            } else {
                let uncle = self.node(gp).left;
                if self.color_of(uncle) == Color::Red {
                    self.set_color(p, Color::Black);
                    self.set_color(uncle.unwrap(), Color::Black);
                    self.set_color(gp, Color::Red);
                    z = gp;
                } else {
                    if Some(z) == self.node(p).left {
                        z = p;
                        self.rotate_right(z);
                    }
                    let p2 = self.node(z).parent.unwrap();
                    let gp2 = self.node(p2).parent.unwrap();
                    self.set_color(p2, Color::Black);
                    self.set_color(gp2, Color::Red);
                    self.rotate_left(gp2);
                    break;
                }
            }
        }
        self.set_color(self.root.unwrap(), Color::Black);
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        let z = self.find_id(key)?;
        Some(self.delete_node(z))
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.len = 0;
    }

    fn delete_node(&mut self, z: Id<K, V>) -> V {
        let mut y = z;
        let mut y_original_color = self.color(y);
        let x: Option<Id<K, V>>;
        let x_parent: Option<Id<K, V>>;

        if self.node(z).left.is_none() {
            x = self.node(z).right;
            x_parent = self.node(z).parent;
            self.transplant(z, x);
        } else if self.node(z).right.is_none() {
            x = self.node(z).left;
            x_parent = self.node(z).parent;
            self.transplant(z, x);
        } else {
            y = cursor::leftmost(self, self.node(z).right.unwrap());
            y_original_color = self.color(y);
            let y_right = self.node(y).right;
            if self.node(y).parent == Some(z) {
                x = y_right;
                x_parent = Some(y);
            } else {
                x = y_right;
                x_parent = self.node(y).parent;
                self.transplant(y, y_right);
                let z_right = self.node(z).right;
                self.node_mut(y).right = z_right;
                if let Some(r) = z_right {
                    self.node_mut(r).parent = Some(y);
                }
            }
            self.transplant(z, Some(y));
            let z_left = self.node(z).left;
            self.node_mut(y).left = z_left;
            if let Some(l) = z_left {
                self.node_mut(l).parent = Some(y);
            }
            self.set_color(y, self.color(z));
        }

        let removed = self.nodes.remove(z);
        self.len -= 1;

        if y_original_color == Color::Black {
            self.fixup_delete(x, x_parent);
        }

        removed.value
    }

    /// Replaces the subtree rooted at `u` with the subtree rooted at `v`
    /// (which may be nil), rewiring `u`'s parent link.
    fn transplant(&mut self, u: Id<K, V>, v: Option<Id<K, V>>) {
        let u_parent = self.node(u).parent;
        match u_parent {
            None => self.root = v,
            Some(p) => {
                if self.node(p).left == Some(u) {
                    self.node_mut(p).left = v;
                } else {
                    self.node_mut(p).right = v;
                }
            }
        }
        if let Some(vi) = v {
            self.node_mut(vi).parent = u_parent;
        }
    }

    /// RB-DELETE-FIXUP. `x` is the node (possibly nil) that now carries a
    /// double-black token; `x_parent` is tracked explicitly because a nil
    /// `x` cannot itself carry a parent link.
    fn fixup_delete(&mut self, mut x: Option<Id<K, V>>, mut x_parent: Option<Id<K, V>>) {
        while x != self.root && self.color_of(x) == Color::Black {
            let p = match x_parent {
                Some(p) => p,
                None => break,
            };
            if x == self.node(p).left {
                let mut w = self
                    .node(p)
                    .right
                    .expect("sibling must exist to balance black-height");
                if self.color(w) == Color::Red {
                    self.set_color(w, Color::Black);
                    self.set_color(p, Color::Red);
                    self.rotate_left(p);
                    w = self.node(p).right.expect("sibling exists after rotation");
                }
                if self.color_of(self.node(w).left) == Color::Black
                    && self.color_of(self.node(w).right) == Color::Black
                {
                    self.set_color(w, Color::Red);
                    x = Some(p);
                    x_parent = self.node(p).parent;
                } else {
                    if self.color_of(self.node(w).right) == Color::Black {
                        if let Some(wl) = self.node(w).left {
                            self.set_color(wl, Color::Black);
                        }
                        self.set_color(w, Color::Red);
                        self.rotate_right(w);
                        w = self.node(p).right.expect("sibling exists after rotation");
                    }
                    self.set_color(w, self.color(p));
                    self.set_color(p, Color::Black);
                    if let Some(wr) = self.node(w).right {
                        self.set_color(wr, Color::Black);
                    }
                    self.rotate_left(p);
                    x = self.root;
                    x_parent = None;
                }
            } else {
                let mut w = self
                    .node(p)
                    .left
                    .expect("sibling must exist to balance black-height");
                if self.color(w) == Color::Red {
                    self.set_color(w, Color::Black);
                    self.set_color(p, Color::Red);
                    self.rotate_right(p);
                    w = self.node(p).left.expect("sibling exists after rotation");
                }
                if self.color_of(self.node(w).right) == Color::Black
                    && self.color_of(self.node(w).left) == Color::Black
                {
                    self.set_color(w, Color::Red);
                    x = Some(p);
                    x_parent = self.node(p).parent;
                } else {
                    if self.color_of(self.node(w).left) == Color::Black {
                        if let Some(wr) = self.node(w).right {
                            self.set_color(wr, Color::Black);
                        }
                        self.set_color(w, Color::Red);
                        self.rotate_left(w);
                        w = self.node(p).left.expect("sibling exists after rotation");
                    }
                    self.set_color(w, self.color(p));
                    self.set_color(p, Color::Black);
                    if let Some(wl) = self.node(w).left {
                        self.set_color(wl, Color::Black);
                    }
                    self.rotate_right(p);
                    x = self.root;
                    x_parent = None;
                }
            }
        }
        if let Some(xi) = x {
            self.set_color(xi, Color::Black);
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

impl<K: Ord, V> Linked for RbTree<K, V> {
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

impl<K: Ord, V> Default for RbTree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, K: Ord, V> IntoIterator for &'a RbTree<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Bidirectional in-order cursor (Section 4.7).
pub struct Iter<'a, K: Ord, V> {
    tree: &'a RbTree<K, V>,
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
