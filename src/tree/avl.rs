//! Height-balanced binary search tree
//!
//! Every structural operation is written as a function that takes ownership
//! of a subtree and returns its (possibly new) root, which the caller
//! reattaches. Heights are recomputed and rotations applied on the way back
//! up, so no public method ever returns with an unbalanced tree.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::iter::FusedIterator;

use super::node::{rotate_left, rotate_right, Link, Node};

/// An AVL tree holding unique, totally ordered elements
///
/// Inserting an element that compares equal to one already stored is a
/// no-op. Lookups and removals accept any borrowed form of the element, the
/// same way [`std::collections::BTreeSet`] does.
#[derive(Clone)]
pub struct AvlTree<T> {
    root: Link<T>,
    len: usize,
}

impl<T> AvlTree<T> {
    /// Creates an empty tree
    pub fn new() -> Self {
        Self { root: None, len: 0 }
    }

    /// Returns true if the tree holds no elements
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns the number of elements
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns the height of the tree (0 when empty, 1 for a single element)
    pub fn height(&self) -> usize {
        super::node::height(&self.root)
    }

    /// Drops every node, leaving the tree empty
    pub fn make_empty(&mut self) {
        self.root = None;
        self.len = 0;
    }

    /// Returns the smallest element, or None if the tree is empty
    pub fn find_min(&self) -> Option<&T> {
        let mut node = self.root.as_deref()?;
        while let Some(left) = node.left.as_deref() {
            node = left;
        }
        Some(&node.element)
    }

    /// Returns the largest element, or None if the tree is empty
    pub fn find_max(&self) -> Option<&T> {
        let mut node = self.root.as_deref()?;
        while let Some(right) = node.right.as_deref() {
            node = right;
        }
        Some(&node.element)
    }

    /// Iterates over the elements in ascending order
    ///
    /// The traversal is lazy; calling `iter` again starts over from the
    /// smallest element.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(&self.root, self.len)
    }
}

impl<T: Ord> AvlTree<T> {
    /// Inserts an element, returning false if an equal element was already present
    pub fn insert(&mut self, element: T) -> bool {
        let mut inserted = false;
        self.root = Some(insert_into(self.root.take(), element, &mut inserted));
        if inserted {
            self.len += 1;
        }
        inserted
    }

    /// Removes the element matching `key`, returning whether one was found
    pub fn remove<Q>(&mut self, key: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.take(key).is_some()
    }

    /// Removes and returns the element matching `key`
    pub fn take<Q>(&mut self, key: &Q) -> Option<T>
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut removed = None;
        self.root = remove_from(self.root.take(), key, &mut removed);
        if removed.is_some() {
            self.len -= 1;
        }
        removed
    }

    /// Returns the stored element matching `key`
    pub fn find<Q>(&self, key: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut current = self.root.as_deref();
        while let Some(node) = current {
            match key.cmp(node.element.borrow()) {
                Ordering::Less => current = node.left.as_deref(),
                Ordering::Greater => current = node.right.as_deref(),
                Ordering::Equal => return Some(&node.element),
            }
        }
        None
    }

    /// Returns a mutable reference to the stored element matching `key`
    ///
    /// The caller must not change anything that affects the element's
    /// ordering.
    pub fn find_mut<Q>(&mut self, key: &Q) -> Option<&mut T>
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut current = self.root.as_deref_mut();
        while let Some(node) = current {
            match key.cmp(node.element.borrow()) {
                Ordering::Less => current = node.left.as_deref_mut(),
                Ordering::Greater => current = node.right.as_deref_mut(),
                Ordering::Equal => return Some(&mut node.element),
            }
        }
        None
    }

    /// Returns true if an element matching `key` is stored
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key).is_some()
    }
}

fn insert_into<T: Ord>(link: Link<T>, element: T, inserted: &mut bool) -> Box<Node<T>> {
    let Some(mut node) = link else {
        *inserted = true;
        return Node::leaf(element);
    };

    match element.cmp(&node.element) {
        Ordering::Less => node.left = Some(insert_into(node.left.take(), element, inserted)),
        Ordering::Greater => node.right = Some(insert_into(node.right.take(), element, inserted)),
        // Duplicate: leave the stored element in place
        Ordering::Equal => {}
    }

    rebalance(node)
}

fn remove_from<T, Q>(link: Link<T>, key: &Q, removed: &mut Option<T>) -> Link<T>
where
    T: Borrow<Q>,
    Q: Ord + ?Sized,
{
    let mut node = link?;

    match key.cmp(node.element.borrow()) {
        Ordering::Less => node.left = remove_from(node.left.take(), key, removed),
        Ordering::Greater => node.right = remove_from(node.right.take(), key, removed),
        Ordering::Equal => match (node.left.take(), node.right.take()) {
            (None, None) => {
                let Node { element, .. } = *node;
                *removed = Some(element);
                return None;
            }
            // Only a left subtree: its maximum takes this node's place
            (Some(left), None) => {
                let (rest, predecessor) = detach_max(left);
                node.left = rest;
                *removed = Some(std::mem::replace(&mut node.element, predecessor));
            }
            // Right subtree present: its minimum takes this node's place
            (left, Some(right)) => {
                let (rest, successor) = detach_min(right);
                node.left = left;
                node.right = rest;
                *removed = Some(std::mem::replace(&mut node.element, successor));
            }
        },
    }

    Some(rebalance(node))
}

/// Removes the leftmost node of a subtree, rebalancing on the way back up
fn detach_min<T>(mut node: Box<Node<T>>) -> (Link<T>, T) {
    match node.left.take() {
        Some(left) => {
            let (rest, min) = detach_min(left);
            node.left = rest;
            (Some(rebalance(node)), min)
        }
        None => {
            let Node { element, right, .. } = *node;
            (right, element)
        }
    }
}

/// Removes the rightmost node of a subtree, rebalancing on the way back up
fn detach_max<T>(mut node: Box<Node<T>>) -> (Link<T>, T) {
    match node.right.take() {
        Some(right) => {
            let (rest, max) = detach_max(right);
            node.right = rest;
            (Some(rebalance(node)), max)
        }
        None => {
            let Node { element, left, .. } = *node;
            (left, element)
        }
    }
}

/// Restores the balance invariant at `node` after one of its subtrees changed
///
/// The single-vs-double rotation case is picked from the overweight child's
/// own balance, never from the key that triggered the change.
fn rebalance<T>(mut node: Box<Node<T>>) -> Box<Node<T>> {
    node.update_height();
    let factor = node.balance_factor();

    if factor > 1 {
        // Left-Right: straighten the left child first
        if node.left.as_ref().is_some_and(|left| left.balance_factor() < 0) {
            node.left = node.left.take().map(rotate_left);
        }
        rotate_right(node)
    } else if factor < -1 {
        // Right-Left: straighten the right child first
        if node.right.as_ref().is_some_and(|right| right.balance_factor() > 0) {
            node.right = node.right.take().map(rotate_right);
        }
        rotate_left(node)
    } else {
        node
    }
}

impl<T> Default for AvlTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for AvlTree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T: Ord> FromIterator<T> for AvlTree<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<T: Ord> Extend<T> for AvlTree<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for element in iter {
            self.insert(element);
        }
    }
}

impl<'a, T> IntoIterator for &'a AvlTree<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// In-order iterator over an [`AvlTree`]
pub struct Iter<'a, T> {
    stack: Vec<&'a Node<T>>,
    remaining: usize,
}

impl<'a, T> Iter<'a, T> {
    fn new(root: &'a Link<T>, len: usize) -> Self {
        let mut iter = Self {
            stack: Vec::new(),
            remaining: len,
        };
        iter.push_left_spine(root.as_deref());
        iter
    }

    fn push_left_spine(&mut self, mut node: Option<&'a Node<T>>) {
        while let Some(current) = node {
            self.stack.push(current);
            node = current.left.as_deref();
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left_spine(node.right.as_deref());
        self.remaining = self.remaining.saturating_sub(1);
        Some(&node.element)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}
