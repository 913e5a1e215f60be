//! # Balanced Search Tree
//!
//! A generic AVL tree: a binary search tree in which the two subtrees of
//! every node differ in height by at most one.
//!
//! | Operation | Cost |
//! |-----------|------|
//! | `insert`, `remove`, `take` | O(log n) |
//! | `find`, `find_mut`, `contains` | O(log n) |
//! | `find_min`, `find_max` | O(log n) |
//! | `is_empty`, `len`, `make_empty` | O(1) |
//! | `iter` (full walk) | O(n) |
//!
//! Elements only need [`Ord`]. Equal elements are never stored twice.
//!
//! ```
//! use agenda_cli::tree::AvlTree;
//!
//! let mut tree: AvlTree<u32> = [20, 10, 30].into_iter().collect();
//! tree.insert(5);
//! assert!(tree.remove(&10));
//! assert_eq!(tree.iter().copied().collect::<Vec<_>>(), vec![5, 20, 30]);
//! ```

mod avl;
mod node;

pub use avl::{AvlTree, Iter};
