//! Tree vertices and the rotation primitives
//!
//! Every rebalancing case in [`super::AvlTree`] is composed of one or two
//! of the rotations defined here.

/// Owning link to a child subtree
pub(crate) type Link<T> = Option<Box<Node<T>>>;

/// A single tree vertex
#[derive(Debug, Clone)]
pub(crate) struct Node<T> {
    pub(crate) element: T,
    pub(crate) left: Link<T>,
    pub(crate) right: Link<T>,
    /// Cached subtree height (a leaf is 1)
    pub(crate) height: usize,
}

impl<T> Node<T> {
    /// Creates a boxed leaf holding `element`
    pub(crate) fn leaf(element: T) -> Box<Self> {
        Box::new(Self {
            element,
            left: None,
            right: None,
            height: 1,
        })
    }

    /// Recomputes the cached height from the children
    pub(crate) fn update_height(&mut self) {
        self.height = height(&self.left).max(height(&self.right)) + 1;
    }

    /// Left height minus right height
    pub(crate) fn balance_factor(&self) -> isize {
        height(&self.left) as isize - height(&self.right) as isize
    }
}

/// Height of a possibly absent subtree
pub(crate) fn height<T>(link: &Link<T>) -> usize {
    link.as_ref().map_or(0, |node| node.height)
}

/// Promotes `k2.left` above `k2` and returns it as the new subtree root
pub(crate) fn rotate_right<T>(mut k2: Box<Node<T>>) -> Box<Node<T>> {
    let Some(mut k1) = k2.left.take() else {
        return k2;
    };
    k2.left = k1.right.take();
    k2.update_height();
    k1.right = Some(k2);
    k1.update_height();
    k1
}

/// Promotes `k1.right` above `k1` and returns it as the new subtree root
pub(crate) fn rotate_left<T>(mut k1: Box<Node<T>>) -> Box<Node<T>> {
    let Some(mut k2) = k1.right.take() else {
        return k1;
    };
    k1.right = k2.left.take();
    k1.update_height();
    k2.left = Some(k1);
    k2.update_height();
    k2
}
