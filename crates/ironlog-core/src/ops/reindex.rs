//! Contiguous `order_index` assignment for owned child lists

/// A child entity positioned by `order_index` within its parent
pub trait Ordered: Sized {
    fn order_index(&self) -> u32;

    /// Return the same child at a new position
    fn with_order_index(self, order_index: u32) -> Self;
}

/// Renumber children `0..n` in the order given
///
/// The input order is authoritative; existing `order_index` values are
/// ignored. Applying `reindex` twice yields the same list.
pub fn reindex<T, I>(children: I) -> Vec<T>
where
    T: Ordered,
    I: IntoIterator<Item = T>,
{
    children
        .into_iter()
        .enumerate()
        .map(|(position, child)| child.with_order_index(position as u32))
        .collect()
}

/// True when `order_index` runs 0, 1, 2, ... in list order
pub fn is_contiguous<T: Ordered>(children: &[T]) -> bool {
    children
        .iter()
        .enumerate()
        .all(|(position, child)| child.order_index() == position as u32)
}
