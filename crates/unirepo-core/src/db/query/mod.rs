mod projection;

use crate::{db::Loaded, db::predicate::Predicate, traits::FieldValues};
use std::fmt;

///
/// Query
///
/// Lazy, composable queryable handed to caller-supplied shapers. Nothing
/// runs until a terminal call (`first`, `into_vec`, `count`, iteration).
///

pub struct Query<'a, T> {
    iter: Box<dyn Iterator<Item = T> + 'a>,
}

impl<'a, T: 'a> Query<'a, T> {
    pub fn new(iter: impl Iterator<Item = T> + 'a) -> Self {
        Self {
            iter: Box::new(iter),
        }
    }

    #[must_use]
    pub fn from_vec(items: Vec<T>) -> Self {
        Self::new(items.into_iter())
    }

    ///
    /// COMPOSITION
    ///

    #[must_use]
    pub fn filter<'b>(self, f: impl FnMut(&T) -> bool + 'b) -> Query<'b, T>
    where
        'a: 'b,
        T: 'b,
    {
        Query::new(self.iter.filter(f))
    }

    #[must_use]
    pub fn map<'b, U: 'b>(self, f: impl FnMut(T) -> U + 'b) -> Query<'b, U>
    where
        'a: 'b,
        T: 'b,
    {
        Query::new(self.iter.map(f))
    }

    #[must_use]
    pub fn skip(self, n: usize) -> Self {
        Self::new(self.iter.skip(n))
    }

    #[must_use]
    pub fn take(self, n: usize) -> Self {
        Self::new(self.iter.take(n))
    }

    /// Stable sort by a derived key. Buffers the remaining items.
    #[must_use]
    pub fn order_by<K: Ord>(self, mut f: impl FnMut(&T) -> K) -> Self {
        let mut items: Vec<T> = self.iter.collect();
        items.sort_by_key(|item| f(item));

        Self::from_vec(items)
    }

    ///
    /// TERMINALS
    ///

    #[must_use]
    pub fn first(mut self) -> Option<T> {
        self.iter.next()
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<T> {
        self.iter.collect()
    }

    #[must_use]
    pub fn count(self) -> usize {
        self.iter.count()
    }
}

impl<'a, T: FieldValues + 'a> Query<'a, T> {
    /// Keep items matching `predicate`.
    #[must_use]
    pub fn filter_by(self, predicate: &Predicate) -> Self {
        let predicate = predicate.clone();

        Self::new(self.iter.filter(move |item| predicate.matches(item)))
    }
}

impl<'a, E: 'a> Query<'a, Loaded<E>> {
    /// Sort by storage key.
    #[must_use]
    pub fn order_by_key(self) -> Self {
        let mut items: Vec<Loaded<E>> = self.iter.collect();
        items.sort_by(|a, b| a.key().cmp(b.key()));

        Self::from_vec(items)
    }
}

impl<T> Iterator for Query<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.iter.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl<T> fmt::Debug for Query<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query").finish_non_exhaustive()
    }
}
