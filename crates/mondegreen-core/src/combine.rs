//! Cartesian combination of choice sets.
//!
//! Used twice in the pipeline: to enumerate a phrase's pronunciation variants
//! (one choice set per word) and to assemble candidate phrases (one choice set
//! of matching words per segment).

/// A set of options for one position.
///
/// Nested choices are flattened to their scalar leaves before the product is
/// taken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choice<T> {
    /// A flat list of options.
    Flat(Vec<T>),
    /// A list of choices whose leaves are all options for this position.
    Nested(Vec<Choice<T>>),
}

impl<T: Clone> Choice<T> {
    /// All scalar options, depth-first, in order.
    pub fn leaves(&self) -> Vec<T> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves(&self, out: &mut Vec<T>) {
        match self {
            Self::Flat(items) => out.extend(items.iter().cloned()),
            Self::Nested(children) => {
                for child in children {
                    child.collect_leaves(out);
                }
            }
        }
    }
}

impl<T> From<Vec<T>> for Choice<T> {
    fn from(items: Vec<T>) -> Self {
        Self::Flat(items)
    }
}

/// Lazy cartesian product over option pools.
///
/// The last position varies fastest. An empty list of pools yields exactly one
/// empty assignment; any empty pool yields nothing.
#[derive(Debug, Clone)]
pub struct CartesianProduct<T> {
    pools: Vec<Vec<T>>,
    indices: Vec<usize>,
    done: bool,
    produced: usize,
}

impl<T: Clone> CartesianProduct<T> {
    /// Product over already-flat pools.
    pub fn new(pools: Vec<Vec<T>>) -> Self {
        let done = pools.iter().any(Vec::is_empty);
        let indices = vec![0; pools.len()];
        Self {
            pools,
            indices,
            done,
            produced: 0,
        }
    }

    /// Product over choices, flattening each one first.
    pub fn from_choices(choices: &[Choice<T>]) -> Self {
        Self::new(choices.iter().map(Choice::leaves).collect())
    }

    /// Total number of assignments, or `None` if it overflows `usize`.
    pub fn total(&self) -> Option<usize> {
        self.pools
            .iter()
            .try_fold(1usize, |acc, pool| acc.checked_mul(pool.len()))
    }

    fn advance(&mut self) {
        for pos in (0..self.indices.len()).rev() {
            self.indices[pos] += 1;
            if self.indices[pos] < self.pools[pos].len() {
                return;
            }
            self.indices[pos] = 0;
        }
        self.done = true;
    }
}

impl<T: Clone> Iterator for CartesianProduct<T> {
    type Item = Vec<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let current = self
            .indices
            .iter()
            .zip(&self.pools)
            .map(|(&idx, pool)| pool[idx].clone())
            .collect();
        self.produced += 1;
        self.advance();
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done {
            return (0, Some(0));
        }
        match self.total() {
            Some(total) => {
                let remaining = total - self.produced;
                (remaining, Some(remaining))
            }
            None => (usize::MAX, None),
        }
    }
}

/// Every assignment of one option per choice, in positional order.
///
/// No filtering and no deduplication: duplicate leaves give duplicate tuples.
pub fn expand<T: Clone>(choices: &[Choice<T>]) -> Vec<Vec<T>> {
    CartesianProduct::from_choices(choices).collect()
}
