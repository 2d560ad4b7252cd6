use std::collections::HashSet;
use std::hash::Hash;

/// Remove duplicates, keeping the first occurrence of each value and the
/// original order otherwise.
pub fn distinct<T, I>(items: I) -> Vec<T>
where
    T: Eq + Hash + Clone,
    I: IntoIterator<Item = T>,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}
