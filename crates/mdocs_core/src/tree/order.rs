//! Sibling ordering: directories first, then case-insensitive by name
//! (directories) or id (files).

use std::cmp::Ordering;

/// Fields that decide where a node sorts among its siblings.
#[derive(Debug, Clone, Copy)]
pub struct SortKey<'a> {
    pub is_dir: bool,
    pub name: &'a str,
    pub id: &'a str,
}

/// Compare two siblings.
pub fn compare(a: SortKey<'_>, b: SortKey<'_>) -> Ordering {
    match (a.is_dir, b.is_dir) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (true, true) => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        (false, false) => a.id.to_lowercase().cmp(&b.id.to_lowercase()),
    }
}
