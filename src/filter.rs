use crate::models::{Entry, FilterSelection};

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

/// True when `entry` passes every active filter in `sel`. A selection
/// without a year matches nothing.
pub fn matches(entry: &Entry, sel: &FilterSelection) -> bool {
    let Some(year) = sel.year else {
        return false;
    };
    if entry.year != year {
        return false;
    }
    if let Some(month) = sel.month {
        if entry.month != month {
            return false;
        }
    }
    if let Some(kind) = sel.kind {
        if entry.kind != kind {
            return false;
        }
    }
    if let Some(supplier) = present(&sel.supplier) {
        if entry.supplier.as_deref() != Some(supplier) {
            return false;
        }
    }
    if let Some(category) = present(&sel.category) {
        if entry.category.as_deref() != Some(category) {
            return false;
        }
    }
    true
}

/// Entries matching `sel`, in base order.
pub fn apply<'a>(entries: &'a [Entry], sel: &FilterSelection) -> Vec<&'a Entry> {
    entries.iter().filter(|e| matches(e, sel)).collect()
}
