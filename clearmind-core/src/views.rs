//! Derived views over the cached item list.
//!
//! Pure projections only. Every screen that shows counts or a focus list goes
//! through [`dashboard`] so the numbers can never disagree between views.

use serde::Serialize;

use crate::models::{Category, Item, Status, Subcategory};

/// Items above this priority (and not done) count as high priority.
pub const HIGH_PRIORITY_THRESHOLD: u8 = 7;
pub const FOCUS_LIMIT: usize = 4;

/// Database-view filter state. `None` means "All" for that dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewFilter {
    pub tab: Option<Category>,
    pub status: Option<Status>,
    pub subcategory: Option<Subcategory>,
    pub query: String,
}

impl ViewFilter {
    /// Switching tabs resets the subcategory filter, whose choices depend on the tab.
    pub fn select_tab(&mut self, tab: Option<Category>) {
        self.tab = tab;
        self.subcategory = None;
    }

    pub fn matches(&self, item: &Item) -> bool {
        if self.tab.is_some_and(|tab| item.category != tab) {
            return false;
        }
        if self.status.is_some_and(|status| item.status != status) {
            return false;
        }
        if self
            .subcategory
            .is_some_and(|sub| item.subcategory != Some(sub))
        {
            return false;
        }
        if !self.query.is_empty() {
            let needle = self.query.to_lowercase();
            let in_title = item.title.to_lowercase().contains(&needle);
            let in_description = item
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&needle));
            if !in_title && !in_description {
                return false;
            }
        }
        true
    }
}

/// Subcategory choices offered for a tab: the tab's own set, or every set under "All".
pub fn available_subcategories(tab: Option<Category>) -> Vec<Subcategory> {
    match tab {
        Some(category) => category.subcategories().to_vec(),
        None => Subcategory::ALL.to_vec(),
    }
}

pub fn filter_items<'a>(items: &'a [Item], filter: &ViewFilter) -> Vec<&'a Item> {
    items.iter().filter(|i| filter.matches(i)).collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ItemStats {
    pub pending: usize,
    pub completed: usize,
    pub high_priority: usize,
}

pub fn compute_stats(items: &[Item]) -> ItemStats {
    items.iter().fold(ItemStats::default(), |mut stats, item| {
        if item.status.is_done() {
            stats.completed += 1;
        } else {
            stats.pending += 1;
            if item.priority > HIGH_PRIORITY_THRESHOLD {
                stats.high_priority += 1;
            }
        }
        stats
    })
}

/// Open items by priority, highest first; equal priorities keep list order.
pub fn focus_items(items: &[Item]) -> Vec<&Item> {
    let mut open: Vec<&Item> = items.iter().filter(|i| !i.status.is_done()).collect();
    // `sort_by` is stable.
    open.sort_by(|a, b| b.priority.cmp(&a.priority));
    open.truncate(FOCUS_LIMIT);
    open
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView<'a> {
    pub stats: ItemStats,
    pub focus: Vec<&'a Item>,
}

pub fn dashboard(items: &[Item]) -> DashboardView<'_> {
    DashboardView {
        stats: compute_stats(items),
        focus: focus_items(items),
    }
}

/// The status a "toggle complete" click sends.
pub fn toggled_status(current: Status) -> Status {
    if current.is_done() {
        Status::Pending
    } else {
        Status::Done
    }
}

pub fn greeting(hour: u32) -> &'static str {
    match hour {
        0..=11 => "Good Morning",
        12..=16 => "Good Afternoon",
        _ => "Good Evening",
    }
}
