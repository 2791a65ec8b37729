//! Plain-text rendering for the terminal pages. Everything here is pure.

use std::fmt::Write;

use clearmind_core::models::{ChatMessage, Item, Role, Status, User};
use clearmind_core::views::DashboardView;
use clearmind_core::{ClearMindError, Route};

const TITLE_WIDTH: usize = 40;

pub fn status_label(status: Status) -> &'static str {
    match status {
        Status::Pending => "Pending",
        Status::InProgress => "In Progress",
        Status::Done => "Done",
        Status::Archived => "Archived",
    }
}

fn checkbox(status: Status) -> &'static str {
    if status.is_done() {
        "[x]"
    } else {
        "[ ]"
    }
}

/// Truncate on a char boundary, marking the cut with "...".
pub fn clip(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(3)).collect();
    format!("{kept}...")
}

/// One list row: `[ ] #12  Title  task/habit  P7  Pending  due 2025-03-01  (Health)`.
pub fn item_line(item: &Item) -> String {
    let kind = match item.subcategory {
        Some(sub) => format!("{}/{}", item.category, sub),
        None => item.category.to_string(),
    };
    let mut line = format!(
        "{} #{:<4} {:<width$}  {:<18} P{:<2}  {}",
        checkbox(item.status),
        item.id,
        clip(&item.title, TITLE_WIDTH),
        kind,
        item.priority,
        status_label(item.status),
        width = TITLE_WIDTH,
    );
    if let Some(deadline) = item.deadline {
        let _ = write!(line, "  due {}", deadline.format("%Y-%m-%d"));
    }
    if let Some(area) = item.life_area.as_deref().filter(|a| !a.is_empty()) {
        let _ = write!(line, "  ({area})");
    }
    line
}

pub fn item_list(items: &[&Item]) -> String {
    if items.is_empty() {
        return "No items found.".to_string();
    }
    let mut out = String::new();
    for item in items {
        out.push_str(&item_line(item));
        out.push('\n');
    }
    let _ = write!(out, "{} item(s)", items.len());
    out
}

/// Pretty JSON array for `items list --json`.
pub fn items_json(items: &[&Item]) -> clearmind_core::Result<String> {
    serde_json::to_string_pretty(items).map_err(ClearMindError::Encode)
}

pub fn item_detail(item: &Item) -> String {
    let mut out = item_line(item);
    if let Some(desc) = item.description.as_deref().filter(|d| !d.is_empty()) {
        let _ = write!(out, "\n    {desc}");
    }
    out
}

pub fn dashboard(greeting: &str, user: &User, view: &DashboardView<'_>) -> String {
    let mut out = format!("{greeting}, {}\n\n", user.display_name());
    let _ = writeln!(out, "  Pending tasks   {}", view.stats.pending);
    let _ = writeln!(out, "  Completed       {}", view.stats.completed);
    let _ = writeln!(out, "  High priority   {}", view.stats.high_priority);
    out.push_str("\nToday's focus\n");
    if view.focus.is_empty() {
        out.push_str("  Nothing pending. Enjoy the calm.");
    } else {
        let lines: Vec<String> = view.focus.iter().map(|i| format!("  {}", item_line(i))).collect();
        out.push_str(&lines.join("\n"));
    }
    out
}

pub fn chat_message(message: &ChatMessage) -> String {
    let who = match message.role {
        Role::User => "you",
        Role::Assistant => "clearmind",
    };
    let mut out = format!("{} {who}> {}", message.sent_at.format("%H:%M"), message.content);
    for item in &message.items {
        let kind = match item.subcategory {
            Some(sub) => format!("{}/{}", item.category, sub),
            None => item.category.to_string(),
        };
        let _ = write!(out, "\n    + {} ({kind}, P{})", item.title, item.priority);
        if let Some(deadline) = item.deadline.as_deref() {
            let _ = write!(out, " due {deadline}");
        }
    }
    out
}

pub fn user(user: &User) -> String {
    let mut out = format!("{} <{}>", user.display_name(), user.email);
    if let Some(occupation) = user.occupation.as_deref().filter(|o| !o.is_empty()) {
        let _ = write!(out, "\n  Occupation:  {occupation}");
    }
    if !user.life_areas.is_empty() {
        let _ = write!(out, "\n  Life areas:  {}", user.life_areas.join(", "));
    }
    for (key, value) in &user.goals {
        let _ = write!(out, "\n  Goal ({key}):  {value}");
    }
    for (key, value) in &user.personality {
        let _ = write!(out, "\n  Personality ({key}):  {value}");
    }
    if let Some(joined) = user.created_at {
        let _ = write!(out, "\n  Member since {}", joined.format("%B %Y"));
    }
    out
}

/// Collapsed sidebars show only the entries' initials.
pub fn sidebar(collapsed: bool) -> String {
    Route::navigation()
        .iter()
        .map(|(label, route)| {
            if collapsed {
                label.chars().take(1).collect()
            } else {
                format!("{label:<14}{}", route.path())
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
