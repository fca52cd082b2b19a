//! Plain-text rendering of the feed

use std::collections::HashSet;

use postwall_feed::domain::entities::{FeedItem, FeedItemId};
use postwall_feed::{FeedStatus, FeedView};

pub fn render_item(item: &FeedItem) -> String {
    let mut out = format!("── {} · {}", item.author, item.id);
    if let Some(title) = &item.title {
        out.push_str(&format!("\n   {}", title));
    }
    for line in item.body.lines() {
        out.push_str(&format!("\n   {}", line));
    }
    if !item.tags.is_empty() {
        let tags: Vec<&str> = item.tags.iter().map(String::as_str).collect();
        out.push_str(&format!("\n   tags: {}", tags.join(", ")));
    }
    if let Some(media) = &item.media_url {
        out.push_str(&format!("\n   [image] {}", media));
    }
    out.push_str(&format!(
        "\n   ♥ {}  💬 {}",
        item.like_count, item.comment_count
    ));
    out
}

/// Prints each post once, plus a line whenever the feed status changes
#[derive(Default)]
pub struct FeedPrinter {
    printed: HashSet<FeedItemId>,
    last_status: Option<FeedStatus>,
}

impl FeedPrinter {
    /// Forget what was printed, e.g. before a refresh
    pub fn clear(&mut self) {
        self.printed.clear();
        self.last_status = None;
    }

    /// Output for a new view: unseen posts, then a status line if it changed
    pub fn show(&mut self, view: &FeedView) -> Vec<String> {
        let mut out = Vec::new();
        for item in &view.items {
            if self.printed.insert(item.id.clone()) {
                out.push(render_item(item));
            }
        }
        if self.last_status != Some(view.status) {
            self.last_status = Some(view.status);
            if let Some(line) = status_line(view) {
                out.push(line);
            }
        }
        out
    }
}

fn status_line(view: &FeedView) -> Option<String> {
    if view.show_empty_state {
        return Some("Nothing here yet. Be the first to post!".to_string());
    }
    match view.status {
        FeedStatus::Loading(_) => Some(format!("({}…)", view.status)),
        FeedStatus::Exhausted => Some("(you're all caught up)".to_string()),
        FeedStatus::Error(_) => Some(format!(
            "Could not load posts: {}. Type `retry` to try again.",
            view.error.as_deref().unwrap_or("unknown error")
        )),
        FeedStatus::Idle | FeedStatus::Ready => None,
    }
}
