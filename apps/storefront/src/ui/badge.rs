//! Cart count badges (`.cart-badge`).

use super::dom::{Document, Selector};
use zhisheng_core::BADGE_DISPLAY_MAX;

pub const BADGE_CLASS: &str = "cart-badge";

/// Badge text: the count, or `"99+"` past the display maximum.
pub fn badge_label(count: u64) -> String {
    if count > BADGE_DISPLAY_MAX {
        format!("{}+", BADGE_DISPLAY_MAX)
    } else {
        count.to_string()
    }
}

/// Updates every badge on the page. Returns how many were touched.
pub fn refresh_badges(doc: &mut dyn Document, count: u64) -> usize {
    let badges = doc.query_all(&Selector::class(BADGE_CLASS));
    for &badge in &badges {
        if count > 0 {
            doc.set_visible(badge, true);
            doc.set_text(badge, &badge_label(count));
        } else {
            doc.set_visible(badge, false);
        }
    }
    badges.len()
}
