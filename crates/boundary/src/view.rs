//! Rendered output of one pass over the tree.

use serde::{Deserialize, Serialize};

/// Heading of the default fallback view.
pub const FALLBACK_TITLE: &str = "Something went wrong";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum View {
    /// Gates not open yet (identity or host readiness pending).
    Pending,
    Page(PageView),
    Fallback(FallbackView),
}

/// Output of a page component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageView {
    pub title: String,
    /// Page-specific payload; the core does not interpret it.
    #[serde(default)]
    pub content: serde_json::Value,
}

/// What the boundary shows in place of a failed subtree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackView {
    pub title: String,
    pub message: String,
}

impl View {
    pub fn page(title: impl Into<String>, content: serde_json::Value) -> Self {
        View::Page(PageView {
            title: title.into(),
            content,
        })
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, View::Pending)
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, View::Fallback(_))
    }

    /// Whether `needle` appears anywhere in the visible text of the view.
    pub fn contains_text(&self, needle: &str) -> bool {
        match self {
            View::Pending => false,
            View::Page(page) => page.title.contains(needle) || page.content.to_string().contains(needle),
            View::Fallback(fallback) => {
                fallback.title.contains(needle) || fallback.message.contains(needle)
            }
        }
    }
}
