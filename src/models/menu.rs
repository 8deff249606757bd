//! Navigation menu entries.
//!
//! Entries form a shallow tree: top-level entries carry an icon and either a
//! link or a list of child links. The menu component renders them in order.

use serde::Serialize;

use crate::utils::{LinkTarget, classify_link};

// ============================================================================
// Menu Types
// ============================================================================

/// Badge shown next to a menu entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MenuStatus {
    Live,
    Soon,
    New,
}

impl MenuStatus {
    /// Badge text.
    pub fn text(self) -> &'static str {
        match self {
            Self::Live => "LIVE",
            Self::Soon => "SOON",
            Self::New => "NEW",
        }
    }

    /// Theme color token for the badge.
    pub fn color(self) -> &'static str {
        match self {
            Self::Live => "failure",
            Self::Soon => "warning",
            Self::New => "success",
        }
    }
}

/// One entry of the navigation menu.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuEntry {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<MenuEntry>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub initial_open_state: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<MenuStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callout_class: Option<String>,
}

impl MenuEntry {
    /// Top-level entry linking straight to `href`.
    pub fn link(label: impl Into<String>, icon: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            icon: Some(icon.into()),
            href: Some(href.into()),
            ..Self::bare(label)
        }
    }

    /// Top-level entry grouping child links.
    pub fn group(label: impl Into<String>, icon: impl Into<String>, items: Vec<MenuEntry>) -> Self {
        Self {
            icon: Some(icon.into()),
            items,
            ..Self::bare(label)
        }
    }

    /// Child link inside a group.
    pub fn item(label: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            href: Some(href.into()),
            ..Self::bare(label)
        }
    }

    /// Render the group expanded on first load.
    pub fn open(mut self) -> Self {
        self.initial_open_state = true;
        self
    }

    /// Attach a badge.
    pub fn with_status(mut self, status: MenuStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Highlight the entry with a callout style class.
    pub fn with_callout(mut self, class: impl Into<String>) -> Self {
        self.callout_class = Some(class.into());
        self
    }

    fn bare(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            icon: None,
            href: None,
            items: Vec::new(),
            initial_open_state: false,
            status: None,
            callout_class: None,
        }
    }

    /// Whether this entry expands into children.
    pub fn is_group(&self) -> bool {
        !self.items.is_empty()
    }

    /// Levels in this subtree, counting the entry itself.
    pub fn depth(&self) -> usize {
        1 + self.items.iter().map(MenuEntry::depth).max().unwrap_or(0)
    }

    /// Every `(label, href)` pair in this subtree, in display order.
    pub fn links(&self) -> Vec<(&str, &str)> {
        let mut links = Vec::new();
        if let Some(href) = &self.href {
            links.push((self.label.as_str(), href.as_str()));
        }
        for item in &self.items {
            links.extend(item.links());
        }
        links
    }

    /// Classify this entry's own link, if it has one.
    pub fn target(&self) -> Option<LinkTarget> {
        self.href.as_deref().map(classify_link)
    }
}
