//! Sidebar View — a passive mirror of registry state.
//!
//! The view renders whatever the registry last told it. Clicking a mute box
//! produces an intent for the registry; the row itself only changes when the
//! registry's authoritative update comes back.

use crate::types::indicator::{TabRecord, WindowSnapshot};
use crate::types::protocol::{SidebarIntent, SidebarMessage};
use crate::types::tab::{TabIdentity, WindowId};

/// Favicon shown for tabs that have none.
pub const DEFAULT_FAVICON: &str = "chrome://mozapps/skin/places/defaultFavicon.png";

/// One tab row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidebarRow {
    pub id: TabIdentity,
    pub icon: String,
    pub title: String,
    pub muted: bool,
}

impl SidebarRow {
    fn from_record(record: &TabRecord) -> Self {
        let mut row = Self {
            id: record.id.clone(),
            icon: String::new(),
            title: String::new(),
            muted: false,
        };
        row.patch(record);
        row
    }

    fn patch(&mut self, record: &TabRecord) {
        self.icon = record
            .icon
            .clone()
            .filter(|i| !i.is_empty())
            .unwrap_or_else(|| DEFAULT_FAVICON.to_string());
        self.title = record.title.clone();
        self.muted = record.muted;
    }
}

/// One window entry with its rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidebarWindow {
    pub id: WindowId,
    pub rows: Vec<SidebarRow>,
}

pub struct SidebarView {
    windows: Vec<SidebarWindow>,
    synced: bool,
    mute_label: String,
}

impl SidebarView {
    /// Creates an empty, not yet synced view. `mute_label` is the localized
    /// text shown next to each checkbox.
    pub fn new(mute_label: impl Into<String>) -> Self {
        Self {
            windows: Vec::new(),
            synced: false,
            mute_label: mute_label.into(),
        }
    }

    /// Whether a full snapshot has arrived yet.
    pub fn is_synced(&self) -> bool {
        self.synced
    }

    /// Applies one registry message.
    pub fn apply(&mut self, message: &SidebarMessage) {
        match message {
            SidebarMessage::Everything(windows) => self.replace_all(windows),
            SidebarMessage::TabChanged(record) => self.patch_row(record),
        }
    }

    fn replace_all(&mut self, windows: &[WindowSnapshot]) {
        self.windows = windows
            .iter()
            .map(|w| SidebarWindow {
                id: w.window.clone(),
                rows: w.tabs.iter().map(SidebarRow::from_record).collect(),
            })
            .collect();
        self.synced = true;
    }

    fn patch_row(&mut self, record: &TabRecord) {
        // Incremental updates are meaningless before the first full snapshot.
        if !self.synced {
            return;
        }
        if let Some(row) = self.row_mut(&record.id) {
            row.patch(record);
        }
    }

    fn row_mut(&mut self, id: &TabIdentity) -> Option<&mut SidebarRow> {
        self.windows
            .iter_mut()
            .flat_map(|w| w.rows.iter_mut())
            .find(|r| &r.id == id)
    }

    /// The user clicked a row's mute checkbox, which now reads `checked`.
    ///
    /// Returns the intent to send to the registry, or `None` if the row is
    /// unknown. The row keeps its current state until the registry answers.
    pub fn click_mute(&self, id: &TabIdentity, checked: bool) -> Option<SidebarIntent> {
        self.row(id)?;
        Some(SidebarIntent::AudioStateChanged {
            id: id.clone(),
            state: Some(checked),
        })
    }

    pub fn row(&self, id: &TabIdentity) -> Option<&SidebarRow> {
        self.windows.iter().flat_map(|w| w.rows.iter()).find(|r| &r.id == id)
    }

    pub fn windows(&self) -> &[SidebarWindow] {
        &self.windows
    }

    pub fn window_count(&self) -> usize {
        self.windows.len()
    }

    /// Number of rows in the window at `index`, 0 if there is no such window.
    pub fn row_count(&self, index: usize) -> usize {
        self.windows.get(index).map(|w| w.rows.len()).unwrap_or(0)
    }

    /// Renders the tree as `ul#windows > li > ul > li` markup.
    pub fn render_html(&self) -> String {
        let mut out = String::from("<ul id=\"windows\">");
        for window in &self.windows {
            out.push_str("<li><ul>");
            for row in &window.rows {
                out.push_str(&format!(
                    "<li id=\"{id}\"><span class=\"tabicon\"><img src=\"{icon}\"/></span>\
                     <span class=\"tabtitle\">{title}</span>\
                     <label><input type=\"checkbox\"{checked}/><span class=\"mutelabel\"> {label}</span></label></li>",
                    id = escape_html(row.id.as_str()),
                    icon = escape_html(&row.icon),
                    title = escape_html(&row.title),
                    checked = if row.muted { " checked" } else { "" },
                    label = escape_html(&self.mute_label),
                ));
            }
            out.push_str("</ul></li>");
        }
        out.push_str("</ul>");
        out
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
