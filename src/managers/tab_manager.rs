use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::types::errors::TabError;
use crate::types::tab::{Tab, TabIdentity, Window, WindowId};

/// Read-only view of open windows and tabs.
///
/// This is all the indicator registry needs from the browser chrome: enumerate
/// windows in stacking order, enumerate tabs of a window in strip order, and
/// resolve a tab identity to its display metadata.
pub trait TabDirectory {
    /// Open windows, front-most first.
    fn windows(&self) -> Vec<WindowId>;
    /// Tabs of one window in strip order. Unknown windows yield nothing.
    fn tabs_in_window(&self, window: &WindowId) -> Vec<&Tab>;
    fn tab(&self, id: &TabIdentity) -> Option<&Tab>;
}

/// Trait defining the window/tab management interface.
pub trait TabManagerTrait {
    fn open_window(&mut self) -> WindowId;
    fn close_window(&mut self, window: &WindowId) -> Result<Vec<TabIdentity>, TabError>;
    fn focus_window(&mut self, window: &WindowId) -> Result<(), TabError>;
    fn create_tab(&mut self, window: &WindowId, url: Option<&str>, active: bool) -> Result<TabIdentity, TabError>;
    fn close_tab(&mut self, tab_id: &TabIdentity) -> Result<(), TabError>;
    fn switch_tab(&mut self, tab_id: &TabIdentity) -> Result<(), TabError>;
    fn reorder_tab(&mut self, tab_id: &TabIdentity, new_index: usize) -> Result<(), TabError>;
    fn pin_tab(&mut self, tab_id: &TabIdentity) -> Result<(), TabError>;
    fn unpin_tab(&mut self, tab_id: &TabIdentity) -> Result<(), TabError>;
    fn update_tab_title(&mut self, tab_id: &TabIdentity, title: &str) -> Result<(), TabError>;
    fn update_tab_favicon(&mut self, tab_id: &TabIdentity, favicon: Option<&str>) -> Result<(), TabError>;
    fn set_close_button(&mut self, tab_id: &TabIdentity, present: bool) -> Result<(), TabError>;
    fn tab_count(&self) -> usize;
    fn get_tab_order(&self, window: &WindowId) -> Result<&[TabIdentity], TabError>;
}

/// In-memory window and tab bookkeeping for the chrome.
pub struct TabManager {
    windows: HashMap<WindowId, Window>,
    /// Stacking order, front-most first.
    window_order: Vec<WindowId>,
    tabs: HashMap<TabIdentity, Tab>,
}

impl TabManager {
    pub fn new() -> Self {
        Self {
            windows: HashMap::new(),
            window_order: Vec::new(),
            tabs: HashMap::new(),
        }
    }

    fn now() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64
    }

    fn window_mut(&mut self, window: &WindowId) -> Result<&mut Window, TabError> {
        self.windows
            .get_mut(window)
            .ok_or_else(|| TabError::WindowNotFound(window.to_string()))
    }

    fn window_of(&self, tab_id: &TabIdentity) -> Result<WindowId, TabError> {
        self.tabs
            .get(tab_id)
            .map(|t| t.window.clone())
            .ok_or_else(|| TabError::NotFound(tab_id.to_string()))
    }

    /// Count of pinned tabs in a window (they are always at the left).
    fn pinned_count(&self, window: &Window) -> usize {
        window
            .tab_order
            .iter()
            .filter(|id| self.tabs.get(*id).map(|t| t.pinned).unwrap_or(false))
            .count()
    }

    /// Marks `tab_id` as the selected tab of its window and clears the others.
    fn select(&mut self, window: &WindowId, tab_id: Option<&TabIdentity>) {
        if let Some(w) = self.windows.get_mut(window) {
            w.selected_tab = tab_id.cloned();
            for id in &w.tab_order {
                if let Some(tab) = self.tabs.get_mut(id) {
                    let selected = Some(id) == tab_id;
                    tab.selected = selected;
                    tab.visually_selected = selected;
                }
            }
        }
    }
}

impl Default for TabManager {
    fn default() -> Self {
        Self::new()
    }
}

impl TabDirectory for TabManager {
    fn windows(&self) -> Vec<WindowId> {
        self.window_order.clone()
    }

    fn tabs_in_window(&self, window: &WindowId) -> Vec<&Tab> {
        match self.windows.get(window) {
            Some(w) => w.tab_order.iter().filter_map(|id| self.tabs.get(id)).collect(),
            None => Vec::new(),
        }
    }

    fn tab(&self, id: &TabIdentity) -> Option<&Tab> {
        self.tabs.get(id)
    }
}

impl TabManagerTrait for TabManager {
    /// Opens a new empty window on top of the stack.
    fn open_window(&mut self) -> WindowId {
        let id = WindowId::generate();
        self.windows.insert(
            id.clone(),
            Window {
                id: id.clone(),
                tab_order: Vec::new(),
                selected_tab: None,
            },
        );
        self.window_order.insert(0, id.clone());
        id
    }

    /// Closes a window and all of its tabs. Returns the identities of the closed tabs.
    fn close_window(&mut self, window: &WindowId) -> Result<Vec<TabIdentity>, TabError> {
        let removed = self
            .windows
            .remove(window)
            .ok_or_else(|| TabError::WindowNotFound(window.to_string()))?;
        self.window_order.retain(|w| w != window);
        for id in &removed.tab_order {
            self.tabs.remove(id);
        }
        Ok(removed.tab_order)
    }

    /// Raises a window to the front of the stacking order.
    fn focus_window(&mut self, window: &WindowId) -> Result<(), TabError> {
        let pos = self
            .window_order
            .iter()
            .position(|w| w == window)
            .ok_or_else(|| TabError::WindowNotFound(window.to_string()))?;
        let id = self.window_order.remove(pos);
        self.window_order.insert(0, id);
        Ok(())
    }

    /// Create a new tab at the end of a window's strip.
    /// Returns the new tab's identity.
    fn create_tab(&mut self, window: &WindowId, url: Option<&str>, active: bool) -> Result<TabIdentity, TabError> {
        let id = TabIdentity::generate();
        let url = url.unwrap_or("about:blank").to_string();
        let w = self.window_mut(window)?;
        w.tab_order.push(id.clone());
        let becomes_selected = active || w.selected_tab.is_none();
        self.tabs.insert(
            id.clone(),
            Tab {
                id: id.clone(),
                window: window.clone(),
                title: url.clone(),
                url,
                favicon: None,
                pinned: false,
                selected: false,
                visually_selected: false,
                has_close_button: true,
                created_at: Self::now(),
            },
        );
        if becomes_selected {
            self.select(window, Some(&id));
        }
        Ok(id)
    }

    /// Close a tab. If it was selected, its nearest neighbour becomes selected.
    fn close_tab(&mut self, tab_id: &TabIdentity) -> Result<(), TabError> {
        let window = self.window_of(tab_id)?;
        let w = self.window_mut(&window)?;
        let order_idx = w
            .tab_order
            .iter()
            .position(|id| id == tab_id)
            .ok_or_else(|| TabError::NotFound(tab_id.to_string()))?;
        w.tab_order.remove(order_idx);
        let need_switch = w.selected_tab.as_ref() == Some(tab_id);
        let neighbour = if w.tab_order.is_empty() {
            None
        } else {
            Some(w.tab_order[order_idx.min(w.tab_order.len() - 1)].clone())
        };
        self.tabs.remove(tab_id);

        if need_switch {
            self.select(&window, neighbour.as_ref());
        }
        Ok(())
    }

    fn switch_tab(&mut self, tab_id: &TabIdentity) -> Result<(), TabError> {
        let window = self.window_of(tab_id)?;
        self.select(&window, Some(tab_id));
        Ok(())
    }

    /// Move a tab to a new position within its window.
    fn reorder_tab(&mut self, tab_id: &TabIdentity, new_index: usize) -> Result<(), TabError> {
        let window = self.window_of(tab_id)?;
        let w = self.window_mut(&window)?;
        if new_index >= w.tab_order.len() {
            return Err(TabError::InvalidIndex(new_index));
        }
        let order_idx = w
            .tab_order
            .iter()
            .position(|id| id == tab_id)
            .ok_or_else(|| TabError::NotFound(tab_id.to_string()))?;
        let id = w.tab_order.remove(order_idx);
        w.tab_order.insert(new_index, id);
        Ok(())
    }

    /// Pin a tab, moving it to the end of the pinned section.
    fn pin_tab(&mut self, tab_id: &TabIdentity) -> Result<(), TabError> {
        let window = self.window_of(tab_id)?;
        if self.tabs.get(tab_id).map(|t| t.pinned).unwrap_or(false) {
            return Ok(());
        }
        let pinned_before = match self.windows.get(&window) {
            Some(w) => self.pinned_count(w),
            None => return Err(TabError::WindowNotFound(window.to_string())),
        };
        if let Some(tab) = self.tabs.get_mut(tab_id) {
            tab.pinned = true;
        }
        let w = self.window_mut(&window)?;
        if let Some(order_idx) = w.tab_order.iter().position(|id| id == tab_id) {
            let id = w.tab_order.remove(order_idx);
            let insert_pos = pinned_before.min(w.tab_order.len());
            w.tab_order.insert(insert_pos, id);
        }
        Ok(())
    }

    /// Unpin a tab, moving it to just after the pinned section.
    fn unpin_tab(&mut self, tab_id: &TabIdentity) -> Result<(), TabError> {
        let window = self.window_of(tab_id)?;
        if !self.tabs.get(tab_id).map(|t| t.pinned).unwrap_or(false) {
            return Ok(());
        }
        if let Some(tab) = self.tabs.get_mut(tab_id) {
            tab.pinned = false;
        }
        let pinned_count = match self.windows.get(&window) {
            Some(w) => self.pinned_count(w),
            None => return Err(TabError::WindowNotFound(window.to_string())),
        };
        let w = self.window_mut(&window)?;
        if let Some(order_idx) = w.tab_order.iter().position(|id| id == tab_id) {
            let id = w.tab_order.remove(order_idx);
            let insert_pos = pinned_count.min(w.tab_order.len());
            w.tab_order.insert(insert_pos, id);
        }
        Ok(())
    }

    fn update_tab_title(&mut self, tab_id: &TabIdentity, title: &str) -> Result<(), TabError> {
        let tab = self.tabs.get_mut(tab_id)
            .ok_or_else(|| TabError::NotFound(tab_id.to_string()))?;
        tab.title = title.to_string();
        Ok(())
    }

    fn update_tab_favicon(&mut self, tab_id: &TabIdentity, favicon: Option<&str>) -> Result<(), TabError> {
        let tab = self.tabs.get_mut(tab_id)
            .ok_or_else(|| TabError::NotFound(tab_id.to_string()))?;
        tab.favicon = favicon.map(str::to_string);
        Ok(())
    }

    /// Records whether the tab strip draws a close button for this tab.
    fn set_close_button(&mut self, tab_id: &TabIdentity, present: bool) -> Result<(), TabError> {
        let tab = self.tabs.get_mut(tab_id)
            .ok_or_else(|| TabError::NotFound(tab_id.to_string()))?;
        tab.has_close_button = present;
        Ok(())
    }

    fn tab_count(&self) -> usize {
        self.tabs.len()
    }

    fn get_tab_order(&self, window: &WindowId) -> Result<&[TabIdentity], TabError> {
        self.windows
            .get(window)
            .map(|w| w.tab_order.as_slice())
            .ok_or_else(|| TabError::WindowNotFound(window.to_string()))
    }
}
