//! Unit tests for the sidebar view: snapshot replacement, incremental patches
//! and click intents.

use noise_control::types::indicator::{TabRecord, WindowSnapshot};
use noise_control::types::protocol::{SidebarIntent, SidebarMessage};
use noise_control::types::tab::{TabIdentity, WindowId};
use noise_control::ui::sidebar_view::{SidebarView, DEFAULT_FAVICON};

fn record(id: &str, title: &str, muted: bool) -> TabRecord {
    TabRecord {
        id: TabIdentity::from(id),
        icon: None,
        title: title.to_string(),
        muted,
        noisy: true,
        has_plugins: false,
    }
}

fn everything(windows: Vec<Vec<TabRecord>>) -> SidebarMessage {
    SidebarMessage::Everything(
        windows
            .into_iter()
            .enumerate()
            .map(|(i, tabs)| WindowSnapshot { window: WindowId::from(format!("w{}", i).as_str()), tabs })
            .collect(),
    )
}

#[test]
fn test_new_view_is_empty_and_unsynced() {
    let view = SidebarView::new("Mute");
    assert!(!view.is_synced());
    assert_eq!(view.window_count(), 0);
    assert_eq!(view.render_html(), "<ul id=\"windows\"></ul>");
}

#[test]
fn test_everything_replaces_tree() {
    let mut view = SidebarView::new("Mute");
    view.apply(&everything(vec![vec![record("a", "A", false), record("b", "B", true)], vec![]]));
    assert!(view.is_synced());
    assert_eq!(view.window_count(), 2);
    assert_eq!(view.row_count(0), 2);
    assert_eq!(view.row_count(1), 0);
    assert_eq!(view.row_count(7), 0);

    view.apply(&everything(vec![vec![record("c", "C", false)]]));
    assert_eq!(view.window_count(), 1);
    assert!(view.row(&TabIdentity::from("a")).is_none());
    assert_eq!(view.row(&TabIdentity::from("c")).unwrap().title, "C");
}

#[test]
fn test_missing_icon_uses_default_favicon() {
    let mut view = SidebarView::new("Mute");
    let mut with_icon = record("b", "B", false);
    with_icon.icon = Some("https://b.example/icon.png".to_string());
    let mut empty_icon = record("c", "C", false);
    empty_icon.icon = Some(String::new());
    view.apply(&everything(vec![vec![record("a", "A", false), with_icon, empty_icon]]));

    assert_eq!(view.row(&TabIdentity::from("a")).unwrap().icon, DEFAULT_FAVICON);
    assert_eq!(view.row(&TabIdentity::from("b")).unwrap().icon, "https://b.example/icon.png");
    assert_eq!(view.row(&TabIdentity::from("c")).unwrap().icon, DEFAULT_FAVICON);
}

#[test]
fn test_tab_changed_patches_row_in_place() {
    let mut view = SidebarView::new("Mute");
    view.apply(&everything(vec![vec![record("a", "A", false), record("b", "B", false)]]));
    view.apply(&SidebarMessage::TabChanged(record("b", "B renamed", true)));

    let row = view.row(&TabIdentity::from("b")).unwrap();
    assert!(row.muted);
    assert_eq!(row.title, "B renamed");
    assert_eq!(view.windows()[0].rows[1].id, TabIdentity::from("b"));
}

#[test]
fn test_tab_changed_before_sync_is_ignored() {
    let mut view = SidebarView::new("Mute");
    view.apply(&SidebarMessage::TabChanged(record("a", "A", true)));
    assert!(!view.is_synced());
    assert!(view.row(&TabIdentity::from("a")).is_none());
}

#[test]
fn test_tab_changed_for_unknown_row_is_ignored() {
    let mut view = SidebarView::new("Mute");
    view.apply(&everything(vec![vec![record("a", "A", false)]]));
    view.apply(&SidebarMessage::TabChanged(record("zzz", "Z", true)));
    assert_eq!(view.row_count(0), 1);
    assert!(view.row(&TabIdentity::from("zzz")).is_none());
}

#[test]
fn test_click_produces_intent_without_changing_row() {
    let mut view = SidebarView::new("Mute");
    view.apply(&everything(vec![vec![record("a", "A", false)]]));
    let intent = view.click_mute(&TabIdentity::from("a"), true).unwrap();
    assert_eq!(
        intent,
        SidebarIntent::AudioStateChanged { id: TabIdentity::from("a"), state: Some(true) }
    );
    assert!(!view.row(&TabIdentity::from("a")).unwrap().muted);
}

#[test]
fn test_click_unknown_row() {
    let view = SidebarView::new("Mute");
    assert!(view.click_mute(&TabIdentity::from("a"), true).is_none());
}

#[test]
fn test_render_html_structure_and_escaping() {
    let mut view = SidebarView::new("Stumm");
    view.apply(&everything(vec![vec![record("a", "<Radio & Co>", true)]]));
    let html = view.render_html();
    assert!(html.starts_with("<ul id=\"windows\"><li><ul><li id=\"a\">"));
    assert!(html.contains("&lt;Radio &amp; Co&gt;"));
    assert!(html.contains("type=\"checkbox\" checked"));
    assert!(html.contains("Stumm"));
    assert!(html.ends_with("</ul></li></ul>"));
}
