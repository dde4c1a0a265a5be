//! End-to-end scenarios across a prober, the coordinator and a sidebar view,
//! with every channel drained by hand so each step is deterministic.

use std::time::Duration;

use tokio::sync::mpsc;

use noise_control::managers::coordinator::Coordinator;
use noise_control::services::tab_audio_prober::{MediaElement, MediaKind, ProberConfig, TabAudioProber};
use noise_control::types::protocol::{ProberCommand, ProberReport, SidebarIntent, SidebarMessage};
use noise_control::types::tab::TabIdentity;
use noise_control::ui::sidebar_view::SidebarView;

struct World {
    coord: Coordinator,
    tab: TabIdentity,
    prober: TabAudioProber,
    reports: mpsc::UnboundedReceiver<ProberReport>,
    commands: mpsc::UnboundedReceiver<ProberCommand>,
    view: SidebarView,
    updates: mpsc::UnboundedReceiver<SidebarMessage>,
}

impl World {
    fn new() -> Self {
        let mut coord = Coordinator::new();
        let window = coord.open_window();
        let tab = coord.open_tab(&window, Some("https://radio.example/"), true).unwrap();
        let (report_tx, reports) = mpsc::unbounded_channel();
        let prober = TabAudioProber::new(tab.clone(), report_tx, ProberConfig { debounce: Duration::ZERO });
        let (command_tx, commands) = mpsc::unbounded_channel();
        coord.link_prober(tab.clone(), command_tx);
        let (update_tx, updates) = mpsc::unbounded_channel();
        coord.attach_sidebar(update_tx);
        let mut world = Self {
            coord,
            tab,
            prober,
            reports,
            commands,
            view: SidebarView::new("Mute"),
            updates,
        };
        world.pump();
        world
    }

    /// Delivers every pending message until all channels are quiet.
    /// Returns the commands the prober received.
    fn pump(&mut self) -> Vec<ProberCommand> {
        let mut delivered = Vec::new();
        loop {
            let mut progressed = false;
            while let Ok(report) = self.reports.try_recv() {
                self.coord.prober_event(&report.tab, report.message);
                progressed = true;
            }
            while let Ok(command) = self.commands.try_recv() {
                self.prober.handle_command(command);
                delivered.push(command);
                progressed = true;
            }
            while let Ok(update) = self.updates.try_recv() {
                self.view.apply(&update);
                progressed = true;
            }
            if !progressed {
                return delivered;
            }
        }
    }

    fn click_indicator(&mut self) -> Vec<ProberCommand> {
        self.coord.indicator_click(&self.tab);
        self.pump()
    }
}

#[test]
fn test_silent_to_noisy_to_muted_and_back() {
    let mut w = World::new();
    w.prober.add_element(MediaElement::new("a1", MediaKind::Audio));
    w.pump();
    assert!(w.coord.indicator(&w.tab).is_none());
    assert_eq!(w.view.row_count(0), 0);

    w.prober.set_playing("a1", true);
    w.pump();
    let state = w.coord.indicator(&w.tab).unwrap().state;
    assert!(state.noisy);
    assert!(!state.muted);
    assert!(!w.view.row(&w.tab).unwrap().muted);

    assert_eq!(w.click_indicator(), vec![ProberCommand::Mute(true)]);
    assert!(w.coord.indicator(&w.tab).unwrap().state.muted);
    assert!(w.prober.element("a1").unwrap().muted);
    assert!(w.view.row(&w.tab).unwrap().muted);

    assert_eq!(w.click_indicator(), vec![ProberCommand::Mute(false)]);
    assert!(!w.coord.indicator(&w.tab).unwrap().state.muted);
    assert!(!w.prober.element("a1").unwrap().muted);
    assert!(!w.view.row(&w.tab).unwrap().muted);
}

#[test]
fn test_sidebar_attach_renders_one_unchecked_row() {
    let mut w = World::new();
    w.prober.add_element(MediaElement::new("v1", MediaKind::Video).playing(true));
    w.pump();

    let (tx, mut rx) = mpsc::unbounded_channel();
    w.coord.attach_sidebar(tx);
    let mut late = SidebarView::new("Mute");
    late.apply(&rx.try_recv().unwrap());

    assert_eq!(late.window_count(), 1);
    assert_eq!(late.row_count(0), 1);
    assert!(!late.row(&w.tab).unwrap().muted);
    assert!(!late.render_html().contains("checked"));
}

#[test]
fn test_tab_close_removes_row() {
    let mut w = World::new();
    w.prober.add_element(MediaElement::new("a1", MediaKind::Audio).playing(true));
    w.pump();
    assert_eq!(w.view.row_count(0), 1);

    let tab = w.tab.clone();
    w.coord.close_tab(&tab).unwrap();
    w.pump();
    assert_eq!(w.view.row_count(0), 0);
    assert!(w.view.row(&tab).is_none());
}

#[test]
fn test_sidebar_click_round_trip() {
    let mut w = World::new();
    w.prober.add_element(MediaElement::new("a1", MediaKind::Audio).playing(true));
    w.pump();

    let intent = w.view.click_mute(&w.tab, true).unwrap();
    assert!(!w.view.row(&w.tab).unwrap().muted);
    w.coord.sidebar_intent(intent);
    assert_eq!(w.pump(), vec![ProberCommand::Mute(true)]);
    assert!(w.view.row(&w.tab).unwrap().muted);
}

#[test]
fn test_mute_twice_equals_mute_once() {
    let mut once = World::new();
    let mut twice = World::new();
    for w in [&mut once, &mut twice] {
        w.prober.add_element(MediaElement::new("a1", MediaKind::Audio).playing(true));
        w.pump();
    }
    let toggle = |w: &World| SidebarIntent::AudioStateChanged { id: w.tab.clone(), state: Some(true) };

    let intent = toggle(&once);
    once.coord.sidebar_intent(intent);
    once.pump();
    for _ in 0..2 {
        let intent = toggle(&twice);
        twice.coord.sidebar_intent(intent);
        twice.pump();
    }

    assert_eq!(
        once.coord.indicator(&once.tab).unwrap().state,
        twice.coord.indicator(&twice.tab).unwrap().state
    );
    assert_eq!(once.prober.elements(), twice.prober.elements());
    assert_eq!(once.prober.is_mute_in_effect(), twice.prober.is_mute_in_effect());
    assert_eq!(once.view.row(&once.tab).unwrap().muted, twice.view.row(&twice.tab).unwrap().muted);
}

#[test]
fn test_native_unmute_reaches_sidebar() {
    let mut w = World::new();
    w.prober.add_element(MediaElement::new("a1", MediaKind::Audio).playing(true));
    w.pump();
    w.click_indicator();
    assert!(w.view.row(&w.tab).unwrap().muted);

    w.prober.set_element_muted("a1", false);
    w.pump();
    assert!(!w.coord.indicator(&w.tab).unwrap().state.muted);
    assert!(!w.view.row(&w.tab).unwrap().muted);
}
