//! Property-based tests for indicator state replay.
//!
//! For any sequence of prober reports, user toggles and title or favicon
//! changes across two tabs:
//! - a sidebar that followed every incremental update shows exactly what a
//!   sidebar attached at the end shows;
//! - every indicator's visual equals a fresh render of its final state;
//! - replaying a prober report immediately is silent.

use proptest::prelude::*;
use tokio::sync::mpsc;

use noise_control::managers::coordinator::Coordinator;
use noise_control::services::theme_engine::ThemeEngineTrait;
use noise_control::types::protocol::{ProberMessage, SidebarIntent, SidebarMessage};
use noise_control::types::tab::TabIdentity;
use noise_control::ui::indicator_render::render_indicator;
use noise_control::ui::sidebar_view::SidebarView;

#[derive(Debug, Clone)]
enum Event {
    Report(usize, ProberMessage),
    Toggle(usize, Option<bool>),
    Metadata(usize, String, Option<String>),
}

fn arb_message() -> impl Strategy<Value = ProberMessage> {
    prop_oneof![
        3 => any::<bool>().prop_map(ProberMessage::HasNoise),
        2 => any::<bool>().prop_map(ProberMessage::HasPlugins),
        1 => Just(ProberMessage::Unloaded),
        1 => Just(ProberMessage::Unmuted),
    ]
}

fn arb_events() -> impl Strategy<Value = Vec<Event>> {
    prop::collection::vec(
        prop_oneof![
            3 => (0..2usize, arb_message()).prop_map(|(t, m)| Event::Report(t, m)),
            2 => (0..2usize, prop::option::of(any::<bool>())).prop_map(|(t, s)| Event::Toggle(t, s)),
            1 => (0..2usize, "[a-z]{1,8}", prop::option::of("[a-z]{1,8}"))
                .prop_map(|(t, title, icon)| Event::Metadata(t, title, icon.map(|i| format!("https://{}.example/icon.png", i)))),
        ],
        1..40,
    )
}

fn setup() -> (Coordinator, Vec<TabIdentity>) {
    let mut coord = Coordinator::new();
    let window = coord.open_window();
    let tabs = (0..2)
        .map(|i| coord.open_tab(&window, Some(&format!("https://site{}.example/", i)), false).unwrap())
        .collect();
    (coord, tabs)
}

fn apply(coord: &mut Coordinator, tabs: &[TabIdentity], event: &Event) {
    match event {
        Event::Report(t, message) => coord.prober_event(&tabs[*t], *message),
        Event::Toggle(t, state) => coord.sidebar_intent(SidebarIntent::AudioStateChanged {
            id: tabs[*t].clone(),
            state: *state,
        }),
        Event::Metadata(t, title, icon) => {
            coord.set_tab_metadata(&tabs[*t], Some(title), Some(icon.as_deref())).unwrap();
        }
    }
}

fn sync(view: &mut SidebarView, rx: &mut mpsc::UnboundedReceiver<SidebarMessage>) {
    while let Ok(message) = rx.try_recv() {
        view.apply(&message);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn incremental_sidebar_matches_fresh_snapshot(events in arb_events()) {
        let (mut coord, tabs) = setup();
        let (tx, mut rx) = mpsc::unbounded_channel();
        coord.attach_sidebar(tx);
        let mut live = SidebarView::new("Mute");

        for event in &events {
            apply(&mut coord, &tabs, event);
            sync(&mut live, &mut rx);
        }

        let (tx, mut fresh_rx) = mpsc::unbounded_channel();
        coord.attach_sidebar(tx);
        let mut fresh = SidebarView::new("Mute");
        sync(&mut fresh, &mut fresh_rx);

        prop_assert_eq!(live.windows(), fresh.windows());
    }

    #[test]
    fn visuals_are_a_function_of_state(events in arb_events()) {
        let (mut coord, tabs) = setup();
        for event in &events {
            apply(&mut coord, &tabs, event);
        }
        let theme = coord.theme.theme();
        for tab in &tabs {
            if let Some(indicator) = coord.indicator(tab) {
                prop_assert_eq!(&indicator.visual, &render_indicator(&indicator.state, &theme));
            }
        }
    }

    #[test]
    fn replayed_report_is_silent(events in arb_events(), last in (0..2usize, arb_message())) {
        let (mut coord, tabs) = setup();
        for event in &events {
            apply(&mut coord, &tabs, event);
        }
        let (t, message) = last;
        coord.prober_event(&tabs[t], message);
        let before = coord.indicator(&tabs[t]).map(|i| i.state);

        let (tx, mut rx) = mpsc::unbounded_channel();
        coord.attach_sidebar(tx);
        let _ = rx.try_recv();
        coord.prober_event(&tabs[t], message);

        prop_assert_eq!(coord.indicator(&tabs[t]).map(|i| i.state), before);
        prop_assert!(rx.try_recv().is_err());
    }
}
