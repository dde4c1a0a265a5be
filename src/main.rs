//! Noise Control — per-tab audio indicators with a live sidebar.
//!
//! Entry point: runs a console demo that drives probers, the indicator
//! registry and a sidebar view through a typical browsing session.

use std::time::Duration;

use noise_control::app::{now_secs, NoiseControl, UnloadReason};
use noise_control::managers::coordinator::Coordinator;
use noise_control::managers::tab_manager::TabManagerTrait;
use noise_control::services::donation_reminder::LoadReason;
use noise_control::services::registry_service::{sidebar_channel, RegistryService};
use noise_control::services::tab_audio_prober::{ContentEvent, MediaElement, MediaKind, ProberConfig};
use noise_control::types::protocol::{ProberMessage, SidebarIntent, SidebarMessage};
use noise_control::ui::sidebar_view::SidebarView;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("noise_control=warn")),
        )
        .init();

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║              Noise Control v{} — Demo Mode                ║", env!("CARGO_PKG_VERSION"));
    println!("║     Per-tab audio indicators, mute and a live sidebar        ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    demo_app_core();
    demo_registry_service().await;

    println!();
    println!("═══════════════════════════════════════════════════════════════");
    println!("  ✅ Demo finished");
    println!("═══════════════════════════════════════════════════════════════");
}

fn section(name: &str) {
    println!("───────────────────────────────────────────────────────────────");
    println!("  📦 {}", name);
    println!("───────────────────────────────────────────────────────────────");
}

fn print_sidebar(view: &SidebarView) {
    for (i, window) in view.windows().iter().enumerate() {
        println!("  window {} ({} rows)", i, window.rows.len());
        for row in &window.rows {
            let mark = if row.muted { "x" } else { " " };
            println!("    [{}] {}", mark, row.title);
        }
    }
}

fn demo_app_core() {
    section("App Core (hosted prober and sidebar)");

    let prefs_path = std::env::temp_dir().join("noise-control-demo-prefs.json");
    let mut app = NoiseControl::new(Some(prefs_path.to_string_lossy().into_owned()), "locales");
    app.startup(LoadReason::Startup, now_secs());

    let window = app.coordinator.open_window();
    let radio = match app.open_tab(&window, Some("https://radio.example/")) {
        Ok(tab) => tab,
        Err(e) => {
            println!("  ✗ {}", e);
            return;
        }
    };
    let _quiet = app.open_tab(&window, Some("https://docs.example/"));
    println!("  Opened {} tabs in one window", app.coordinator.tabs.tab_count());

    let session = app.attach_sidebar();
    println!("  Sidebar '{}' attached", app.sidebar_title());

    app.coordinator.prober_event(&radio, ProberMessage::HasNoise(true));
    app.poll_sidebar(&session);
    if let Some(view) = app.sidebar_view(&session) {
        print_sidebar(view);
    }

    app.click_sidebar_mute(&session, &radio, true);
    let commands = app.poll_prober(&radio);
    println!("  Prober received: {:?}", commands);
    app.poll_sidebar(&session);
    if let Some(view) = app.sidebar_view(&session) {
        print_sidebar(view);
    }

    if let Some(indicator) = app.coordinator.indicator(&radio) {
        println!("  Indicator icon: {:?}, classes: {}", indicator.visual.icon, indicator.visual.classes.join(" "));
    }

    let _ = app.close_tab(&radio);
    app.poll_sidebar(&session);
    println!("  After close: {} rows", app.sidebar_view(&session).map(|v| v.row_count(0)).unwrap_or(0));

    app.shutdown(UnloadReason::Disable);
    let _ = std::fs::remove_file(&prefs_path);
    println!("  ✓ App core OK");
    println!();
}

async fn demo_registry_service() {
    section("Registry Service (prober tasks)");

    let (handle, service) = RegistryService::spawn(Coordinator::new());
    let window = match handle.open_window().await {
        Some(w) => w,
        None => return,
    };
    let tab = match handle.open_tab(window, Some("https://video.example/")).await {
        Some(Ok(tab)) => tab,
        _ => return,
    };

    let (outbox, mut updates) = sidebar_channel();
    let _session = handle.attach_sidebar(outbox).await;
    let mut view = SidebarView::new("Mute");

    let config = ProberConfig { debounce: Duration::from_millis(20) };
    let (content, prober_task) = handle.spawn_prober(tab.clone(), config);
    let _ = content.send(ContentEvent::ElementAdded(MediaElement::new("v1", MediaKind::Video).playing(true)));
    tokio::time::sleep(Duration::from_millis(60)).await;

    handle.intent(SidebarIntent::AudioStateChanged { id: tab.clone(), state: Some(true) });
    tokio::time::sleep(Duration::from_millis(20)).await;

    while let Ok(message) = updates.try_recv() {
        let label = match &message {
            SidebarMessage::Everything(w) => format!("everything ({} windows)", w.len()),
            SidebarMessage::TabChanged(r) => format!("tabchanged {} muted={}", r.title, r.muted),
        };
        println!("  Sidebar update: {}", label);
        view.apply(&message);
    }
    print_sidebar(&view);

    handle.shutdown();
    drop(content);
    if let Ok(prober) = prober_task.await {
        println!("  Prober disabled: {}, mute in effect: {}", prober.is_disabled(), prober.is_mute_in_effect());
    }
    if let Ok(coordinator) = service.await {
        println!("  Registry disposed: {}", coordinator.registry.is_disposed());
    }
    println!("  ✓ Registry service OK");
    println!();
}
