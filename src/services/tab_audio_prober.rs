//! Tab Audio Prober — content-side observer for one tab.
//!
//! Tracks the media and plugin elements of a tab (including nested frames),
//! reports when the tab starts or stops making noise, and applies mute
//! commands from the registry. Mute is a property of the tab: elements that
//! appear while mute is in effect are muted as they are added.

use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tracing::debug;

use crate::types::protocol::{ProberCommand, ProberMessage, ProberReport};
use crate::types::tab::TabIdentity;

/// Default settle window for noise reports.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Audio,
    Video,
    Plugin,
}

/// One media or plugin element in the tab's document tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaElement {
    pub id: String,
    pub kind: MediaKind,
    /// Frame nesting path, empty for the top-level document.
    pub frame_path: Vec<u32>,
    pub playing: bool,
    pub muted: bool,
    /// Whether the element carries an audio track at non-zero volume.
    pub audible: bool,
}

impl MediaElement {
    pub fn new(id: impl Into<String>, kind: MediaKind) -> Self {
        Self {
            id: id.into(),
            kind,
            frame_path: Vec::new(),
            playing: false,
            muted: false,
            audible: true,
        }
    }

    pub fn in_frame(mut self, frame_path: Vec<u32>) -> Self {
        self.frame_path = frame_path;
        self
    }

    pub fn playing(mut self, playing: bool) -> Self {
        self.playing = playing;
        self
    }

    fn makes_noise(&self) -> bool {
        self.kind != MediaKind::Plugin && self.playing && self.audible
    }
}

/// Content-side changes observed in the tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentEvent {
    ElementAdded(MediaElement),
    ElementRemoved(String),
    PlaybackChanged { id: String, playing: bool },
    /// The element's mute attribute changed from content (e.g. its native control).
    ElementMuteChanged { id: String, muted: bool },
    Unload,
}

#[derive(Debug, Clone)]
pub struct ProberConfig {
    /// Settle window for noise reports. Zero reports immediately.
    pub debounce: Duration,
}

impl Default for ProberConfig {
    fn default() -> Self {
        Self { debounce: DEFAULT_DEBOUNCE }
    }
}

pub struct TabAudioProber {
    tab: TabIdentity,
    reports: mpsc::UnboundedSender<ProberReport>,
    config: ProberConfig,
    elements: Vec<MediaElement>,
    /// Privileged or API-less document: never reports anything.
    restricted: bool,
    disabled: bool,
    mute_in_effect: bool,
    reported_noise: bool,
    reported_plugins: bool,
    noise_deadline: Option<Instant>,
}

impl TabAudioProber {
    pub fn new(tab: TabIdentity, reports: mpsc::UnboundedSender<ProberReport>, config: ProberConfig) -> Self {
        Self {
            tab,
            reports,
            config,
            elements: Vec::new(),
            restricted: false,
            disabled: false,
            mute_in_effect: false,
            reported_noise: false,
            reported_plugins: false,
            noise_deadline: None,
        }
    }

    /// A prober for a document without media access.
    pub fn restricted(tab: TabIdentity, reports: mpsc::UnboundedSender<ProberReport>) -> Self {
        let mut prober = Self::new(tab, reports, ProberConfig::default());
        prober.restricted = true;
        prober
    }

    fn send(&mut self, message: ProberMessage) {
        if self.restricted || self.disabled {
            return;
        }
        let report = ProberReport {
            tab: self.tab.clone(),
            message,
        };
        if self.reports.send(report).is_err() {
            debug!(tab = %self.tab, "registry gone, prober disabling");
            self.disabled = true;
        }
    }

    fn noise_predicate(&self) -> bool {
        self.elements.iter().any(MediaElement::makes_noise)
    }

    fn plugins_predicate(&self) -> bool {
        self.elements.iter().any(|e| e.kind == MediaKind::Plugin)
    }

    // ─── Reports ───

    /// Reports the noise predicate if it differs from the last report.
    pub fn report_noise(&mut self, noisy: bool) {
        if self.restricted || self.disabled || noisy == self.reported_noise {
            return;
        }
        self.reported_noise = noisy;
        self.send(ProberMessage::HasNoise(noisy));
    }

    /// Reports plugin presence if it differs from the last report.
    pub fn report_plugins(&mut self, has_plugins: bool) {
        if self.restricted || self.disabled || has_plugins == self.reported_plugins {
            return;
        }
        self.reported_plugins = has_plugins;
        self.send(ProberMessage::HasPlugins(has_plugins));
    }

    /// Re-reports the current noise predicate unconditionally.
    pub fn check_noise(&mut self) {
        self.noise_deadline = None;
        let noisy = self.noise_predicate();
        self.reported_noise = noisy;
        self.send(ProberMessage::HasNoise(noisy));
    }

    /// Re-reports plugin presence unconditionally.
    pub fn check_plugins(&mut self) {
        let has_plugins = self.plugins_predicate();
        self.reported_plugins = has_plugins;
        self.send(ProberMessage::HasPlugins(has_plugins));
    }

    /// Re-evaluates the noise predicate after a media change, honouring the
    /// settle window.
    fn schedule_noise(&mut self) {
        if self.config.debounce.is_zero() {
            let noisy = self.noise_predicate();
            self.report_noise(noisy);
        } else if self.noise_deadline.is_none() {
            self.noise_deadline = Some(Instant::now() + self.config.debounce);
        }
    }

    /// When a debounced noise report is due.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.noise_deadline
    }

    /// Emits the settled noise report if its deadline has passed.
    pub fn flush_pending(&mut self, now: Instant) {
        match self.noise_deadline {
            Some(deadline) if now >= deadline => {
                self.noise_deadline = None;
                let noisy = self.noise_predicate();
                self.report_noise(noisy);
            }
            _ => {}
        }
    }

    // ─── Commands ───

    /// Mutes or unmutes every element in the tab, and keeps doing so for
    /// elements added later while mute is in effect.
    pub fn apply_mute(&mut self, muted: bool) {
        if self.disabled {
            return;
        }
        self.mute_in_effect = muted;
        for element in &mut self.elements {
            element.muted = muted;
        }
    }

    pub fn handle_command(&mut self, command: ProberCommand) {
        if self.disabled {
            return;
        }
        match command {
            ProberCommand::Mute(muted) => self.apply_mute(muted),
            ProberCommand::CheckNoise => self.check_noise(),
            ProberCommand::CheckPlugins => self.check_plugins(),
            ProberCommand::Disable => self.disable(),
        }
    }

    /// Stops all reporting and command handling.
    pub fn disable(&mut self) {
        self.disabled = true;
        self.noise_deadline = None;
    }

    // ─── Content events ───

    pub fn handle_content(&mut self, event: ContentEvent) {
        if self.disabled {
            return;
        }
        match event {
            ContentEvent::ElementAdded(element) => self.add_element(element),
            ContentEvent::ElementRemoved(id) => self.remove_element(&id),
            ContentEvent::PlaybackChanged { id, playing } => self.set_playing(&id, playing),
            ContentEvent::ElementMuteChanged { id, muted } => self.set_element_muted(&id, muted),
            ContentEvent::Unload => self.on_unload(),
        }
    }

    pub fn add_element(&mut self, mut element: MediaElement) {
        if self.mute_in_effect {
            element.muted = true;
        }
        let plugin = element.kind == MediaKind::Plugin;
        self.elements.retain(|e| e.id != element.id);
        self.elements.push(element);
        if plugin {
            let has_plugins = self.plugins_predicate();
            self.report_plugins(has_plugins);
        } else {
            self.schedule_noise();
        }
    }

    pub fn remove_element(&mut self, id: &str) {
        let before = self.elements.len();
        self.elements.retain(|e| e.id != id);
        if self.elements.len() != before {
            let has_plugins = self.plugins_predicate();
            self.report_plugins(has_plugins);
            self.schedule_noise();
        }
    }

    pub fn set_playing(&mut self, id: &str, playing: bool) {
        if let Some(element) = self.elements.iter_mut().find(|e| e.id == id) {
            element.playing = playing;
            self.schedule_noise();
        }
    }

    /// An element's mute attribute changed from inside the page. Unmuting
    /// while the tab is muted lifts the tab's mute and tells the registry.
    pub fn set_element_muted(&mut self, id: &str, muted: bool) {
        let found = match self.elements.iter_mut().find(|e| e.id == id) {
            Some(element) => {
                element.muted = muted;
                true
            }
            None => false,
        };
        if found && !muted && self.mute_in_effect {
            self.mute_in_effect = false;
            self.send(ProberMessage::Unmuted);
        }
    }

    /// The tab's document is going away.
    pub fn on_unload(&mut self) {
        self.send(ProberMessage::Unloaded);
        self.elements.clear();
        self.mute_in_effect = false;
        self.reported_noise = false;
        self.reported_plugins = false;
        self.noise_deadline = None;
    }

    // ─── Queries ───

    pub fn tab(&self) -> &TabIdentity {
        &self.tab
    }

    pub fn element(&self, id: &str) -> Option<&MediaElement> {
        self.elements.iter().find(|e| e.id == id)
    }

    pub fn elements(&self) -> &[MediaElement] {
        &self.elements
    }

    pub fn is_mute_in_effect(&self) -> bool {
        self.mute_in_effect
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }
}

/// Drives a prober as its own task: applies registry commands and content
/// events in arrival order and flushes debounced reports on time. Returns the
/// prober once it is disabled, or once both inputs are closed and any pending
/// noise report has been sent.
pub async fn run_prober(
    mut prober: TabAudioProber,
    mut commands: mpsc::UnboundedReceiver<ProberCommand>,
    mut content: mpsc::UnboundedReceiver<ContentEvent>,
) -> TabAudioProber {
    let mut commands_open = true;
    let mut content_open = true;

    while !prober.is_disabled() && (commands_open || content_open) {
        let deadline = prober.next_deadline();
        tokio::select! {
            command = commands.recv(), if commands_open => match command {
                Some(command) => prober.handle_command(command),
                None => commands_open = false,
            },
            event = content.recv(), if content_open => match event {
                Some(event) => prober.handle_content(event),
                None => content_open = false,
            },
            _ = sleep_until_deadline(deadline), if deadline.is_some() => {
                prober.flush_pending(Instant::now());
            }
        }
    }

    // Inputs are closed but a settled noise report may still be pending.
    if !prober.is_disabled() {
        if let Some(deadline) = prober.next_deadline() {
            sleep_until_deadline(Some(deadline)).await;
            prober.flush_pending(Instant::now());
        }
    }

    debug!(tab = %prober.tab(), "prober stopped");
    prober
}

async fn sleep_until_deadline(deadline: Option<Instant>) {
    if let Some(deadline) = deadline {
        tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await;
    }
}
