//! Registry Service — the coordinator's execution context as a tokio task.
//!
//! The task owns the registry and chrome state outright, so nothing is shared
//! and nothing is locked. Prober reports arrive on their own channel and
//! everything else on the inbox; reports are drained first, so a report sent
//! before an inbox message is always handled before it.

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::managers::coordinator::Coordinator;
use crate::managers::indicator_registry::{Indicator, ProberSender, SessionId, SidebarSender};
use crate::services::tab_audio_prober::{run_prober, ContentEvent, ProberConfig, TabAudioProber};
use crate::types::errors::TabError;
use crate::types::indicator::WindowSnapshot;
use crate::types::protocol::{ProberMessage, ProberReport, SidebarIntent, SidebarMessage};
use crate::types::tab::{TabIdentity, WindowId};

/// Everything the coordinator accepts besides prober reports.
#[derive(Debug)]
pub enum RegistryInput {
    Sidebar(SidebarIntent),
    AttachSidebar {
        outbox: SidebarSender,
        reply: oneshot::Sender<SessionId>,
    },
    DetachSidebar(SessionId),
    LinkProber {
        tab: TabIdentity,
        commands: ProberSender,
    },
    OpenWindow {
        reply: oneshot::Sender<WindowId>,
    },
    OpenTab {
        window: WindowId,
        url: Option<String>,
        reply: oneshot::Sender<Result<TabIdentity, TabError>>,
    },
    CloseTab(TabIdentity),
    CloseWindow(WindowId),
    MoveTab {
        tab: TabIdentity,
        index: usize,
    },
    PinTab {
        tab: TabIdentity,
        pinned: bool,
    },
    SelectTab(TabIdentity),
    IndicatorClicked(TabIdentity),
    ColourChanged(String),
    Snapshot {
        reply: oneshot::Sender<Vec<WindowSnapshot>>,
    },
    Inspect {
        tab: TabIdentity,
        reply: oneshot::Sender<Option<Indicator>>,
    },
    Shutdown,
}

/// Cloneable handle for talking to a running registry service.
#[derive(Clone)]
pub struct RegistryHandle {
    inbox: mpsc::UnboundedSender<RegistryInput>,
    reports: mpsc::UnboundedSender<ProberReport>,
}

impl RegistryHandle {
    fn send(&self, input: RegistryInput) -> bool {
        self.inbox.send(input).is_ok()
    }

    /// Sender probers use for their reports.
    pub fn report_sender(&self) -> mpsc::UnboundedSender<ProberReport> {
        self.reports.clone()
    }

    pub fn report(&self, tab: TabIdentity, message: ProberMessage) -> bool {
        self.reports.send(ProberReport { tab, message }).is_ok()
    }

    pub fn intent(&self, intent: SidebarIntent) -> bool {
        self.send(RegistryInput::Sidebar(intent))
    }

    /// Attaches a sidebar; its first message on `outbox` is the full snapshot.
    pub async fn attach_sidebar(&self, outbox: SidebarSender) -> Option<SessionId> {
        let (reply, rx) = oneshot::channel();
        if !self.send(RegistryInput::AttachSidebar { outbox, reply }) {
            return None;
        }
        rx.await.ok()
    }

    pub fn detach_sidebar(&self, session: SessionId) -> bool {
        self.send(RegistryInput::DetachSidebar(session))
    }

    pub fn link_prober(&self, tab: TabIdentity, commands: ProberSender) -> bool {
        self.send(RegistryInput::LinkProber { tab, commands })
    }

    pub async fn open_window(&self) -> Option<WindowId> {
        let (reply, rx) = oneshot::channel();
        if !self.send(RegistryInput::OpenWindow { reply }) {
            return None;
        }
        rx.await.ok()
    }

    pub async fn open_tab(&self, window: WindowId, url: Option<&str>) -> Option<Result<TabIdentity, TabError>> {
        let (reply, rx) = oneshot::channel();
        let input = RegistryInput::OpenTab {
            window,
            url: url.map(str::to_string),
            reply,
        };
        if !self.send(input) {
            return None;
        }
        rx.await.ok()
    }

    pub fn close_tab(&self, tab: TabIdentity) -> bool {
        self.send(RegistryInput::CloseTab(tab))
    }

    pub fn close_window(&self, window: WindowId) -> bool {
        self.send(RegistryInput::CloseWindow(window))
    }

    pub fn move_tab(&self, tab: TabIdentity, index: usize) -> bool {
        self.send(RegistryInput::MoveTab { tab, index })
    }

    pub fn pin_tab(&self, tab: TabIdentity, pinned: bool) -> bool {
        self.send(RegistryInput::PinTab { tab, pinned })
    }

    pub fn select_tab(&self, tab: TabIdentity) -> bool {
        self.send(RegistryInput::SelectTab(tab))
    }

    pub fn click_indicator(&self, tab: TabIdentity) -> bool {
        self.send(RegistryInput::IndicatorClicked(tab))
    }

    pub fn colour_changed(&self, colour: impl Into<String>) -> bool {
        self.send(RegistryInput::ColourChanged(colour.into()))
    }

    pub async fn snapshot(&self) -> Option<Vec<WindowSnapshot>> {
        let (reply, rx) = oneshot::channel();
        if !self.send(RegistryInput::Snapshot { reply }) {
            return None;
        }
        rx.await.ok()
    }

    pub async fn indicator(&self, tab: TabIdentity) -> Option<Indicator> {
        let (reply, rx) = oneshot::channel();
        if !self.send(RegistryInput::Inspect { tab, reply }) {
            return None;
        }
        rx.await.ok().flatten()
    }

    pub fn shutdown(&self) -> bool {
        self.send(RegistryInput::Shutdown)
    }

    /// Starts a prober task for `tab` and links it to the registry.
    ///
    /// Returns the sender for the tab's content events and the prober task.
    pub fn spawn_prober(
        &self,
        tab: TabIdentity,
        config: ProberConfig,
    ) -> (mpsc::UnboundedSender<ContentEvent>, JoinHandle<TabAudioProber>) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (content_tx, content_rx) = mpsc::unbounded_channel();
        let prober = TabAudioProber::new(tab.clone(), self.report_sender(), config);
        self.link_prober(tab, command_tx);
        let task = tokio::spawn(run_prober(prober, command_rx, content_rx));
        (content_tx, task)
    }
}

pub struct RegistryService {
    coordinator: Coordinator,
    inbox: mpsc::UnboundedReceiver<RegistryInput>,
    reports: mpsc::UnboundedReceiver<ProberReport>,
}

impl RegistryService {
    pub fn new(coordinator: Coordinator) -> (Self, RegistryHandle) {
        let (inbox_tx, inbox) = mpsc::unbounded_channel();
        let (reports_tx, reports) = mpsc::unbounded_channel();
        let service = Self {
            coordinator,
            inbox,
            reports,
        };
        let handle = RegistryHandle {
            inbox: inbox_tx,
            reports: reports_tx,
        };
        (service, handle)
    }

    /// Spawns the service on the current runtime.
    pub fn spawn(coordinator: Coordinator) -> (RegistryHandle, JoinHandle<Coordinator>) {
        let (service, handle) = Self::new(coordinator);
        (handle, tokio::spawn(service.run()))
    }

    /// Runs until shutdown or until every handle is dropped, then disposes
    /// the registry and hands the coordinator back.
    pub async fn run(mut self) -> Coordinator {
        info!("registry service started");
        let mut reports_open = true;
        loop {
            tokio::select! {
                biased;
                report = self.reports.recv(), if reports_open => match report {
                    Some(report) => self.coordinator.prober_event(&report.tab, report.message),
                    None => reports_open = false,
                },
                input = self.inbox.recv() => match input {
                    Some(RegistryInput::Shutdown) | None => break,
                    Some(input) => self.handle(input),
                },
            }
        }
        self.coordinator.dispose();
        info!("registry service stopped");
        self.coordinator
    }

    fn handle(&mut self, input: RegistryInput) {
        let c = &mut self.coordinator;
        match input {
            RegistryInput::Sidebar(intent) => c.sidebar_intent(intent),
            RegistryInput::AttachSidebar { outbox, reply } => {
                let session = c.attach_sidebar(outbox);
                let _ = reply.send(session);
            }
            RegistryInput::DetachSidebar(session) => {
                c.detach_sidebar(&session);
            }
            RegistryInput::LinkProber { tab, commands } => {
                c.link_prober(tab, commands);
            }
            RegistryInput::OpenWindow { reply } => {
                let _ = reply.send(c.open_window());
            }
            RegistryInput::OpenTab { window, url, reply } => {
                let _ = reply.send(c.open_tab(&window, url.as_deref(), true));
            }
            RegistryInput::CloseTab(tab) => log_missing(c.close_tab(&tab)),
            RegistryInput::CloseWindow(window) => log_missing(c.close_window(&window).map(|_| ())),
            RegistryInput::MoveTab { tab, index } => log_missing(c.move_tab(&tab, index)),
            RegistryInput::PinTab { tab, pinned } => log_missing(c.set_pinned(&tab, pinned)),
            RegistryInput::SelectTab(tab) => log_missing(c.select_tab(&tab)),
            RegistryInput::IndicatorClicked(tab) => c.indicator_click(&tab),
            RegistryInput::ColourChanged(colour) => {
                let _ = c.set_indicator_colour(&colour);
            }
            RegistryInput::Snapshot { reply } => {
                let _ = reply.send(c.snapshot());
            }
            RegistryInput::Inspect { tab, reply } => {
                let _ = reply.send(c.indicator(&tab).cloned());
            }
            RegistryInput::Shutdown => {}
        }
    }
}

/// Chrome events racing a closing tab are expected; they are not errors.
fn log_missing(result: Result<(), TabError>) {
    if let Err(e) = result {
        debug!(error = %e, "chrome event for missing target");
    }
}

/// Receiving half of a sidebar session, for hosts that render views.
pub fn sidebar_channel() -> (SidebarSender, mpsc::UnboundedReceiver<SidebarMessage>) {
    mpsc::unbounded_channel()
}
