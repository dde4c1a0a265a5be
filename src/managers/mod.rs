// Noise Control state managers
// Managers own stateful bookkeeping: windows and tabs, indicator state, and the coordinator tying them together.

pub mod coordinator;
pub mod indicator_registry;
pub mod tab_manager;
