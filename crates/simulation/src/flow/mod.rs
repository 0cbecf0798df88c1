//! Live flow engine: animated connectors from the hub to items and the
//! discrete system state derived from them.

pub mod event;
mod manager;
mod plugin;
mod state;

#[cfg(test)]
mod tests;

pub use event::{FlowEvent, FlowIntensity, FlowMode, FlowPhase};
pub use manager::FlowEventManager;
pub use plugin::{ErrorSignal, FlowPlugin, FlowTrigger, StreamCommand};
pub use state::{FlowEventView, FlowSnapshot, SystemState};
