//! Activity signal adapter: turns polled "currently working on X" pings
//! into start/update/stop/target-changed notifications.

mod adapter;
mod channel;
mod plugin;
mod signal;


pub use adapter::{
    ActivityAdapter, ActivityClock, ActivityEvent, ActivityStatus, ActivityTransitions,
};
pub use channel::{ActivityChannel, ActivitySource, FileActivityChannel, SharedActivityChannel};
pub use plugin::{ActivityPlugin, ActivityPollTimer};
pub use signal::ActivitySignal;
