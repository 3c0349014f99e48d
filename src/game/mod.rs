//! Game-level shared state: entities, turns, events, observer traffic

pub mod events;
pub mod state;
pub mod turns;

pub use events::{Audience, Event, EventKind, EventLog, MotiveSeverity};
pub use state::{GameState, Notification, Player};
pub use turns::{ClassMask, SlotKind, TurnQueue, TurnSlot};
