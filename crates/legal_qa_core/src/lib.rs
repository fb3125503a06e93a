pub mod domain;
pub mod ports;

pub use domain::{InteractionKind, InteractionRecord, NewInteractionRecord};
pub use ports::{AnsweringService, HistoryService, PortError, PortResult};
