pub mod clock;
pub mod control;
pub mod hub;
pub mod runner;
pub mod source;

pub use clock::FpsMeter;
pub use control::{ControlEvent, ControlQueue};
pub use hub::{HubSnapshot, SnapshotHub, HUB_MAX_EVENTS};
pub use runner::{FrameReport, PoolRunner};
pub use source::{FrameRecord, FrameSource, SourceError};
