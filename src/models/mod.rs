pub mod assessment;
pub mod protocol;

pub use assessment::Assessment;
pub use protocol::{Protocol, ProtocolItem};
