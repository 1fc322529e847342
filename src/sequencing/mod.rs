pub mod rate;
pub mod step;
pub mod time_signature;
pub mod transport;

pub use rate::StepRate;
pub use step::StepSequencer;
pub use time_signature::TimeSignature;
pub use transport::{ResetReason, TransportEvent, TransportSnapshot, TransportSync};
