pub mod photos;
pub mod processed;

pub use photos::PhotoLedger;
pub use processed::ProcessedLedger;
