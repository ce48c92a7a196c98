pub mod constants;
pub mod identity;
pub mod progress;
pub mod step;

pub use identity::Identity;
pub use progress::ProgressRecord;
pub use step::Step;
