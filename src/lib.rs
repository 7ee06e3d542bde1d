mod notifier;
mod signal;

pub use notifier::Notifier;
pub use notifier::WaitHandle;
pub use signal::Triggered;
