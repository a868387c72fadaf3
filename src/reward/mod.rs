pub mod handlers;
pub mod locks;
pub mod messages;
pub mod services;
pub mod verifier;

pub use locks::UserLocks;
