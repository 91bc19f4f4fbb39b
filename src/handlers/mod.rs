mod health;
mod identity;

pub use health::health_check;
pub use identity::whoami;
