// Declarative commands: apply, diff, status
pub mod declarative;

pub mod platform;
pub mod show;
