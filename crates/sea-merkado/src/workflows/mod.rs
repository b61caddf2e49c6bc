pub mod notifications;
pub mod sellers;
