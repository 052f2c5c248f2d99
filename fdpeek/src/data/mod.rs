pub mod classify;
pub mod inspector;
pub mod procfs;
