pub mod access;
pub mod browse;
pub mod settings;
