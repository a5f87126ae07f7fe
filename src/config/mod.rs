pub mod loader;
pub mod logging;
pub mod oracle;
pub mod store;
