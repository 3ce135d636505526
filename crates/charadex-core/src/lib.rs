pub mod merge;
pub mod oracle;
pub mod pipeline;
pub mod reference;
pub mod segment;
pub mod settings;
pub mod snapshot;
pub mod store;
pub mod unicode;
pub mod validate;
