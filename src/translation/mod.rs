pub mod chain;
pub mod tables;
pub mod template;
