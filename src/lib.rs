// Crate root library declaration and module exports.
pub mod cli;
pub mod config;
pub mod context;
pub mod controller;
pub mod model;
pub mod report;
pub mod rewrite;
pub mod scan;
pub mod storage;
pub mod validation;
