//! Domain types for ConfluenceLab

pub mod outcome;
pub mod trade;

pub use outcome::Outcome;
pub use trade::Trade;

/// Confluence tag name as it appears in the trade log.
pub type Tag = String;
