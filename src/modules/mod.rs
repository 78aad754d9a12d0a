pub mod perception;
pub mod brain;
pub mod action;
pub mod ledger;
pub mod pipeline;

pub use pipeline::NewsPipeline;
