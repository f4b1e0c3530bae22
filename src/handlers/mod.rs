pub mod protected;
pub mod public;
