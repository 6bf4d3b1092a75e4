pub mod jargon;
pub mod recognition;
pub mod ws;
