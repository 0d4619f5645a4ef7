pub mod directory;
pub mod export;
pub mod insight;
