pub mod emoji;
pub mod interactive;
pub mod message;
pub mod styles;
