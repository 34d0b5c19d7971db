pub mod editor;
pub mod exercise;
