pub mod components;
pub mod screen;
