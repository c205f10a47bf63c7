pub mod demo;
pub mod scene;
