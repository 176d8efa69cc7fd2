pub mod console;
pub mod fragment;
pub mod html;
pub mod renderer;
