pub mod cli;
pub mod console;
pub mod form;
pub mod poll;
pub mod registry;
pub mod render;
pub mod scan;
pub mod trace;
pub mod transport;
