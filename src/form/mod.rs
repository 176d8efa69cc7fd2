pub mod controller;
pub mod draft;
