pub mod registry_model;
pub mod view;
