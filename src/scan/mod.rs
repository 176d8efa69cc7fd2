pub mod reconciler;
pub mod scan_model;
