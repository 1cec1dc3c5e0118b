pub mod container_models;
pub mod error_models;
pub mod image_models;
pub mod link_report_models;
pub mod network_models;
