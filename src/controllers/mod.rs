pub mod cleanup_controller;
pub mod container_controller;
pub mod image_controller;
pub mod network_controller;
