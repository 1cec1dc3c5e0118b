pub mod config_utils;
pub mod docker_utils;
pub mod logging_utils;

#[cfg(test)]
pub mod test_utils;
