use serde::Serialize;
use uuid::Uuid;

/// Summary of a completed link run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkReport {
    ///value of the run label put on every network and container
    pub run_id: Uuid,
    pub network_id: String,
    pub server_container_id: String,
    pub client_container_id: String,
    pub client_exit_code: i64,
    ///the server stop is not fatal; its failure lands here
    pub server_stop_error: Option<String>,
    pub cleanup_failures: Vec<String>,
}

impl LinkReport {
    pub fn is_clean(&self) -> bool {
        self.server_stop_error.is_none() && self.cleanup_failures.is_empty()
    }
}
