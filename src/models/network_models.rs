use std::collections::HashMap;

use bollard::network::CreateNetworkOptions;

/// Requested shape of the user-defined network.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkSpec {
    pub name: String,
    /// lets containers attach after the network exists
    pub attachable: bool,
    /// asks the engine to refuse a second network with the same name
    pub check_duplicate: bool,
    pub labels: HashMap<String, String>,
}

impl NetworkSpec {
    pub fn new(name: &str, labels: HashMap<String, String>) -> NetworkSpec {
        NetworkSpec {
            name: name.to_string(),
            attachable: true,
            check_duplicate: true,
            labels,
        }
    }

    pub fn to_create_options(&self) -> CreateNetworkOptions<String> {
        CreateNetworkOptions {
            name: self.name.clone(),
            check_duplicate: self.check_duplicate,
            attachable: self.attachable,
            driver: "bridge".to_string(),
            labels: self.labels.clone(),
            ..Default::default()
        }
    }
}

/// Handle to a network created by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkNetwork {
    ///engine generated id
    pub id: String,
    pub name: String,
}
