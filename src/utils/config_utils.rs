use std::{fmt::Display, sync::OnceLock};

use regex::Regex;

use crate::models::{
    error_models::{LinkError, Result},
    image_models::ImageReference,
};

static DNS_NAME: OnceLock<Regex> = OnceLock::new();

/// Seconds between curl's connection attempts while the server comes up.
pub const CLIENT_RETRY_DELAY_SECONDS: u32 = 1;
pub const CLIENT_RETRIES: u32 = 5;

///dot separated labels of 1-63 alphanumerics or inner hyphens
fn is_dns_name(name: &str) -> bool {
    let pattern = DNS_NAME.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)*$")
            .expect("dns name pattern compiles")
    });
    name.len() <= 253 && pattern.is_match(name)
}

#[allow(non_camel_case_types)]
pub enum LinkEnv {
    CLIENT_IMAGE,
    SERVER_IMAGE,
    NETWORK_NAME,
    SERVER_ALIAS,
    SERVER_PORT,
    REQUEST_PATH,
    STOP_GRACE_SECONDS,
    REMOVE_CONTAINERS,
    REMOVE_IMAGES,
    LOG_LEVEL,
}

impl Display for LinkEnv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl LinkEnv {
    pub fn as_str(&self) -> &str {
        match *self {
            Self::CLIENT_IMAGE => "LINK_CLIENT_IMAGE",
            Self::SERVER_IMAGE => "LINK_SERVER_IMAGE",
            Self::NETWORK_NAME => "LINK_NETWORK_NAME",
            Self::SERVER_ALIAS => "LINK_SERVER_ALIAS",
            Self::SERVER_PORT => "LINK_SERVER_PORT",
            Self::REQUEST_PATH => "LINK_REQUEST_PATH",
            Self::STOP_GRACE_SECONDS => "LINK_STOP_GRACE_SECONDS",
            Self::REMOVE_CONTAINERS => "LINK_REMOVE_CONTAINERS",
            Self::REMOVE_IMAGES => "LINK_REMOVE_IMAGES",
            Self::LOG_LEVEL => "LINK_LOG_LEVEL",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinkConfig {
    pub client_image: ImageReference,
    pub server_image: ImageReference,
    pub network_name: String,
    pub server_alias: String,
    pub server_port: u16,
    ///path and query, always starts with '/'
    pub request_path: String,
    pub stop_grace_seconds: i64,
    pub remove_containers: bool,
    pub remove_images: bool,
    pub log_level: String,
}

impl LinkConfig {
    pub fn from_env() -> Result<LinkConfig> {
        LinkConfig::from_lookup(|key| std::env::var(key).ok())
    }

    ///builds the config from any key lookup; unset keys fall back to defaults
    pub fn from_lookup<F>(lookup: F) -> Result<LinkConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: LinkEnv, default: &str| -> String {
            lookup(key.as_str())
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let client_image = parse_image(LinkEnv::CLIENT_IMAGE, &value(LinkEnv::CLIENT_IMAGE, "curlimages/curl"))?;
        let server_image = parse_image(LinkEnv::SERVER_IMAGE, &value(LinkEnv::SERVER_IMAGE, "mccutchen/go-httpbin"))?;

        let network_name = value(LinkEnv::NETWORK_NAME, "docker-link");
        let server_alias = value(LinkEnv::SERVER_ALIAS, "httpbin");
        if !is_dns_name(&server_alias) {
            return Err(config_error(LinkEnv::SERVER_ALIAS, "alias must be a DNS name"));
        }

        let server_port = match value(LinkEnv::SERVER_PORT, "8080").parse::<u16>() {
            Ok(0) => return Err(config_error(LinkEnv::SERVER_PORT, "port cannot be 0")),
            Ok(port) => port,
            Err(err) => return Err(config_error(LinkEnv::SERVER_PORT, &err.to_string())),
        };

        let mut request_path = value(LinkEnv::REQUEST_PATH, "/get?foo=bar");
        if !request_path.starts_with('/') {
            request_path.insert(0, '/');
        }

        let stop_grace_seconds = match value(LinkEnv::STOP_GRACE_SECONDS, "5").parse::<i64>() {
            Ok(seconds) if seconds < 0 => {
                return Err(config_error(LinkEnv::STOP_GRACE_SECONDS, "grace period cannot be negative"))
            }
            Ok(seconds) => seconds,
            Err(err) => return Err(config_error(LinkEnv::STOP_GRACE_SECONDS, &err.to_string())),
        };

        let remove_containers = parse_flag(LinkEnv::REMOVE_CONTAINERS, &value(LinkEnv::REMOVE_CONTAINERS, "false"))?;
        let remove_images = parse_flag(LinkEnv::REMOVE_IMAGES, &value(LinkEnv::REMOVE_IMAGES, "false"))?;
        // the engine refuses to remove an image that a kept container still references
        if remove_images && !remove_containers {
            return Err(config_error(
                LinkEnv::REMOVE_IMAGES,
                &format!("image removal requires {}", LinkEnv::REMOVE_CONTAINERS),
            ));
        }

        Ok(LinkConfig {
            client_image,
            server_image,
            network_name,
            server_alias,
            server_port,
            request_path,
            stop_grace_seconds,
            remove_containers,
            remove_images,
            log_level: value(LinkEnv::LOG_LEVEL, "info").to_lowercase(),
        })
    }

    ///the url the client container requests, resolved through the server alias
    pub fn server_url(&self) -> String {
        format!("http://{}:{}{}", self.server_alias, self.server_port, self.request_path)
    }

    ///curl retries refused connections, the server may still be binding its port
    pub fn client_command(&self) -> Vec<String> {
        vec![
            "curl".to_string(),
            "--silent".to_string(),
            "--show-error".to_string(),
            "--retry".to_string(),
            CLIENT_RETRIES.to_string(),
            "--retry-delay".to_string(),
            CLIENT_RETRY_DELAY_SECONDS.to_string(),
            "--retry-connrefused".to_string(),
            self.server_url(),
        ]
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        LinkConfig {
            client_image: ImageReference {
                name: "curlimages/curl".to_string(),
                tag: None,
                digest: None,
            },
            server_image: ImageReference {
                name: "mccutchen/go-httpbin".to_string(),
                tag: None,
                digest: None,
            },
            network_name: "docker-link".to_string(),
            server_alias: "httpbin".to_string(),
            server_port: 8080,
            request_path: "/get?foo=bar".to_string(),
            stop_grace_seconds: 5,
            remove_containers: false,
            remove_images: false,
            log_level: "info".to_string(),
        }
    }
}

fn config_error(key: LinkEnv, reason: &str) -> LinkError {
    LinkError::Config {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_image(key: LinkEnv, raw: &str) -> Result<ImageReference> {
    ImageReference::parse(raw).map_err(|err| config_error(key, &err.to_string()))
}

fn parse_flag(key: LinkEnv, raw: &str) -> Result<bool> {
    match raw.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(config_error(key, &format!("'{}' is not a boolean", raw))),
    }
}
