use std::{fmt::Display, sync::OnceLock};

use regex::Regex;

use super::error_models::{LinkError, Result};

pub const DEFAULT_TAG: &str = "latest";

static PATH_COMPONENT: OnceLock<Regex> = OnceLock::new();
static REGISTRY_COMPONENT: OnceLock<Regex> = OnceLock::new();
static TAG: OnceLock<Regex> = OnceLock::new();
static DIGEST: OnceLock<Regex> = OnceLock::new();

fn pattern(cell: &'static OnceLock<Regex>, source: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(source).expect("image reference pattern compiles"))
}

///An image reference as it is handed to the engine.
///A reference without tag or digest is pinned to `latest`, otherwise the engine pulls every tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    pub name: String,
    pub tag: Option<String>,
    pub digest: Option<String>,
}

impl ImageReference {
    pub fn parse(raw: &str) -> Result<ImageReference> {
        let invalid = |reason: &str| LinkError::InvalidImage {
            image: raw.to_string(),
            reason: reason.to_string(),
        };
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(invalid("reference is empty"));
        }

        let (rest, digest) = match trimmed.split_once('@') {
            Some((rest, digest)) => {
                if !pattern(&DIGEST, r"^[A-Za-z][A-Za-z0-9]*(?:[-_+.][A-Za-z][A-Za-z0-9]*)*:[0-9a-fA-F]{32,}$")
                    .is_match(digest)
                {
                    return Err(invalid("malformed digest"));
                }
                (rest, Some(digest.to_string()))
            }
            None => (trimmed, None),
        };

        // a colon only separates a tag when it follows the last path separator
        let last_slash = rest.rfind('/').map(|i| i + 1).unwrap_or(0);
        let (name, tag) = match rest[last_slash..].rfind(':') {
            Some(colon) => {
                let split = last_slash + colon;
                (&rest[..split], Some(rest[split + 1..].to_string()))
            }
            None => (rest, None),
        };

        if let Some(tag) = &tag {
            if !pattern(&TAG, r"^[\w][\w.-]{0,127}$").is_match(tag) {
                return Err(invalid("malformed tag"));
            }
        }

        let components: Vec<&str> = name.split('/').collect();
        for (index, component) in components.iter().enumerate() {
            let is_registry = index == 0
                && components.len() > 1
                && (component.contains('.') || component.contains(':') || *component == "localhost");
            let valid = if is_registry {
                pattern(
                    &REGISTRY_COMPONENT,
                    r"^[a-zA-Z0-9](?:[a-zA-Z0-9.-]*[a-zA-Z0-9])?(?::[0-9]+)?$",
                )
                .is_match(component)
            } else {
                pattern(&PATH_COMPONENT, r"^[a-z0-9]+(?:(?:[._]|__|-+)[a-z0-9]+)*$").is_match(component)
            };
            if !valid {
                return Err(invalid(&format!("invalid name component '{}'", component)));
            }
        }

        Ok(ImageReference {
            name: name.to_string(),
            tag,
            digest,
        })
    }

    ///The reference sent to pull and create calls.
    pub fn pull_reference(&self) -> String {
        match (&self.tag, &self.digest) {
            (Some(tag), Some(digest)) => format!("{}:{}@{}", self.name, tag, digest),
            (None, Some(digest)) => format!("{}@{}", self.name, digest),
            (Some(tag), None) => format!("{}:{}", self.name, tag),
            (None, None) => format!("{}:{}", self.name, DEFAULT_TAG),
        }
    }
}

impl Display for ImageReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.pull_reference())
    }
}
