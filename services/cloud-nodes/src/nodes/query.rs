//! Node Lookup query parameters
//!
//! Raw query string fields are deserialized into `RawNodesQuery` and then
//! validated into a `NodesQuery`.

use serde::Deserialize;

use crate::error::NodesError;
use crate::provider::{ProviderOptions, Tag, DEFAULT_MGMT_PORT};

/// Which owner address becomes the node IP
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressType {
    Public,
    Private,
}

impl AddressType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AddressType::Public => "public",
            AddressType::Private => "private",
        }
    }
}

impl std::fmt::Display for AddressType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AddressType {
    type Err = NodesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "public" => Ok(AddressType::Public),
            "private" => Ok(AddressType::Private),
            _ => Err(NodesError::InvalidParameter {
                name: "memberAddressType",
                reason: format!("expected public or private, got {}", s),
            }),
        }
    }
}

/// Query string as received
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawNodesQuery {
    pub cloud: Option<String>,
    pub member_tag: Option<String>,
    pub member_address_type: Option<String>,
    pub mgmt_port: Option<String>,
    pub provider_options: Option<String>,
}

/// Validated Node Lookup request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodesQuery {
    pub cloud: String,
    pub tag: Tag,
    pub address_type: AddressType,
    pub options: ProviderOptions,
}

impl TryFrom<RawNodesQuery> for NodesQuery {
    type Error = NodesError;

    fn try_from(raw: RawNodesQuery) -> Result<Self, Self::Error> {
        let cloud = required(raw.cloud, "cloud")?;
        let member_tag = required(raw.member_tag, "memberTag")?;
        let address_type: AddressType =
            required(raw.member_address_type, "memberAddressType")?.parse()?;

        let mgmt_port = match raw.mgmt_port.as_deref().filter(|p| !p.is_empty()) {
            Some(port) => port.trim().parse::<u16>().map_err(|_| NodesError::InvalidParameter {
                name: "mgmtPort",
                reason: format!("{} is not a valid port", port),
            })?,
            None => DEFAULT_MGMT_PORT,
        };

        Ok(Self {
            cloud,
            tag: parse_tag(&member_tag),
            address_type,
            options: parse_provider_options(mgmt_port, raw.provider_options.as_deref()),
        })
    }
}

fn required(value: Option<String>, name: &'static str) -> Result<String, NodesError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or(NodesError::MissingParameter(name))
}

/// Split on the first `=` only, so the right side may contain more `=`
pub fn split_pair(input: &str) -> Option<(&str, &str)> {
    input.split_once('=')
}

/// `key=value` or a bare `value`
pub fn parse_tag(member_tag: &str) -> Tag {
    match split_pair(member_tag) {
        Some((key, value)) if !key.is_empty() => Tag::new(Some(key), value),
        Some((_, value)) => Tag::new(None, value),
        None => Tag::new(None, member_tag),
    }
}

/// Build init options from the management port and `k=v,k=v` pairs.
///
/// Pairs without `=`, with nothing after the `=`, or with an empty key are
/// skipped. Whitespace-only values are kept and trimmed to `""`. A `mgmtPort`
/// pair replaces the port when it parses, and is skipped otherwise.
pub fn parse_provider_options(mgmt_port: u16, provider_options: Option<&str>) -> ProviderOptions {
    let mut options = ProviderOptions::new(mgmt_port);

    let Some(pairs) = provider_options else {
        return options;
    };

    for pair in pairs.split(',') {
        let Some((key, value)) = split_pair(pair) else {
            continue;
        };
        if value.is_empty() {
            continue;
        }
        let (key, value) = (key.trim(), value.trim());
        if key.is_empty() {
            continue;
        }

        if key == "mgmtPort" {
            if let Ok(port) = value.parse::<u16>() {
                options.mgmt_port = port;
            }
            continue;
        }

        options.extra.insert(key.to_string(), value.to_string());
    }

    options
}
