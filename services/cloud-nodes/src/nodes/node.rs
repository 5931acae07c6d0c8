//! Pool member records and owner reduction

use serde::{Deserialize, Serialize};

use super::query::AddressType;
use crate::provider::Owner;

/// A load-balancing pool member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// `<owner id>-<address type>`
    pub id: String,
    pub ip: String,
}

impl Node {
    /// Node for the owner's address of the requested type, if it has one
    pub fn from_owner(owner: &Owner, address_type: AddressType) -> Option<Self> {
        let ip = match address_type {
            AddressType::Public => owner.ip.public.as_deref(),
            AddressType::Private => owner.ip.private.as_deref(),
        }
        .filter(|ip| !ip.is_empty())?;

        Some(Self {
            id: format!("{}-{}", owner.id, address_type),
            ip: ip.to_string(),
        })
    }
}

/// Reduce owners to nodes, dropping owners without the address type
pub fn to_nodes(owners: &[Owner], address_type: AddressType) -> Vec<Node> {
    owners
        .iter()
        .filter_map(|owner| Node::from_owner(owner, address_type))
        .collect()
}

/// Nodes from interfaces, or from virtual machines when interfaces produce none
pub fn select_nodes(
    nics: Option<Vec<Owner>>,
    vms: Option<Vec<Owner>>,
    address_type: AddressType,
) -> Vec<Node> {
    let nodes = to_nodes(&nics.unwrap_or_default(), address_type);
    if !nodes.is_empty() {
        return nodes;
    }

    tracing::debug!("no valid nics found, trying vms");
    to_nodes(&vms.unwrap_or_default(), address_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owners() -> Vec<Owner> {
        vec![
            Owner::new("1", Some("1.2.3.4"), Some("5.6.7.8")),
            Owner::new("2", Some("11.12.13.14"), Some("15.16.17.18")),
        ]
    }

    fn vms() -> Vec<Owner> {
        vec![
            Owner::new("1", Some("21.22.23.24"), Some("25.26.27.28")),
            Owner::new("2", Some("111.112.113.114"), Some("115.116.117.118")),
        ]
    }

    #[test]
    fn test_private_address() {
        let owner = Owner::new("1", Some("1.2.3.4"), Some("5.6.7.8"));
        assert_eq!(
            Node::from_owner(&owner, AddressType::Private),
            Some(Node {
                id: "1-private".to_string(),
                ip: "5.6.7.8".to_string()
            })
        );
    }

    #[test]
    fn test_public_address() {
        let owner = Owner::new("1", Some("1.2.3.4"), Some("5.6.7.8"));
        assert_eq!(
            Node::from_owner(&owner, AddressType::Public),
            Some(Node {
                id: "1-public".to_string(),
                ip: "1.2.3.4".to_string()
            })
        );
    }

    #[test]
    fn test_missing_or_empty_address_dropped() {
        let owners = vec![
            Owner::new("1", None, Some("10.0.0.1")),
            Owner::new("2", Some(""), Some("10.0.0.2")),
            Owner::new("3", Some("3.3.3.3"), None),
        ];

        let nodes = to_nodes(&owners, AddressType::Public);
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].id, "3-public");
    }

    #[test]
    fn test_nics_take_priority() {
        let nodes = select_nodes(Some(owners()), Some(vms()), AddressType::Private);
        let ips: Vec<&str> = nodes.iter().map(|n| n.ip.as_str()).collect();
        assert_eq!(ips, vec!["5.6.7.8", "15.16.17.18"]);
    }

    #[test]
    fn test_empty_nics_fall_back_to_vms() {
        let nodes = select_nodes(Some(vec![]), Some(vms()), AddressType::Public);
        let ips: Vec<&str> = nodes.iter().map(|n| n.ip.as_str()).collect();
        assert_eq!(ips, vec!["21.22.23.24", "111.112.113.114"]);
    }

    #[test]
    fn test_nics_without_addresses_fall_back_to_vms() {
        let nics = vec![Owner::new("eni-1", None, Some("10.0.0.1"))];
        let nodes = select_nodes(Some(nics), Some(vms()), AddressType::Public);
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].id, "1-public");
    }

    #[test]
    fn test_no_lists_is_empty() {
        assert!(select_nodes(None, None, AddressType::Private).is_empty());
    }
}
