use crate::{DomainId, NodeId, NodeKind};
use std::fmt;

/// Registry of the stations that share a collision domain.
///
/// Domains describe who can hear whom. The scheduler resolves every
/// station on a single timeline, so a domain is a grouping for reporting
/// and validation: joining it does not shield a station from the timing
/// of stations in other domains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollisionDomain {
    id: DomainId,
    transmitters: Vec<NodeId>,
    access_points: Vec<NodeId>,
}

impl CollisionDomain {
    pub(crate) fn new(id: DomainId) -> Self {
        Self {
            id,
            transmitters: Vec::new(),
            access_points: Vec::new(),
        }
    }

    pub(crate) fn add(&mut self, node: NodeId, kind: NodeKind) {
        match kind {
            NodeKind::Transmitter => self.transmitters.push(node),
            NodeKind::AccessPoint => self.access_points.push(node),
        }
    }

    pub fn id(&self) -> DomainId {
        self.id
    }

    pub fn transmitters(&self) -> &[NodeId] {
        &self.transmitters
    }

    pub fn access_points(&self) -> &[NodeId] {
        &self.access_points
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.transmitters.contains(&node) || self.access_points.contains(&node)
    }
}

fn write_ids(f: &mut fmt::Formatter<'_>, ids: &[NodeId]) -> fmt::Result {
    if ids.is_empty() {
        return f.write_str("None");
    }
    for (i, id) in ids.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{id}")?;
    }
    Ok(())
}

impl fmt::Display for CollisionDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: tx nodes: ", self.id)?;
        write_ids(f, &self.transmitters)?;
        f.write_str("; ap nodes: ")?;
        write_ids(f, &self.access_points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_by_kind() {
        let mut domain = CollisionDomain::new(DomainId::new(0));
        domain.add(NodeId::new(1), NodeKind::Transmitter);
        domain.add(NodeId::new(2), NodeKind::Transmitter);
        domain.add(NodeId::new(3), NodeKind::AccessPoint);

        assert_eq!(domain.transmitters(), [NodeId::new(1), NodeId::new(2)]);
        assert_eq!(domain.access_points(), [NodeId::new(3)]);
        assert!(domain.contains(NodeId::new(3)));
        assert!(!domain.contains(NodeId::new(4)));
    }

    #[test]
    fn display() {
        let mut domain = CollisionDomain::new(DomainId::new(1));
        domain.add(NodeId::new(1), NodeKind::Transmitter);
        domain.add(NodeId::new(2), NodeKind::Transmitter);

        assert_eq!(domain.to_string(), "cd1: tx nodes: 1, 2; ap nodes: None");
    }
}
