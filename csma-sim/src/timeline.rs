//! CSV export of the stations' timelines.

use csma_core::SimReport;
use std::io::{self, Write};

/// Write every history entry of `report` as `slot,node,kind,label,duration`
/// rows, ordered by slot then node.
pub fn write_timeline<W: Write>(report: &SimReport, mut out: W) -> io::Result<()> {
    let mut rows: Vec<_> = report
        .nodes
        .iter()
        .flat_map(|node| node.history.iter().map(move |entry| (node, entry)))
        .collect();
    rows.sort_by_key(|(node, entry)| (entry.slot, node.id));

    writeln!(out, "slot,node,kind,label,duration")?;
    for (node, entry) in rows {
        writeln!(
            out,
            "{},{},{},{},{}",
            entry.slot, node.id, node.kind, entry.label, entry.duration
        )?;
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use csma_core::{Network, Timing};

    #[test]
    fn rows_are_ordered_by_slot() {
        let timing = Timing {
            difs: 2,
            sifs: 1,
            ack: 2,
            cw_min: 1,
            cw_max: 1,
            data: 5,
        };
        let mut network = Network::new(timing, 50).unwrap();
        let domain = network.add_collision_domain();
        network.new_transmitter([0, 50]).join(domain).build().unwrap();
        network.new_access_point().join(domain).build().unwrap();
        network.run().unwrap();

        let mut csv = Vec::new();
        write_timeline(network.sink(), &mut csv).unwrap();
        let csv = String::from_utf8(csv).unwrap();
        let mut lines = csv.lines();

        assert_eq!(lines.next(), Some("slot,node,kind,label,duration"));
        let slots: Vec<u64> = lines
            .map(|line| line.split(',').next().unwrap().parse().unwrap())
            .collect();
        assert!(!slots.is_empty());
        assert!(slots.windows(2).all(|pair| pair[0] <= pair[1]));
        assert!(csv.contains(",1,tx,DATA,5"));
        assert!(csv.contains(",2,ap,ACK,2"));
    }
}
