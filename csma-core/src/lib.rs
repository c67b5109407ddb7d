/*!
# CSMA/CA medium access simulation

A slot-exact, single-threaded discrete-event simulator of the CSMA/CA
protocol: transmitters sense the medium for a DIFS, count down a random
backoff, send a data frame and wait for the access point to acknowledge it
one SIFS later. Simultaneous attempts collide, and the colliding
transmitters retry with a doubled contention window.

```
use csma_core::{network::Network, Timing};

let timing = Timing { difs: 2, sifs: 1, ack: 2, cw_min: 4, cw_max: 64, data: 10 };
let mut network = Network::new(timing, 500)?;
network.set_seed(1);

let domain = network.add_collision_domain();
let a = network.new_transmitter([0, 100, 500]).join(domain).build()?;
let b = network.new_transmitter([0, 250, 500]).join(domain).build()?;
network.new_access_point().join(domain).build()?;

network.run()?;

let report = network.sink();
assert_eq!(report.get(a).unwrap().successes, 2);
assert_eq!(report.get(b).unwrap().successes, 2);
# Ok::<(), Box<dyn std::error::Error>>(())
```
*/

mod backoff;
mod bandwidth;
pub mod defaults;
mod domain;
mod event;
pub mod history;
pub mod network;
pub mod node;
pub mod report;
pub mod time;
mod timing;
pub mod traffic;

pub use self::{
    backoff::{Backoff, ScriptedBackoff},
    bandwidth::{Bandwidth, BandwidthParseError},
    domain::CollisionDomain,
    event::{Event, EventKind},
    network::{Network, RegistrationError, SimError},
    node::{AccessPoint, DomainId, Node, NodeId, NodeKind, ProtocolViolation, Station, Transmitter, TxState},
    report::{NodeReport, ReportSink, SimReport},
    timing::{Parameters, Slot, Timing, TimingError},
    traffic::{ArrivalQueue, poisson_arrivals},
};
