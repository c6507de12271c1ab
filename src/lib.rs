/*!
caminos-routing
=====

This crate provides the routing core of an interconnection network simulator: the decision, at each router, of by which port and virtual channel a packet leaves.

# Usage

This crate is `caminos-routing`. To use it add `caminos-routing` to your dependencies in your project's `Cargo.toml`.

```toml
[dependencies]
caminos-routing = "0.1"
```

# Public Interface

Every router of the network owns its own [Topology](topology::Topology), built by [new_topology](topology::new_topology) from a [ConfigurationValue](config::ConfigurationValue) describing the network, the index of the router, its number of ports and the number of virtual networks.

A packet is offered at its ingress router as a [RouterEvent](event::RouterEvent). The ingress router converts it with `process_input` into a [RoutingEvent](event::RoutingEvent), which travels with the packet. Each router it reaches calls `route_packet`, which leaves the output port in `next_port` and may change the virtual channel in `vc`.

Adaptive routings read the available credits of the output ports through a [CreditView](credit::CreditView), installed once per router. The owner of the router keeps the matching [CreditCounters](credit::CreditCounters) and updates them as flits are sent and credits return.

Untimed traffic, used to model configuration and broadcast messages, is routed with `route_untimed`, which may give several output ports and ignores credits.

The [network](network) module builds all the routers of a topology together with the links between them. It is mainly a tool to check and trace routes; a simulator would replace it with its own delivery layer.

# Configuration Syntax

Topologies are configured by a [ConfigurationValue](config::ConfigurationValue):

```ignore
pub enum ConfigurationValue
{
	Literal(String),
	Number(f64),
	Object(String,Vec<(String,ConfigurationValue)>),
	Array(Vec<ConfigurationValue>),
	True,
	False,
	None,
}
```

* An `Object` is typed `Name { key1 : value1, key2 : value2, [...] }`.
* An `Array` is typed `[value1, value2, value3, [...]]`.
* A `Number` can be written like 2 or 3.1. Stored as a `f64`.
* A `Literal` is a double-quoted string.
* `True` is written `true` and `False` is written `false`.

See [new_topology](topology::new_topology) for the available topologies and their fields.

## Example

```ignore
FatTree{
	shape: "4,4:4,4:8",
	routing_alg: ["deterministic","adaptive"],
	adaptive_threshold: 0.5,
}
```

# Logging

Messages are emitted through the `log` crate. Adaptive decisions and flooding are reported at the `trace` and `debug` levels; suspicious configurations at `warn`. Nothing is printed unless the executable installs a logger.

*/

pub use quantifiable_derive::Quantifiable;//the derive macro

pub mod error;
pub mod config;
pub mod quantify;
pub mod credit;
pub mod event;
pub mod topology;
pub mod network;

pub use error::{Error,ErrorKind,SourceLocation};
pub use config::ConfigurationValue;
pub use credit::{CreditCounters,CreditView};
pub use event::{Destination,RouterEvent,RoutingEvent,UntimedPhase};
pub use topology::{Topology,TopologyBuilderArgument,PortState,new_topology};
pub use network::{Network,NetworkBuilderArgument,Location,Wiring};
