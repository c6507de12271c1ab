/*!

A Topology is the routing function of a single router: it knows where the router sits in the network and decides by which port each packet leaves.

see [`new_topology`](fn.new_topology.html) for documentation on the configuration syntax of predefined topologies.

*/

pub mod shape;
pub mod fat_tree;
pub mod mesh;

use std::fmt::Debug;

use quantifiable_derive::Quantifiable;//the derive macro
use self::fat_tree::FatTree;
use self::mesh::Mesh;
use crate::config::ConfigurationValue;
use crate::credit::CreditView;
use crate::event::{RouterEvent,RoutingEvent};
use crate::quantify::Quantifiable;
use crate::error;
use crate::error::*;

/// Some things most uses of the topology module will use.
pub mod prelude
{
	pub use super::{Topology,PortState,RouterIdentity,TopologyBuilderArgument,new_topology};
	pub use crate::event::{Destination,RouterEvent,RoutingEvent,UntimedPhase};
	pub use crate::credit::CreditView;
	pub use crate::config::ConfigurationValue;
	pub use crate::error::{Error,ErrorKind};
}

///Static classification of the ports of a router.
#[derive(Quantifiable)]
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum PortState
{
	///The port goes to an endpoint.
	RouterToNode,
	///The port goes to another router.
	RouterToRouter,
	///Nothing is connected to the port.
	Unconnected,
}

///The routing of one router. Each router of the network gets its own instance.
pub trait Topology : Quantifiable + Debug
{
	///Index of this router in the network.
	fn router_index(&self) -> usize;
	fn num_ports(&self) -> usize;
	fn num_vns(&self) -> usize;
	///Number of endpoints in the whole network.
	fn num_endpoints(&self) -> usize;
	///Select in `event.next_port` the port by which the packet leaves this router, possibly changing `event.vc`.
	///`in_port` and `vc` are the port and virtual channel by which the packet arrived.
	///Calling it again with the same arguments gives the same result.
	///The event must come from `process_input`.
	fn route_packet(&self, in_port:usize, vc:usize, event:&mut RoutingEvent);
	///Prepare a packet at its ingress router. Called once per packet.
	fn process_input(&self, event:RouterEvent) -> Result<RoutingEvent,Error>;
	///Append to `out_ports` every port by which an untimed packet leaves this router.
	///Credits are not consulted.
	fn route_untimed(&self, in_port:usize, event:&mut RoutingEvent, out_ports:&mut Vec<usize>);
	///Prepare an untimed packet at its ingress router. The destination may be `Destination::Broadcast`.
	fn process_untimed_input(&self, event:RouterEvent) -> Result<RoutingEvent,Error>;
	///The global identifier of the endpoint attached to `port`, if any.
	fn endpoint_id(&self, port:usize) -> Option<usize>;
	fn port_state(&self, port:usize) -> PortState;
	///Give the topology read access to the output credits, indexed by `port*num_vcs+vc`.
	///It can be done only once.
	fn install_credit_view(&mut self, credits:CreditView, num_vcs:usize) -> Result<(),Error>;
	///Number of virtual channels used by each virtual network.
	fn vcs_per_vn(&self) -> Vec<usize>;
}

///The data every router has, independently of the topology.
#[derive(Quantifiable)]
#[derive(Debug)]
pub struct RouterIdentity
{
	pub router_index: usize,
	pub num_ports: usize,
	pub num_vns: usize,
	///Only known once the credits are installed.
	num_vcs: Option<usize>,
	credits: Option<CreditView>,
}

impl RouterIdentity
{
	pub fn new(arg:&TopologyBuilderArgument) -> RouterIdentity
	{
		RouterIdentity{
			router_index: arg.router_index,
			num_ports: arg.num_ports,
			num_vns: arg.num_vns,
			num_vcs: None,
			credits: None,
		}
	}
	pub fn num_vcs(&self) -> Option<usize>
	{
		self.num_vcs
	}
	pub fn credits(&self) -> Option<&CreditView>
	{
		self.credits.as_ref()
	}
	///Keep the credit view after checking it agrees with the ports and with the virtual channels the topology asked for.
	pub fn install_credits(&mut self, credits:CreditView, num_vcs:usize, vcs_per_vn:&[usize]) -> Result<&CreditView,Error>
	{
		if self.credits.is_some()
		{
			return Err(error!(credit_view_already_installed).with_message(format!("router {}",self.router_index)));
		}
		let requested : usize = vcs_per_vn.iter().sum();
		if num_vcs != requested
		{
			return Err(error!(credit_view_mismatch,requested,num_vcs).with_message(format!("router {} uses {} virtual channels",self.router_index,requested)));
		}
		let expected = self.num_ports*num_vcs;
		if credits.len() != expected
		{
			return Err(error!(credit_view_mismatch,expected,credits.len()).with_message(format!("router {} has {} ports of {} virtual channels",self.router_index,self.num_ports,num_vcs)));
		}
		self.num_vcs=Some(num_vcs);
		Ok(self.credits.get_or_insert(credits))
	}
	///Fail when a packet claims a virtual network this router was not built for.
	pub fn check_vn(&self, vn:usize) -> Result<(),Error>
	{
		if vn >= self.num_vns
		{
			return Err(error!(virtual_network_out_of_range,vn,self.num_vns));
		}
		Ok(())
	}
}

#[derive(Debug)]
pub struct TopologyBuilderArgument<'a>
{
	///A ConfigurationValue::Object defining the topology.
	pub cv: &'a ConfigurationValue,
	///The index of the router being built.
	pub router_index: usize,
	///Ports the router has.
	pub num_ports: usize,
	///Virtual networks the router carries.
	pub num_vns: usize,
}

/**Build the routing of a router.

## Fat tree

A folded Clos given by the ports of each level, from the leaves to the root. `"4,4:4,4:8"` has leaves with 4 hosts and 4 up ports, a middle level with 4 down and 4 up ports and a root level with 8 down ports.

`routing_alg` may be a single mode for every virtual network or a list with one mode per virtual network. The modes are `"deterministic"` (default) and `"adaptive"`. Adaptive virtual networks leave the deterministic up port when its credits fall below `adaptive_threshold` (default 0.5) times the credits it had when installed, going instead through the up port with most credits. Routes going down are always deterministic.

```ignore
FatTree{
	shape: "4,4:4,4:8",
	routing_alg: ["deterministic","adaptive"],
	adaptive_threshold: 0.5,
	legend_name: "fat tree of 128 hosts",
}
```

## Mesh and Torus

Dimension order routing over the sides given in `shape`. `width` is the number of parallel links between neighbours in each dimension (default 1) and `local_ports` the number of endpoints per router (default 1). The ports of a router are, for each dimension, `width` ports in the positive direction followed by `width` in the negative direction, and then the local ports.
Each virtual network uses two virtual channels, exchanging them when the packet leaves coordinate 0 of a dimension. The Torus has wraparound links and goes through the shortest side of each ring.

```ignore
Torus{
	shape: "4x4x2",
	width: "2x1x1",
	local_ports: 2,
	legend_name: "4x4x2 torus with double links in the first dimension",
}
```

*/
pub fn new_topology(arg:TopologyBuilderArgument) -> Result<Box<dyn Topology>,Error>
{
	if let &ConfigurationValue::Object(ref cv_name, ref _cv_pairs)=arg.cv
	{
		match cv_name.as_ref()
		{
			"FatTree" => Ok(Box::new(FatTree::new(arg)?)),
			"Mesh" | "Torus" => Ok(Box::new(Mesh::new(arg)?)),
			_ => Err(arg.cv.ill(&format!("Unknown topology {}",cv_name))),
		}
	}
	else
	{
		Err(arg.cv.ill("Trying to create a topology from a non-Object"))
	}
}
