/*!

A whole network: one [Topology] per router plus the wiring between their ports.

The routing of each router never looks at the network; this module exists to build every router of a topology at once, check that their port classification agrees with the links, and walk packets through the routers as the delivery layer of a simulator would.

*/

pub mod fat_tree;
pub mod cartesian;

use std::collections::VecDeque;
use std::fmt::Debug;
use std::mem::size_of;

use log::{info,trace};
use quantifiable_derive::Quantifiable;//the derive macro

use self::fat_tree::FatTreeWiring;
use self::cartesian::CartesianWiring;
use crate::credit::CreditCounters;
use crate::topology::prelude::*;
use crate::quantify::Quantifiable;
use crate::error;

///A location where a packet can be inserted.
///None is used for disconnected ports, for example in the borders of a `Mesh`.
#[derive(Clone,Debug,Quantifiable,Hash,Eq,PartialEq)]
pub enum Location
{
	RouterPort{
		router_index: usize,
		router_port: usize,
	},
	EndpointPort(usize),
	None,
}

///How the ports of the routers are linked.
pub trait Wiring : Quantifiable + Debug
{
	fn num_routers(&self) -> usize;
	fn num_endpoints(&self) -> usize;
	///Number of ports of a router.
	fn ports(&self, router_index:usize) -> usize;
	///What is at the other side of a port.
	fn neighbour(&self, router_index:usize, port:usize) -> Location;
	///The router port an endpoint is attached to.
	fn endpoint_neighbour(&self, endpoint:usize) -> Location;
}

///Build the wiring for a topology configuration, the same object given to `new_topology`.
pub fn new_wiring(cv:&ConfigurationValue) -> Result<Box<dyn Wiring>,Error>
{
	match cv.object_name()
	{
		Some("FatTree") => Ok(Box::new(FatTreeWiring::new(cv)?)),
		Some("Mesh") | Some("Torus") => Ok(Box::new(CartesianWiring::new(cv)?)),
		Some(name) => Err(cv.ill(&format!("Unknown topology {}",name))),
		None => Err(cv.ill("Trying to create a topology from a non-Object")),
	}
}

#[derive(Debug)]
pub struct NetworkBuilderArgument<'a>
{
	///A ConfigurationValue::Object defining the topology.
	pub cv: &'a ConfigurationValue,
	///Virtual networks carried by every router.
	pub num_vns: usize,
}

///A step of a packet through the network.
#[derive(Debug,Clone,PartialEq,Eq)]
pub struct Hop
{
	pub router: usize,
	pub in_port: usize,
	pub in_vc: usize,
	pub out_port: usize,
	pub out_vc: usize,
	///The routing dimension after routing at this router.
	pub routing_dim: usize,
}

///What happened to an untimed packet.
#[derive(Debug,Clone,Default)]
pub struct UntimedReport
{
	///Copies received by each endpoint.
	pub endpoint_deliveries: Vec<usize>,
	///Times each router forwarded the packet outside of its converging phase.
	pub router_visits: Vec<usize>,
	///Routers crossed while converging towards the root of a flood.
	pub converging_hops: usize,
}

#[derive(Debug)]
pub struct Network
{
	wiring: Box<dyn Wiring>,
	routers: Vec<Box<dyn Topology>>,
	///Empty until `install_credits`.
	credits: Vec<CreditCounters>,
}

impl Network
{
	///Build every router and check their ports against the wiring.
	pub fn new(arg:NetworkBuilderArgument) -> Result<Network,Error>
	{
		let wiring = new_wiring(arg.cv)?;
		let routers = (0..wiring.num_routers()).map(|router_index|new_topology(TopologyBuilderArgument{
			cv: arg.cv,
			router_index,
			num_ports: wiring.ports(router_index),
			num_vns: arg.num_vns,
		})).collect::<Result<Vec<Box<dyn Topology>>,Error>>()?;
		let network = Network{
			wiring,
			routers,
			credits: vec![],
		};
		network.check_ports()?;
		Ok(network)
	}
	pub fn num_routers(&self) -> usize
	{
		self.routers.len()
	}
	pub fn num_endpoints(&self) -> usize
	{
		self.wiring.num_endpoints()
	}
	pub fn router(&self, router_index:usize) -> &dyn Topology
	{
		self.routers[router_index].as_ref()
	}
	pub fn wiring(&self) -> &dyn Wiring
	{
		self.wiring.as_ref()
	}
	///The write side of the credits of a router. Panics before `install_credits`.
	pub fn credit_counters(&self, router_index:usize) -> &CreditCounters
	{
		&self.credits[router_index]
	}
	///Every port state must agree with what the wiring connects to that port.
	fn check_ports(&self) -> Result<(),Error>
	{
		for (router_index,router) in self.routers.iter().enumerate()
		{
			if router.num_endpoints() != self.wiring.num_endpoints()
			{
				return Err(error!(undetermined).with_message(format!("router {} counts {} endpoints but the wiring has {}",router_index,router.num_endpoints(),self.wiring.num_endpoints())));
			}
			for port in 0..router.num_ports()
			{
				let consistent = match (router.port_state(port),self.wiring.neighbour(router_index,port))
				{
					(PortState::RouterToNode,Location::EndpointPort(endpoint)) => router.endpoint_id(port)==Some(endpoint),
					(PortState::RouterToRouter,Location::RouterPort{..}) => router.endpoint_id(port).is_none(),
					(PortState::Unconnected,Location::None) => router.endpoint_id(port).is_none(),
					_ => false,
				};
				if !consistent
				{
					return Err(error!(port_state_mismatch,router_index,port));
				}
			}
		}
		Ok(())
	}
	///Give every router `initial` credits in each of its (port,vc) pairs, sizing the virtual channels from `vcs_per_vn`.
	///If some router refuses its view, `credits` keeps only the counters of the routers before it, which did accept theirs.
	pub fn install_credits(&mut self, initial:usize) -> Result<(),Error>
	{
		if !self.credits.is_empty()
		{
			return Err(error!(credit_view_already_installed));
		}
		let mut credits : Vec<CreditCounters> = self.routers.iter().map(|router|{
			let num_vcs = router.vcs_per_vn().iter().sum();
			CreditCounters::new(router.num_ports(),num_vcs,initial)
		}).collect();
		let mut outcome = Ok(());
		for (router_index,(router,counters)) in self.routers.iter_mut().zip(credits.iter()).enumerate()
		{
			if let Err(error) = router.install_credit_view(counters.view(),counters.num_vcs())
			{
				credits.truncate(router_index);
				outcome = Err(error);
				break;
			}
		}
		self.credits = credits;
		outcome
	}
	///The router and port where an endpoint injects.
	fn ingress(&self, endpoint:usize) -> Result<(usize,usize),Error>
	{
		if endpoint >= self.num_endpoints()
		{
			return Err(error!(destination_out_of_range,endpoint,self.num_endpoints()));
		}
		match self.wiring.endpoint_neighbour(endpoint)
		{
			Location::RouterPort{router_index,router_port} => Ok((router_index,router_port)),
			location => Err(error!(undetermined).with_message(format!("endpoint {} is attached to {:?}",endpoint,location))),
		}
	}
	///Walk a packet from `source` to `destination`, routing it at every router.
	pub fn trace_route(&self, source:usize, destination:usize, vn:usize) -> Result<Vec<Hop>,Error>
	{
		let (mut router,mut in_port) = self.ingress(source)?;
		let mut event = self.routers[router].process_input(RouterEvent::new(Some(source),Destination::Endpoint(destination),vn))?;
		let mut hops = vec![];
		//A minimal route visits each router at most once.
		while hops.len() <= self.num_routers()
		{
			let in_vc = event.vc;
			self.routers[router].route_packet(in_port,in_vc,&mut event);
			let out_port = event.next_port();
			trace!("packet {}->{} at router {} from port {} vc {} to port {} vc {}",source,destination,router,in_port,in_vc,out_port,event.vc);
			hops.push(Hop{
				router,
				in_port,
				in_vc,
				out_port,
				out_vc: event.vc,
				routing_dim: event.routing_dim,
			});
			match self.wiring.neighbour(router,out_port)
			{
				Location::EndpointPort(endpoint) if endpoint==destination => return Ok(hops),
				Location::EndpointPort(endpoint) => return Err(error!(undetermined).with_message(format!("packet towards {} delivered to endpoint {}",destination,endpoint))),
				Location::RouterPort{router_index,router_port} =>
				{
					router = router_index;
					in_port = router_port;
				},
				Location::None => return Err(error!(port_state_mismatch,router,out_port).with_message(format!("packet towards {} sent through a disconnected port",destination))),
			}
		}
		Err(error!(route_did_not_converge,hops.len()).with_message(format!("packet from {} towards {}",source,destination)))
	}
	///Propagate an untimed packet from `source`, following every copy made by `route_untimed`.
	pub fn propagate_untimed(&self, source:usize, destination:Destination) -> Result<UntimedReport,Error>
	{
		let (router,in_port) = self.ingress(source)?;
		let event = self.routers[router].process_untimed_input(RouterEvent::new(Some(source),destination,0))?;
		let mut report = UntimedReport{
			endpoint_deliveries: vec![0;self.num_endpoints()],
			router_visits: vec![0;self.num_routers()],
			converging_hops: 0,
		};
		let limit = 2*(self.num_routers()+self.num_endpoints());
		let mut processed = 0;
		let mut queue = VecDeque::new();
		queue.push_back((router,in_port,event));
		while let Some((router,in_port,mut event)) = queue.pop_front()
		{
			processed += 1;
			if processed > limit
			{
				return Err(error!(route_did_not_converge,processed).with_message(format!("untimed packet from {}",source)));
			}
			let mut out_ports = vec![];
			self.routers[router].route_untimed(in_port,&mut event,&mut out_ports);
			if event.phase==Some(UntimedPhase::Converging)
			{
				report.converging_hops += 1;
			}
			else
			{
				report.router_visits[router] += 1;
			}
			for port in out_ports
			{
				match self.wiring.neighbour(router,port)
				{
					Location::EndpointPort(endpoint) => report.endpoint_deliveries[endpoint] += 1,
					Location::RouterPort{router_index,router_port} => queue.push_back((router_index,router_port,event.clone())),
					Location::None => return Err(error!(port_state_mismatch,router,port).with_message("untimed packet sent through a disconnected port".to_string())),
				}
			}
		}
		Ok(report)
	}
	///Broadcast an untimed packet from `source` to every endpoint.
	pub fn flood(&self, source:usize) -> Result<UntimedReport,Error>
	{
		self.propagate_untimed(source,Destination::Broadcast)
	}
}

impl Quantifiable for Network
{
	fn total_memory(&self) -> usize
	{
		size_of::<Network>() + self.wiring.total_memory() + self.routers.total_memory() + self.credits.total_memory()
	}
	fn print_memory_breakdown(&self)
	{
		info!("Memory breakdown of a network of {} routers and {} endpoints:",self.num_routers(),self.num_endpoints());
		info!("wiring: {} bytes",self.wiring.total_memory());
		info!("routers: {} bytes",self.routers.total_memory());
		info!("credits: {} bytes",self.credits.total_memory());
		info!("size_of::<Network> = {}",size_of::<Network>());
		info!("size_of::<CreditCounters> = {}",size_of::<CreditCounters>());
		info!("size_of::<RoutingEvent> = {}",size_of::<RoutingEvent>());
		info!("total: {} bytes",self.total_memory());
	}
	fn forecast_total_memory(&self) -> usize
	{
		size_of::<Network>() + self.wiring.forecast_total_memory() + self.routers.forecast_total_memory() + self.credits.forecast_total_memory()
	}
}

#[cfg(test)]
mod tests
{
	use super::*;

	#[test]
	fn unknown_wiring()
	{
		let cv=ConfigurationValue::Object("Dragonfly".to_string(),vec![]);
		assert!(new_wiring(&cv).is_err());
		assert!(new_wiring(&ConfigurationValue::True).is_err());
	}

	#[test]
	fn mismatched_ports_are_detected()
	{
		let cv=ConfigurationValue::Object("Mesh".to_string(),vec![
			("shape".to_string(),ConfigurationValue::Literal("3x2".to_string())),
		]);
		let mut network=Network::new(NetworkBuilderArgument{cv:&cv,num_vns:1}).unwrap();
		assert!(network.check_ports().is_ok());
		//A router built as a torus claims its border ports are connected.
		let torus=ConfigurationValue::Object("Torus".to_string(),vec![
			("shape".to_string(),ConfigurationValue::Literal("3x2".to_string())),
		]);
		network.routers[0]=new_topology(TopologyBuilderArgument{cv:&torus,router_index:0,num_ports:5,num_vns:1}).unwrap();
		match network.check_ports()
		{
			Err(Error{kind:ErrorKind::PortStateMismatch{router_index:0,port:1},..}) => (),
			other => panic!("{:?}",other),
		}
	}

	fn small_mesh() -> ConfigurationValue
	{
		ConfigurationValue::Object("Mesh".to_string(),vec![
			("shape".to_string(),ConfigurationValue::Literal("4x4".to_string())),
		])
	}

	#[test]
	fn memory_adds_its_parts()
	{
		let cv=small_mesh();
		let mut network=Network::new(NetworkBuilderArgument{cv:&cv,num_vns:1}).unwrap();
		assert_eq!(network.wiring().num_routers(),16);
		assert_eq!(network.wiring().ports(5),network.router(5).num_ports());
		let before=network.total_memory();
		assert_eq!(before,size_of::<Network>()+network.wiring.total_memory()+network.routers.total_memory()+network.credits.total_memory());
		network.install_credits(3).unwrap();
		assert!(network.total_memory()>before);
		assert!(network.forecast_total_memory()>0);
		network.print_memory_breakdown();
	}

	#[test]
	fn refused_credits_keep_accepted_counters()
	{
		let cv=small_mesh();
		let mut network=Network::new(NetworkBuilderArgument{cv:&cv,num_vns:1}).unwrap();
		let num_vcs=network.router(2).vcs_per_vn().iter().sum();
		let foreign=CreditCounters::new(network.router(2).num_ports(),num_vcs,1);
		network.routers[2].install_credit_view(foreign.view(),num_vcs).unwrap();
		match network.install_credits(4)
		{
			Err(Error{kind:ErrorKind::CreditViewAlreadyInstalled,..}) => (),
			other => panic!("{:?}",other),
		}
		//Routers 0 and 1 accepted their views and their write side is still reachable.
		assert_eq!(network.credits.len(),2);
		assert_eq!(network.credit_counters(1).get(0,0),4);
		network.credit_counters(1).set(0,0,2);
		assert_eq!(network.credit_counters(1).get(0,0),2);
		//Nothing is replaced by a second installation.
		assert!(network.install_credits(5).is_err());
		assert_eq!(network.credits.len(),2);
		assert_eq!(network.credit_counters(0).get(0,0),4);
	}
}
