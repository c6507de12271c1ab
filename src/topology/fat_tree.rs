/*!

Routing in a folded fat tree.

A router knows its level and the contiguous range of hosts below it. Packets for hosts in that range go down through the only possible port. Other packets go up, spreading the destinations among the up ports. Virtual networks configured as adaptive may leave the deterministic up port when it is short of credits.

*/

use log::{debug,trace,warn};
use quantifiable_derive::Quantifiable;//the derive macro

use super::prelude::*;
use super::shape::{FatTreeShape,parse_fat_tree_shape};
use crate::quantify::Quantifiable;
use crate::{error,match_object};

///How a virtual network selects its up ports.
#[derive(Quantifiable)]
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum RoutingMode
{
	Deterministic,
	Adaptive,
}

impl RoutingMode
{
	pub fn from_configuration(cv:&ConfigurationValue) -> Result<RoutingMode,Error>
	{
		match cv.as_str()?
		{
			"deterministic" => Ok(RoutingMode::Deterministic),
			"adaptive" => Ok(RoutingMode::Adaptive),
			other => Err(error!(unknown_routing_mode,other.to_string())),
		}
	}
}

///The virtual channels and routing mode of a virtual network.
#[derive(Quantifiable)]
#[derive(Debug,Clone,PartialEq,Eq)]
pub struct VirtualNetworkPolicy
{
	pub start_vc: usize,
	pub num_vcs: usize,
	pub allow_adaptive: bool,
}

///Build the policies of `num_vns` virtual networks from the `routing_alg` field, which may be absent, a single mode or a list of modes.
pub fn virtual_network_policies(routing_alg:Option<&ConfigurationValue>, num_vns:usize) -> Result<Vec<VirtualNetworkPolicy>,Error>
{
	let modes = match routing_alg
	{
		None => vec![RoutingMode::Deterministic;num_vns],
		Some(&ConfigurationValue::Array(ref list)) =>
		{
			if list.len() != num_vns
			{
				return Err(error!(routing_mode_count_mismatch,num_vns,list.len()));
			}
			list.iter().map(RoutingMode::from_configuration).collect::<Result<Vec<RoutingMode>,Error>>()?
		},
		Some(global) => vec![RoutingMode::from_configuration(global)?;num_vns],
	};
	//Currently every virtual network uses a single virtual channel.
	Ok(modes.into_iter().enumerate().map(|(vn,mode)|VirtualNetworkPolicy{
		start_vc: vn,
		num_vcs: 1,
		allow_adaptive: mode==RoutingMode::Adaptive,
	}).collect())
}

///The fields of a `FatTree` configuration object.
#[derive(Debug)]
pub struct FatTreeConfiguration<'a>
{
	pub shape: FatTreeShape,
	pub routing_alg: Option<&'a ConfigurationValue>,
	pub adaptive_threshold: f64,
}

impl<'a> FatTreeConfiguration<'a>
{
	pub fn new(cv:&'a ConfigurationValue) -> Result<FatTreeConfiguration<'a>,Error>
	{
		let mut shape=None;
		let mut routing_alg=None;
		let mut adaptive_threshold=0.5;
		match_object!(cv,"FatTree",value,
			"shape" => shape=Some(parse_fat_tree_shape(value.as_str()?)?),
			"routing_alg" => routing_alg=Some(value),
			"adaptive_threshold" => adaptive_threshold=value.as_f64()?,
		);
		let shape=shape.ok_or_else(||cv.ill("There were no shape"))?;
		if !(adaptive_threshold>=0.0)
		{
			return Err(cv.ill(&format!("adaptive_threshold must be a non-negative fraction, got {}",adaptive_threshold)));
		}
		Ok(FatTreeConfiguration{shape,routing_alg,adaptive_threshold})
	}
}

///Where a router sits in the fat tree.
#[derive(Quantifiable)]
#[derive(Debug,Clone,PartialEq,Eq)]
pub struct FatTreePosition
{
	///0 for the leaves.
	pub level: usize,
	///Index among the routers of the same level.
	pub level_id: usize,
	///The group of routers of the level sharing this router's hosts.
	pub level_group: usize,
	pub down_ports: usize,
	pub up_ports: usize,
	///First host below this router.
	pub low_host: usize,
	///Last host below this router.
	pub high_host: usize,
	///Hosts below each down port.
	pub down_route_factor: usize,
}

impl FatTreePosition
{
	///Decode the linear index of a router.
	pub fn new(shape:&FatTreeShape, router_index:usize) -> Result<FatTreePosition,Error>
	{
		let mut count=0;
		let mut routers_per_group=1;
		let mut hosts_below=1;
		for (level,routers) in shape.routers_per_level().into_iter().enumerate()
		{
			hosts_below *= shape.downs[level];
			if router_index < count+routers
			{
				let level_id = router_index-count;
				let level_group = level_id/routers_per_group;
				let low_host = level_group*hosts_below;
				return Ok(FatTreePosition{
					level,
					level_id,
					level_group,
					down_ports: shape.downs[level],
					up_ports: shape.ups[level],
					low_host,
					high_host: low_host+hosts_below-1,
					down_route_factor: hosts_below/shape.downs[level],
				});
			}
			count += routers;
			routers_per_group *= shape.ups[level];
		}
		Err(error!(router_out_of_range,router_index,count).with_message(format!("fat tree {}",shape)))
	}
	///Whether `destination` is below this router.
	pub fn contains(&self, destination:usize) -> bool
	{
		self.low_host<=destination && destination<=self.high_host
	}
}

///The routing of a fat tree router.
#[derive(Quantifiable)]
#[derive(Debug)]
pub struct FatTree
{
	identity: RouterIdentity,
	shape: FatTreeShape,
	position: FatTreePosition,
	total_hosts: usize,
	vns: Vec<VirtualNetworkPolicy>,
	adaptive_threshold: f64,
	///Per (port,vc), the credits below which an adaptive virtual network looks for another up port.
	thresholds: Vec<usize>,
}

impl FatTree
{
	pub fn new(arg:TopologyBuilderArgument) -> Result<FatTree,Error>
	{
		let FatTreeConfiguration{shape,routing_alg,adaptive_threshold} = FatTreeConfiguration::new(arg.cv)?;
		if adaptive_threshold > 1.0
		{
			warn!("adaptive_threshold={} is above 1; adaptive virtual networks will reconsider every up route",adaptive_threshold);
		}
		let vns = virtual_network_policies(routing_alg,arg.num_vns)?;
		let position = FatTreePosition::new(&shape,arg.router_index)?;
		let required = position.down_ports + position.up_ports;
		if arg.num_ports < required
		{
			return Err(error!(insufficient_ports,required,arg.num_ports).with_message(format!("router {} at level {} of fat tree {}",arg.router_index,position.level,shape)));
		}
		let identity = RouterIdentity::new(&arg);
		Ok(FatTree{
			identity,
			total_hosts: shape.total_hosts(),
			shape,
			position,
			vns,
			adaptive_threshold,
			thresholds: vec![],
		})
	}
	pub fn position(&self) -> &FatTreePosition
	{
		&self.position
	}
	pub fn shape(&self) -> &FatTreeShape
	{
		&self.shape
	}
	pub fn virtual_networks(&self) -> &[VirtualNetworkPolicy]
	{
		&self.vns
	}
	pub fn thresholds(&self) -> &[usize]
	{
		&self.thresholds
	}
	///The port used when congestion is ignored.
	pub fn route_deterministic(&self, destination:usize) -> usize
	{
		let position = &self.position;
		if position.contains(destination)
		{
			(destination-position.low_host)/position.down_route_factor
		}
		else
		{
			position.down_ports + (destination/position.down_route_factor) % position.up_ports
		}
	}
	fn check_destination(&self, event:&RouterEvent) -> Result<(),Error>
	{
		self.identity.check_vn(event.vn)?;
		match event.destination.endpoint()
		{
			Some(destination) if destination >= self.total_hosts => Err(error!(destination_out_of_range,destination,self.total_hosts)),
			_ => Ok(()),
		}
	}
}

impl Topology for FatTree
{
	fn router_index(&self) -> usize
	{
		self.identity.router_index
	}
	fn num_ports(&self) -> usize
	{
		self.identity.num_ports
	}
	fn num_vns(&self) -> usize
	{
		self.identity.num_vns
	}
	fn num_endpoints(&self) -> usize
	{
		self.total_hosts
	}
	fn route_packet(&self, _in_port:usize, _vc:usize, event:&mut RoutingEvent)
	{
		let destination = match event.destination
		{
			Destination::Endpoint(destination) => destination,
			Destination::Broadcast => panic!("router {} asked to route a broadcast as timed traffic",self.identity.router_index),
		};
		let port = self.route_deterministic(destination);
		event.next_port = Some(port);
		if self.position.contains(destination)
		{
			return;
		}
		if !self.vns[event.vn].allow_adaptive
		{
			return;
		}
		let (credits,num_vcs) = match (self.identity.credits(),self.identity.num_vcs())
		{
			(Some(credits),Some(num_vcs)) => (credits,num_vcs),
			_ => panic!("router {} routing adaptively without output credits",self.identity.router_index),
		};
		let vc = event.vc;
		let index = port*num_vcs + vc;
		let mut best_credits = credits.get(index);
		if best_credits >= self.thresholds[index]
		{
			return;
		}
		//Strictly greater, so ties keep the deterministic port.
		let mut best_port = port;
		let first_up = self.position.down_ports;
		for up_port in first_up..first_up+self.position.up_ports
		{
			let available = credits.get(up_port*num_vcs + vc);
			if available > best_credits
			{
				best_credits = available;
				best_port = up_port;
			}
		}
		if best_port != port
		{
			trace!("router {} adapts packet towards {} from port {} to port {} ({} credits)",self.identity.router_index,destination,port,best_port,best_credits);
		}
		event.next_port = Some(best_port);
	}
	fn process_input(&self, event:RouterEvent) -> Result<RoutingEvent,Error>
	{
		self.check_destination(&event)?;
		if event.destination.is_broadcast()
		{
			return Err(error!(undetermined).with_message("broadcast packets must be sent as untimed traffic".to_string()));
		}
		let start_vc = self.vns[event.vn].start_vc;
		let mut routing_event = RoutingEvent::new(event);
		routing_event.vc = start_vc;
		Ok(routing_event)
	}
	fn route_untimed(&self, in_port:usize, event:&mut RoutingEvent, out_ports:&mut Vec<usize>)
	{
		match event.destination
		{
			Destination::Broadcast =>
			{
				let down_ports = self.position.down_ports;
				let up_ports = self.position.up_ports;
				out_ports.extend( (0..down_ports).filter(|&port|port!=in_port) );
				if up_ports != 0 && in_port < down_ports
				{
					out_ports.push(down_ports + in_port%up_ports);
				}
				debug!("router {} floods the broadcast from port {} to ports {:?}",self.identity.router_index,in_port,out_ports);
			},
			Destination::Endpoint(destination) =>
			{
				let port = self.route_deterministic(destination);
				event.next_port = Some(port);
				out_ports.push(port);
			},
		}
	}
	fn process_untimed_input(&self, event:RouterEvent) -> Result<RoutingEvent,Error>
	{
		self.check_destination(&event)?;
		Ok(RoutingEvent::new(event))
	}
	fn endpoint_id(&self, port:usize) -> Option<usize>
	{
		if self.position.level==0 && port<self.position.down_ports
		{
			Some(self.position.low_host+port)
		}
		else
		{
			None
		}
	}
	fn port_state(&self, port:usize) -> PortState
	{
		if port < self.position.down_ports
		{
			if self.position.level==0 { PortState::RouterToNode } else { PortState::RouterToRouter }
		}
		else if port < self.position.down_ports+self.position.up_ports
		{
			PortState::RouterToRouter
		}
		else
		{
			PortState::Unconnected
		}
	}
	fn install_credit_view(&mut self, credits:CreditView, num_vcs:usize) -> Result<(),Error>
	{
		let vcs_per_vn = self.vcs_per_vn();
		let credits = self.identity.install_credits(credits,num_vcs,&vcs_per_vn)?;
		let threshold = self.adaptive_threshold;
		self.thresholds = (0..credits.len()).map(|index|(credits.get(index) as f64*threshold) as usize).collect();
		Ok(())
	}
	fn vcs_per_vn(&self) -> Vec<usize>
	{
		self.vns.iter().map(|policy|policy.num_vcs).collect()
	}
}
