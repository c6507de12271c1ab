/*!

Dimension order routing in meshes and tori.

A packet corrects its coordinates one dimension at a time, starting by dimension 0, and never goes back to a dimension already corrected. Every virtual network has two virtual channels. A packet starts each dimension in the even one and exchanges them when it leaves coordinate 0, which breaks the cyclic dependencies of the rings of a torus.

*/

use log::debug;
use quantifiable_derive::Quantifiable;//the derive macro
use itertools::Itertools;

use super::prelude::*;
use super::shape::parse_dimensions;
use crate::quantify::Quantifiable;
use crate::{error,match_object};

///Index of the positive direction in the port ranges of a dimension.
pub const POSITIVE: usize = 0;
pub const NEGATIVE: usize = 1;
///The router where untimed broadcasts start flooding.
const BROADCAST_ROOT: usize = 0;

///A Cartesian ortahedral region of arbitrary dimension.
#[derive(Quantifiable)]
#[derive(Debug,Clone,PartialEq,Eq)]
pub struct CartesianData
{
	pub sides: Vec<usize>,
	pub size: usize,
}

impl CartesianData
{
	pub fn new(sides:&[usize]) -> CartesianData
	{
		CartesianData{
			sides:sides.to_vec(),
			size: sides.iter().product(),
		}
	}
	///The coordinates of a router. Dimension 0 varies fastest.
	pub fn unpack(&self, mut router_index: usize) -> Vec<usize>
	{
		if router_index>=self.size
		{
			panic!("router_index={} is greater than the size of the CartesianData={}",router_index,self.size);
		}
		let mut r=Vec::with_capacity(self.sides.len());
		for side in self.sides.iter()
		{
			r.push(router_index%side);
			router_index/=side;
		}
		r
	}
	pub fn pack(&self, coordinates:&[usize]) -> usize
	{
		let mut r=0;
		let mut stride=1;
		for (coordinate,side) in coordinates.iter().zip(self.sides.iter())
		{
			if *coordinate>=*side
			{
				panic!("coordinate {} is greater than the side {}",coordinate,side);
			}
			r+=coordinate*stride;
			stride*=side;
		}
		r
	}
}

///Ports used by the dimensions. For each dimension, `width` ports towards the positive direction followed by `width` ports towards the negative one.
///Returns the first port of each direction and the number of ports used.
pub fn dimension_ports(widths:&[usize]) -> (Vec<[usize;2]>,usize)
{
	let mut port_start=Vec::with_capacity(widths.len());
	let mut next=0;
	for width in widths
	{
		port_start.push([next,next+width]);
		next += 2*width;
	}
	(port_start,next)
}

///Select among the `width` parallel links starting at `start_port`, spreading by distance.
pub fn choose_multipath(start_port:usize, width:usize, distance:usize) -> usize
{
	if width==1
	{
		start_port
	}
	else
	{
		start_port + distance%width
	}
}

///The fields of a `Mesh` or `Torus` configuration object.
#[derive(Quantifiable)]
#[derive(Debug,Clone)]
pub struct MeshConfiguration
{
	pub sides: Vec<usize>,
	pub widths: Vec<usize>,
	pub local_ports: usize,
	pub wraparound: bool,
}

impl MeshConfiguration
{
	pub fn new(cv:&ConfigurationValue) -> Result<MeshConfiguration,Error>
	{
		let mut sides=None;
		let mut widths=None;
		let mut local_ports=1;
		match_object!(cv,["Mesh","Torus"],value,
			"shape" => sides=Some(parse_dimensions(value.as_str()?)?),
			"width" => widths=Some(parse_dimensions(value.as_str()?)?),
			"local_ports" => local_ports=value.as_usize()?,
		);
		let sides=sides.ok_or_else(||cv.ill("There were no shape"))?;
		let widths=widths.unwrap_or_else(||vec![1;sides.len()]);
		if widths.len()!=sides.len()
		{
			let shape=sides.iter().join("x");
			return Err(error!(malformed_shape,shape).with_message(format!("there are {} link widths for {} dimensions",widths.len(),sides.len())));
		}
		if local_ports==0
		{
			return Err(cv.ill("local_ports must be positive"));
		}
		Ok(MeshConfiguration{
			sides,
			widths,
			local_ports,
			wraparound: cv.object_name()==Some("Torus"),
		})
	}
	pub fn num_routers(&self) -> usize
	{
		self.sides.iter().product()
	}
	///Ports required by every router.
	pub fn ports_per_router(&self) -> usize
	{
		dimension_ports(&self.widths).1 + self.local_ports
	}
}

///The routing of a mesh or torus router.
#[derive(Quantifiable)]
#[derive(Debug)]
pub struct Mesh
{
	identity: RouterIdentity,
	cartesian_data: CartesianData,
	dim_width: Vec<usize>,
	///First port of each direction of each dimension, indexed by `POSITIVE` and `NEGATIVE`.
	port_start: Vec<[usize;2]>,
	///Coordinates of this router.
	id_loc: Vec<usize>,
	local_port_start: usize,
	num_local_ports: usize,
	wraparound: bool,
}

impl Mesh
{
	pub fn new(arg:TopologyBuilderArgument) -> Result<Mesh,Error>
	{
		let MeshConfiguration{sides,widths,local_ports,wraparound} = MeshConfiguration::new(arg.cv)?;
		let cartesian_data = CartesianData::new(&sides);
		if arg.router_index >= cartesian_data.size
		{
			return Err(error!(router_out_of_range,arg.router_index,cartesian_data.size));
		}
		let (port_start,needed_ports) = dimension_ports(&widths);
		if arg.num_ports < needed_ports+local_ports
		{
			return Err(error!(insufficient_ports,needed_ports+local_ports,arg.num_ports).with_message(format!("shape {} with widths {} and {} local ports",sides.iter().join("x"),widths.iter().join("x"),local_ports)));
		}
		let id_loc = cartesian_data.unpack(arg.router_index);
		Ok(Mesh{
			identity: RouterIdentity::new(&arg),
			cartesian_data,
			dim_width: widths,
			port_start,
			id_loc,
			local_port_start: needed_ports,
			num_local_ports: local_ports,
			wraparound,
		})
	}
	pub fn dimensions(&self) -> usize
	{
		self.id_loc.len()
	}
	///Coordinates of this router.
	pub fn location(&self) -> &[usize]
	{
		&self.id_loc
	}
	pub fn cartesian_data(&self) -> &CartesianData
	{
		&self.cartesian_data
	}
	pub fn local_port_start(&self) -> usize
	{
		self.local_port_start
	}
	///The first port of a direction of a dimension.
	pub fn port_start(&self, dimension:usize, positive:bool) -> usize
	{
		self.port_start[dimension][if positive {POSITIVE} else {NEGATIVE}]
	}
	///The router an endpoint is attached to.
	pub fn endpoint_router(&self, endpoint:usize) -> usize
	{
		endpoint/self.num_local_ports
	}
	///The port of its router by which an endpoint is attached.
	pub fn endpoint_port(&self, endpoint:usize) -> usize
	{
		self.local_port_start + endpoint%self.num_local_ports
	}
	///Direction and distance to travel along `dimension` to reach coordinate `target`.
	fn direction(&self, dimension:usize, target:usize) -> (usize,usize)
	{
		let current = self.id_loc[dimension];
		if self.wraparound
		{
			let side = self.cartesian_data.sides[dimension];
			let forward = (target+side-current)%side;
			let backward = side-forward;
			if forward<=backward { (POSITIVE,forward) } else { (NEGATIVE,backward) }
		}
		else if current<target
		{
			(POSITIVE,target-current)
		}
		else
		{
			(NEGATIVE,current-target)
		}
	}
	///The dimension and direction of a network port.
	fn port_dimension(&self, port:usize) -> Option<(usize,usize)>
	{
		self.port_start.iter().zip(self.dim_width.iter()).enumerate().find_map(|(dimension,(start,width))|{
			[POSITIVE,NEGATIVE].iter().copied().find(|&direction|start[direction]<=port && port<start[direction]+width).map(|direction|(dimension,direction))
		})
	}
	fn check_destination(&self, event:&RouterEvent) -> Result<(),Error>
	{
		self.identity.check_vn(event.vn)?;
		let num_endpoints = self.num_endpoints();
		match event.destination.endpoint()
		{
			Some(destination) if destination >= num_endpoints => Err(error!(destination_out_of_range,destination,num_endpoints)),
			_ => Ok(()),
		}
	}
	///The router a packet is heading to. Broadcasts go first to the root of the flood.
	fn target_router(&self, destination:Destination) -> usize
	{
		match destination
		{
			Destination::Endpoint(endpoint) => self.endpoint_router(endpoint),
			Destination::Broadcast => BROADCAST_ROOT,
		}
	}
	///Forward a flood. Appends the ports in the positive direction of every dimension from `first_dimension` plus the local ports other than `in_port`.
	fn flood(&self, in_port:usize, first_dimension:usize, out_ports:&mut Vec<usize>)
	{
		for dimension in first_dimension..self.dimensions()
		{
			if self.id_loc[dimension]+1 < self.cartesian_data.sides[dimension]
			{
				out_ports.push(self.port_start[dimension][POSITIVE]);
			}
		}
		let local_ports = self.local_port_start..self.local_port_start+self.num_local_ports;
		out_ports.extend( local_ports.filter(|&port|port!=in_port) );
		debug!("router {} at ({}) floods from port {} to ports {:?}",self.identity.router_index,self.id_loc.iter().join(","),in_port,out_ports);
	}
}

impl Topology for Mesh
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
		self.cartesian_data.size*self.num_local_ports
	}
	fn route_packet(&self, in_port:usize, vc:usize, event:&mut RoutingEvent)
	{
		if self.target_router(event.destination) == self.identity.router_index
		{
			match event.destination
			{
				Destination::Endpoint(endpoint) => event.next_port = Some(self.endpoint_port(endpoint)),
				Destination::Broadcast => panic!("a broadcast reached router {} as unicast traffic",self.identity.router_index),
			}
			return;
		}
		for dimension in event.routing_dim..self.dimensions()
		{
			let target = match event.dest_location
			{
				Some(ref location) => location[dimension],
				None => panic!("router {} got a packet without destination coordinates",self.identity.router_index),
			};
			if target != self.id_loc[dimension]
			{
				let (direction,distance) = self.direction(dimension,target);
				event.next_port = Some(choose_multipath(self.port_start[dimension][direction],self.dim_width[dimension],distance));
				if self.id_loc[dimension]==0 && in_port<self.local_port_start
				{
					let new_vc = vc ^ 1;
					debug!("Crossing dateline at router {} in dimension {}. Changing from VC {} to {}",self.identity.router_index,dimension,vc,new_vc);
					event.vc = new_vc;
				}
				return;
			}
			//A new dimension starts in the even virtual channel.
			event.routing_dim = dimension+1;
			event.vc = vc & !1;
		}
		panic!("router {} is not the destination of a packet towards {:?} but all its coordinates match",self.identity.router_index,event.destination);
	}
	fn process_input(&self, event:RouterEvent) -> Result<RoutingEvent,Error>
	{
		self.check_destination(&event)?;
		let target = match event.destination
		{
			Destination::Endpoint(endpoint) => self.endpoint_router(endpoint),
			Destination::Broadcast => return Err(error!(undetermined).with_message("broadcast packets must be sent as untimed traffic".to_string())),
		};
		let mut routing_event = RoutingEvent::new(event);
		routing_event.vc = routing_event.vn*2;
		routing_event.dest_location = Some(self.cartesian_data.unpack(target));
		Ok(routing_event)
	}
	fn route_untimed(&self, in_port:usize, event:&mut RoutingEvent, out_ports:&mut Vec<usize>)
	{
		match event.phase
		{
			Some(UntimedPhase::Converging) =>
			{
				if self.identity.router_index != BROADCAST_ROOT || !event.destination.is_broadcast()
				{
					self.route_packet(in_port,0,event);
					out_ports.push(event.next_port());
					return;
				}
				event.phase = Some(UntimedPhase::Flooding);
				self.flood(in_port,0,out_ports);
			},
			Some(UntimedPhase::Flooding) =>
			{
				//Do not flood back into the dimension the packet came from.
				let first_dimension = match self.port_dimension(in_port)
				{
					Some((dimension,NEGATIVE)) => dimension,
					_ => self.dimensions(),
				};
				self.flood(in_port,first_dimension,out_ports);
			},
			None => panic!("router {} got untimed traffic in phase {:?}",self.identity.router_index,event.phase),
		}
	}
	fn process_untimed_input(&self, event:RouterEvent) -> Result<RoutingEvent,Error>
	{
		self.check_destination(&event)?;
		let target = self.target_router(event.destination);
		let mut routing_event = RoutingEvent::new(event);
		routing_event.dest_location = Some(self.cartesian_data.unpack(target));
		routing_event.phase = Some(UntimedPhase::Converging);
		Ok(routing_event)
	}
	fn endpoint_id(&self, port:usize) -> Option<usize>
	{
		if self.local_port_start<=port && port<self.local_port_start+self.num_local_ports
		{
			Some(self.identity.router_index*self.num_local_ports + port-self.local_port_start)
		}
		else
		{
			None
		}
	}
	fn port_state(&self, port:usize) -> PortState
	{
		if port >= self.local_port_start
		{
			return if port < self.local_port_start+self.num_local_ports { PortState::RouterToNode } else { PortState::Unconnected };
		}
		let (dimension,direction) = match self.port_dimension(port)
		{
			Some(found) => found,
			None => return PortState::Unconnected,
		};
		let side = self.cartesian_data.sides[dimension];
		let at_edge = match direction
		{
			POSITIVE => self.id_loc[dimension]+1 == side,
			_ => self.id_loc[dimension] == 0,
		};
		if side==1 || (at_edge && !self.wraparound)
		{
			PortState::Unconnected
		}
		else
		{
			PortState::RouterToRouter
		}
	}
	fn install_credit_view(&mut self, credits:CreditView, num_vcs:usize) -> Result<(),Error>
	{
		let vcs_per_vn = self.vcs_per_vn();
		self.identity.install_credits(credits,num_vcs,&vcs_per_vn)?;
		Ok(())
	}
	///Two per virtual network, exchanged at the dateline.
	fn vcs_per_vn(&self) -> Vec<usize>
	{
		vec![2;self.identity.num_vns]
	}
}
