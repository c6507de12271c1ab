
use quantifiable_derive::Quantifiable;//the derive macro

use super::{Location,Wiring};
use crate::topology::prelude::*;
use crate::topology::mesh::{CartesianData,MeshConfiguration,dimension_ports,POSITIVE,NEGATIVE};
use crate::quantify::Quantifiable;

///The links of a `Mesh` or `Torus`.
///The `k`-th positive link of a router goes to the `k`-th negative link of the next router in that dimension.
#[derive(Quantifiable)]
#[derive(Debug)]
pub struct CartesianWiring
{
	cartesian_data: CartesianData,
	widths: Vec<usize>,
	port_start: Vec<[usize;2]>,
	local_port_start: usize,
	local_ports: usize,
	wraparound: bool,
}

impl CartesianWiring
{
	pub fn new(cv:&ConfigurationValue) -> Result<CartesianWiring,Error>
	{
		let MeshConfiguration{sides,widths,local_ports,wraparound} = MeshConfiguration::new(cv)?;
		let (port_start,local_port_start) = dimension_ports(&widths);
		Ok(CartesianWiring{
			cartesian_data: CartesianData::new(&sides),
			widths,
			port_start,
			local_port_start,
			local_ports,
			wraparound,
		})
	}
	///The router reached by moving one step in `dimension`, if any.
	fn step(&self, coordinates:&[usize], dimension:usize, direction:usize) -> Option<usize>
	{
		let side = self.cartesian_data.sides[dimension];
		let current = coordinates[dimension];
		if side==1
		{
			return None;
		}
		let next = match direction
		{
			POSITIVE if current+1<side => current+1,
			POSITIVE if self.wraparound => 0,
			NEGATIVE if current>0 => current-1,
			NEGATIVE if self.wraparound => side-1,
			_ => return None,
		};
		let mut target = coordinates.to_vec();
		target[dimension] = next;
		Some(self.cartesian_data.pack(&target))
	}
}

impl Wiring for CartesianWiring
{
	fn num_routers(&self) -> usize
	{
		self.cartesian_data.size
	}
	fn num_endpoints(&self) -> usize
	{
		self.cartesian_data.size*self.local_ports
	}
	fn ports(&self, _router_index:usize) -> usize
	{
		self.local_port_start+self.local_ports
	}
	fn neighbour(&self, router_index:usize, port:usize) -> Location
	{
		if port >= self.local_port_start
		{
			if port < self.local_port_start+self.local_ports
			{
				return Location::EndpointPort(router_index*self.local_ports + port-self.local_port_start);
			}
			return Location::None;
		}
		let coordinates = self.cartesian_data.unpack(router_index);
		for (dimension,(start,width)) in self.port_start.iter().zip(self.widths.iter()).enumerate()
		{
			for &direction in [POSITIVE,NEGATIVE].iter()
			{
				if start[direction]<=port && port<start[direction]+width
				{
					let link = port-start[direction];
					return match self.step(&coordinates,dimension,direction)
					{
						Some(neighbour) => Location::RouterPort{
							router_index: neighbour,
							router_port: start[1-direction]+link,
						},
						None => Location::None,
					};
				}
			}
		}
		Location::None
	}
	fn endpoint_neighbour(&self, endpoint:usize) -> Location
	{
		if endpoint >= self.num_endpoints()
		{
			return Location::None;
		}
		Location::RouterPort{
			router_index: endpoint/self.local_ports,
			router_port: self.local_port_start + endpoint%self.local_ports,
		}
	}
}

#[cfg(test)]
mod tests
{
	use super::*;

	fn wiring(name:&str, shape:&str, width:&str) -> CartesianWiring
	{
		let cv=ConfigurationValue::Object(name.to_string(),vec![
			("shape".to_string(),ConfigurationValue::Literal(shape.to_string())),
			("width".to_string(),ConfigurationValue::Literal(width.to_string())),
			("local_ports".to_string(),ConfigurationValue::Number(2.0)),
		]);
		CartesianWiring::new(&cv).unwrap()
	}

	#[test]
	fn mesh_borders_are_disconnected()
	{
		let wiring=wiring("Mesh","3x2x1","2x1x1");
		//Ports: dimension 0 uses 0-3, dimension 1 uses 4-5, dimension 2 uses 6-7, local 8-9.
		assert_eq!(wiring.ports(0),10);
		assert_eq!(wiring.neighbour(0,1),Location::RouterPort{router_index:1,router_port:3});
		assert_eq!(wiring.neighbour(0,2),Location::None);
		assert_eq!(wiring.neighbour(2,0),Location::None);
		assert_eq!(wiring.neighbour(2,3),Location::RouterPort{router_index:1,router_port:1});
		assert_eq!(wiring.neighbour(0,4),Location::RouterPort{router_index:3,router_port:5});
		assert_eq!(wiring.neighbour(0,6),Location::None);
		assert_eq!(wiring.neighbour(4,9),Location::EndpointPort(9));
		assert_eq!(wiring.endpoint_neighbour(9),Location::RouterPort{router_index:4,router_port:9});
	}

	#[test]
	fn torus_wraps_around()
	{
		let wiring=wiring("Torus","3x2x1","2x1x1");
		assert_eq!(wiring.neighbour(2,0),Location::RouterPort{router_index:0,router_port:2});
		assert_eq!(wiring.neighbour(0,3),Location::RouterPort{router_index:2,router_port:1});
		//Size 1 dimensions stay disconnected.
		assert_eq!(wiring.neighbour(0,7),Location::None);
		for router in 0..wiring.num_routers()
		{
			for port in 0..wiring.local_port_start
			{
				if let Location::RouterPort{router_index,router_port}=wiring.neighbour(router,port)
				{
					assert_eq!(wiring.neighbour(router_index,router_port),Location::RouterPort{router_index:router,router_port:port});
				}
			}
		}
	}
}
