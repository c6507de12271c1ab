
use quantifiable_derive::Quantifiable;//the derive macro

use super::{Location,Wiring};
use crate::topology::prelude::*;
use crate::topology::fat_tree::FatTreeConfiguration;
use crate::topology::shape::FatTreeShape;
use crate::quantify::Quantifiable;

///The links of a folded fat tree.
///
///Routers are numbered by level, from the leaves. Inside a level, the routers of a group are consecutive, each group reaching the same hosts.
///The up port `u` of router `r` of group `G` at level `l` goes to router `r+u*routers_per_group(l)` of group `G/downs[l+1]` at level `l+1`, arriving by its down port `G%downs[l+1]`.
#[derive(Quantifiable)]
#[derive(Debug)]
pub struct FatTreeWiring
{
	shape: FatTreeShape,
	level_starts: Vec<usize>,
	num_routers: usize,
	total_hosts: usize,
}

impl FatTreeWiring
{
	pub fn new(cv:&ConfigurationValue) -> Result<FatTreeWiring,Error>
	{
		let FatTreeConfiguration{shape,..} = FatTreeConfiguration::new(cv)?;
		Ok(FatTreeWiring{
			level_starts: shape.level_starts(),
			num_routers: shape.num_routers(),
			total_hosts: shape.total_hosts(),
			shape,
		})
	}
	///Level, group and index inside the group of a router.
	fn position(&self, router_index:usize) -> (usize,usize,usize)
	{
		if router_index >= self.num_routers
		{
			panic!("router {} is not in the fat tree {}",router_index,self.shape);
		}
		let level = self.level_starts.iter().rposition(|&start|start<=router_index).unwrap_or(0);
		let level_id = router_index - self.level_starts[level];
		let per_group = self.shape.routers_per_group(level);
		(level,level_id/per_group,level_id%per_group)
	}
	fn router_id(&self, level:usize, group:usize, index:usize) -> usize
	{
		self.level_starts[level] + group*self.shape.routers_per_group(level) + index
	}
}

impl Wiring for FatTreeWiring
{
	fn num_routers(&self) -> usize
	{
		self.num_routers
	}
	fn num_endpoints(&self) -> usize
	{
		self.total_hosts
	}
	fn ports(&self, router_index:usize) -> usize
	{
		let (level,_,_) = self.position(router_index);
		self.shape.downs[level] + self.shape.ups[level]
	}
	fn neighbour(&self, router_index:usize, port:usize) -> Location
	{
		let (level,group,index) = self.position(router_index);
		let downs = &self.shape.downs;
		let ups = &self.shape.ups;
		if port < downs[level]
		{
			if level==0
			{
				return Location::EndpointPort(group*downs[0]+port);
			}
			let child_per_group = self.shape.routers_per_group(level-1);
			Location::RouterPort{
				router_index: self.router_id(level-1,group*downs[level]+port,index%child_per_group),
				router_port: downs[level-1] + index/child_per_group,
			}
		}
		else if port < downs[level]+ups[level]
		{
			let up = port-downs[level];
			let per_group = self.shape.routers_per_group(level);
			Location::RouterPort{
				router_index: self.router_id(level+1,group/downs[level+1],index+up*per_group),
				router_port: group%downs[level+1],
			}
		}
		else
		{
			Location::None
		}
	}
	fn endpoint_neighbour(&self, endpoint:usize) -> Location
	{
		if endpoint >= self.total_hosts
		{
			return Location::None;
		}
		let downs = self.shape.downs[0];
		Location::RouterPort{
			router_index: self.router_id(0,endpoint/downs,0),
			router_port: endpoint%downs,
		}
	}
}

#[cfg(test)]
mod tests
{
	use super::*;

	fn wiring(shape:&str) -> FatTreeWiring
	{
		let cv=ConfigurationValue::Object("FatTree".to_string(),vec![
			("shape".to_string(),ConfigurationValue::Literal(shape.to_string())),
		]);
		FatTreeWiring::new(&cv).unwrap()
	}

	#[test]
	fn links_are_symmetric()
	{
		for shape in ["2,2:2,2:4","4,4:4,4:8","3,2:2,3:6","4"].iter()
		{
			let wiring=wiring(shape);
			let mut endpoints_seen=vec![0;wiring.num_endpoints()];
			for router in 0..wiring.num_routers()
			{
				for port in 0..wiring.ports(router)
				{
					match wiring.neighbour(router,port)
					{
						Location::RouterPort{router_index,router_port} =>
						{
							assert_eq!(wiring.neighbour(router_index,router_port),Location::RouterPort{router_index:router,router_port:port},"shape {} router {} port {}",shape,router,port);
						},
						Location::EndpointPort(endpoint) =>
						{
							endpoints_seen[endpoint]+=1;
							assert_eq!(wiring.endpoint_neighbour(endpoint),Location::RouterPort{router_index:router,router_port:port});
						},
						Location::None => panic!("shape {} router {} port {} is disconnected",shape,router,port),
					}
				}
			}
			assert!(endpoints_seen.iter().all(|&count|count==1));
		}
	}

	#[test]
	fn small_tree_links()
	{
		let wiring=wiring("2,2:2,2:4");
		assert_eq!(wiring.num_routers(),20);
		//Leaf 5 goes up to the middle routers of group 2.
		assert_eq!(wiring.neighbour(5,2),Location::RouterPort{router_index:12,router_port:1});
		assert_eq!(wiring.neighbour(5,3),Location::RouterPort{router_index:13,router_port:1});
		//The second middle router of group 0 goes up to roots 17 and 19.
		assert_eq!(wiring.neighbour(9,2),Location::RouterPort{router_index:17,router_port:0});
		assert_eq!(wiring.neighbour(9,3),Location::RouterPort{router_index:19,router_port:0});
		assert_eq!(wiring.endpoint_neighbour(11),Location::RouterPort{router_index:5,router_port:1});
		assert_eq!(wiring.endpoint_neighbour(16),Location::None);
		assert_eq!(wiring.neighbour(16,4),Location::None);
	}
}
