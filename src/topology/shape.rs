/*!

Parsing of the compact shape strings.

* Fat trees are given from the leaves to the root as `"<down>,<up>:<down>,<up>:...:<down>"`. The root level has no up ports.
* Cartesian topologies are given as `"<side>x<side>x...x<side>"`, one factor per dimension, dimension 0 first.

*/

use quantifiable_derive::Quantifiable;//the derive macro
use itertools::Itertools;

use crate::quantify::Quantifiable;
use crate::error;
use crate::error::*;

///Number of down and up ports of the routers of each level of a fat tree, from the leaves to the root.
#[derive(Quantifiable)]
#[derive(Debug,Clone,PartialEq,Eq)]
pub struct FatTreeShape
{
	pub downs: Vec<usize>,
	pub ups: Vec<usize>,
}

impl FatTreeShape
{
	pub fn num_levels(&self) -> usize
	{
		self.downs.len()
	}
	///Number of hosts attached to the leaves.
	pub fn total_hosts(&self) -> usize
	{
		self.downs.iter().product()
	}
	///Number of routers in each level.
	pub fn routers_per_level(&self) -> Vec<usize>
	{
		let mut routers=Vec::with_capacity(self.num_levels());
		routers.push(self.total_hosts()/self.downs[0]);
		for level in 1..self.num_levels()
		{
			routers.push( routers[level-1]*self.ups[level-1]/self.downs[level] );
		}
		routers
	}
	///Routers in a group of a level. Every router of a group reaches exactly the same hosts.
	pub fn routers_per_group(&self, level:usize) -> usize
	{
		self.ups[..level].iter().product()
	}
	///Index of the first router of each level.
	pub fn level_starts(&self) -> Vec<usize>
	{
		let mut count=0;
		self.routers_per_level().into_iter().map(|routers|{
			let start=count;
			count+=routers;
			start
		}).collect()
	}
	pub fn num_routers(&self) -> usize
	{
		self.routers_per_level().iter().sum()
	}
}

impl std::fmt::Display for FatTreeShape
{
	fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::result::Result<(), std::fmt::Error>
	{
		let last=self.num_levels()-1;
		let text=self.downs.iter().zip(self.ups.iter()).enumerate().map(|(level,(down,up))|
			if level==last { format!("{}",down) } else { format!("{},{}",down,up) }
		).join(":");
		write!(formatter,"{}",text)
	}
}

fn parse_count(shape:&str, text:&str) -> Result<usize,Error>
{
	match text.trim().parse::<usize>()
	{
		Ok(0) => Err(error!(malformed_shape,shape.to_string()).with_message("ports counts must be positive".to_string())),
		Ok(count) => Ok(count),
		Err(_) => Err(error!(malformed_shape,shape.to_string()).with_message(format!("\"{}\" is not a number",text))),
	}
}

/// Parse a fat tree shape such as `"4,4:4,4:8"`, which gives `downs=[4,4,8]` and `ups=[4,4,0]`.
/// Any combination of positive counts gives a whole number of routers per level, being `prod(ups[..level])*prod(downs[level+1..])`.
pub fn parse_fat_tree_shape(shape:&str) -> Result<FatTreeShape,Error>
{
	let levels : Vec<&str> = shape.split(':').collect();
	let mut downs=Vec::with_capacity(levels.len());
	let mut ups=Vec::with_capacity(levels.len());
	for (level,text) in levels.iter().enumerate()
	{
		let is_root = level+1==levels.len();
		let counts : Vec<&str> = text.split(',').collect();
		match counts.len()
		{
			1 if is_root =>
			{
				downs.push(parse_count(shape,counts[0])?);
				ups.push(0);
			},
			1 => return Err(error!(malformed_shape,shape.to_string()).with_message(format!("level {} has no up ports and is not the root",level))),
			2 if is_root =>
			{
				//An explicit zero is tolerated at the root.
				downs.push(parse_count(shape,counts[0])?);
				if counts[1].trim()!="0"
				{
					return Err(error!(malformed_shape,shape.to_string()).with_message("the root level cannot have up ports".to_string()));
				}
				ups.push(0);
			},
			2 =>
			{
				downs.push(parse_count(shape,counts[0])?);
				ups.push(parse_count(shape,counts[1])?);
			},
			_ => return Err(error!(malformed_shape,shape.to_string()).with_message(format!("level {} has {} counts",level,counts.len()))),
		}
	}
	Ok(FatTreeShape{downs,ups})
}

/// Parse a string such as `"4x4x2"` into one size per dimension.
pub fn parse_dimensions(text:&str) -> Result<Vec<usize>,Error>
{
	text.split('x').map(|factor|parse_count(text,factor)).collect()
}

#[cfg(test)]
mod tests
{
	use super::*;

	#[test]
	fn fat_tree_shape_round_trip()
	{
		let shape=parse_fat_tree_shape("4,4:4,4:8").unwrap();
		assert_eq!(shape.downs,vec![4,4,8]);
		assert_eq!(shape.ups,vec![4,4,0]);
		assert_eq!(shape.total_hosts(),128);
		assert_eq!(shape.routers_per_level(),vec![32,32,16]);
		assert_eq!(shape.level_starts(),vec![0,32,64]);
		assert_eq!(shape.num_routers(),80);
		assert_eq!(shape.routers_per_group(2),16);
		assert_eq!(format!("{}",shape),"4,4:4,4:8");
	}

	#[test]
	fn small_fat_tree_counts()
	{
		let shape=parse_fat_tree_shape("2,2:2,2:4").unwrap();
		assert_eq!(shape.total_hosts(),16);
		assert_eq!(shape.routers_per_level(),vec![8,8,4]);
		assert_eq!(shape.routers_per_group(1),2);
		let single=parse_fat_tree_shape("8").unwrap();
		assert_eq!(single.downs,vec![8]);
		assert_eq!(single.num_routers(),1);
	}

	#[test]
	fn malformed_fat_tree_shapes()
	{
		for text in ["", "4,4", "4:4,4:8", "4,4:4,4,2:8", "4,a:8", "0,4:8", "4,0:8", "4,4:8,2"].iter()
		{
			match parse_fat_tree_shape(text)
			{
				Err(Error{kind:ErrorKind::MalformedShape{..},..}) => (),
				other => panic!("shape {:?} gave {:?}",text,other),
			}
		}
		assert!(parse_fat_tree_shape("4,4:8,0").is_ok());
	}

	#[test]
	fn dimension_strings()
	{
		assert_eq!(parse_dimensions("4x4x2x2").unwrap(),vec![4,4,2,2]);
		assert_eq!(parse_dimensions("7").unwrap(),vec![7]);
		assert!(parse_dimensions("4x").is_err());
		assert!(parse_dimensions("4x0").is_err());
		assert!(parse_dimensions("4*4").is_err());
	}
}
