/*!

Errors of caminos-routing. Every constructor and installation call returns `Result<_,Error>` so the embedding simulator can abort the run with a readable message.
Conditions in the per-packet routing path that can only come from a programming error are kept as `panic!`.

Build errors with the `error!` macro, which captures the source location:
* `return Err( error!(malformed_shape,shape.to_string()) );`
* `error!(ill_formed_configuration,cv.clone()).with_message(format!("..."))`

*/

use std::fmt::{Display,Formatter};
use crate::config::ConfigurationValue;

/// The main Error class to be used in each `Result(Whatever,Error)`.
/// It contains the code source of the error and its kind.
/// An arbitrary `String` message can be optionally attached.
#[derive(Debug)]
pub struct Error
{
	pub source_location: SourceLocation,
	pub kind: ErrorKind,
	pub message: Option<String>,
}

/// A source code location where an error occurred.
/// Contains the values of the macros `std::{file,line,column}`.
#[derive(Debug,Clone,Copy)]
pub struct SourceLocation
{
	pub file: &'static str,
	pub line: u32,
	pub column: u32,
}

#[derive(Debug)]
pub enum ErrorKind
{
	/// A configuration value that cannot be used where it was given.
	IllFormedConfiguration{
		value: ConfigurationValue,
	},
	/// A topology shape string that could not be understood.
	MalformedShape{
		shape: String,
	},
	/// A routing mode other than `deterministic` or `adaptive`.
	UnknownRoutingMode{
		mode: String,
	},
	/// A per-VN list of routing modes with the wrong length.
	RoutingModeCountMismatch{
		expected: usize,
		found: usize,
	},
	/// The router has fewer ports than its position in the topology requires.
	InsufficientPorts{
		required: usize,
		available: usize,
	},
	RouterOutOfRange{
		router_index: usize,
		num_routers: usize,
	},
	DestinationOutOfRange{
		destination: usize,
		num_endpoints: usize,
	},
	VirtualNetworkOutOfRange{
		vn: usize,
		num_vns: usize,
	},
	/// The flow-control layer tried to install the credit view a second time.
	CreditViewAlreadyInstalled,
	/// The credit view does not have the size derived from ports and virtual channels.
	CreditViewMismatch{
		expected: usize,
		found: usize,
	},
	/// A topology classifies a port differently than the wiring connects it.
	PortStateMismatch{
		router_index: usize,
		port: usize,
	},
	/// A traced packet did not reach its destination within the hop limit.
	RouteDidNotConverge{
		hops: usize,
	},
	/// Any other error. Better to add new types than to use this thing.
	Undetermined,
}

/// Builds a `SourceLocation` for the place where it is invoked.
#[macro_export]
macro_rules! source_location{
	() => {
		$crate::error::SourceLocation{
			file: file!(),
			line: line!(),
			column: column!(),
		}
	}
}

/// `error!(kind_constructor, args...)` calls `Error::kind_constructor(source_location!(), args...)`.
#[macro_export]
macro_rules! error{
	($kind:ident) => {{
		$crate::error::Error::$kind( $crate::source_location!() )
	}};
	($kind:ident, $($args:expr),* ) => {{
		$crate::error::Error::$kind( $crate::source_location!(), $($args),* )
	}};
}

use ErrorKind::*;

impl Error
{
	pub fn new(source_location:SourceLocation, kind:ErrorKind) -> Error
	{
		Error{
			source_location,
			kind,
			message:None,
		}
	}
	pub fn with_message(mut self,message:String) -> Error
	{
		self.message=Some(message);
		self
	}
	pub fn ill_formed_configuration(source_location:SourceLocation,value:ConfigurationValue)->Error
	{
		Error::new(source_location,IllFormedConfiguration{value})
	}
	pub fn malformed_shape(source_location:SourceLocation,shape:String)->Error
	{
		Error::new(source_location,MalformedShape{shape})
	}
	pub fn unknown_routing_mode(source_location:SourceLocation,mode:String)->Error
	{
		Error::new(source_location,UnknownRoutingMode{mode})
	}
	pub fn routing_mode_count_mismatch(source_location:SourceLocation,expected:usize,found:usize)->Error
	{
		Error::new(source_location,RoutingModeCountMismatch{expected,found})
	}
	pub fn insufficient_ports(source_location:SourceLocation,required:usize,available:usize)->Error
	{
		Error::new(source_location,InsufficientPorts{required,available})
	}
	pub fn router_out_of_range(source_location:SourceLocation,router_index:usize,num_routers:usize)->Error
	{
		Error::new(source_location,RouterOutOfRange{router_index,num_routers})
	}
	pub fn destination_out_of_range(source_location:SourceLocation,destination:usize,num_endpoints:usize)->Error
	{
		Error::new(source_location,DestinationOutOfRange{destination,num_endpoints})
	}
	pub fn virtual_network_out_of_range(source_location:SourceLocation,vn:usize,num_vns:usize)->Error
	{
		Error::new(source_location,VirtualNetworkOutOfRange{vn,num_vns})
	}
	pub fn credit_view_already_installed(source_location:SourceLocation)->Error
	{
		Error::new(source_location,CreditViewAlreadyInstalled)
	}
	pub fn credit_view_mismatch(source_location:SourceLocation,expected:usize,found:usize)->Error
	{
		Error::new(source_location,CreditViewMismatch{expected,found})
	}
	pub fn port_state_mismatch(source_location:SourceLocation,router_index:usize,port:usize)->Error
	{
		Error::new(source_location,PortStateMismatch{router_index,port})
	}
	pub fn route_did_not_converge(source_location:SourceLocation,hops:usize)->Error
	{
		Error::new(source_location,RouteDidNotConverge{hops})
	}
	pub fn undetermined(source_location:SourceLocation)->Error
	{
		Error::new(source_location,Undetermined)
	}
}

impl Display for Error
{
	fn fmt(&self, formatter: &mut Formatter<'_>) -> std::result::Result<(), std::fmt::Error>
	{
		let Error{source_location:location,kind,message} = self;
		writeln!(formatter,"Error at file {} at line {} column {}.",location.file,location.line,location.column)?;
		if let Some(text) = message
		{
			writeln!(formatter,"{}",text)?;
		}
		kind.fmt(formatter)?;
		Ok(())
	}
}

impl Display for ErrorKind
{
	fn fmt(&self, formatter: &mut Formatter<'_>) -> std::result::Result<(), std::fmt::Error>
	{
		match self
		{
			IllFormedConfiguration{value} =>
			{
				writeln!(formatter,"IllFormedConfiguration error: the following configuration value could not be used:\n{}",value)?;
			},
			MalformedShape{shape} =>
			{
				writeln!(formatter,"MalformedShape error: the topology shape \"{}\" could not be parsed.",shape)?;
			},
			UnknownRoutingMode{mode} =>
			{
				writeln!(formatter,"UnknownRoutingMode error: \"{}\" is neither deterministic nor adaptive.",mode)?;
			},
			RoutingModeCountMismatch{expected,found} =>
			{
				writeln!(formatter,"RoutingModeCountMismatch error: {} routing modes were given for {} virtual networks.",found,expected)?;
			},
			InsufficientPorts{required,available} =>
			{
				writeln!(formatter,"InsufficientPorts error: the router needs {} ports but only has {}.",required,available)?;
			},
			RouterOutOfRange{router_index,num_routers} =>
			{
				writeln!(formatter,"RouterOutOfRange error: router {} does not exist in a topology of {} routers.",router_index,num_routers)?;
			},
			DestinationOutOfRange{destination,num_endpoints} =>
			{
				writeln!(formatter,"DestinationOutOfRange error: endpoint {} does not exist in a network of {} endpoints.",destination,num_endpoints)?;
			},
			VirtualNetworkOutOfRange{vn,num_vns} =>
			{
				writeln!(formatter,"VirtualNetworkOutOfRange error: virtual network {} requested but the router was built for {}.",vn,num_vns)?;
			},
			CreditViewAlreadyInstalled =>
			{
				writeln!(formatter,"CreditViewAlreadyInstalled error: the output credits of a router can only be installed once.")?;
			},
			CreditViewMismatch{expected,found} =>
			{
				writeln!(formatter,"CreditViewMismatch error: expected {} but found {}.",expected,found)?;
			},
			PortStateMismatch{router_index,port} =>
			{
				writeln!(formatter,"PortStateMismatch error: port {} of router {} is classified differently from how it is wired.",port,router_index)?;
			},
			RouteDidNotConverge{hops} =>
			{
				writeln!(formatter,"RouteDidNotConverge error: the packet was still in the network after {} hops.",hops)?;
			},
			Undetermined =>
			{
				writeln!(formatter,"Undetermined error: A generic error. The concrete error should be more specified.")?;
			},
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests
{
	use super::*;
	#[test]
	fn display_includes_message_and_kind()
	{
		let error = error!(insufficient_ports,10,6).with_message("mesh 4x4 with 2 local ports".to_string());
		let text = format!("{}",error);
		assert!(text.contains("src/error.rs"));
		assert!(text.contains("mesh 4x4 with 2 local ports"));
		assert!(text.contains("needs 10 ports but only has 6"));
		match error.kind
		{
			InsufficientPorts{required:10,available:6} => (),
			ref other => panic!("unexpected kind {:?}",other),
		}
	}
}
