/*!

Packets as seen by the routing of a router.

A [RouterEvent] is what the delivery layer offers at the ingress router. The topology turns it into a [RoutingEvent] once, with `process_input` or `process_untimed_input`, and then every router in the path mutates that same [RoutingEvent] through `route_packet` or `route_untimed`.

*/

use quantifiable_derive::Quantifiable;//the derive macro
use crate::quantify::Quantifiable;

///The target of a packet.
#[derive(Quantifiable)]
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum Destination
{
	///A single endpoint, by its global identifier.
	Endpoint(usize),
	///Every endpoint of the network. Only meaningful for untimed traffic.
	Broadcast,
}

impl Destination
{
	pub fn endpoint(&self) -> Option<usize>
	{
		match self
		{
			&Destination::Endpoint(endpoint) => Some(endpoint),
			&Destination::Broadcast => None,
		}
	}
	pub fn is_broadcast(&self) -> bool
	{
		*self == Destination::Broadcast
	}
}

///A packet as handed by the delivery layer to its ingress router.
#[derive(Quantifiable)]
#[derive(Debug,Clone)]
pub struct RouterEvent
{
	///The endpoint that injected the packet, when known.
	pub source: Option<usize>,
	pub destination: Destination,
	///Virtual network of the packet.
	pub vn: usize,
}

impl RouterEvent
{
	pub fn new(source:Option<usize>, destination:Destination, vn:usize) -> RouterEvent
	{
		RouterEvent{
			source,
			destination,
			vn,
		}
	}
}

///Progress of an untimed broadcast in a Cartesian topology.
#[derive(Quantifiable)]
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum UntimedPhase
{
	///Travelling as unicast towards the router that starts the flood.
	Converging,
	///Spreading through the positive direction of the dimensions.
	Flooding,
}

///Information stored in the packet for the topologies to operate.
#[derive(Quantifiable)]
#[derive(Debug,Clone)]
pub struct RoutingEvent
{
	pub destination: Destination,
	pub vn: usize,
	///Virtual channel the packet requests or travels by.
	pub vc: usize,
	///The output port selected by the last routing call.
	pub next_port: Option<usize>,

	//All the remaining fields are used only by the Cartesian topologies.
	///First dimension that may still differ from the destination.
	pub routing_dim: usize,
	///Coordinates of the destination router. Decoded once at ingress.
	pub dest_location: Option<Vec<usize>>,
	///Only for untimed traffic.
	pub phase: Option<UntimedPhase>,

	///The packet as it was offered at ingress.
	pub encapsulated: RouterEvent,
}

impl RoutingEvent
{
	///A routing event with no topology state yet.
	pub fn new(encapsulated:RouterEvent) -> RoutingEvent
	{
		RoutingEvent{
			destination: encapsulated.destination,
			vn: encapsulated.vn,
			vc: 0,
			next_port: None,
			routing_dim: 0,
			dest_location: None,
			phase: None,
			encapsulated,
		}
	}
	///The output port, panicking if the packet has not been routed yet.
	pub fn next_port(&self) -> usize
	{
		match self.next_port
		{
			Some(port) => port,
			None => panic!("the packet towards {:?} has not been routed yet",self.destination),
		}
	}
}

#[cfg(test)]
mod tests
{
	use super::*;
	#[test]
	fn new_event_copies_destination_and_vn()
	{
		let event=RoutingEvent::new(RouterEvent::new(Some(3),Destination::Endpoint(7),1));
		assert_eq!(event.destination,Destination::Endpoint(7));
		assert_eq!(event.destination.endpoint(),Some(7));
		assert_eq!(event.vn,1);
		assert_eq!(event.next_port,None);
		assert!(Destination::Broadcast.is_broadcast());
		assert_eq!(Destination::Broadcast.endpoint(),None);
	}
}
