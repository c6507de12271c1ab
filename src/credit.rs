/*!

Output credits of a router.

The flow-control layer owns a [CreditCounters] and is the only one writing to it. Topologies receive a [CreditView], which shares the storage but can only read it.
Both are indexed by `port*num_vcs+vc`.

*/

use std::cell::Cell;
use std::rc::Rc;
use std::mem::size_of;

use crate::quantify::Quantifiable;

///The write side of the output credits of a router.
#[derive(Debug)]
pub struct CreditCounters
{
	credits: Rc<[Cell<usize>]>,
	num_ports: usize,
	num_vcs: usize,
}

impl CreditCounters
{
	///Every (port,vc) pair starts with `initial` credits.
	pub fn new(num_ports:usize, num_vcs:usize, initial:usize) -> CreditCounters
	{
		let credits : Rc<[Cell<usize>]> = (0..num_ports*num_vcs).map(|_|Cell::new(initial)).collect();
		CreditCounters{
			credits,
			num_ports,
			num_vcs,
		}
	}
	pub fn num_ports(&self) -> usize
	{
		self.num_ports
	}
	pub fn num_vcs(&self) -> usize
	{
		self.num_vcs
	}
	pub fn get(&self, port:usize, vc:usize) -> usize
	{
		self.credits[self.index(port,vc)].get()
	}
	pub fn set(&self, port:usize, vc:usize, value:usize)
	{
		self.credits[self.index(port,vc)].set(value);
	}
	///A phit was sent through `(port,vc)`.
	pub fn consume(&self, port:usize, vc:usize, amount:usize)
	{
		let cell=&self.credits[self.index(port,vc)];
		let current=cell.get();
		if amount>current
		{
			panic!("consuming {} credits from port {} vc {}, which only has {}",amount,port,vc,current);
		}
		cell.set(current-amount);
	}
	///The next router freed space in `(port,vc)`.
	pub fn release(&self, port:usize, vc:usize, amount:usize)
	{
		let cell=&self.credits[self.index(port,vc)];
		cell.set(cell.get()+amount);
	}
	///A read-only handle over the same counters.
	pub fn view(&self) -> CreditView
	{
		CreditView{
			credits: self.credits.clone(),
		}
	}
	fn index(&self, port:usize, vc:usize) -> usize
	{
		if vc>=self.num_vcs
		{
			panic!("vc {} out of range, there are {} virtual channels",vc,self.num_vcs);
		}
		port*self.num_vcs+vc
	}
}

///The read side of the output credits of a router, as seen by the topology.
#[derive(Debug,Clone)]
pub struct CreditView
{
	credits: Rc<[Cell<usize>]>,
}

impl CreditView
{
	///Available credits at position `index`, which is `port*num_vcs+vc`.
	pub fn get(&self, index:usize) -> usize
	{
		self.credits[index].get()
	}
	pub fn len(&self) -> usize
	{
		self.credits.len()
	}
	pub fn is_empty(&self) -> bool
	{
		self.credits.is_empty()
	}
}

impl Quantifiable for CreditCounters
{
	fn total_memory(&self) -> usize
	{
		size_of::<CreditCounters>() + self.credits.len()*size_of::<Cell<usize>>()
	}
	fn forecast_total_memory(&self) -> usize
	{
		self.total_memory()
	}
}

///The storage belongs to the counters.
impl Quantifiable for CreditView
{
	fn total_memory(&self) -> usize
	{
		size_of::<CreditView>()
	}
	fn forecast_total_memory(&self) -> usize
	{
		size_of::<CreditView>()
	}
}
