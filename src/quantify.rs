use std::mem::size_of;
use std::rc::Rc;
use std::cell::Cell;

use log::info;

// This is similar to https://docs.rs/heapsize/0.4.2/heapsize/

pub trait Quantifiable
{
	/// Get the total memory currently being employed by the implementing type. Both stack and heap.
	fn total_memory(&self) -> usize;
	/// Report the memory employed by each part.
	/// The derive macro implements this as `unimplemented!()`, so types that are reported on implement the trait by hand.
	fn print_memory_breakdown(&self)
	{
		info!("total memory {} bytes, forecast {} bytes",self.total_memory(),self.forecast_total_memory());
	}
	/// Get an estimation on how much memory the type could reach during the simulation.
	fn forecast_total_memory(&self) -> usize;
}

impl<T:Quantifiable> Quantifiable for Vec<T>
{
	fn total_memory(&self) -> usize
	{
		size_of::<Vec<T>>() + self.iter().map(|e|e.total_memory()).sum::<usize>() + (self.capacity()-self.len())*size_of::<T>()
	}
	fn forecast_total_memory(&self) -> usize
	{
		size_of::<Vec<T>>() + self.iter().map(|e|e.forecast_total_memory()).sum::<usize>()
	}
}

impl<A:Quantifiable, B:Quantifiable> Quantifiable for (A,B)
{
	fn total_memory(&self) -> usize
	{
		self.0.total_memory()+self.1.total_memory()
	}
	fn forecast_total_memory(&self) -> usize
	{
		self.0.forecast_total_memory()+self.1.forecast_total_memory()
	}
}

impl<T:Quantifiable> Quantifiable for [T;2]
{
	fn total_memory(&self) -> usize
	{
		self[0].total_memory()+self[1].total_memory()
	}
	fn forecast_total_memory(&self) -> usize
	{
		self[0].forecast_total_memory()+self[1].forecast_total_memory()
	}
}

macro_rules! quantifiable_simple
{
	($t:ty) =>
	{
		impl Quantifiable for $t
		{
			fn total_memory(&self) -> usize
			{
				size_of::<$t>()
			}
			fn forecast_total_memory(&self) -> usize
			{
				size_of::<$t>()
			}
		}
	}
}

quantifiable_simple!(bool);
quantifiable_simple!(i32);
quantifiable_simple!(usize);
quantifiable_simple!(f64);

impl Quantifiable for String
{
	fn total_memory(&self) -> usize
	{
		size_of::<String>() + self.capacity()
	}
	fn forecast_total_memory(&self) -> usize
	{
		size_of::<String>() + self.len()
	}
}

impl<T:Quantifiable+Copy> Quantifiable for Cell<T>
{
	fn total_memory(&self) -> usize
	{
		self.get().total_memory()
	}
	fn forecast_total_memory(&self) -> usize
	{
		self.get().forecast_total_memory()
	}
}

///Only the pointer is counted. The pointee is accounted by whoever creates it.
impl<T:?Sized> Quantifiable for Rc<T>
{
	fn total_memory(&self) -> usize
	{
		size_of::<Rc<T>>()
	}
	fn forecast_total_memory(&self) -> usize
	{
		size_of::<Rc<T>>()
	}
}

impl<T:Quantifiable+?Sized> Quantifiable for Box<T>
{
	fn total_memory(&self) -> usize
	{
		size_of::<Box<T>>() + self.as_ref().total_memory()
	}
	fn forecast_total_memory(&self) -> usize
	{
		size_of::<Box<T>>() + self.as_ref().forecast_total_memory()
	}
}

impl<T:Quantifiable> Quantifiable for Option<T>
{
	fn total_memory(&self) -> usize
	{
		match self
		{
			&None => size_of::<Option<T>>(),
			&Some(ref thing) => size_of::<Option<T>>() - size_of::<T>() + thing.total_memory(),
		}
	}
	fn forecast_total_memory(&self) -> usize
	{
		match self
		{
			&None => size_of::<Option<T>>(),
			&Some(ref thing) => size_of::<Option<T>>() - size_of::<T>() + thing.forecast_total_memory(),
		}
	}
}

#[cfg(test)]
mod tests
{
	use super::*;
	use quantifiable_derive::Quantifiable;

	#[derive(Quantifiable)]
	struct Sample
	{
		ports: Vec<usize>,
		flag: bool,
	}

	#[derive(Quantifiable)]
	#[allow(dead_code)]
	enum Shape
	{
		Empty,
		Sides(Vec<usize>),
		Named{name:String},
	}

	#[test]
	fn derived_struct_adds_fields()
	{
		let sample=Sample{ports:Vec::with_capacity(4),flag:true};
		let expected=size_of::<Vec<usize>>()+4*size_of::<usize>()+size_of::<bool>();
		assert_eq!(sample.total_memory(),expected);
		assert_eq!(sample.forecast_total_memory(),size_of::<Vec<usize>>()+size_of::<bool>());
		assert!(sample.ports.is_empty() && sample.flag);
	}

	#[test]
	fn derived_enum_counts_active_variant()
	{
		assert_eq!(Shape::Empty.total_memory(),0);
		let sides=Shape::Sides(vec![4,4]);
		assert_eq!(sides.total_memory(),vec![4usize,4].total_memory());
	}

	#[test]
	fn breakdown_of_plain_values()
	{
		let cells=vec![Cell::new(3usize);2];
		assert_eq!(cells.total_memory(),size_of::<Vec<Cell<usize>>>()+2*size_of::<usize>());
		cells.print_memory_breakdown();
	}
}
