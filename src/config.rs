/*!

Configuration values used to build topologies.

A topology is described by a named object whose fields are themselves configuration values, as in

```ignore
FatTree{
	shape: "4,4:4,4:8",
	routing_alg: ["deterministic","adaptive"],
	adaptive_threshold: 0.5,
}
```

There is no textual parser here; the embedding simulator builds the values and hands them over.
*/

use std::fmt::{Display,Formatter};

use crate::error;
use crate::error::*;

#[derive(Clone,Debug,PartialEq,PartialOrd)]
pub enum ConfigurationValue
{
	Literal(String),
	Number(f64),
	Object(String,Vec<(String,ConfigurationValue)>),
	Array(Vec<ConfigurationValue>),
	True,
	False,
	None,
}

impl Default for ConfigurationValue
{
	fn default() -> ConfigurationValue
	{
		ConfigurationValue::None
	}
}

impl ConfigurationValue
{
	fn write(&self, f: &mut Formatter, indent:usize) -> Result<(),std::fmt::Error>
	{
		let is=String::from("\t").repeat(indent);
		write!(f,"{}",is)?;
		match self
		{
			&ConfigurationValue::Literal(ref s) => write!(f,"\"{}\"",s)?,
			&ConfigurationValue::Number(v) => write!(f,"{}",v)?,
			&ConfigurationValue::Object(ref name, ref list) =>
			{
				writeln!(f,"{}\n{}{{",name,is)?;
				for &(ref attr_name,ref attr_value) in list.iter()
				{
					writeln!(f,"{}\t{}:",is,attr_name)?;
					attr_value.write(f,indent+1)?;
					writeln!(f,",")?;
				}
				write!(f,"{}}}",is)?;
			},
			&ConfigurationValue::Array(ref list) =>
			{
				writeln!(f,"[")?;
				for elem in list.iter()
				{
					elem.write(f,indent+1)?;
					writeln!(f,",")?;
				}
				write!(f,"{}]",is)?;
			},
			&ConfigurationValue::True => write!(f,"true")?,
			&ConfigurationValue::False => write!(f,"false")?,
			&ConfigurationValue::None => write!(f,"NONE VALUE")?,
		};
		Ok(())
	}
	pub fn as_bool(&self) -> Result<bool,Error>
	{
		match self
		{
			&ConfigurationValue::True => Ok(true),
			&ConfigurationValue::False => Ok(false),
			_ => Err(error!(ill_formed_configuration, self.clone() )),
		}
	}
	pub fn as_str(&self) -> Result<&str,Error>
	{
		match self
		{
			&ConfigurationValue::Literal(ref s) => Ok(s),
			_ => Err(error!(ill_formed_configuration, self.clone() )),
		}
	}
	pub fn as_f64(&self) -> Result<f64,Error>
	{
		match self
		{
			&ConfigurationValue::Number(x) => Ok(x),
			_ => Err(error!(ill_formed_configuration, self.clone() )),
		}
	}
	/// Numbers are stored as `f64`. Accept only values within a small tolerance of a non-negative integer.
	pub fn as_usize(&self) -> Result<usize,Error>
	{
		match self
		{
			&ConfigurationValue::Number(x) =>
			{
				// Casting from a float to an integer rounds towards zero and saturates.
				let res = x as usize;
				let tolerance = 1e-5;
				let difference = x - res as f64;
				if x < 0.0 || difference > tolerance || difference < -tolerance
				{
					Err(error!(ill_formed_configuration, self.clone()).with_message(format!("{} is not a valid natural number",x)))
				} else {
					Ok( res )
				}
			},
			_ => Err(error!(ill_formed_configuration, self.clone() )),
		}
	}
	pub fn as_array(&self) -> Result<&Vec<ConfigurationValue>,Error>
	{
		match self
		{
			&ConfigurationValue::Array(ref x) => Ok(x),
			_ => Err(error!(ill_formed_configuration, self.clone() )),
		}
	}
	/// The name of an object, if this is an object.
	pub fn object_name(&self) -> Option<&str>
	{
		match self
		{
			&ConfigurationValue::Object(ref name,_) => Some(name),
			_ => None,
		}
	}
	/// Build an error message of kind `IllFormedConfiguration` about this value.
	pub fn ill(&self,message:&str) -> Error
	{
		error!(ill_formed_configuration,self.clone()).with_message(message.to_string())
	}
}

impl Display for ConfigurationValue
{
	fn fmt(&self, f:&mut Formatter) -> Result<(),std::fmt::Error>
	{
		self.write(f,0)
	}
}

/**
Walk the fields of a configuration object, running the arm whose key matches the field name.
The object name must be among the given names. An unknown field or a non-object value makes the enclosing function return an `IllFormedConfiguration` error.

```ignore
let mut shape=None;
match_object!(arg.cv,"FatTree",value,
	"shape" => shape=Some(value.as_str()?.to_string()),
);
```
**/
#[macro_export]
macro_rules! match_object{
	($cv:expr, $name:literal, $valueid:ident, $($arm:tt)* ) => {{
		$crate::match_object!($cv,[$name],$valueid,$($arm)*)
	}};
	($cv:expr, $names:expr, $valueid:ident, $($arm:tt)* ) => {{
		if let &$crate::config::ConfigurationValue::Object(ref cv_name, ref cv_pairs) = $cv
		{
			if !$names.iter().any(|&x|x==cv_name)
			{
				return Err($crate::error!(ill_formed_configuration,$cv.clone()).with_message(format!("Trying to create either of `{:?}` object from `{}`",$names,cv_name)));
			}
			for &(ref name,ref $valueid) in cv_pairs
			{
				match AsRef::<str>::as_ref(&name)
				{
					$( $arm )*
					"legend_name" => (),
					_ => return Err($crate::error!(ill_formed_configuration,$cv.clone()).with_message(format!("Nothing to do with field {} in {}",name,cv_name))),
				}
			}
		}
		else
		{
			return Err($crate::error!(ill_formed_configuration,$cv.clone()).with_message(format!("Trying to create a {} from a non-Object",$names.get(0).unwrap_or_else(||&"None"))));
		}
	}};
}
