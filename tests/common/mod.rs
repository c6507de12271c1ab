#![allow(dead_code)]
use caminos_routing::*;
use caminos_routing::network::{Network,NetworkBuilderArgument};


/// A `FatTree` object with the given shape, routing modes and adaptive threshold.
pub fn create_fat_tree_topology(shape: &str, routing_alg: ConfigurationValue, adaptive_threshold: f64) -> ConfigurationValue
{
    ConfigurationValue::Object("FatTree".to_string(), vec![
        ("shape".to_string(), ConfigurationValue::Literal(shape.to_string())),
        ("routing_alg".to_string(), routing_alg),
        ("adaptive_threshold".to_string(), ConfigurationValue::Number(adaptive_threshold)),
    ])
}

/// The same routing mode for every virtual network.
pub fn create_routing_mode(mode: &str) -> ConfigurationValue
{
    ConfigurationValue::Literal(mode.to_string())
}

/// One routing mode per virtual network.
pub fn create_routing_modes(modes: &[&str]) -> ConfigurationValue
{
    ConfigurationValue::Array(modes.iter().map(|mode| create_routing_mode(mode)).collect())
}

/// A `Mesh` or `Torus` object. `name` selects which.
pub fn create_mesh_topology(name: &str, shape: &str, width: &str, local_ports: f64) -> ConfigurationValue
{
    ConfigurationValue::Object(name.to_string(), vec![
        ("shape".to_string(), ConfigurationValue::Literal(shape.to_string())),
        ("width".to_string(), ConfigurationValue::Literal(width.to_string())),
        ("local_ports".to_string(), ConfigurationValue::Number(local_ports)),
    ])
}

pub fn create_network(topology: &ConfigurationValue, num_vns: usize) -> Network
{
    match Network::new(NetworkBuilderArgument{ cv: topology, num_vns })
    {
        Ok(network) => network,
        Err(error) => panic!("could not build the network {}:\n{}", topology, error),
    }
}
