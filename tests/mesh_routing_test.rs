/*!
Tests for dimension order routing in meshes and tori, and for their untimed broadcasts.
 */

mod common;
use caminos_routing::*;
use caminos_routing::network::Hop;
use caminos_routing::topology::mesh::{CartesianData,dimension_ports};
use caminos_routing::topology::shape::parse_dimensions;
use common::*;

/// Number of routers the route crosses in each dimension.
fn dimension_distances(sides: &[usize], wraparound: bool, source: usize, destination: usize) -> Vec<usize>
{
    let data = CartesianData::new(sides);
    let source = data.unpack(source);
    let destination = data.unpack(destination);
    sides.iter().enumerate().map(|(dimension, side)| {
        let forward = (destination[dimension] + side - source[dimension]) % side;
        if wraparound { forward.min(side - forward) } else if source[dimension] < destination[dimension] { destination[dimension] - source[dimension] } else { source[dimension] - destination[dimension] }
    }).collect()
}

fn check_all_routes(name: &str, shape: &str, sides: &[usize], width: &str, local_ports: usize)
{
    let cv = create_mesh_topology(name, shape, width, local_ports as f64);
    let network = create_network(&cv, 2);
    let data = CartesianData::new(sides);
    let widths = parse_dimensions(width).unwrap();
    let (port_start, local_port_start) = dimension_ports(&widths);
    let port_dimension = |port: usize| (0..widths.len()).find(|&dimension| port_start[dimension][0] <= port && port < port_start[dimension][1] + widths[dimension]);
    for source in 0..network.num_endpoints()
    {
        for destination in 0..network.num_endpoints()
        {
            let vn = (source * 7 + destination) % 2;
            let hops = network.trace_route(source, destination, vn).unwrap();
            let distance: usize = dimension_distances(sides, name == "Torus", source / local_ports, destination / local_ports).iter().sum();
            assert_eq!(hops.len(), distance + 1, "{} {} from {} to {}", name, shape, source, destination);
            for pair in hops.windows(2)
            {
                assert!(pair[0].routing_dim <= pair[1].routing_dim, "dimension order broken in {:?}", hops);
                assert_eq!(pair[0].out_vc, pair[1].in_vc);
            }
            for hop in hops.iter()
            {
                assert!(vn * 2 <= hop.out_vc && hop.out_vc <= vn * 2 + 1, "virtual channel out of its network in {:?}", hop);
                let at_dateline = data.unpack(hop.router)[hop.routing_dim] == 0;
                let from_network = hop.in_port < local_port_start;
                if at_dateline && from_network && port_dimension(hop.out_port) == Some(hop.routing_dim)
                {
                    assert_eq!(hop.out_vc, hop.in_vc ^ 1, "{} {} crossing coordinate 0 in {:?}", name, shape, hops);
                }
                else
                {
                    assert!(hop.out_vc == hop.in_vc || hop.out_vc == hop.in_vc & !1, "{} {} changed channel in {:?}", name, shape, hops);
                }
            }
            assert_eq!(hops[0].in_vc, vn * 2);
            let last = hops.last().unwrap();
            assert_eq!(network.router(last.router).endpoint_id(last.out_port), Some(destination));
        }
    }
}

#[test]
fn mesh_routes_follow_dimension_order()
{
    check_all_routes("Mesh", "4x3x2", &[4, 3, 2], "2x1x1", 2);
}

#[test]
fn torus_routes_take_the_shortest_side()
{
    check_all_routes("Torus", "5x4", &[5, 4], "1x2", 1);
    check_all_routes("Torus", "3x1x4", &[3, 1, 4], "1x1x1", 1);
}

/// Leaving coordinate 0 through a network port exchanges the virtual channel, inside the pair of the virtual network.
#[test]
fn torus_dateline_exchanges_virtual_channel()
{
    let cv = create_mesh_topology("Torus", "4x4", "1x1", 1.0);
    let network = create_network(&cv, 2);
    //Ports 0,1 are the first dimension, 2,3 the second and 4 the local port.
    let hops = network.trace_route(3, 1, 1).unwrap();
    assert_eq!(hops, vec![
        Hop{ router: 3, in_port: 4, in_vc: 2, out_port: 0, out_vc: 2, routing_dim: 0 },
        Hop{ router: 0, in_port: 1, in_vc: 2, out_port: 0, out_vc: 3, routing_dim: 0 },
        Hop{ router: 1, in_port: 1, in_vc: 3, out_port: 4, out_vc: 3, routing_dim: 0 },
    ]);
    //Starting at coordinate 0 from the local port does not exchange it.
    let hops = network.trace_route(0, 2, 0).unwrap();
    assert!(hops.iter().all(|hop| hop.out_vc == 0));
}

/// Routing again at the same router with the same arguments gives the same port and channel.
#[test]
fn routing_is_repeatable()
{
    let cv = create_mesh_topology("Torus", "4x4", "1x1", 1.0);
    let network = create_network(&cv, 1);
    let router = network.router(0);
    let mut event = router.process_input(RouterEvent::new(None, Destination::Endpoint(5), 0)).unwrap();
    router.route_packet(1, 0, &mut event);
    let first = (event.next_port(), event.vc, event.routing_dim);
    router.route_packet(1, 0, &mut event);
    assert_eq!((event.next_port(), event.vc, event.routing_dim), first);
    assert_eq!(first, (0, 1, 0));
}

fn check_flood(name: &str, shape: &str, sides: &[usize], local_ports: usize)
{
    let width = vec!["1"; sides.len()].join("x");
    let cv = create_mesh_topology(name, shape, &width, local_ports as f64);
    let network = create_network(&cv, 1);
    for source in 0..network.num_endpoints()
    {
        let report = network.flood(source).unwrap();
        let at_root = source / local_ports == 0;
        for (endpoint, &copies) in report.endpoint_deliveries.iter().enumerate()
        {
            let expected = if endpoint == source && at_root { 0 } else { 1 };
            assert_eq!(copies, expected, "{} {} source {} endpoint {}", name, shape, source, endpoint);
        }
        assert!(report.router_visits.iter().all(|&visits| visits == 1), "{:?}", report.router_visits);
        let distance: usize = dimension_distances(sides, name == "Torus", source / local_ports, 0).iter().sum();
        assert_eq!(report.converging_hops, distance);
    }
}

#[test]
fn mesh_broadcast_reaches_everything_once()
{
    check_flood("Mesh", "4x3x2", &[4, 3, 2], 2);
    check_flood("Mesh", "5", &[5], 1);
}

#[test]
fn torus_broadcast_reaches_everything_once()
{
    check_flood("Torus", "3x4", &[3, 4], 1);
}

/// Untimed unicast converges all the way to its destination.
#[test]
fn untimed_unicast_is_delivered()
{
    let cv = create_mesh_topology("Mesh", "4x3x2", "1x1x1", 2.0);
    let network = create_network(&cv, 1);
    let report = network.propagate_untimed(0, Destination::Endpoint(47)).unwrap();
    for (endpoint, &copies) in report.endpoint_deliveries.iter().enumerate()
    {
        assert_eq!(copies, if endpoint == 47 { 1 } else { 0 });
    }
    assert_eq!(report.converging_hops, 3 + 2 + 1 + 1);
    assert_eq!(report.router_visits.iter().sum::<usize>(), 0);
}

#[test]
fn bad_packets_and_configurations_are_rejected()
{
    let cv = create_mesh_topology("Mesh", "4x4", "1x1", 1.0);
    let network = create_network(&cv, 1);
    assert!(network.router(0).process_input(RouterEvent::new(Some(0), Destination::Broadcast, 0)).is_err());
    match network.trace_route(0, 3, 2)
    {
        Err(Error{ kind: ErrorKind::VirtualNetworkOutOfRange{ vn: 2, num_vns: 1 }, .. }) => (),
        other => panic!("out of range virtual network gave {:?}", other.err()),
    }
    match network.router(5).process_untimed_input(RouterEvent::new(Some(5), Destination::Endpoint(16), 0))
    {
        Err(Error{ kind: ErrorKind::DestinationOutOfRange{ destination: 16, num_endpoints: 16 }, .. }) => (),
        other => panic!("out of range destination gave {:?}", other.err()),
    }
    match new_topology(TopologyBuilderArgument{ cv: &cv, router_index: 0, num_ports: 4, num_vns: 1 })
    {
        Err(Error{ kind: ErrorKind::InsufficientPorts{ required: 5, available: 4 }, .. }) => (),
        other => panic!("missing ports gave {:?}", other.err()),
    }
    let cv = create_mesh_topology("Mesh", "4x4", "1x1x1", 1.0);
    assert!(Network::new(NetworkBuilderArgument{ cv: &cv, num_vns: 1 }).is_err());
}
