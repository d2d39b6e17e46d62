use fxhash::FxHashMap;
use rand::{Rng, seq::IndexedRandom};
use tracing::debug;

use crate::error::GraphError;

use super::*;

/// Adjacency-list graph of named planets and weighted, deactivatable edge records.
///
/// The `i`-th call to [`Graph::add_node`] with a new name registers node `i`.
/// Edges can only be added between registered planets; they are never removed, only
/// deactivated.
///
/// # Examples
/// ```
/// use stepgraphs::prelude::*;
///
/// let mut graph = Graph::new();
/// let a = graph.add_node("Super Earth");
/// let b = graph.add_node("Mars");
/// graph.add_route("Super Earth", "Mars", 2.0).unwrap();
///
/// assert_eq!(graph.neighbors_of(a).collect::<Vec<_>>(), vec![(b, 2.0)]);
/// assert_eq!(graph.number_of_edges(), 2);
///
/// assert_eq!(graph.deactivate_edge(b, a), Some(Edge(b, a)));
/// assert_eq!(graph.neighbors_of(a).count(), 0);
/// assert_eq!(graph.number_of_edges(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Graph {
    planets: Vec<Planet>,
    index: FxHashMap<String, Node>,
    adjacency: Vec<Vec<EdgeRecord>>,
    /// Positions `(tail, offset)` of the records of every route
    routes: Vec<Vec<(Node, usize)>>,
    num_edges: NumEdges,
}

impl Graph {
    /// Creates an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a graph with nodes `0..n` named after their index and one route per
    /// `(u, v, weight)`.
    ///
    /// # Panics
    /// Panics if an endpoint is not in `0..n`.
    pub fn from_edges<I>(n: NumNodes, edges: I, bidirectional: bool) -> Self
    where
        I: IntoIterator<Item = (Node, Node, Weight)>,
    {
        let mut graph = Self::new();
        for u in 0..n {
            graph.add_node(u.to_string());
        }

        for (u, v, weight) in edges {
            assert!(u < n && v < n, "Edge ({u},{v}) leaves 0..{n}");
            graph.push_route(u, v, weight, bidirectional);
        }

        graph
    }

    /// Registers a planet and returns its node.
    /// If a planet with the same name exists, nothing changes and its node is returned.
    pub fn add_node(&mut self, planet: impl Into<Planet>) -> Node {
        let planet = planet.into();
        if let Some(&u) = self.index.get(planet.name()) {
            return u;
        }

        let u = self.planets.len() as Node;
        self.index.insert(planet.name().to_string(), u);
        self.planets.push(planet);
        self.adjacency.push(Vec::new());
        u
    }

    /// Adds a route between the planets named `u` and `v`.
    ///
    /// If `bidirectional`, two independent records `u -> v` and `v -> u` are created,
    /// otherwise a single directed record `u -> v`. Both endpoints must be registered;
    /// otherwise nothing is added and [`GraphError::InvalidReference`] is returned.
    pub fn add_edge(
        &mut self,
        u: &str,
        v: &str,
        weight: Weight,
        bidirectional: bool,
    ) -> Result<RouteId, GraphError> {
        let resolve = |name: &str| {
            self.index
                .get(name)
                .copied()
                .ok_or_else(|| GraphError::InvalidReference(name.to_string()))
        };

        let u = resolve(u)?;
        let v = resolve(v)?;
        Ok(self.push_route(u, v, weight, bidirectional))
    }

    /// Adds an undirected route, see [`Graph::add_edge`]
    pub fn add_route(&mut self, u: &str, v: &str, weight: Weight) -> Result<RouteId, GraphError> {
        self.add_edge(u, v, weight, true)
    }

    /// Adds a directed route, see [`Graph::add_edge`]
    pub fn add_directed_route(
        &mut self,
        u: &str,
        v: &str,
        weight: Weight,
    ) -> Result<RouteId, GraphError> {
        self.add_edge(u, v, weight, false)
    }

    /// Like [`Graph::add_edge`] but with node indices as endpoints
    pub fn connect(
        &mut self,
        u: Node,
        v: Node,
        weight: Weight,
        bidirectional: bool,
    ) -> Result<RouteId, GraphError> {
        for x in [u, v] {
            if x >= self.number_of_nodes() {
                return Err(GraphError::InvalidReference(format!("#{x}")));
            }
        }

        Ok(self.push_route(u, v, weight, bidirectional))
    }

    fn push_route(&mut self, u: Node, v: Node, weight: Weight, bidirectional: bool) -> RouteId {
        let route = self.routes.len() as RouteId;
        let mut positions = Vec::with_capacity(2);

        positions.push(self.push_record(u, v, weight, !bidirectional, route));
        if bidirectional {
            positions.push(self.push_record(v, u, weight, false, route));
        }

        self.routes.push(positions);
        route
    }

    fn push_record(
        &mut self,
        from: Node,
        to: Node,
        weight: Weight,
        directed: bool,
        route: RouteId,
    ) -> (Node, usize) {
        let list = &mut self.adjacency[from as usize];
        list.push(EdgeRecord {
            from,
            to,
            weight,
            active: true,
            directed,
            route,
        });
        self.num_edges += 1;
        (from, list.len() - 1)
    }

    /// Deactivates a record chosen uniformly at random among all active records.
    /// If the record is half of an undirected route, its reverse record is deactivated
    /// as well.
    ///
    /// Returns the endpoints of the chosen record or `None` if no record is active.
    pub fn deactivate_random_edge<R>(&mut self, rng: &mut R) -> Option<Edge>
    where
        R: Rng + ?Sized,
    {
        let candidates: Vec<(Edge, RouteId)> = self
            .edge_records()
            .filter(|record| record.active)
            .map(|record| (record.endpoints(), record.route))
            .collect();

        let &(edge, route) = candidates.choose(rng)?;
        self.deactivate_route(route);
        Some(edge)
    }

    /// Deactivates the first active record `u -> v` together with its route.
    /// Returns `None` if there is no such record.
    pub fn deactivate_edge(&mut self, u: Node, v: Node) -> Option<Edge> {
        let route = self
            .out_records(u)
            .iter()
            .find(|record| record.active && record.to == v)?
            .route;

        self.deactivate_route(route);
        Some(Edge(u, v))
    }

    fn deactivate_route(&mut self, route: RouteId) {
        for &(tail, offset) in &self.routes[route as usize] {
            self.adjacency[tail as usize][offset].active = false;
        }

        debug!(route, "route deactivated");
    }

    /// Returns the node of the planet called `name`
    pub fn node_id(&self, name: &str) -> Result<Node, GraphError> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| GraphError::UnknownNode(name.to_string()))
    }

    /// Returns the name of node `u`.
    /// ** Panics if `u >= n` **
    pub fn name_of(&self, u: Node) -> &str {
        self.planets[u as usize].name()
    }

    /// Returns the planet of node `u`.
    /// ** Panics if `u >= n` **
    pub fn planet(&self, u: Node) -> &Planet {
        &self.planets[u as usize]
    }

    /// Returns the planet of node `u` for updating its cosmetic attributes
    /// ** Panics if `u >= n` **
    pub fn planet_mut(&mut self, u: Node) -> &mut Planet {
        &mut self.planets[u as usize]
    }

    /// Returns all planets in registration order
    pub fn planets(&self) -> impl Iterator<Item = &Planet> + '_ {
        self.planets.iter()
    }

    /// Returns the number of routes (a bidirectional route counts once)
    pub fn number_of_routes(&self) -> NumEdges {
        self.routes.len() as NumEdges
    }
}

impl GraphNodeOrder for Graph {
    fn number_of_nodes(&self) -> NumNodes {
        self.planets.len() as NumNodes
    }
}

impl GraphEdgeOrder for Graph {
    fn number_of_edges(&self) -> NumEdges {
        self.num_edges
    }
}

impl WeightedAdjacencyList for Graph {
    fn out_records(&self, u: Node) -> &[EdgeRecord] {
        &self.adjacency[u as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use itertools::Itertools;
    use rand::SeedableRng;
    use rand_pcg::Pcg64Mcg;

    fn path_graph(bidirectional: bool) -> Graph {
        let mut graph = Graph::new();
        for name in ["A", "B", "C"] {
            graph.add_node(name);
        }
        graph.add_edge("A", "B", 1.0, bidirectional).unwrap();
        graph.add_edge("B", "C", 2.0, bidirectional).unwrap();
        graph
    }

    #[test]
    fn add_node_is_idempotent() {
        let mut graph = Graph::new();
        assert_eq!(graph.add_node(Planet::new("Mars", "Alliance", (640, 615))), 0);
        assert_eq!(graph.add_node("Heeth"), 1);
        assert_eq!(graph.add_node("Mars"), 0);

        assert_eq!(graph.number_of_nodes(), 2);
        assert_eq!(graph.planet(0).faction, "Alliance");
        assert_eq!(graph.node_id("Heeth"), Ok(1));
        assert_eq!(graph.name_of(1), "Heeth");
    }

    #[test]
    fn cosmetic_updates_keep_names_unique() {
        let mut graph = Graph::new();
        graph.add_node(Planet::new("Mars", "Alliance", (640, 615)));
        graph.add_node("Heeth");

        let mars = graph.planet_mut(0);
        mars.faction = "Automatons".to_string();
        mars.position = (10, 20);
        mars.liberation = 40;
        mars.in_mission = false;

        assert_eq!(graph.planet(0).name(), "Mars");
        assert_eq!(graph.node_id("Mars"), Ok(0));
        assert_eq!(graph.add_node("Mars"), 0);
        assert_eq!(graph.number_of_nodes(), 2);
        assert_eq!(graph.planets().map(Planet::name).collect::<Vec<_>>(), vec!["Mars", "Heeth"]);
    }

    #[test]
    fn unknown_endpoints_are_rejected() {
        let mut graph = path_graph(true);
        let before = graph.number_of_edges();

        assert_eq!(
            graph.add_route("A", "Hellmire", 1.0),
            Err(GraphError::InvalidReference("Hellmire".into()))
        );
        assert_eq!(
            graph.add_directed_route("Vandalon IV", "A", 1.0),
            Err(GraphError::InvalidReference("Vandalon IV".into()))
        );
        assert_eq!(
            graph.connect(0, 7, 1.0, false),
            Err(GraphError::InvalidReference("#7".into()))
        );
        assert_eq!(graph.number_of_edges(), before);
        assert_eq!(
            graph.node_id("Hellmire"),
            Err(GraphError::UnknownNode("Hellmire".into()))
        );
    }

    #[test]
    fn bidirectional_routes_create_two_records() {
        let graph = path_graph(true);

        assert_eq!(graph.number_of_edges(), 4);
        assert_eq!(graph.number_of_routes(), 2);
        assert_eq!(graph.neighbors_of(1).collect_vec(), vec![(0, 1.0), (2, 2.0)]);
        assert!(graph.edge_records().all(|record| !record.directed));

        let graph = path_graph(false);
        assert_eq!(graph.number_of_edges(), 2);
        assert_eq!(graph.neighbors_of(1).collect_vec(), vec![(2, 2.0)]);
        assert!(graph.edge_records().all(|record| record.directed));
    }

    #[test]
    fn edge_records_in_node_then_insertion_order() {
        let graph = path_graph(true);
        let order = graph
            .edge_records()
            .map(|record| record.endpoints())
            .collect_vec();
        assert_eq!(order, vec![Edge(0, 1), Edge(1, 0), Edge(1, 2), Edge(2, 1)]);
    }

    #[test]
    fn deactivation_severs_both_directions() {
        let mut graph = path_graph(true);

        assert_eq!(graph.deactivate_edge(2, 1), Some(Edge(2, 1)));
        assert_eq!(graph.neighbors_of(1).collect_vec(), vec![(0, 1.0)]);
        assert_eq!(graph.neighbors_of(2).count(), 0);
        assert_eq!(graph.number_of_edges(), 4);
        assert_eq!(graph.number_of_active_edges(), 2);

        assert_eq!(graph.deactivate_edge(2, 1), None);
    }

    #[test]
    fn directed_deactivation_keeps_reverse_route() {
        let mut graph = path_graph(false);
        graph.add_directed_route("B", "A", 5.0).unwrap();

        assert_eq!(graph.deactivate_edge(0, 1), Some(Edge(0, 1)));
        assert_eq!(graph.neighbors_of(1).collect_vec(), vec![(2, 2.0), (0, 5.0)]);
    }

    #[test]
    fn random_deactivation_drains_all_routes() {
        let rng = &mut Pcg64Mcg::seed_from_u64(3);

        for bidirectional in [false, true] {
            let mut graph = Graph::from_edges(
                6,
                [(0, 1, 1.0), (1, 2, 1.0), (2, 3, 1.0), (3, 4, 1.0), (4, 5, 1.0), (5, 0, 1.0)],
                bidirectional,
            );
            let mut removed = Vec::new();

            while let Some(edge) = graph.deactivate_random_edge(rng) {
                removed.push(edge.normalized());
                let per_route = if bidirectional { 2 } else { 1 };
                assert_eq!(
                    graph.number_of_active_edges(),
                    graph.number_of_edges() - per_route * removed.len() as NumEdges
                );
            }

            removed.sort();
            assert_eq!(removed.len(), 6);
            assert!(removed.iter().tuple_windows().all(|(a, b)| a != b));
            assert_eq!(graph.deactivate_random_edge(rng), None);
        }
    }

    #[test]
    fn empty_graph() {
        let mut graph = Graph::new();
        assert!(graph.is_empty());
        assert!(graph.is_singleton());
        assert_eq!(graph.edge_records().count(), 0);
        assert_eq!(graph.deactivate_random_edge(&mut Pcg64Mcg::seed_from_u64(1)), None);
    }
}
