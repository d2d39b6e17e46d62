/*!
# Headless Step Driver

[`Playback`] owns a graph, the player's origin/destination selection and at most one
running algorithm. It pulls steps either on a timer ([`Pacing::Auto`], via
[`Playback::tick`]) or on demand ([`Playback::advance`]) and folds them into a
[`Presentation`]: a bounded message log plus the path, cycle, spanning tree and
fragmentation a renderer would highlight. Nothing is drawn here.

```
use std::time::{Duration, Instant};
use stepgraphs::{prelude::*, algo::*, driver::*};

let mut graph = Graph::new();
for name in ["Super Earth", "Mars", "Heeth"] {
    graph.add_node(name);
}
graph.add_route("Super Earth", "Mars", 2.0).unwrap();
graph.add_route("Mars", "Heeth", 3.0).unwrap();

let config = PlaybackConfig::default().pacing(Pacing::Auto { delay: Duration::from_millis(10) });
let mut playback = Playback::new(graph, config);
playback.select("Super Earth").unwrap();
playback.select("Heeth").unwrap();
playback.start(Algorithm::Dijkstra).unwrap();

let mut now = Instant::now();
while playback.is_running() {
    playback.tick(now);
    now += Duration::from_millis(10);
}
assert_eq!(playback.presentation().path(), &[0, 1, 2]);
```
*/

use std::{
    collections::VecDeque,
    rc::Rc,
    time::{Duration, Instant},
};

use rand::Rng;
use tracing::{debug, trace};

use crate::{algo::*, prelude::*};

/// When [`Playback::tick`] pulls the next step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pacing {
    /// Pull one step whenever `delay` has elapsed since the previous pull
    Auto { delay: Duration },
    /// Never pull on ticks; steps are pulled by [`Playback::advance`] only
    Manual,
}

impl Default for Pacing {
    fn default() -> Self {
        Pacing::Auto {
            delay: Duration::from_millis(400),
        }
    }
}

/// Configuration of a [`Playback`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackConfig {
    pacing: Pacing,
    message_capacity: usize,
    frontier: Frontier,
    fragment_display: Duration,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            pacing: Pacing::default(),
            message_capacity: 5,
            frontier: Frontier::default(),
            fragment_display: Duration::from_secs(5),
        }
    }
}

impl PlaybackConfig {
    /// Whether steps are pulled on a timer or one by one
    pub fn set_pacing(&mut self, pacing: Pacing) {
        self.pacing = pacing;
    }

    /// Whether steps are pulled on a timer or one by one
    pub fn pacing(mut self, pacing: Pacing) -> Self {
        self.set_pacing(pacing);
        self
    }

    /// Number of messages kept in the log; older ones are dropped first
    pub fn set_message_capacity(&mut self, capacity: usize) {
        self.message_capacity = capacity;
    }

    /// Number of messages kept in the log
    pub fn message_capacity(mut self, capacity: usize) -> Self {
        self.set_message_capacity(capacity);
        self
    }

    /// Frontier strategy used for Dijkstra and Prim
    pub fn set_frontier(&mut self, frontier: Frontier) {
        self.frontier = frontier;
    }

    /// Frontier strategy used for Dijkstra and Prim
    pub fn frontier(mut self, frontier: Frontier) -> Self {
        self.set_frontier(frontier);
        self
    }

    /// How long the components of a fragmented network stay highlighted
    pub fn set_fragment_display(&mut self, duration: Duration) {
        self.fragment_display = duration;
    }

    /// How long the components of a fragmented network stay highlighted
    pub fn fragment_display(mut self, duration: Duration) -> Self {
        self.set_fragment_display(duration);
        self
    }
}

/// Everything a renderer needs to highlight, folded from the steps pulled so far
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Presentation {
    messages: VecDeque<String>,
    focus: Option<Node>,
    path: Vec<Node>,
    cycle: Vec<Node>,
    tree: Vec<Edge>,
    fragments: Option<Vec<Vec<Node>>>,
    critical_routes: Vec<Edge>,
}

impl Presentation {
    /// Returns the message log, oldest first
    pub fn messages(&self) -> impl Iterator<Item = &str> + '_ {
        self.messages.iter().map(String::as_str)
    }

    /// Node the last step was about
    pub fn focus(&self) -> Option<Node> {
        self.focus
    }

    /// Final shortest path of the last path search
    pub fn path(&self) -> &[Node] {
        &self.path
    }

    /// Cycle found by the last cycle detection
    pub fn cycle(&self) -> &[Node] {
        &self.cycle
    }

    /// Spanning tree edges, growing while Prim runs
    pub fn tree(&self) -> &[Edge] {
        &self.tree
    }

    /// Components after the last route destruction that fragmented the network
    pub fn fragments(&self) -> Option<&[Vec<Node>]> {
        self.fragments.as_deref()
    }

    /// Routes whose destruction would fragment the network
    pub fn critical_routes(&self) -> &[Edge] {
        &self.critical_routes
    }

    fn say(&mut self, capacity: usize, message: String) {
        debug!(%message, "message");
        self.messages.push_back(message);
        while self.messages.len() > capacity {
            self.messages.pop_front();
        }
    }

    fn clear_highlights(&mut self) {
        self.focus = None;
        self.path.clear();
        self.cycle.clear();
        self.tree.clear();
    }
}

/// Drives at most one stepwise algorithm over an owned graph.
pub struct Playback {
    graph: Rc<Graph>,
    config: PlaybackConfig,
    origin: Option<Node>,
    destination: Option<Node>,
    active: Option<(Algorithm, Box<dyn StepSequence>)>,
    last_pull: Option<Instant>,
    fragments_until: Option<Instant>,
    presentation: Presentation,
}

impl Playback {
    pub fn new(graph: Graph, config: PlaybackConfig) -> Self {
        let mut playback = Self {
            graph: Rc::new(Graph::new()),
            config,
            origin: None,
            destination: None,
            active: None,
            last_pull: None,
            fragments_until: None,
            presentation: Presentation::default(),
        };
        playback.load(graph);
        playback
    }

    /// Replaces the graph (e.g. when switching levels).
    /// Discards the running algorithm, the selection and all highlights; keeps messages.
    pub fn load(&mut self, graph: Graph) {
        debug!(
            nodes = graph.number_of_nodes(),
            routes = graph.number_of_routes(),
            "graph loaded"
        );

        self.active = None;
        self.graph = Rc::new(graph);
        self.origin = None;
        self.destination = None;
        self.fragments_until = None;
        self.presentation.clear_highlights();
        self.presentation.fragments = None;
        self.presentation.critical_routes = self.graph.compute_bridges();
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    pub fn presentation(&self) -> &Presentation {
        &self.presentation
    }

    pub fn origin(&self) -> Option<Node> {
        self.origin
    }

    pub fn destination(&self) -> Option<Node> {
        self.destination
    }

    /// Selects the planet called `name`, the way clicks work: the first click (or any click
    /// after both ends are chosen) selects the origin and clears the destination, the
    /// second one selects the destination.
    pub fn select(&mut self, name: &str) -> Result<Node, GraphError> {
        let u = self.graph.node_id(name)?;

        if self.origin.is_none() || self.destination.is_some() {
            self.origin = Some(u);
            self.destination = None;
            self.say(format!("Origin: {name}"));
        } else {
            self.destination = Some(u);
            self.say(format!("Destination: {name}"));
        }

        Ok(u)
    }

    /// Starts `algorithm` with the current selection, discarding any running algorithm.
    /// Fails with [`GraphError::MissingSelection`] if the algorithm needs a selection that
    /// was not made; the reason is also logged as message.
    pub fn start(&mut self, algorithm: Algorithm) -> Result<(), GraphError> {
        self.active = None;
        self.presentation.clear_highlights();

        let steps = match algorithm.start(
            Rc::clone(&self.graph),
            self.origin,
            self.destination,
            self.config.frontier,
        ) {
            Ok(steps) => steps,
            Err(err) => {
                self.say(err.to_string());
                return Err(err);
            }
        };

        debug!(%algorithm, origin = ?self.origin, destination = ?self.destination, "algorithm started");
        self.active = Some((algorithm, steps));
        self.last_pull = None;
        Ok(())
    }

    /// Abandons the running algorithm, if any
    pub fn stop(&mut self) {
        if let Some((algorithm, _)) = self.active.take() {
            debug!(%algorithm, "algorithm stopped");
        }
    }

    /// Returns *true* while an algorithm has steps left
    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    /// Returns the running algorithm
    pub fn running(&self) -> Option<Algorithm> {
        self.active.as_ref().map(|(algorithm, _)| *algorithm)
    }

    /// Pulls the next step of the running algorithm regardless of pacing and folds it
    /// into the presentation. The algorithm is released after its terminal step.
    pub fn advance(&mut self) -> Option<Step> {
        let (algorithm, steps) = self.active.as_mut()?;
        let algorithm = *algorithm;

        let Some(step) = steps.next() else {
            self.active = None;
            return None;
        };
        trace!(%algorithm, ?step, "step");

        if step.is_terminal() {
            self.active = None;
        }
        self.fold(&step);
        Some(step)
    }

    /// Advances time to `now`: expires the fragmentation highlight and, under
    /// [`Pacing::Auto`], pulls a step once the delay has elapsed since the previous pull.
    pub fn tick(&mut self, now: Instant) -> Option<Step> {
        if self.fragments_until.is_some_and(|until| now >= until) {
            self.fragments_until = None;
            self.presentation.fragments = None;
        }

        let Pacing::Auto { delay } = self.config.pacing else {
            return None;
        };
        if !self.is_running()
            || self
                .last_pull
                .is_some_and(|last| now.saturating_duration_since(last) < delay)
        {
            return None;
        }

        self.last_pull = Some(now);
        self.advance()
    }

    /// Destroys a random active route and reports the damage.
    /// Returns `Ok(None)` if no route is left and fails with [`GraphError::RunInProgress`]
    /// while an algorithm is running.
    pub fn remove_random_route<R>(
        &mut self,
        rng: &mut R,
        now: Instant,
    ) -> Result<Option<Fragmentation>, GraphError>
    where
        R: Rng + ?Sized,
    {
        if self.is_running() {
            return Err(GraphError::RunInProgress);
        }
        let graph = Rc::get_mut(&mut self.graph).ok_or(GraphError::RunInProgress)?;

        let Some(report) = graph.remove_random_route(rng) else {
            self.say("No vulnerable route left.".to_string());
            return Ok(None);
        };

        let Edge(u, v) = report.route;
        self.say(format!(
            "Route {} <-> {} destroyed!",
            self.graph.name_of(u),
            self.graph.name_of(v)
        ));

        if report.is_fragmented() {
            self.say(format!(
                "ALERT: sector fragmented into {} regions!",
                report.components.len()
            ));
            self.presentation.fragments = Some(report.components.clone());
            self.fragments_until = Some(now + self.config.fragment_display);
        }
        self.presentation.critical_routes = self.graph.compute_bridges();

        Ok(Some(report))
    }

    fn say(&mut self, message: String) {
        self.presentation
            .say(self.config.message_capacity, message);
    }

    fn fold(&mut self, step: &Step) {
        self.presentation.focus = step.focus();

        match step {
            Step::Notice(notice) => {
                let message = notice.render(&self.graph);
                self.say(message);
            }
            Step::MstAdd { tree, .. } => self.presentation.tree = tree.clone(),
            Step::Finished(Outcome::ShortestPath { path, cost }) => {
                self.presentation.path = path.clone();
                if !path.is_empty() {
                    self.say(format!(
                        "Final route: {} planets. Cost: {cost:.1}",
                        path.len()
                    ));
                } else if let Some(destination) = self.destination {
                    let message = format!("No route to {} exists.", self.graph.name_of(destination));
                    self.say(message);
                }
            }
            Step::Finished(Outcome::NegativeCycle) => self.say(
                "CRITICAL ERROR: negative-weight cycle detected! The system is unstable."
                    .to_string(),
            ),
            Step::Finished(Outcome::Cycle(Some(cycle))) => {
                self.presentation.cycle = cycle.clone();
            }
            Step::Finished(Outcome::SpanningTree { edges, cost }) => {
                self.presentation.tree = edges.clone();
                self.say(format!("Supply network complete. Total cost: {cost:.1}"));
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{diamond, directed_triangle};
    use itertools::Itertools;
    use rand::SeedableRng;
    use rand_pcg::Pcg64Mcg;

    fn manual(graph: Graph) -> Playback {
        Playback::new(graph, PlaybackConfig::default().pacing(Pacing::Manual))
    }

    fn drain(playback: &mut Playback) -> usize {
        std::iter::from_fn(|| playback.advance()).count()
    }

    #[test]
    fn selection_follows_clicks() {
        let mut playback = manual(diamond());

        assert_eq!(playback.select("B"), Ok(1));
        assert_eq!((playback.origin(), playback.destination()), (Some(1), None));
        assert_eq!(playback.select("D"), Ok(3));
        assert_eq!((playback.origin(), playback.destination()), (Some(1), Some(3)));
        assert_eq!(playback.select("A"), Ok(0));
        assert_eq!((playback.origin(), playback.destination()), (Some(0), None));

        assert_eq!(
            playback.select("Cyberstan"),
            Err(GraphError::UnknownNode("Cyberstan".into()))
        );
        assert_eq!(
            playback.presentation().messages().collect_vec(),
            vec!["Origin: B", "Destination: D", "Origin: A"]
        );
    }

    #[test]
    fn missing_selection_is_reported() {
        let mut playback = manual(diamond());
        playback.select("A").unwrap();

        assert!(matches!(
            playback.start(Algorithm::BellmanFord),
            Err(GraphError::MissingSelection { .. })
        ));
        assert!(!playback.is_running());
        assert_eq!(
            playback.presentation().messages().last(),
            Some("Bellman-Ford needs a selected destination")
        );
    }

    #[test]
    fn dijkstra_folds_into_path() {
        let mut playback = manual(diamond());
        playback.select("A").unwrap();
        playback.select("D").unwrap();
        playback.start(Algorithm::Dijkstra).unwrap();

        assert_eq!(playback.running(), Some(Algorithm::Dijkstra));
        assert!(drain(&mut playback) > 2);
        assert!(!playback.is_running());
        assert_eq!(playback.presentation().path(), &[0, 1, 2, 3]);
        assert_eq!(
            playback.presentation().messages().last(),
            Some("Final route: 4 planets. Cost: 4.0")
        );
        assert_eq!(playback.advance(), None);
    }

    #[test]
    fn unreachable_destination_is_reported() {
        let mut playback = manual(Graph::from_edges(3, [(0, 1, 1.0)], true));
        playback.select("0").unwrap();
        playback.select("2").unwrap();
        playback.start(Algorithm::Dijkstra).unwrap();
        drain(&mut playback);

        assert!(playback.presentation().path().is_empty());
        assert_eq!(
            playback.presentation().messages().last(),
            Some("No route to 2 exists.")
        );
    }

    #[test]
    fn prim_tree_grows_stepwise() {
        let mut playback = manual(diamond());
        playback.select("A").unwrap();
        playback.start(Algorithm::Prim).unwrap();

        let mut sizes = Vec::new();
        while let Some(step) = playback.advance() {
            if let Step::MstAdd { .. } = step {
                sizes.push(playback.presentation().tree().len());
            }
        }

        assert_eq!(sizes, vec![1, 2, 3]);
        assert_eq!(
            playback.presentation().tree(),
            &[Edge(0, 1), Edge(1, 2), Edge(2, 3)]
        );
    }

    #[test]
    fn cycle_and_negative_cycle() {
        let mut playback = manual(directed_triangle());
        playback.start(Algorithm::CycleDetection).unwrap();
        drain(&mut playback);
        assert_eq!(playback.presentation().cycle(), &[0, 1, 2]);

        let mut graph = Graph::from_edges(2, [(0, 1, -1.0)], true);
        graph.planet_mut(0).in_mission = false;
        playback.load(graph);
        assert!(playback.presentation().cycle().is_empty());

        playback.select("0").unwrap();
        playback.select("1").unwrap();
        playback.start(Algorithm::BellmanFord).unwrap();
        drain(&mut playback);
        assert!(
            playback
                .presentation()
                .messages()
                .last()
                .is_some_and(|m| m.starts_with("CRITICAL ERROR"))
        );
    }

    #[test]
    fn auto_pacing_respects_delay() {
        let delay = Duration::from_millis(100);
        let mut playback = Playback::new(
            diamond(),
            PlaybackConfig::default().pacing(Pacing::Auto { delay }),
        );
        playback.select("A").unwrap();
        playback.start(Algorithm::Bfs).unwrap();

        let t0 = Instant::now();
        assert!(playback.tick(t0).is_some());
        assert!(playback.tick(t0 + delay / 2).is_none());
        assert!(playback.tick(t0 + delay).is_some());
        assert!(playback.tick(t0 + delay).is_none());

        let mut now = t0 + delay;
        let mut pulled = 2;
        while playback.is_running() {
            now += delay;
            pulled += usize::from(playback.tick(now).is_some());
        }
        assert_eq!(pulled, diamond().bfs_steps(0).count());
    }

    #[test]
    fn manual_pacing_ignores_ticks() {
        let mut playback = manual(diamond());
        playback.start(Algorithm::CycleDetection).unwrap();

        assert!(playback.tick(Instant::now()).is_none());
        assert!(playback.advance().is_some());
        playback.stop();
        assert!(!playback.is_running());
        assert!(playback.advance().is_none());
    }

    #[test]
    fn message_log_is_bounded() {
        let mut playback = Playback::new(
            diamond(),
            PlaybackConfig::default()
                .pacing(Pacing::Manual)
                .message_capacity(2),
        );
        for name in ["A", "B", "C", "D"] {
            playback.select(name).unwrap();
        }

        assert_eq!(
            playback.presentation().messages().collect_vec(),
            vec!["Origin: C", "Destination: D"]
        );
    }

    #[test]
    fn routes_cannot_change_mid_run() {
        let rng = &mut Pcg64Mcg::seed_from_u64(2);
        let mut playback = manual(diamond());
        playback.start(Algorithm::CycleDetection).unwrap();

        assert_eq!(
            playback.remove_random_route(rng, Instant::now()),
            Err(GraphError::RunInProgress)
        );
        assert_eq!(playback.graph().number_of_active_edges(), 8);

        drain(&mut playback);
        assert!(playback.remove_random_route(rng, Instant::now()).is_ok());
        assert_eq!(playback.graph().number_of_active_edges(), 6);
    }

    #[test]
    fn fragmentation_is_highlighted_for_a_while() {
        let rng = &mut Pcg64Mcg::seed_from_u64(4);
        let mut playback = manual(Graph::from_edges(3, [(0, 1, 1.0), (1, 2, 1.0)], true));
        assert_eq!(playback.presentation().critical_routes().len(), 2);

        let t0 = Instant::now();
        let report = playback.remove_random_route(rng, t0).unwrap().unwrap();
        assert!(report.is_fragmented());
        assert_eq!(playback.presentation().fragments().map(<[_]>::len), Some(2));
        assert_eq!(playback.presentation().critical_routes().len(), 1);
        assert!(
            playback
                .presentation()
                .messages()
                .any(|m| m == "ALERT: sector fragmented into 2 regions!")
        );

        playback.tick(t0 + Duration::from_secs(1));
        assert!(playback.presentation().fragments().is_some());
        playback.tick(t0 + Duration::from_secs(5));
        assert!(playback.presentation().fragments().is_none());

        playback.remove_random_route(rng, t0).unwrap();
        assert_eq!(playback.remove_random_route(rng, t0), Ok(None));
        assert_eq!(
            playback.presentation().messages().last(),
            Some("No vulnerable route left.")
        );
    }
}
