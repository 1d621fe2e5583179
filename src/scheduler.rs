//! Live arc paths and the timer that spawns new ones

use crate::cities::Route;
use crate::path::{ArcPath, PathId};
use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

pub const DEFAULT_MAX_PATHS: usize = 12;
pub const DEFAULT_SPAWN_INTERVAL: Duration = Duration::from_millis(200);

/// Owns every live path. Paths report their own disposal over a channel,
/// which is drained after each tick so nothing is removed mid-iteration.
pub struct PathRegistry {
    paths: HashMap<PathId, ArcPath>,
    max_paths: usize,
    radius: f64,
    next_id: u64,
    disposed_tx: Sender<PathId>,
    disposed_rx: Receiver<PathId>,
}

impl PathRegistry {
    pub fn new(max_paths: usize, radius: f64) -> Self {
        let (disposed_tx, disposed_rx) = mpsc::channel();
        Self {
            paths: HashMap::new(),
            max_paths,
            radius,
            next_id: 0,
            disposed_tx,
            disposed_rx,
        }
    }

    pub fn max_paths(&self) -> usize {
        self.max_paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.paths.len() >= self.max_paths
    }

    pub fn contains_label(&self, label: &str) -> bool {
        self.paths.values().any(|p| p.label() == label)
    }

    /// Build and register a path for `route`.
    ///
    /// Returns `None` when the registry is full or a path with the same label
    /// is already live.
    pub fn insert(&mut self, route: Route) -> Option<PathId> {
        if self.is_full() || self.contains_label(&route.label) {
            return None;
        }

        self.next_id += 1;
        let id = PathId(self.next_id);
        let tx = self.disposed_tx.clone();
        let path = ArcPath::new(id, route, self.radius).on_dispose(move |id| {
            let _ = tx.send(id);
        });

        debug!(%id, label = path.label(), live = self.paths.len() + 1, "path spawned");
        self.paths.insert(id, path);
        Some(id)
    }

    pub fn get(&self, id: PathId) -> Option<&ArcPath> {
        self.paths.get(&id)
    }

    pub fn get_mut(&mut self, id: PathId) -> Option<&mut ArcPath> {
        self.paths.get_mut(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ArcPath> {
        self.paths.values()
    }

    /// Advance every path one frame, then drop the ones that finished.
    /// Returns the ids removed this tick.
    pub fn tick_all(&mut self) -> Vec<PathId> {
        for path in self.paths.values_mut() {
            path.tick();
        }

        let removed: Vec<PathId> = self.disposed_rx.try_iter().collect();
        for id in &removed {
            if let Some(path) = self.paths.remove(id) {
                debug!(%id, label = path.label(), live = self.paths.len(), "path disposed");
            }
        }
        removed
    }

    /// Drop every path without running its animation out
    pub fn clear(&mut self) {
        self.paths.clear();
        while self.disposed_rx.try_recv().is_ok() {}
    }
}

/// Walks the route pool on a fixed interval, independent of the frame rate
pub struct PathScheduler {
    routes: Vec<Route>,
    cursor: usize,
    interval: Duration,
    next_due: Option<Instant>,
    stopped: bool,
}

impl PathScheduler {
    pub fn new(routes: Vec<Route>, interval: Duration) -> Self {
        Self {
            routes,
            cursor: 0,
            interval,
            next_due: None,
            stopped: false,
        }
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Try the route under the cursor, then move the cursor on
    pub fn spawn_next(&mut self, registry: &mut PathRegistry) -> Option<PathId> {
        if self.routes.is_empty() {
            return None;
        }

        let route = &self.routes[self.cursor];
        self.cursor = (self.cursor + 1) % self.routes.len();

        if registry.is_full() {
            return None;
        }
        if registry.contains_label(&route.label) {
            trace!(label = %route.label, "route already live, skipped");
            return None;
        }
        registry.insert(route.clone())
    }

    /// Fire at most once when the interval has elapsed by `now`. The first
    /// poll only arms the timer. Intervals missed during a stall are dropped
    /// and the timer is re-armed from `now`.
    pub fn poll(&mut self, now: Instant, registry: &mut PathRegistry) -> Option<PathId> {
        if self.stopped {
            return None;
        }

        let Some(due) = self.next_due else {
            self.next_due = Some(now + self.interval);
            return None;
        };
        if due > now {
            return None;
        }

        let next = due + self.interval;
        self.next_due = Some(if next > now { next } else { now + self.interval });
        self.spawn_next(registry)
    }

    pub fn stop(&mut self) {
        if !self.stopped {
            debug!(cursor = self.cursor, "path scheduler stopped");
        }
        self.stopped = true;
        self.next_due = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cities::{builtin_cities, City};
    use crate::path::PathPhase;

    fn route(a: &str, b: &str) -> Route {
        let city = |name: &str, lat: f64, long: f64| City {
            city: name.into(),
            country: "C".into(),
            lat,
            long,
        };
        Route::new(city(a, 10.0, 20.0), city(b, -30.0, 100.0))
    }

    fn routes(n: usize) -> Vec<Route> {
        let cities = builtin_cities();
        (0..n)
            .map(|i| Route::new(cities[i].clone(), cities[i + 1].clone()))
            .collect()
    }

    #[test]
    fn registry_refuses_when_full() {
        let mut registry = PathRegistry::new(2, 1.0);
        assert!(registry.insert(route("A", "B")).is_some());
        assert!(registry.insert(route("C", "D")).is_some());
        assert!(registry.is_full());
        assert!(registry.insert(route("E", "F")).is_none());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn registry_refuses_duplicate_labels() {
        let mut registry = PathRegistry::new(5, 1.0);
        let first = registry.insert(route("A", "B"));
        assert!(first.is_some());
        assert!(registry.insert(route("A", "B")).is_none());
        assert!(registry.insert(route("B", "A")).is_some());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn ids_are_unique() {
        let mut registry = PathRegistry::new(10, 1.0);
        let ids: Vec<PathId> = routes(5)
            .into_iter()
            .filter_map(|r| registry.insert(r))
            .collect();
        let mut sorted = ids.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), 5);
    }

    #[test]
    fn disposed_paths_leave_registry() {
        let mut registry = PathRegistry::new(3, 1.0);
        let id = registry.insert(route("A", "B")).unwrap();

        let mut removed = Vec::new();
        for _ in 0..100_000 {
            removed = registry.tick_all();
            if !removed.is_empty() {
                break;
            }
            assert_ne!(registry.get(id).unwrap().phase(), PathPhase::Disposed);
        }
        assert_eq!(removed, vec![id]);
        assert!(registry.get(id).is_none());
        assert!(registry.is_empty());

        // the label is free again
        assert!(registry.insert(route("A", "B")).is_some());
    }

    #[test]
    fn hovered_path_is_never_removed() {
        let mut registry = PathRegistry::new(3, 1.0);
        let id = registry.insert(route("A", "B")).unwrap();
        registry.get_mut(id).unwrap().set_hover(true);
        for _ in 0..5_000 {
            assert!(registry.tick_all().is_empty());
        }
        assert!(registry.get(id).is_some());
    }

    #[test]
    fn scheduler_wraps_cursor() {
        let mut registry = PathRegistry::new(10, 1.0);
        let mut scheduler = PathScheduler::new(routes(3), DEFAULT_SPAWN_INTERVAL);
        for _ in 0..3 {
            assert!(scheduler.spawn_next(&mut registry).is_some());
        }
        assert_eq!(scheduler.cursor(), 0);

        // all three labels are live, so the next lap spawns nothing
        assert!(scheduler.spawn_next(&mut registry).is_none());
        assert_eq!(scheduler.cursor(), 1);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn scheduler_respects_capacity() {
        let mut registry = PathRegistry::new(2, 1.0);
        let mut scheduler = PathScheduler::new(routes(6), DEFAULT_SPAWN_INTERVAL);
        let spawned: Vec<_> = (0..6).filter_map(|_| scheduler.spawn_next(&mut registry)).collect();
        assert_eq!(spawned.len(), 2);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn poll_follows_interval() {
        let mut registry = PathRegistry::new(10, 1.0);
        let interval = Duration::from_millis(200);
        let mut scheduler = PathScheduler::new(routes(8), interval);
        let start = Instant::now();

        assert!(scheduler.poll(start, &mut registry).is_none());
        assert!(scheduler.poll(start + Duration::from_millis(150), &mut registry).is_none());
        assert!(scheduler.poll(start + Duration::from_millis(200), &mut registry).is_some());
        assert!(scheduler.poll(start + Duration::from_millis(350), &mut registry).is_none());
        // ticks stay on the 200ms grid when frames arrive late
        assert!(scheduler.poll(start + Duration::from_millis(410), &mut registry).is_some());
        assert!(scheduler.poll(start + Duration::from_millis(590), &mut registry).is_none());
        assert!(scheduler.poll(start + Duration::from_millis(600), &mut registry).is_some());
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn stall_spawns_once_then_resumes_the_interval() {
        let mut registry = PathRegistry::new(12, 1.0);
        let interval = Duration::from_millis(200);
        let mut scheduler = PathScheduler::new(routes(40), interval);
        let start = Instant::now();
        scheduler.poll(start, &mut registry);

        let resumed = start + Duration::from_secs(10);
        assert!(scheduler.poll(resumed, &mut registry).is_some());
        assert_eq!(registry.len(), 1);
        assert_eq!(scheduler.cursor(), 1);

        // the next frames after the stall do not make up for lost ticks
        assert!(scheduler.poll(resumed + Duration::from_millis(30), &mut registry).is_none());
        assert!(scheduler.poll(resumed + Duration::from_millis(199), &mut registry).is_none());
        assert!(scheduler.poll(resumed + interval, &mut registry).is_some());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn stopped_scheduler_spawns_nothing() {
        let mut registry = PathRegistry::new(10, 1.0);
        let mut scheduler = PathScheduler::new(routes(4), Duration::from_millis(10));
        let start = Instant::now();
        scheduler.poll(start, &mut registry);
        scheduler.stop();
        assert!(scheduler.poll(start + Duration::from_secs(5), &mut registry).is_none());
        assert!(registry.is_empty());
        assert!(scheduler.is_stopped());
    }

    #[test]
    fn empty_pool_is_harmless() {
        let mut registry = PathRegistry::new(10, 1.0);
        let mut scheduler = PathScheduler::new(Vec::new(), Duration::from_millis(10));
        assert!(scheduler.spawn_next(&mut registry).is_none());
        let start = Instant::now();
        scheduler.poll(start, &mut registry);
        assert!(scheduler.poll(start + Duration::from_secs(1), &mut registry).is_none());
    }
}
