use std::time::Instant;

use crate::domain::{DuplicateCache, MonitorRegistry, ScheduleStore};
use crate::semantics::InvocationSemantics;

/// The global, single-instance state the dispatcher owns (spec.md §9):
/// facility set + schedule, duplicate cache, monitor registry, and the
/// server's own start time for the STATUS handler. Created once at
/// startup, torn down on process exit — no hidden singleton.
pub struct ServerState {
    pub schedule: ScheduleStore,
    pub dup_cache: DuplicateCache,
    pub monitors: MonitorRegistry,
    pub semantics: InvocationSemantics,
    started_at: Instant,
}

impl ServerState {
    pub fn new(facility_names: impl IntoIterator<Item = String>, dup_cache_capacity: usize, semantics: InvocationSemantics) -> Self {
        Self {
            schedule: ScheduleStore::new(facility_names),
            dup_cache: DuplicateCache::new(dup_cache_capacity),
            monitors: MonitorRegistry::new(),
            semantics,
            started_at: Instant::now(),
        }
    }

    /// spec.md §4.5: "a short textual health string (uptime, facility
    /// count, reservation count, subscription count)".
    pub fn status_text(&mut self) -> String {
        let uptime = self.started_at.elapsed().as_secs();
        let subscriptions = self.monitors.total_subscriptions(Instant::now());
        format!(
            "STATUS: uptime={}s facilities={} reservations={} subscriptions={}",
            uptime,
            self.schedule.facility_count(),
            self.schedule.reservation_count(),
            subscriptions
        )
    }
}
