//! The monitor-subscription registry (spec.md §4.4): facility -> list of
//! `(clientAddr, expiry)`. Expired entries are pruned lazily, on touch.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Instant;

#[derive(Debug, Clone)]
struct Subscription {
    addr: SocketAddr,
    expires_at: Instant,
}

#[derive(Debug, Default)]
pub struct MonitorRegistry {
    subscriptions: HashMap<String, Vec<Subscription>>,
}

impl MonitorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn prune(&mut self, facility: &str, now: Instant) {
        if let Some(subs) = self.subscriptions.get_mut(facility) {
            subs.retain(|s| s.expires_at > now);
        }
    }

    /// spec.md §4.4 register: `expiresAt = now + intervalMinutes * 60s`.
    pub fn register(&mut self, facility: &str, addr: SocketAddr, interval_minutes: i32, now: Instant) {
        self.prune(facility, now);
        let expires_at = now + std::time::Duration::from_secs(interval_minutes.max(0) as u64 * 60);
        self.subscriptions.entry(facility.to_string()).or_default().push(Subscription { addr, expires_at });
    }

    /// Prunes expired entries for `facility` and returns the addresses of
    /// the surviving subscriptions — the broadcast fan-out list.
    pub fn targets(&mut self, facility: &str, now: Instant) -> Vec<SocketAddr> {
        self.prune(facility, now);
        self.subscriptions.get(facility).map(|subs| subs.iter().map(|s| s.addr).collect()).unwrap_or_default()
    }

    /// Total live subscriptions across all facilities, for the STATUS
    /// handler. Prunes every facility first so the count is accurate.
    pub fn total_subscriptions(&mut self, now: Instant) -> usize {
        let facilities: Vec<String> = self.subscriptions.keys().cloned().collect();
        for facility in facilities {
            self.prune(&facility, now);
        }
        self.subscriptions.values().map(|v| v.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};
    use std::time::Duration;

    fn addr() -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 4242)
    }

    #[test]
    fn registered_subscription_receives_broadcast() {
        let mut reg = MonitorRegistry::new();
        let now = Instant::now();
        reg.register("GymA", addr(), 10, now);
        assert_eq!(reg.targets("GymA", now), vec![addr()]);
    }

    #[test]
    fn expired_subscription_is_pruned_and_not_targeted() {
        let mut reg = MonitorRegistry::new();
        let now = Instant::now();
        reg.register("GymA", addr(), 10, now);
        let later = now + Duration::from_secs(10 * 60 + 1);
        assert!(reg.targets("GymA", later).is_empty());
    }

    #[test]
    fn unknown_facility_has_no_targets() {
        let mut reg = MonitorRegistry::new();
        assert!(reg.targets("Nope", Instant::now()).is_empty());
    }
}
