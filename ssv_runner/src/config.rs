use std::time::Duration;

/// Tunables for the duty runner and its cache, all pinned to fixed values in
/// spec.md but called out there (§9 Open Questions) as things that should be
/// configurable rather than baked in.
#[derive(Debug, Clone, Copy)]
pub struct RunnerConfig {
    /// How long `Network::broadcast` is allowed to wait on the gossip queue
    /// before giving up (spec.md §5: "hard 5s timeout").
    pub broadcast_timeout: Duration,
    /// How many of the most-recently-seen slots `AttestationDataCache`
    /// keeps around before a slot is eligible for eviction (spec.md §4.A:
    /// "retains last 11 slots ever seen").
    pub cache_retained_slots: u64,
    /// How often the cache's eviction sweep runs.
    pub cache_sweep_interval: Duration,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            broadcast_timeout: Duration::from_secs(5),
            cache_retained_slots: 11,
            cache_sweep_interval: Duration::from_secs(12),
        }
    }
}
