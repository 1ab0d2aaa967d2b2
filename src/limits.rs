/// Safety thresholds that bound the work a single pull can do, per SPEC_FULL.md §4.4/§10.3. The
/// RFC-mandated defaults are 1000/1000; an embedding caller on a latency-sensitive path can
/// tighten either threshold without touching stage internals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineLimits {
    max_empty_sets: u32,
    max_empty_instances: u32,
}

impl Default for PipelineLimits {
    fn default() -> Self {
        Self {
            max_empty_sets: 1000,
            max_empty_instances: 1000,
        }
    }
}

impl PipelineLimits {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_empty_sets(mut self, max_empty_sets: u32) -> Self {
        self.max_empty_sets = max_empty_sets;
        self
    }

    pub fn with_max_empty_instances(mut self, max_empty_instances: u32) -> Self {
        self.max_empty_instances = max_empty_instances;
        self
    }

    pub fn max_empty_sets(&self) -> u32 {
        self.max_empty_sets
    }

    pub fn max_empty_instances(&self) -> u32 {
        self.max_empty_instances
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions_sorted::assert_eq;

    #[test]
    fn defaults_match_the_rfc_mandated_thresholds() {
        let limits = PipelineLimits::default();
        assert_eq!(limits.max_empty_sets(), 1000);
        assert_eq!(limits.max_empty_instances(), 1000);
    }

    #[test]
    fn builder_overrides_apply() {
        let limits = PipelineLimits::new()
            .with_max_empty_sets(10)
            .with_max_empty_instances(20);

        assert_eq!(limits.max_empty_sets(), 10);
        assert_eq!(limits.max_empty_instances(), 20);
    }
}
