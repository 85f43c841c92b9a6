//! Server configuration.

/// What to do when a single mutation fails to apply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MutationErrorPolicy {
    /// Log the failure, skip the mutation, and advance the client's
    /// counter anyway, so one bad mutation cannot permanently block a
    /// client's queue. Liveness over strictness.
    #[default]
    Skip,
    /// Fail the whole push; nothing in the batch is committed.
    Abort,
}

/// Configuration for the sync server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Maximum number of mutations accepted in one push.
    pub max_push_batch: u32,
    /// Handling of per-mutation application failures.
    pub mutation_error_policy: MutationErrorPolicy,
}

impl ServerConfig {
    /// Creates a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_push_batch: 100,
            mutation_error_policy: MutationErrorPolicy::default(),
        }
    }

    /// Sets the maximum push batch size.
    #[must_use]
    pub fn with_max_push_batch(mut self, size: u32) -> Self {
        self.max_push_batch = size;
        self
    }

    /// Sets the per-mutation failure policy.
    #[must_use]
    pub fn with_mutation_error_policy(mut self, policy: MutationErrorPolicy) -> Self {
        self.mutation_error_policy = policy;
        self
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new()
    }
}
