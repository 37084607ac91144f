//! Parent-chain tracking for template resolution

/// The chain of templates currently being resolved, outermost first.
///
/// Resolution is a depth-first walk up parent references; a name that shows
/// up again while it is still on the chain closes a cycle.
#[derive(Debug, Clone, Default)]
pub struct ResolutionContext {
    resolving: Vec<String>,
}

impl ResolutionContext {
    /// Create a new empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a template is currently being resolved (cycle detection)
    pub fn is_resolving(&self, name: &str) -> bool {
        self.resolving.iter().any(|n| n == name)
    }

    /// Mark a template as being resolved
    pub fn start_resolving(&mut self, name: &str) {
        self.resolving.push(name.to_string());
    }

    /// Mark a template as done resolving
    pub fn done_resolving(&mut self, name: &str) {
        if let Some(pos) = self.resolving.iter().rposition(|n| n == name) {
            self.resolving.remove(pos);
        }
    }

    /// The chain from the first visit of `name` back round to `name`
    pub fn cycle_to(&self, name: &str) -> Vec<String> {
        let start = self
            .resolving
            .iter()
            .position(|n| n == name)
            .unwrap_or(0);
        let mut chain = self.resolving[start..].to_vec();
        chain.push(name.to_string());
        chain
    }
}
