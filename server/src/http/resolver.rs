//! Environments that are answered by the controller itself and never stored.
//!
//! Only reads consult the resolver. The list is fixed at construction, so the
//! set of names that bypass storage is always visible in one place.

use shared_types::Environment;

fn fold_case(s: &str) -> impl Iterator<Item = char> + '_ {
    s.chars().flat_map(char::to_lowercase)
}

/// A synthetic environment recognised by name.
pub trait VirtualEnvironment: Send + Sync {
    fn name(&self) -> &'static str;

    /// Case-insensitive under Unicode lowercasing, so "WOR\u{212A}FLOW" (Kelvin sign) matches too.
    fn matches(&self, name: &str) -> bool {
        fold_case(name).eq(fold_case(self.name()))
    }

    fn resolve(&self) -> Environment {
        Environment::new(self.name())
    }
}

/// Placeholder for the workflow engine runtime, which has no stored definition.
#[derive(Debug, Default, Clone, Copy)]
pub struct WorkflowEnvironment;

impl WorkflowEnvironment {
    pub const NAME: &'static str = "workflow";
}

impl VirtualEnvironment for WorkflowEnvironment {
    fn name(&self) -> &'static str {
        Self::NAME
    }
}

pub struct VirtualResolver {
    entries: Vec<Box<dyn VirtualEnvironment>>,
}

impl VirtualResolver {
    pub fn new(entries: Vec<Box<dyn VirtualEnvironment>>) -> Self {
        Self { entries }
    }

    /// A resolver that knows no virtual environments
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn resolve(&self, name: &str) -> Option<Environment> {
        self.entries
            .iter()
            .find(|entry| entry.matches(name))
            .map(|entry| entry.resolve())
    }
}

impl Default for VirtualResolver {
    fn default() -> Self {
        Self::new(vec![Box::new(WorkflowEnvironment)])
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_workflow_matches_any_case() {
        let resolver = VirtualResolver::default();

        for name in ["workflow", "Workflow", "WORKFLOW", "wOrKfLoW"] {
            let env = resolver.resolve(name).unwrap();
            assert_eq!(env.metadata.name, "workflow");
            assert!(env.metadata.uid.is_empty());
            assert!(env.spec.is_empty());
        }
    }

    #[test]
    fn test_workflow_matches_unicode_case_variants() {
        let resolver = VirtualResolver::default();

        for name in ["wor\u{212A}flow", "WOR\u{212A}FLOW"] {
            let env = resolver.resolve(name).unwrap();
            assert_eq!(env.metadata.name, "workflow");
        }
        assert!(resolver.resolve("wörkflow").is_none());
    }

    #[test]
    fn test_other_names_fall_through() {
        let resolver = VirtualResolver::default();

        for name in ["python", "workflows", "workflow ", ""] {
            assert!(resolver.resolve(name).is_none(), "{name:?} should not resolve");
        }
    }

    #[test]
    fn test_empty_resolver() {
        assert!(VirtualResolver::empty().resolve("workflow").is_none());
    }
}
