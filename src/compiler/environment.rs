use std::collections::HashMap;
use crate::compiler::evaluator::value::Value;

/// Handle to one scope in an [`Environments`] arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EnvId(usize);

impl EnvId {
    /// Whether this scope was created after `mark` was taken.
    pub fn is_since(&self, mark: ScopeMark) -> bool {
        self.0 >= mark.0
    }
}

/// Arena height at some point in time; see [`Environments::release`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScopeMark(usize);

#[derive(Debug, Default)]
struct Environment {
    values: HashMap<String, Value>,
    parent: Option<EnvId>,
}

/// Arena of scopes. A scope refers to its enclosing scope by index only, so closures
/// capturing an [`EnvId`] never form ownership cycles. Call scopes are released again
/// once nothing refers to them.
#[derive(Debug, Default)]
pub struct Environments {
    environments: Vec<Environment>,
}

impl Environments {
    pub fn new() -> Environments {
        Environments::default()
    }

    pub fn new_global(&mut self) -> EnvId {
        self.push(Environment::default())
    }

    pub fn new_with_parent(&mut self, parent: EnvId) -> EnvId {
        self.push(Environment { values: HashMap::new(), parent: Some(parent) })
    }

    fn push(&mut self, environment: Environment) -> EnvId {
        self.environments.push(environment);
        EnvId(self.environments.len() - 1)
    }

    pub fn find_variable(&self, env: EnvId, name: &str) -> Option<&Value> {
        let environment = self.environments.get(env.0)?;

        match environment.values.get(name) {
            Some(value) => Some(value),
            None => environment.parent.and_then(|parent| self.find_variable(parent, name)),
        }
    }

    /// Binds `name` in `env` itself, shadowing any binding in enclosing scopes.
    pub fn put_variable(&mut self, env: EnvId, name: &str, value: Value) {
        if let Some(environment) = self.environments.get_mut(env.0) {
            environment.values.insert(name.to_owned(), value);
        }
    }

    pub fn mark(&self) -> ScopeMark {
        ScopeMark(self.environments.len())
    }

    /// Drops every scope created since `mark`. Any [`EnvId`] for which
    /// [`EnvId::is_since`] holds must no longer be reachable.
    pub fn release(&mut self, mark: ScopeMark) {
        self.environments.truncate(mark.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    pub fn test_lookup_walks_outward() {
        let mut environments = Environments::new();
        let global = environments.new_global();
        let inner = environments.new_with_parent(global);
        let innermost = environments.new_with_parent(inner);

        environments.put_variable(global, "x", Value::Integer(1));
        environments.put_variable(inner, "y", Value::Integer(2));

        assert_eq!(Some(&Value::Integer(1)), environments.find_variable(innermost, "x"));
        assert_eq!(Some(&Value::Integer(2)), environments.find_variable(innermost, "y"));
        assert_eq!(None, environments.find_variable(global, "y"));
        assert_eq!(None, environments.find_variable(innermost, "z"));
    }

    #[test]
    pub fn test_shadowing() {
        let mut environments = Environments::new();
        let global = environments.new_global();
        let inner = environments.new_with_parent(global);

        environments.put_variable(global, "x", Value::Integer(1));
        environments.put_variable(inner, "x", Value::Bool(true));

        assert_eq!(Some(&Value::Bool(true)), environments.find_variable(inner, "x"));
        assert_eq!(Some(&Value::Integer(1)), environments.find_variable(global, "x"));
    }

    #[test]
    pub fn test_release_drops_newer_scopes() {
        let mut environments = Environments::new();
        let global = environments.new_global();
        let mark = environments.mark();

        let call = environments.new_with_parent(global);
        environments.put_variable(call, "x", Value::Integer(1));

        assert!(call.is_since(mark));
        assert!(!global.is_since(mark));

        environments.release(mark);
        assert_eq!(mark, environments.mark());
        assert_eq!(None, environments.find_variable(call, "x"));

        // Ids are handed out again from the released height
        assert_eq!(call, environments.new_with_parent(global));
    }
}
