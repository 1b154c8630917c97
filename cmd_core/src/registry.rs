//! # Command Registry
//!
//! Root commands live in a [`CommandTable`]; nested commands hang off their
//! parent's child list. Registration walks the existing tree segment by
//! segment, stops at the first segment that is not registered yet, builds
//! the whole remaining chain off to the side and only then links it in.
//!
//! ```
//! use cmd_core::Registry;
//!
//! let mut registry = Registry::new();
//! registry.register("config get <STRING>", |_| {}).unwrap();
//! registry.register("config set <STRING> <INT>", |_| {}).unwrap();
//!
//! let set = registry.lookup("config set").unwrap();
//! assert_eq!(set.arg_count(), 2);
//! ```

use core::any::Any;
use core::fmt;
use std::rc::Rc;

use cmd_config::TABLE_INITIAL_CAPACITY;
use log::debug;

use crate::bundle::ArgBundle;
use crate::error::RegisterError;
use crate::node::{CommandNode, Context, Handler};
use crate::spec::{CommandSpec, Segment};
use crate::table::CommandTable;

pub struct Registry {
    table: CommandTable,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::with_capacity(TABLE_INITIAL_CAPACITY)
    }

    /// Start the root table with `capacity` slots instead of the configured default.
    pub fn with_capacity(capacity: usize) -> Self {
        Self { table: CommandTable::with_capacity(capacity) }
    }

    /// Register `spec` and bind `handler` to its innermost command.
    pub fn register<F>(&mut self, spec: &str, handler: F) -> Result<(), RegisterError>
    where
        F: Fn(&ArgBundle<'_>) + 'static,
    {
        self.register_inner(spec, Box::new(handler), None)
    }

    /// Like [`Registry::register`], with data the handler reads through
    /// [`ArgBundle::context`].
    pub fn register_with_context<F, C>(
        &mut self,
        spec: &str,
        handler: F,
        context: C,
    ) -> Result<(), RegisterError>
    where
        F: Fn(&ArgBundle<'_>) + 'static,
        C: Any,
    {
        let context: Context = Rc::new(context);
        self.register_inner(spec, Box::new(handler), Some(context))
    }

    fn register_inner(
        &mut self,
        spec: &str,
        handler: Handler,
        context: Option<Context>,
    ) -> Result<(), RegisterError> {
        debug!("REGISTER START ({})", spec.trim());
        let result =
            CommandSpec::parse(spec).and_then(|parsed| self.merge(&parsed, handler, context));
        match &result {
            Ok(()) => debug!("REGISTER FINISH ({})", spec.trim()),
            Err(e) => debug!("REGISTER FAILED ({}): {}", spec.trim(), e),
        }
        result
    }

    /// Descend through the registered prefix of `spec`, then attach the rest.
    fn merge(
        &mut self,
        spec: &CommandSpec,
        handler: Handler,
        context: Option<Context>,
    ) -> Result<(), RegisterError> {
        let segments = spec.segments();
        let Some(first) = segments.first() else {
            return Err(RegisterError::EmptySpec);
        };

        let Some(mut node) = self.table.get_mut(&first.name) else {
            let root = build(segments, handler, context)?;
            return self.table.insert(root);
        };

        let mut depth = 0;
        loop {
            check_grammar(node, &segments[depth])?;
            depth += 1;
            let Some(next) = segments.get(depth) else {
                return Err(RegisterError::DuplicatePath { path: spec.path() });
            };
            match node.child_index(&next.name) {
                Some(index) => {
                    node = node.child_mut(index);
                }
                None => {
                    node.reserve_child().map_err(|_| RegisterError::AllocationFailure)?;
                    let subtree = build(&segments[depth..], handler, context)?;
                    node.attach(subtree);
                    return Ok(());
                }
            }
        }
    }

    /// Root command by name.
    pub fn lookup_root(&self, name: &str) -> Option<&CommandNode> {
        self.table.get(name)
    }

    /// Node at a blank-separated command path, e.g. `"config set"`.
    pub fn lookup(&self, path: &str) -> Option<&CommandNode> {
        let mut names = path.split_whitespace();
        let mut node = self.table.get(names.next()?)?;
        for name in names {
            node = node.find_child(name)?;
        }
        Some(node)
    }

    /// Number of root commands.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Root nodes, sorted by name.
    pub fn roots(&self) -> Vec<&CommandNode> {
        let mut roots: Vec<&CommandNode> = self.table.iter().collect();
        roots.sort_unstable_by(|a, b| a.name().cmp(b.name()));
        roots
    }

    /// Root command names, sorted.
    pub fn command_names(&self) -> Vec<&str> {
        self.roots().into_iter().map(CommandNode::name).collect()
    }

    /// Text rendering of the whole tree, one command per line, children
    /// indented two spaces per level.
    pub fn dump(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for root in self.roots() {
            root.write_tree(f, 0)?;
        }
        Ok(())
    }
}

fn build(
    segments: &[Segment],
    handler: Handler,
    context: Option<Context>,
) -> Result<Box<CommandNode>, RegisterError> {
    CommandNode::build_chain(segments, handler, context).ok_or(RegisterError::EmptySpec)
}

/// An existing node can only be extended if the spec agrees on its grammar.
fn check_grammar(node: &CommandNode, segment: &Segment) -> Result<(), RegisterError> {
    if segment.same_grammar(node.descriptors()) {
        Ok(())
    } else {
        Err(RegisterError::GrammarConflict { name: segment.name.clone() })
    }
}

// ==================== TESTS =======================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Kind;

    fn noop(_: &ArgBundle<'_>) {}

    fn kinds(node: &CommandNode) -> Vec<Kind> {
        node.descriptors().iter().map(|d| d.kind).collect()
    }

    #[test]
    fn test_register_then_lookup_round_trip() {
        let mut r = Registry::new();
        r.register("set <INT> <STRING>", noop).unwrap();
        let node = r.lookup("set").unwrap();
        assert_eq!(node.name(), "set");
        assert_eq!(kinds(node), vec![Kind::Int, Kind::Str]);
        assert!(node.has_handler());
    }

    #[test]
    fn test_nested_round_trip() {
        let mut r = Registry::new();
        r.register("config <UBYTE> set <STRING>", noop).unwrap();
        let config = r.lookup("config").unwrap();
        assert_eq!(kinds(config), vec![Kind::UByte, Kind::Subcommand]);
        assert!(!config.has_handler());
        let set = r.lookup("config set").unwrap();
        assert_eq!(kinds(set), vec![Kind::Str]);
        assert!(set.has_handler());
        assert_eq!(r.len(), 1);
    }

    #[test]
    fn test_siblings_share_one_parent() {
        let mut r = Registry::new();
        r.register("config set <STRING>", noop).unwrap();
        r.register("config get", noop).unwrap();
        r.register("config reset all", noop).unwrap();
        r.register("config reset one <INT>", noop).unwrap();
        assert_eq!(r.len(), 1);
        let config = r.lookup("config").unwrap();
        let names: Vec<_> = config.children().map(CommandNode::name).collect();
        assert_eq!(names, vec!["set", "get", "reset"]);
        assert_eq!(r.lookup("config reset").unwrap().children().count(), 2);
        assert!(r.lookup("config reset one").unwrap().has_handler());
    }

    #[test]
    fn test_lookup_absent_paths() {
        let mut r = Registry::new();
        r.register("config set <STRING>", noop).unwrap();
        assert!(r.lookup("config unset").is_none());
        assert!(r.lookup("nope").is_none());
        assert!(r.lookup("").is_none());
        assert!(r.lookup("config set deeper").is_none());
    }

    #[test]
    fn test_duplicate_path_rejected() {
        let mut r = Registry::new();
        r.register("config set <STRING>", noop).unwrap();
        assert_eq!(
            r.register("config  set <STRING>", noop),
            Err(RegisterError::DuplicatePath { path: "config set".into() })
        );
        r.register("ping", noop).unwrap();
        assert_eq!(
            r.register("ping", noop),
            Err(RegisterError::DuplicatePath { path: "ping".into() })
        );
    }

    #[test]
    fn test_conflicting_grammar_rejected() {
        let mut r = Registry::new();
        r.register("config <INT> set", noop).unwrap();
        assert_eq!(
            r.register("config <UINT> get", noop),
            Err(RegisterError::GrammarConflict { name: "config".into() })
        );
        r.register("led <UBYTE>", noop).unwrap();
        assert_eq!(
            r.register("led on", noop),
            Err(RegisterError::GrammarConflict { name: "led".into() })
        );
        // rejected registrations leave the tree untouched
        assert!(r.lookup("config get").is_none());
        assert_eq!(r.lookup("led").unwrap().children().count(), 0);
    }

    #[test]
    fn test_invalid_specs_leave_registry_empty() {
        let mut r = Registry::new();
        assert_eq!(r.register("   ", noop), Err(RegisterError::EmptySpec));
        assert!(matches!(r.register("x <FLOAT>", noop), Err(RegisterError::UnknownType { .. })));
        assert!(matches!(r.register("<INT>", noop), Err(RegisterError::MissingName { .. })));
        assert!(r.is_empty());
    }

    #[test]
    fn test_many_roots_survive_resizes() {
        let mut r = Registry::with_capacity(2);
        for i in 0..20 {
            r.register(&format!("cmd{i} <INT>"), noop).unwrap();
        }
        r.register("cmd3 sub", noop).unwrap_err();
        for i in 0..20 {
            assert!(r.lookup(&format!("cmd{i}")).is_some(), "cmd{i}");
        }
        assert_eq!(r.len(), 20);
    }

    #[test]
    fn test_dump_is_sorted_and_indented() {
        let mut r = Registry::new();
        r.register("zeta", noop).unwrap();
        r.register("config set <STRING>", noop).unwrap();
        r.register("config get", noop).unwrap();
        assert_eq!(
            r.dump(),
            "config <SUBCMD>\n  set <STRING>\n  get\nzeta\n"
        );
        assert_eq!(r.command_names(), vec!["config", "zeta"]);
    }

    #[test]
    fn test_context_reaches_leaf() {
        let mut r = Registry::new();
        r.register_with_context("a b", noop, String::from("ctx")).unwrap();
        let leaf = r.lookup("a b").unwrap();
        assert_eq!(
            leaf.context().and_then(|c| c.downcast_ref::<String>()).map(String::as_str),
            Some("ctx")
        );
    }
}
