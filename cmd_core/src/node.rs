//! Command tree nodes.

use core::any::Any;
use core::fmt::{self, Write};
use std::rc::Rc;

use log::trace;

use crate::bundle::ArgBundle;
use crate::spec::Segment;
use crate::types::Descriptor;

/// Callback bound to a command path; receives the fully populated bundle.
pub type Handler = Box<dyn Fn(&ArgBundle<'_>)>;

/// Opaque data supplied at registration, reachable from the bundle.
pub type Context = Rc<dyn Any>;

/// One registered command or subcommand.
///
/// Children are boxed individually, so a node keeps its address for as long
/// as the tree lives, whatever happens to the containers holding it.
pub struct CommandNode {
    name: String,
    descriptors: Vec<&'static Descriptor>,
    handler: Option<Handler>,
    context: Option<Context>,
    children: Vec<Box<CommandNode>>,
}

impl CommandNode {
    /// Build the chain of nodes described by `segments`, outermost first.
    ///
    /// Only the innermost node receives the handler and context; every
    /// ancestor ends with the subcommand marker and owns exactly one child.
    pub(crate) fn build_chain(
        segments: &[Segment],
        handler: Handler,
        context: Option<Context>,
    ) -> Option<Box<CommandNode>> {
        let mut handler = Some(handler);
        let mut context = context;
        let mut chain: Option<Box<CommandNode>> = None;
        for segment in segments.iter().rev() {
            let mut node = Box::new(CommandNode {
                name: segment.name.clone(),
                descriptors: segment.descriptors.clone(),
                handler: handler.take(),
                context: context.take(),
                children: Vec::new(),
            });
            if let Some(child) = chain.take() {
                node.children.push(child);
            }
            chain = Some(node);
        }
        chain
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Positional grammar, subcommand marker included.
    pub fn descriptors(&self) -> &[&'static Descriptor] {
        &self.descriptors
    }

    pub fn arg_count(&self) -> usize {
        self.descriptors.len()
    }

    pub fn has_handler(&self) -> bool {
        self.handler.is_some()
    }

    pub(crate) fn handler(&self) -> Option<&Handler> {
        self.handler.as_ref()
    }

    pub(crate) fn context(&self) -> Option<&dyn Any> {
        self.context.as_deref()
    }

    pub fn children(&self) -> impl Iterator<Item = &CommandNode> + '_ {
        self.children.iter().map(|c| c.as_ref())
    }

    /// True when the last positional slot opens a nested command.
    pub fn takes_subcommand(&self) -> bool {
        self.descriptors.last().is_some_and(|d| d.is_subcommand())
    }

    /// Linear scan over the direct children.
    pub fn find_child(&self, name: &str) -> Option<&CommandNode> {
        self.children.iter().map(|c| c.as_ref()).find(|c| {
            trace!("compare: {} - {}", name, c.name);
            c.name == name
        })
    }

    pub(crate) fn child_index(&self, name: &str) -> Option<usize> {
        self.children.iter().position(|c| c.name == name)
    }

    /// `index` comes from [`CommandNode::child_index`] on the same node.
    pub(crate) fn child_mut(&mut self, index: usize) -> &mut CommandNode {
        self.children[index].as_mut()
    }

    /// Reserve room for one more child; a failed reservation leaves the list intact.
    pub(crate) fn reserve_child(&mut self) -> Result<(), std::collections::TryReserveError> {
        self.children.try_reserve(1)
    }

    pub(crate) fn attach(&mut self, child: Box<CommandNode>) {
        self.children.push(child);
    }

    /// Write this node and its descendants, one node per line.
    pub fn write_tree<W: Write>(&self, out: &mut W, depth: usize) -> fmt::Result {
        for _ in 0..depth {
            out.write_str("  ")?;
        }
        out.write_str(&self.name)?;
        for d in &self.descriptors {
            write!(out, " {d}")?;
        }
        out.write_char('\n')?;
        for child in &self.children {
            child.write_tree(out, depth + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for CommandNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_tree(f, 0)
    }
}

impl fmt::Debug for CommandNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandNode")
            .field("name", &self.name)
            .field("descriptors", &self.descriptors)
            .field("handler", &self.handler.is_some())
            .field("children", &self.children)
            .finish()
    }
}

// ==================== TESTS =======================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::CommandSpec;

    fn chain(spec: &str) -> Box<CommandNode> {
        let spec = CommandSpec::parse(spec).unwrap();
        let handler: Handler = Box::new(|_: &ArgBundle<'_>| {});
        CommandNode::build_chain(spec.segments(), handler, None).unwrap()
    }

    #[test]
    fn test_chain_pushes_handler_to_leaf() {
        let root = chain("config <INT> set <STRING>");
        assert_eq!(root.name(), "config");
        assert!(!root.has_handler());
        assert!(root.takes_subcommand());
        let leaf = root.find_child("set").unwrap();
        assert!(leaf.has_handler());
        assert_eq!(leaf.arg_count(), 1);
        assert!(!leaf.takes_subcommand());
    }

    #[test]
    fn test_single_node_keeps_handler() {
        let root = chain("reset");
        assert!(root.has_handler());
        assert_eq!(root.children().count(), 0);
    }

    #[test]
    fn test_context_travels_with_handler() {
        let spec = CommandSpec::parse("a b").unwrap();
        let ctx: Context = Rc::new(7u32);
        let handler: Handler = Box::new(|_: &ArgBundle<'_>| {});
        let root = CommandNode::build_chain(spec.segments(), handler, Some(ctx)).unwrap();
        assert!(root.context().is_none());
        let leaf = root.find_child("b").unwrap();
        assert_eq!(leaf.context().and_then(|c| c.downcast_ref::<u32>()), Some(&7));
    }

    #[test]
    fn test_find_child_absent() {
        let root = chain("config set");
        assert!(root.find_child("unset").is_none());
    }

    #[test]
    fn test_write_tree() {
        let root = chain("config <INT> set <STRING>");
        assert_eq!(root.to_string(), "config <INT> <SUBCMD>\n  set <STRING>\n");
    }
}
