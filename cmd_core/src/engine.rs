//! # Execution Engine
//!
//! Runs one input line against the registry with a small state machine:
//!
//! ```text
//!            token is child name            token converts
//!  CommandExpected ─────────────▶ (recompute)   ValueExpected ─────▶ (recompute)
//!        │ no such child                          │ conversion fails
//!        ▼                                        ▼
//!      Error ◀──────── input ends while a command or value is expected
//!
//!  Ready ── no tokens left ──▶ handler runs
//! ```
//!
//! The state after every step comes from [`next_state`]: the current node
//! and the number of its positional slots already filled.
//!
//! The tokenized line and the argument bundle are locals of
//! [`Shell::try_execute`]; whichever way the call returns they are dropped
//! exactly once.

use core::any::Any;

use heapless::String as ScratchString;
use log::{debug, trace};

use cmd_config::{MAX_ARG_LEN, TOKEN_DELIMITER};

use crate::bundle::ArgBundle;
use crate::error::{ExecError, ParseError, RegisterError};
use crate::node::CommandNode;
use crate::registry::Registry;
use crate::tokenizer::{TokenizedInput, trim_blank};
use crate::types::Kind;

/// Parser state between two input tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum State {
    /// The next token must name a child of the current node.
    CommandExpected,
    /// The next token is a value for the current descriptor.
    ValueExpected,
    /// Every positional slot of the current node is filled.
    Ready,
    /// No handler will run.
    Error(ExecError),
    /// Internal invariant violated; never observed in a consistent tree.
    Unreachable,
}

/// Transition function: state for `node` after `args_parsed` of its slots were filled.
pub fn next_state(node: &CommandNode, args_parsed: usize) -> State {
    match node.descriptors().get(args_parsed) {
        Some(d) if d.is_subcommand() => State::CommandExpected,
        Some(_) => State::ValueExpected,
        None if args_parsed == node.arg_count() => State::Ready,
        None => State::Unreachable,
    }
}

/// A registry plus the executor, with a scratch buffer of `AL` bytes for
/// value conversion.
pub struct Shell<const AL: usize> {
    registry: Registry,
}

/// Shell using the configured scratch capacity.
pub type DefaultShell = Shell<MAX_ARG_LEN>;

impl<const AL: usize> Default for Shell<AL> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const AL: usize> Shell<AL> {
    pub fn new() -> Self {
        Self { registry: Registry::new() }
    }

    /// Wrap a registry that was populated before the shell existed.
    pub fn with_registry(registry: Registry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// Longest value token accepted, in bytes.
    pub const fn max_arg_len(&self) -> usize {
        AL
    }

    pub fn register<F>(&mut self, spec: &str, handler: F) -> Result<(), RegisterError>
    where
        F: Fn(&ArgBundle<'_>) + 'static,
    {
        self.registry.register(spec, handler)
    }

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
        self.registry.register_with_context(spec, handler, context)
    }

    pub fn lookup(&self, path: &str) -> Option<&CommandNode> {
        self.registry.lookup(path)
    }

    pub fn dump(&self) -> String {
        self.registry.dump()
    }

    /// Run `line`; true iff a handler was invoked.
    pub fn execute(&self, line: &str) -> bool {
        self.try_execute(line).is_ok()
    }

    /// Run `line`, reporting why no handler ran.
    ///
    /// The handler runs only when the line names a full command path and
    /// supplies exactly the values its grammar declares, all of them valid.
    pub fn try_execute(&self, line: &str) -> Result<(), ExecError> {
        let input = TokenizedInput::split(trim_blank(line), TOKEN_DELIMITER);
        let mut tokens = input.iter();
        let mut bundle = ArgBundle::new();

        let result = self.run(&mut tokens, &mut bundle);
        if let Err(e) = &result {
            debug!("execute `{}` rejected: {}", line.trim(), e);
        }
        result
    }

    fn run<'s, 't>(
        &'s self,
        tokens: &mut impl Iterator<Item = &'t str>,
        bundle: &mut ArgBundle<'s>,
    ) -> Result<(), ExecError> {
        // split() always yields at least one token
        let first = tokens.next().unwrap_or_default();
        let mut node = self.registry.lookup_root(first);
        let mut args_parsed = 0usize;
        let mut state = match node {
            Some(root) => next_state(root, 0),
            None => State::Error(ExecError::UnknownCommand {
                name: first.to_owned(),
            }),
        };

        loop {
            trace!(
                "state: {:?} (node: {:?}, args: {})",
                state,
                node.map(CommandNode::name),
                args_parsed
            );
            state = match state {
                State::CommandExpected => {
                    let current = node.ok_or(ExecError::Fault)?;
                    match tokens.next() {
                        None => State::Error(missing_argument(current, args_parsed)),
                        Some(token) => {
                            node = current.find_child(token);
                            args_parsed = 0;
                            match node {
                                Some(child) => next_state(child, 0),
                                None => State::Error(ExecError::UnknownCommand {
                                    name: token.to_owned(),
                                }),
                            }
                        }
                    }
                }
                State::ValueExpected => {
                    let current = node.ok_or(ExecError::Fault)?;
                    match tokens.next() {
                        None => State::Error(missing_argument(current, args_parsed)),
                        Some(token) => {
                            let descriptor = current.descriptors()[args_parsed];
                            match self.convert(token, descriptor.kind, bundle) {
                                Ok(()) => {
                                    args_parsed += 1;
                                    next_state(current, args_parsed)
                                }
                                Err(source) => State::Error(ExecError::UnparsableToken {
                                    token: token.to_owned(),
                                    tag: descriptor.tag,
                                    source,
                                }),
                            }
                        }
                    }
                }
                State::Ready => {
                    let current = node.ok_or(ExecError::Fault)?;
                    if let Some(extra) = tokens.next() {
                        return Err(ExecError::TooManyArguments {
                            command: current.name().to_owned(),
                            extra: extra.to_owned(),
                        });
                    }
                    let handler = current.handler().ok_or(ExecError::Fault)?;
                    bundle.set_context(current.context());
                    handler(&*bundle);
                    return Ok(());
                }
                State::Error(e) => return Err(e),
                State::Unreachable => return Err(ExecError::Fault),
            };
        }
    }

    /// Bounded copy into the scratch buffer, conversion, then append to the bundle.
    fn convert(
        &self,
        token: &str,
        kind: Kind,
        bundle: &mut ArgBundle<'_>,
    ) -> Result<(), ParseError> {
        let mut scratch: ScratchString<AL> = ScratchString::new();
        scratch
            .push_str(token)
            .map_err(|_| ParseError::TooLong { max: AL })?;
        let value = kind.parse(scratch.as_str())?;
        bundle.push_value(value);
        Ok(())
    }
}

fn missing_argument(node: &CommandNode, args_parsed: usize) -> ExecError {
    let expected = match node.descriptors().get(args_parsed) {
        Some(d) if d.is_subcommand() => "a subcommand",
        Some(d) => d.tag,
        None => "nothing",
    };
    ExecError::MissingArgument {
        command: node.name().to_owned(),
        expected,
    }
}

// ==================== TESTS =======================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::types::Value;

    type Log = Rc<RefCell<Vec<String>>>;

    /// Handler that records its name and every value it receives.
    fn recorder(log: &Log, name: &'static str) -> impl Fn(&ArgBundle<'_>) + 'static {
        let log = Rc::clone(log);
        move |bundle: &ArgBundle<'_>| {
            let mut entry = String::from(name);
            while let Some(value) = bundle.next_value() {
                entry.push(' ');
                entry.push_str(&value.to_string());
            }
            log.borrow_mut().push(entry);
        }
    }

    fn shell_with(specs: &[(&str, &'static str)]) -> (DefaultShell, Log) {
        let log: Log = Rc::default();
        let mut shell = DefaultShell::new();
        for &(spec, name) in specs {
            shell.register(spec, recorder(&log, name)).unwrap();
        }
        (shell, log)
    }

    fn calls(log: &Log) -> Vec<String> {
        log.borrow().clone()
    }

    #[test]
    fn test_int_conversion() {
        let value = Rc::new(RefCell::new(None));
        let seen = Rc::clone(&value);
        let mut shell = DefaultShell::new();
        shell
            .register("set <INT>", move |b: &ArgBundle<'_>| {
                *seen.borrow_mut() = b.next_as::<i32>();
                assert!(b.next().is_none());
            })
            .unwrap();
        assert!(shell.execute("set 42"));
        assert_eq!(*value.borrow(), Some(42));
    }

    #[test]
    fn test_string_round_trip() {
        let value = Rc::new(RefCell::new(String::new()));
        let seen = Rc::clone(&value);
        let mut shell = DefaultShell::new();
        shell
            .register("say <STRING>", move |b: &ArgBundle<'_>| {
                if let Some(text) = b.next_as::<&str>() {
                    seen.borrow_mut().push_str(text);
                }
            })
            .unwrap();
        assert!(shell.execute("say hello"));
        assert_eq!(value.borrow().as_str(), "hello");
    }

    #[test]
    fn test_missing_argument() {
        let (shell, log) = shell_with(&[("set <INT>", "set")]);
        assert!(!shell.execute("set"));
        assert_eq!(
            shell.try_execute("set"),
            Err(ExecError::MissingArgument { command: "set".into(), expected: "<INT>" })
        );
        assert!(calls(&log).is_empty());
    }

    #[test]
    fn test_unparsable_token() {
        let (shell, log) = shell_with(&[("set <INT>", "set")]);
        assert!(!shell.execute("set abc"));
        assert_eq!(
            shell.try_execute("set abc"),
            Err(ExecError::UnparsableToken {
                token: "abc".into(),
                tag: "<INT>",
                source: ParseError::InvalidInteger,
            })
        );
        assert!(calls(&log).is_empty());
    }

    #[test]
    fn test_unknown_subcommand_runs_nothing() {
        let (shell, log) = shell_with(&[("config set <STRING>", "set")]);
        assert_eq!(
            shell.try_execute("config unset x"),
            Err(ExecError::UnknownCommand { name: "unset".into() })
        );
        assert_eq!(
            shell.try_execute("config"),
            Err(ExecError::MissingArgument { command: "config".into(), expected: "a subcommand" })
        );
        assert!(calls(&log).is_empty());
        assert!(shell.execute("config set x"));
        assert_eq!(calls(&log), vec!["set x"]);
    }

    #[test]
    fn test_unknown_root() {
        let (shell, _) = shell_with(&[("set <INT>", "set")]);
        assert_eq!(
            shell.try_execute("get 1"),
            Err(ExecError::UnknownCommand { name: "get".into() })
        );
        assert!(!shell.execute(""));
    }

    #[test]
    fn test_exact_arity_only() {
        let (shell, log) = shell_with(&[("move <INT> <INT>", "move")]);
        assert!(!shell.execute("move 1"));
        assert_eq!(
            shell.try_execute("move 1 2 3"),
            Err(ExecError::TooManyArguments { command: "move".into(), extra: "3".into() })
        );
        assert!(calls(&log).is_empty());
        assert!(shell.execute("move 1 -2"));
        assert_eq!(calls(&log), vec!["move 1 -2"]);
    }

    #[test]
    fn test_partial_failure_runs_nothing() {
        let (shell, log) = shell_with(&[("put <UBYTE> <STRING> <SHORT>", "put")]);
        assert!(!shell.execute("put 1 name 99999"));
        assert!(!shell.execute("put 300 name 1"));
        assert!(calls(&log).is_empty());
        assert!(shell.execute("put 255 name -1"));
        assert_eq!(calls(&log), vec!["put 255 name -1"]);
    }

    #[test]
    fn test_values_before_and_after_nesting() {
        let (shell, log) = shell_with(&[
            ("dev <UBYTE> reg <USHORT> <UINT>", "reg"),
            ("dev <UBYTE> reset", "reset"),
        ]);
        assert!(shell.execute("dev 3 reg 16 4096"));
        assert!(shell.execute("dev 7 reset"));
        assert!(!shell.execute("dev reset"));
        assert_eq!(calls(&log), vec!["reg 3 16 4096", "reset 7"]);
    }

    #[test]
    fn test_trailing_line_ending_is_ignored() {
        let (shell, log) = shell_with(&[("ping", "ping")]);
        assert!(shell.execute("ping\r\n"));
        assert!(shell.execute("  ping"));
        assert_eq!(calls(&log).len(), 2);
    }

    #[test]
    fn test_scratch_capacity_bounds_values() {
        let mut shell: Shell<8> = Shell::new();
        let log: Log = Rc::default();
        shell.register("say <STRING>", recorder(&log, "say")).unwrap();
        assert_eq!(shell.max_arg_len(), 8);
        assert!(shell.execute("say 12345678"));
        assert_eq!(
            shell.try_execute("say 123456789"),
            Err(ExecError::UnparsableToken {
                token: "123456789".into(),
                tag: "<STRING>",
                source: ParseError::TooLong { max: 8 },
            })
        );
        assert_eq!(calls(&log), vec!["say 12345678"]);
    }

    #[test]
    fn test_context_reaches_handler() {
        let out = Rc::new(RefCell::new(0u32));
        let sink = Rc::clone(&out);
        let mut shell = DefaultShell::new();
        shell
            .register_with_context(
                "scale <UINT>",
                move |b: &ArgBundle<'_>| {
                    let factor = b.context::<u32>().copied().unwrap_or(0);
                    *sink.borrow_mut() = b.next_as::<u32>().unwrap_or(0) * factor;
                },
                10u32,
            )
            .unwrap();
        assert!(shell.execute("scale 7"));
        assert_eq!(*out.borrow(), 70);
    }

    #[test]
    fn test_every_value_kind() {
        let (shell, log) = shell_with(&[(
            "all <CHAR> <BYTE> <UBYTE> <SHORT> <USHORT> <INT> <UINT> <LONG> <ULONG> <LLONG> <ULLONG> <STRING> <PTR>",
            "all",
        )]);
        assert!(shell.execute("all z -1 2 -3 4 -5 6 -7 8 -9 10 txt 0x1f"));
        assert_eq!(calls(&log), vec!["all z -1 2 -3 4 -5 6 -7 8 -9 10 txt 0x1f"]);
    }

    #[test]
    fn test_next_state_table() {
        let mut registry = Registry::new();
        registry.register("a <INT> b", |_: &ArgBundle<'_>| {}).unwrap();
        let a = registry.lookup("a").unwrap();
        assert_eq!(next_state(a, 0), State::ValueExpected);
        assert_eq!(next_state(a, 1), State::CommandExpected);
        assert_eq!(next_state(registry.lookup("a b").unwrap(), 0), State::Ready);
        assert_eq!(next_state(a, 3), State::Unreachable);
    }

    #[test]
    fn test_absent_child_is_not_a_fault() {
        let (shell, _) = shell_with(&[("a <INT> b", "b")]);
        let err = shell.try_execute("a 1 c").unwrap_err();
        assert_eq!(err, ExecError::UnknownCommand { name: "c".into() });
        assert_ne!(err, ExecError::Fault);
    }

    #[test]
    fn test_shell_over_prebuilt_registry() {
        let log: Log = Rc::default();
        let mut registry = Registry::new();
        registry.register("ping", recorder(&log, "ping")).unwrap();
        let shell = DefaultShell::with_registry(registry);
        assert!(shell.lookup("ping").is_some());
        assert!(shell.execute("ping"));
        assert_eq!(calls(&log), vec!["ping"]);
    }

    #[test]
    fn test_handler_sees_values_in_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut shell = DefaultShell::new();
        shell
            .register("pair <CHAR> <LLONG>", move |b: &ArgBundle<'_>| {
                sink.borrow_mut().extend(b.values().map(|v| v.kind()));
                assert_eq!(b.values().nth(1), Some(Value::LLong(-4)));
            })
            .unwrap();
        assert!(shell.execute("pair q -4"));
        assert_eq!(seen.borrow().len(), 2);
    }
}
