//! Hierarchical command registry with a typed argument grammar.
//!
//! Commands are registered from textual specs such as
//! `"config <UBYTE> set <STRING>"`: bare words name commands, `<TAG>` words
//! declare typed positional values, and a word after values opens a nested
//! subcommand. A [`Shell`] then runs input lines against the tree: it
//! descends command by command, converts every value through its
//! descriptor and calls the bound handler with an [`ArgBundle`] once the
//! line matches a full path exactly.
//!
//! ```
//! use cmd_core::{ArgBundle, DefaultShell};
//!
//! let mut shell = DefaultShell::new();
//! shell
//!     .register("led <UBYTE> on", |args: &ArgBundle<'_>| {
//!         let index: u8 = args.next_as().unwrap_or_default();
//!         println!("led {index} on");
//!     })
//!     .unwrap();
//!
//! assert!(shell.execute("led 3 on"));
//! assert!(!shell.execute("led 300 on"));
//! ```

pub mod bundle;
pub mod engine;
pub mod error;
pub mod node;
pub mod registry;
pub mod spec;
pub mod table;
pub mod tokenizer;
pub mod types;

pub use bundle::{ArgBundle, FromArg};
pub use engine::{DefaultShell, Shell, State};
pub use error::{ExecError, ParseError, RegisterError};
pub use node::{CommandNode, Context, Handler};
pub use registry::Registry;
pub use spec::CommandSpec;
pub use tokenizer::TokenizedInput;
pub use types::{Descriptor, Kind, Value};
