//! Building blocks for interactive text-console applications.
//!
//! The crate binds raw console input to strongly typed values and drives
//! nested, key-selectable menus:
//!
//! - [`validator`] parses and constrains raw text into a typed [`Value`];
//!   [`registry`] infers a default validator from a declared [`SemanticType`].
//! - [`prompt`] assembles validated, optionally masked fields for a [`Form`]
//!   and collects them one by one.
//! - [`menu`], [`command`] and [`dispatcher`] compose key-bound menus of
//!   commands, nested menus and prompted actions, and run them.
//!
//! Everything is single-threaded and blocks only on console reads. Output and
//! input go through the [`Console`] trait: [`Terminal`] for real sessions,
//! [`ScriptedConsole`] for tests and scripts.
//!
//! ```
//! use keymenu::{Menu, ScriptedConsole, Termination};
//!
//! let mut menu = Menu::titled("Main");
//! menu.add("Say hello", 'h', |console| {
//!     console.write_line("hello")?;
//!     Ok(())
//! })
//! .unwrap()
//! .add_back("Quit", 'q')
//! .unwrap();
//!
//! let mut console = ScriptedConsole::from_lines(&["h", "q"]);
//! assert_eq!(menu.run(&mut console).unwrap(), Termination::Left);
//! assert!(console.output().contains("hello"));
//! ```

pub mod command;
pub mod console;
pub mod dispatcher;
pub mod error;
mod io_adapters;
pub mod menu;
pub mod prompt;
pub mod registry;
pub mod validator;
pub mod value;

pub use command::{Command, ExecuteOrder, FnCommand, FormAction, MenuCommand, MenuOrder, PromptedCommand};
pub use console::{Console, Terminal};
pub use dispatcher::{Dispatcher, Termination};
pub use error::{AssignError, ConsoleError, MenuError, ValidatorError};
pub use io_adapters::{ReadKind, ScriptedConsole};
pub use menu::{Binding, Menu, MenuItem};
pub use prompt::{Field, Form, Prompt, PromptEntry};
pub use registry::Registry;
pub use validator::{EnumMode, PathKind, PathRule, Pattern, Rule, Validator};
pub use value::{EnumMember, Enumerated, Number, NumericKind, SemanticType, Value};
