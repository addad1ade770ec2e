//! Key-bound menus.
//!
//! A [`Menu`] is an ordered list of [`MenuItem`]s, each bound to a single
//! character key. Keys are matched case-insensitively and must be unique
//! within one menu. The loop that drives a menu lives in
//! [`crate::dispatcher`].

use crate::command::{Command, FnCommand, FormAction, MenuCommand, MenuOrder, PromptedCommand};
use crate::console::Console;
use crate::dispatcher::{Dispatcher, Termination};
use crate::error::{ConsoleError, MenuError};
use crate::prompt::Form;
use crate::registry::Registry;
use anyhow::Result;
use log::trace;

/// Label shown when waiting for a selection.
pub const SELECT_LABEL: &str = "Select: ";

/// What selecting an item does.
pub enum Binding {
    Command(Box<dyn Command>),
    /// Prompt first, then act.
    Prompted(Box<dyn PromptedCommand>),
    /// Open a nested menu.
    Submenu(MenuCommand),
    /// Leave the current menu.
    Back,
}

/// One key-bound entry of a menu.
pub struct MenuItem {
    key: char,
    title: String,
    binding: Binding,
}

impl MenuItem {
    pub fn new(key: char, title: impl Into<String>, binding: Binding) -> Self {
        Self {
            key,
            title: title.into(),
            binding,
        }
    }

    pub fn key(&self) -> char {
        self.key
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn binding(&self) -> &Binding {
        &self.binding
    }

    pub(crate) fn binding_mut(&mut self) -> &mut Binding {
        &mut self.binding
    }

    /// `true` when selecting this item prompts for input first.
    pub fn has_prompt(&self) -> bool {
        matches!(self.binding, Binding::Prompted(_))
    }

    fn matches(&self, key: char) -> bool {
        normalize(self.key) == normalize(key)
    }
}

fn normalize(key: char) -> char {
    key.to_ascii_uppercase()
}

/// Reads a selection line as a key: exactly one non-whitespace character.
pub fn parse_key(line: &str) -> Option<char> {
    let mut chars = line.trim().chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

/// An ordered collection of key-bound items.
#[derive(Default)]
pub struct Menu {
    title: Option<String>,
    items: Vec<MenuItem>,
    order: MenuOrder,
    exit_on_bad_selection: bool,
}

impl Menu {
    pub fn new() -> Self {
        Self::default()
    }

    /// A menu that prints `title` above its items.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn set_order(&mut self, order: MenuOrder) -> &mut Self {
        self.order = order;
        self
    }

    pub fn set_exit_on_bad_selection(&mut self, exit: bool) -> &mut Self {
        self.exit_on_bad_selection = exit;
        self
    }

    pub fn exit_on_bad_selection(&self) -> bool {
        self.exit_on_bad_selection
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Adds `item`, rejecting a key already bound in this menu.
    pub fn push(&mut self, item: MenuItem) -> Result<&mut Self, MenuError> {
        if self.find(item.key).is_some() {
            return Err(MenuError::DuplicateKey(item.key));
        }
        self.items.push(item);
        Ok(self)
    }

    /// Binds `key` to a zero-argument action.
    pub fn add<F>(&mut self, title: impl Into<String>, key: char, action: F) -> Result<&mut Self, MenuError>
    where
        F: FnMut(&mut dyn Console) -> Result<()> + 'static,
    {
        let title = title.into();
        let command = FnCommand::new(title.clone(), action);
        self.push(MenuItem::new(key, title, Binding::Command(Box::new(command))))
    }

    /// Binds `key` to prompting for `form` and then running `action` on it.
    /// Field validators not given explicitly are inferred with [`Registry::default`].
    pub fn add_prompted<T, F>(
        &mut self,
        title: impl Into<String>,
        key: char,
        form: T,
        action: F,
    ) -> Result<&mut Self, MenuError>
    where
        T: Form + 'static,
        F: FnMut(&mut T, &mut dyn Console) -> Result<()> + 'static,
    {
        let prompted = FormAction::new(form, &Registry::default(), action);
        self.push(MenuItem::new(key, title, Binding::Prompted(Box::new(prompted))))
    }

    /// Binds `key` to a command, titled by the command itself.
    pub fn add_command<C: Command + 'static>(&mut self, key: char, command: C) -> Result<&mut Self, MenuError> {
        let title = command.title().to_string();
        self.push(MenuItem::new(key, title, Binding::Command(Box::new(command))))
    }

    /// Binds `key` to a nested menu.
    pub fn add_submenu(&mut self, key: char, submenu: MenuCommand) -> Result<&mut Self, MenuError> {
        let title = submenu.title().to_string();
        self.push(MenuItem::new(key, title, Binding::Submenu(submenu)))
    }

    /// Binds `key` to leaving this menu.
    pub fn add_back(&mut self, title: impl Into<String>, key: char) -> Result<&mut Self, MenuError> {
        self.push(MenuItem::new(key, title, Binding::Back))
    }

    /// Items in registration order.
    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    pub(crate) fn item_mut(&mut self, index: usize) -> Option<&mut MenuItem> {
        self.items.get_mut(index)
    }

    /// Index of the item bound to `key`.
    pub fn find(&self, key: char) -> Option<usize> {
        self.items.iter().position(|item| item.matches(key))
    }

    /// Items in display order.
    pub fn display_order(&self) -> Vec<&MenuItem> {
        let mut items: Vec<&MenuItem> = self.items.iter().collect();
        match self.order {
            MenuOrder::None => {}
            MenuOrder::ByKey => items.sort_by_key(|item| normalize(item.key)),
            MenuOrder::ByTitle => items.sort_by(|a, b| a.title.cmp(&b.title)),
        }
        items
    }

    /// Writes the title (if any) and one line per item.
    pub fn render(&self, console: &mut dyn Console) -> Result<(), ConsoleError> {
        trace!("rendering menu {:?}", self.title);
        if let Some(title) = &self.title {
            console.write_line(title)?;
        }
        for item in self.display_order() {
            console.write_line(&format!("  {}) {}", item.key, item.title))?;
        }
        Ok(())
    }

    /// Runs this menu's loop until it is left or input closes.
    pub fn run(&mut self, console: &mut dyn Console) -> Result<Termination> {
        Dispatcher::new().run(self, console)
    }
}
