use crate::console::Console;
use crate::dispatcher::{Dispatcher, Termination};
use crate::error::{ConsoleError, MenuError};
use crate::menu::Menu;
use crate::prompt::{Form, Prompt};
use crate::registry::Registry;
use anyhow::Result;

/// A unit of executable behavior with a display title.
///
/// Implementors only produce side effects; an `Err` is reported by the menu
/// that invoked the command and the menu carries on.
pub trait Command {
    fn title(&self) -> &str;

    fn execute(&mut self, console: &mut dyn Console) -> Result<()>;
}

/// Side-effecting action run by a menu item.
pub type Action = Box<dyn FnMut(&mut dyn Console) -> Result<()>>;

/// A closure wearing a title.
pub struct FnCommand<F> {
    title: String,
    action: F,
}

impl<F> FnCommand<F>
where
    F: FnMut(&mut dyn Console) -> Result<()>,
{
    pub fn new(title: impl Into<String>, action: F) -> Self {
        Self {
            title: title.into(),
            action,
        }
    }
}

impl<F> Command for FnCommand<F>
where
    F: FnMut(&mut dyn Console) -> Result<()>,
{
    fn title(&self) -> &str {
        &self.title
    }

    fn execute(&mut self, console: &mut dyn Console) -> Result<()> {
        (self.action)(console)
    }
}

/// A prompt that must complete before its action runs.
pub trait PromptedCommand {
    /// Collects and commits the prompt's fields.
    fn prompt(&mut self, console: &mut dyn Console) -> Result<()>;

    /// Runs the action once the prompt has completed.
    fn execute(&mut self, console: &mut dyn Console) -> Result<()>;
}

/// Pairs a [`Form`] with the action that consumes it.
///
/// The form persists between selections, so every run overwrites the
/// previous answers.
pub struct FormAction<T, F> {
    form: T,
    prompt: Prompt,
    action: F,
}

impl<T, F> FormAction<T, F>
where
    T: Form,
    F: FnMut(&mut T, &mut dyn Console) -> Result<()>,
{
    pub fn new(form: T, registry: &Registry, action: F) -> Self {
        let prompt = Prompt::bind(&form, registry);
        Self {
            form,
            prompt,
            action,
        }
    }
}

impl<T, F> PromptedCommand for FormAction<T, F>
where
    T: Form,
    F: FnMut(&mut T, &mut dyn Console) -> Result<()>,
{
    fn prompt(&mut self, console: &mut dyn Console) -> Result<()> {
        self.prompt.run(console, &mut self.form)
    }

    fn execute(&mut self, console: &mut dyn Console) -> Result<()> {
        (self.action)(&mut self.form, console)
    }
}

/// Whether a [`MenuCommand`]'s own body runs before or after its menu.
///
/// A before-menu body that fails keeps the menu closed: the dispatcher
/// reports the error and stays in the parent menu, and
/// [`Command::execute`] on a root [`MenuCommand`] returns the error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecuteOrder {
    #[default]
    BeforeMenu,
    AfterMenu,
}

/// Display order of a menu's items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MenuOrder {
    /// Registration order.
    #[default]
    None,
    ByKey,
    ByTitle,
}

/// A command that owns a nested [`Menu`].
///
/// Selecting it from a parent menu runs the body (if any) and the nested
/// menu's loop in the configured [`ExecuteOrder`].
pub struct MenuCommand {
    title: String,
    menu: Menu,
    order: ExecuteOrder,
    body: Option<Action>,
}

impl MenuCommand {
    pub fn new(title: impl Into<String>) -> Self {
        let title = title.into();
        Self {
            menu: Menu::titled(title.clone()),
            title,
            order: ExecuteOrder::default(),
            body: None,
        }
    }

    pub fn with_execute_order(mut self, order: ExecuteOrder) -> Self {
        self.order = order;
        self
    }

    pub fn with_menu_order(mut self, order: MenuOrder) -> Self {
        self.menu.set_order(order);
        self
    }

    pub fn with_exit_on_bad_selection(mut self, exit: bool) -> Self {
        self.menu.set_exit_on_bad_selection(exit);
        self
    }

    /// The command's own behavior, run once per selection.
    pub fn on_execute<F>(mut self, body: F) -> Self
    where
        F: FnMut(&mut dyn Console) -> Result<()> + 'static,
    {
        self.body = Some(Box::new(body));
        self
    }

    /// Binds `key` to a zero-argument action.
    pub fn add<F>(&mut self, title: impl Into<String>, key: char, action: F) -> Result<&mut Self, MenuError>
    where
        F: FnMut(&mut dyn Console) -> Result<()> + 'static,
    {
        self.menu.add(title, key, action)?;
        Ok(self)
    }

    /// Binds `key` to prompting for `form`, then running `action`.
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
        self.menu.add_prompted(title, key, form, action)?;
        Ok(self)
    }

    pub fn execute_order(&self) -> ExecuteOrder {
        self.order
    }

    pub fn menu(&self) -> &Menu {
        &self.menu
    }

    pub fn menu_mut(&mut self) -> &mut Menu {
        &mut self.menu
    }

    pub(crate) fn run_body(&mut self, console: &mut dyn Console) -> Result<()> {
        match self.body.as_mut() {
            Some(body) => body(console),
            None => Ok(()),
        }
    }
}

impl Command for MenuCommand {
    fn title(&self) -> &str {
        &self.title
    }

    /// Runs this command as the root of its own session.
    ///
    /// Input closing while the menu is active ends the session without the
    /// after-menu body and reports [`ConsoleError::Closed`].
    fn execute(&mut self, console: &mut dyn Console) -> Result<()> {
        if self.order == ExecuteOrder::BeforeMenu {
            self.run_body(console)?;
        }
        match Dispatcher::new().run(&mut self.menu, console)? {
            Termination::Left => {}
            Termination::InputClosed => return Err(ConsoleError::Closed.into()),
        }
        if self.order == ExecuteOrder::AfterMenu {
            self.run_body(console)?;
        }
        Ok(())
    }
}
