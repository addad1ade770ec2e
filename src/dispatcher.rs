//! The menu selection loop.
//!
//! A [`Dispatcher`] drives a root [`Menu`] and every submenu opened from it
//! without recursion: the active menus form an explicit stack of item
//! indices, each naming the submenu item selected in the menu below it.
//!
//! Each turn renders the menu on top of the stack, reads one key and
//! dispatches it:
//! - a command runs, then the menu renders again;
//! - a prompted item collects its fields, then runs its action; a prompt
//!   that fails is reported and the action does not run;
//! - a submenu runs its before-menu body and is pushed, unless the body
//!   fails, in which case the failure is reported and the submenu is skipped;
//! - a back item, or an unbound key when the menu exits on bad selections,
//!   pops the menu and runs its after-menu body.
//!
//! Popping the root ends the run. Closed or interrupted input ends the whole
//! session at once without running pending after-menu bodies. Any other error
//! from a command is written to the console and the menu carries on.

use crate::command::{ExecuteOrder, MenuCommand};
use crate::console::Console;
use crate::error::ConsoleError;
use crate::menu::{Binding, Menu, SELECT_LABEL, parse_key};
use anyhow::{Result, anyhow};
use log::{debug, warn};

/// How a dispatcher run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The root menu was left by a back item or a bad selection.
    Left,
    /// Input closed or was interrupted.
    InputClosed,
}

enum Step {
    Stay,
    Enter(usize),
    Leave,
}

/// Runs nested menu loops on an explicit stack.
#[derive(Debug, Default)]
pub struct Dispatcher {
    stack: Vec<usize>,
    deepest: usize,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of submenus currently open above the root.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Greatest depth reached so far.
    pub fn deepest(&self) -> usize {
        self.deepest
    }

    /// Runs `root` until it is left or input closes.
    pub fn run(&mut self, root: &mut Menu, console: &mut dyn Console) -> Result<Termination> {
        self.stack.clear();
        self.deepest = 0;
        loop {
            let step = match self.turn(root, console) {
                Ok(step) => step,
                Err(e) if is_end_of_input(&e) => {
                    debug!("input closed at depth {}", self.depth());
                    self.stack.clear();
                    return Ok(Termination::InputClosed);
                }
                Err(e) => return Err(e),
            };

            match step {
                Step::Stay => {}
                Step::Enter(index) => {
                    self.stack.push(index);
                    self.deepest = self.deepest.max(self.stack.len());
                    debug!("entered submenu, depth {}", self.depth());
                }
                Step::Leave => {
                    let Some(index) = self.stack.pop() else {
                        debug!("left root menu");
                        return Ok(Termination::Left);
                    };
                    debug!("left submenu, depth {}", self.depth());
                    let parent = menu_at(root, &self.stack)?;
                    let submenu = submenu_in(parent, index)?;
                    if submenu.execute_order() == ExecuteOrder::AfterMenu {
                        if let Err(e) = report(submenu.run_body(console), console) {
                            if is_end_of_input(&e) {
                                return Ok(Termination::InputClosed);
                            }
                            return Err(e);
                        }
                    }
                }
            }
        }
    }

    /// One render, read and dispatch of the menu on top of the stack.
    fn turn(&mut self, root: &mut Menu, console: &mut dyn Console) -> Result<Step> {
        let menu = menu_at(root, &self.stack)?;
        menu.render(console)?;

        let raw = console.read_key(SELECT_LABEL)?;
        let Some(index) = parse_key(&raw).and_then(|key| menu.find(key)) else {
            debug!("bad selection {:?}", raw.trim());
            if menu.exit_on_bad_selection() {
                return Ok(Step::Leave);
            }
            console.write_line(&format!("Invalid selection: {}", raw.trim()))?;
            return Ok(Step::Stay);
        };

        let item = menu
            .item_mut(index)
            .ok_or_else(|| anyhow!("menu item {} vanished", index))?;
        debug!("selected {:?} ({})", item.key(), item.title());

        match item.binding_mut() {
            Binding::Back => Ok(Step::Leave),
            Binding::Command(command) => {
                report(command.execute(console), console)?;
                Ok(Step::Stay)
            }
            Binding::Prompted(prompted) => {
                match prompted.prompt(console) {
                    Ok(()) => report(prompted.execute(console), console)?,
                    Err(e) => report(Err(e), console)?,
                }
                Ok(Step::Stay)
            }
            Binding::Submenu(submenu) => {
                if submenu.execute_order() == ExecuteOrder::BeforeMenu {
                    if let Err(e) = submenu.run_body(console) {
                        report(Err(e), console)?;
                        return Ok(Step::Stay);
                    }
                }
                Ok(Step::Enter(index))
            }
        }
    }
}

fn is_end_of_input(err: &anyhow::Error) -> bool {
    err.downcast_ref::<ConsoleError>()
        .is_some_and(ConsoleError::is_end_of_input)
}

/// Shows a failed command's error and swallows it, unless input has ended.
fn report(result: Result<()>, console: &mut dyn Console) -> Result<()> {
    match result {
        Ok(()) => Ok(()),
        Err(e) if is_end_of_input(&e) => Err(e),
        Err(e) => {
            warn!("command failed: {:#}", e);
            console.write_line(&format!("Error: {:#}", e))?;
            Ok(())
        }
    }
}

/// Walks from `root` along `path` to the active menu.
fn menu_at<'m>(root: &'m mut Menu, path: &[usize]) -> Result<&'m mut Menu> {
    let mut menu = root;
    for &index in path {
        menu = submenu_in(menu, index)?.menu_mut();
    }
    Ok(menu)
}

fn submenu_in(menu: &mut Menu, index: usize) -> Result<&mut MenuCommand> {
    match menu.item_mut(index).map(|item| item.binding_mut()) {
        Some(Binding::Submenu(submenu)) => Ok(submenu),
        _ => Err(anyhow!("item {} is not a submenu", index)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{Command, MenuOrder};
    use crate::error::AssignError;
    use crate::io_adapters::ScriptedConsole;
    use crate::prompt::{Field, Form};
    use crate::value::{SemanticType, Value};
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<String>>>;

    fn recorder(log: &Log, name: &'static str) -> impl FnMut(&mut dyn Console) -> Result<()> + 'static {
        let log = Rc::clone(log);
        move |_console: &mut dyn Console| {
            log.borrow_mut().push(name.to_string());
            Ok(())
        }
    }

    fn entries(log: &Log) -> Vec<String> {
        log.borrow().clone()
    }

    #[test]
    fn test_selecting_a_runs_only_a() {
        let log = Log::default();
        let mut menu = Menu::new();
        menu.set_exit_on_bad_selection(true);
        menu.add("first", 'A', recorder(&log, "A"))
            .unwrap()
            .add("second", 'B', recorder(&log, "B"))
            .unwrap();

        let mut console = ScriptedConsole::from_lines(&["a", "x"]);
        let end = menu.run(&mut console).unwrap();

        assert_eq!(end, Termination::Left);
        assert_eq!(entries(&log), vec!["A"]);
    }

    #[test]
    fn test_unbound_key_with_exit_runs_nothing() {
        let log = Log::default();
        let mut menu = Menu::new();
        menu.set_exit_on_bad_selection(true);
        menu.add("first", 'A', recorder(&log, "A")).unwrap();

        let mut console = ScriptedConsole::from_lines(&["z", "a"]);
        assert_eq!(menu.run(&mut console).unwrap(), Termination::Left);
        assert!(entries(&log).is_empty());
    }

    #[test]
    fn test_unbound_key_without_exit_prompts_again() {
        let log = Log::default();
        let mut menu = Menu::new();
        menu.add("first", 'A', recorder(&log, "A")).unwrap();

        let mut console = ScriptedConsole::from_lines(&["z", "a"]);
        assert_eq!(menu.run(&mut console).unwrap(), Termination::InputClosed);
        assert_eq!(entries(&log), vec!["A"]);
        assert!(console.output().contains("Invalid selection: z"));
        assert_eq!(console.output().matches("  A) first").count(), 3);
    }

    #[test]
    fn test_back_item_leaves_menu() {
        let log = Log::default();
        let mut menu = Menu::new();
        menu.add("first", '1', recorder(&log, "1"))
            .unwrap()
            .add_back("Quit", 'q')
            .unwrap();

        let mut console = ScriptedConsole::from_lines(&["1", "1", "q", "1"]);
        assert_eq!(menu.run(&mut console).unwrap(), Termination::Left);
        assert_eq!(entries(&log), vec!["1", "1"]);
    }

    fn nested(log: &Log, order: ExecuteOrder) -> Menu {
        let mut sub = MenuCommand::new("Sub")
            .with_execute_order(order)
            .with_exit_on_bad_selection(true)
            .on_execute({
                let log = Rc::clone(log);
                move |console: &mut dyn Console| {
                    log.borrow_mut().push("execute".to_string());
                    console.write_line("in execute")?;
                    Ok(())
                }
            });
        sub.add("inner", 'i', recorder(log, "inner")).unwrap();

        let mut root = Menu::titled("Root");
        root.add_submenu('s', sub).unwrap().add_back("Quit", 'q').unwrap();
        root
    }

    #[test]
    fn test_before_menu_runs_body_before_first_render() {
        let log = Log::default();
        let mut root = nested(&log, ExecuteOrder::BeforeMenu);
        let mut console = ScriptedConsole::from_lines(&["s", "i", "x", "q"]);

        assert_eq!(root.run(&mut console).unwrap(), Termination::Left);
        assert_eq!(entries(&log), vec!["execute", "inner"]);
        let out = console.output();
        assert_eq!(out.matches("in execute").count(), 1);
        assert!(out.find("in execute").unwrap() < out.find("  i) inner").unwrap());
    }

    #[test]
    fn test_after_menu_runs_body_after_nested_loop() {
        let log = Log::default();
        let mut root = nested(&log, ExecuteOrder::AfterMenu);
        let mut console = ScriptedConsole::from_lines(&["s", "i", "i", "x", "q"]);

        assert_eq!(root.run(&mut console).unwrap(), Termination::Left);
        assert_eq!(entries(&log), vec!["inner", "inner", "execute"]);
        let out = console.output();
        assert_eq!(out.matches("in execute").count(), 1);
        assert!(out.rfind("  i) inner").unwrap() < out.find("in execute").unwrap());
    }

    #[test]
    fn test_input_closing_skips_pending_after_body() {
        let log = Log::default();
        let mut root = nested(&log, ExecuteOrder::AfterMenu);
        let mut console = ScriptedConsole::from_lines(&["s", "i"]);

        assert_eq!(root.run(&mut console).unwrap(), Termination::InputClosed);
        assert_eq!(entries(&log), vec!["inner"]);
    }

    #[test]
    fn test_deeply_nested_menus_use_the_stack() {
        let log = Log::default();
        let mut level3 = MenuCommand::new("L3");
        level3.add("leaf", 'l', recorder(&log, "leaf")).unwrap();
        level3.menu_mut().add_back("Up", 'u').unwrap();
        let mut level2 = MenuCommand::new("L2");
        level2.menu_mut().add_submenu('d', level3).unwrap().add_back("Up", 'u').unwrap();
        let mut level1 = MenuCommand::new("L1");
        level1.menu_mut().add_submenu('d', level2).unwrap().add_back("Up", 'u').unwrap();
        let mut root = Menu::new();
        root.add_submenu('d', level1).unwrap().add_back("Quit", 'q').unwrap();

        let mut console = ScriptedConsole::from_lines(&["d", "d", "d", "l", "u", "u", "u", "q"]);
        let mut dispatcher = Dispatcher::new();
        assert_eq!(dispatcher.run(&mut root, &mut console).unwrap(), Termination::Left);
        assert_eq!(dispatcher.deepest(), 3);
        assert_eq!(dispatcher.depth(), 0);
        assert_eq!(entries(&log), vec!["leaf"]);
    }

    #[test]
    fn test_failing_command_is_reported_and_loop_continues() {
        let log = Log::default();
        let mut menu = Menu::new();
        menu.add("broken", 'b', |_c: &mut dyn Console| -> Result<()> {
            Err(anyhow!("disk full"))
        })
        .unwrap()
        .add("ok", 'o', recorder(&log, "ok"))
        .unwrap()
        .add_back("Quit", 'q')
        .unwrap();

        let mut console = ScriptedConsole::from_lines(&["b", "o", "q"]);
        assert_eq!(menu.run(&mut console).unwrap(), Termination::Left);
        assert!(console.output().contains("Error: disk full"));
        assert_eq!(entries(&log), vec!["ok"]);
    }

    #[derive(Default)]
    struct Greeting {
        name: String,
    }

    impl Form for Greeting {
        fn fields(&self) -> Vec<Field> {
            vec![Field::new("name", "Name")]
        }

        fn field_type(&self, name: &str) -> Option<SemanticType> {
            (name == "name").then_some(SemanticType::String)
        }

        fn assign(&mut self, name: &str, value: Value) -> Result<(), AssignError> {
            match (name, value) {
                ("name", Value::Text(s)) => {
                    self.name = s;
                    Ok(())
                }
                (field, _) => Err(AssignError::UnknownField(field.to_string())),
            }
        }
    }

    #[test]
    fn test_prompted_item_collects_before_action() {
        let log = Log::default();
        let mut menu = Menu::new();
        let seen = Rc::clone(&log);
        menu.add_prompted("Greet", 'g', Greeting::default(), move |form, console| {
            seen.borrow_mut().push(form.name.clone());
            console.write_line(&format!("Hello, {}!", form.name))?;
            Ok(())
        })
        .unwrap()
        .add_back("Quit", 'q')
        .unwrap();
        assert!(menu.items()[0].has_prompt());

        let mut console = ScriptedConsole::from_lines(&["g", "", "Ada", "q"]);
        assert_eq!(menu.run(&mut console).unwrap(), Termination::Left);
        assert_eq!(entries(&log), vec!["Ada"]);
        let out = console.output();
        assert!(out.contains("value may not be blank"));
        assert!(out.contains("Hello, Ada!"));
    }

    /// Refuses every answer on assign.
    #[derive(Default)]
    struct Stubborn;

    impl Form for Stubborn {
        fn fields(&self) -> Vec<Field> {
            vec![Field::new("name", "Name")]
        }

        fn field_type(&self, name: &str) -> Option<SemanticType> {
            (name == "name").then_some(SemanticType::String)
        }

        fn assign(&mut self, name: &str, value: Value) -> Result<(), AssignError> {
            Err(AssignError::Mismatch {
                field: name.to_string(),
                expected: "int",
                got: value.variant_name(),
            })
        }
    }

    #[test]
    fn test_rejected_assignment_skips_action() {
        let log = Log::default();
        let mut menu = Menu::new();
        let seen = Rc::clone(&log);
        menu.add_prompted("Greet", 'p', Stubborn, move |_form, _console| {
            seen.borrow_mut().push("action".to_string());
            Ok(())
        })
        .unwrap()
        .add_back("Quit", 'q')
        .unwrap();

        let mut console = ScriptedConsole::from_lines(&["p", "Ada", "q"]);
        assert_eq!(menu.run(&mut console).unwrap(), Termination::Left);
        assert!(entries(&log).is_empty());
        assert!(console.output().contains("Error: assigning field `name`"));
    }

    #[test]
    fn test_failing_before_body_does_not_open_submenu() {
        let log = Log::default();
        let mut sub = MenuCommand::new("Locked").on_execute(|_c: &mut dyn Console| -> Result<()> {
            Err(anyhow!("no access"))
        });
        sub.add("inner", 'i', recorder(&log, "inner")).unwrap();
        sub.menu_mut().add_back("Up", 'u').unwrap();
        let mut root = Menu::titled("Root");
        root.add_submenu('s', sub).unwrap().add_back("Quit", 'q').unwrap();

        // `i` is unbound in the root, so it is only run if the submenu opened.
        let mut console = ScriptedConsole::from_lines(&["s", "i", "q"]);
        let mut dispatcher = Dispatcher::new();
        assert_eq!(dispatcher.run(&mut root, &mut console).unwrap(), Termination::Left);
        assert_eq!(dispatcher.deepest(), 0);
        assert!(entries(&log).is_empty());
        let out = console.output();
        assert!(out.contains("Error: no access"));
        assert!(out.contains("Invalid selection: i"));
        assert!(!out.contains("  i) inner"));
    }

    #[test]
    fn test_reused_dispatcher_reports_depth_of_latest_run() {
        let log = Log::default();
        let mut deep = nested(&log, ExecuteOrder::BeforeMenu);
        let mut flat = Menu::new();
        flat.add_back("Quit", 'q').unwrap();

        let mut dispatcher = Dispatcher::new();
        let mut console = ScriptedConsole::from_lines(&["s", "x", "q"]);
        dispatcher.run(&mut deep, &mut console).unwrap();
        assert_eq!(dispatcher.deepest(), 1);

        let mut console = ScriptedConsole::from_lines(&["q"]);
        dispatcher.run(&mut flat, &mut console).unwrap();
        assert_eq!(dispatcher.deepest(), 0);
    }

    #[test]
    fn test_menu_command_as_root_command() {
        let log = Log::default();
        let mut cmd = MenuCommand::new("Tools")
            .with_execute_order(ExecuteOrder::AfterMenu)
            .with_menu_order(MenuOrder::ByKey)
            .with_exit_on_bad_selection(true)
            .on_execute(recorder(&log, "done"));
        cmd.add("run", 'r', recorder(&log, "run")).unwrap();

        let mut console = ScriptedConsole::from_lines(&["r", "-"]);
        cmd.execute(&mut console).unwrap();
        assert_eq!(entries(&log), vec!["run", "done"]);
        assert_eq!(cmd.title(), "Tools");

        let mut closed = ScriptedConsole::from_lines(&["r"]);
        let err = cmd.execute(&mut closed).unwrap_err();
        assert!(is_end_of_input(&err));
    }
}
