//! # Prompt Binder
//!
//! A host type opts into prompting by implementing [`Form`]: it lists its
//! prompted members as [`Field`] markers, reports each member's declared
//! [`SemanticType`], and accepts parsed values through [`Form::assign`].
//!
//! [`Prompt::bind`] turns those markers into an ordered [`Prompt`], choosing
//! each field's validator from the marker or by inference through a
//! [`Registry`]. [`Prompt::run`] collects the fields one after another,
//! re-asking until the input validates, and hands every accepted value to the
//! form exactly once.
//!
//! ```
//! use keymenu::{AssignError, Field, Form, Prompt, Registry, ScriptedConsole, SemanticType, Value};
//!
//! #[derive(Default)]
//! struct Login { user: String, password: String }
//!
//! impl Form for Login {
//!     fn fields(&self) -> Vec<Field> {
//!         vec![Field::new("user", "User"), Field::new("password", "Password").secret()]
//!     }
//!     fn field_type(&self, name: &str) -> Option<SemanticType> {
//!         matches!(name, "user" | "password").then_some(SemanticType::String)
//!     }
//!     fn assign(&mut self, name: &str, value: Value) -> Result<(), AssignError> {
//!         let text = value.to_string();
//!         match name {
//!             "user" => self.user = text,
//!             "password" => self.password = text,
//!             _ => return Err(AssignError::UnknownField(name.to_string())),
//!         }
//!         Ok(())
//!     }
//! }
//!
//! let mut login = Login::default();
//! let mut console = ScriptedConsole::from_lines(&["", "alice", "s3cret"]);
//! Prompt::bind(&login, &Registry::default()).run(&mut console, &mut login).unwrap();
//! assert_eq!(login.user, "alice");
//! assert_eq!(login.password, "s3cret");
//! ```

use crate::console::Console;
use crate::error::AssignError;
use crate::registry::Registry;
use crate::validator::Validator;
use crate::value::{SemanticType, Value};
use anyhow::{Context, Result};
use log::debug;

/// Marker placed on a form member to have it prompted.
#[derive(Debug, Clone)]
pub struct Field {
    name: String,
    label: String,
    secret: bool,
    validator: Option<Validator>,
}

impl Field {
    /// Marks member `name`, shown to the user as `label`.
    pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            secret: false,
            validator: None,
        }
    }

    /// Input for this field is masked.
    pub fn secret(mut self) -> Self {
        self.secret = true;
        self
    }

    /// Uses `validator` instead of inferring one from the member's type.
    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_secret(&self) -> bool {
        self.secret
    }
}

/// A type whose members can be filled in by a [`Prompt`].
pub trait Form {
    /// Prompted members, in prompting order.
    fn fields(&self) -> Vec<Field>;

    /// Declared type of member `name`; `None` if there is no such member.
    fn field_type(&self, name: &str) -> Option<SemanticType>;

    /// Stores an accepted value into member `name`.
    fn assign(&mut self, name: &str, value: Value) -> Result<(), AssignError>;
}

/// One labeled, validated input of a prompt.
#[derive(Debug, Clone)]
pub struct PromptEntry {
    pub field: String,
    pub label: String,
    pub validator: Validator,
    pub secret: bool,
}

/// An ordered sequence of entries collected one at a time.
#[derive(Debug, Clone, Default)]
pub struct Prompt {
    entries: Vec<PromptEntry>,
}

impl Prompt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry; `field` names where the value goes.
    pub fn push(
        &mut self,
        field: impl Into<String>,
        label: impl Into<String>,
        validator: Validator,
        secret: bool,
    ) -> &mut Self {
        self.entries.push(PromptEntry {
            field: field.into(),
            label: label.into(),
            validator,
            secret,
        });
        self
    }

    /// Builds the prompt for `target` from its field markers.
    pub fn bind<T: Form + ?Sized>(target: &T, registry: &Registry) -> Self {
        let mut prompt = Self::new();
        for field in target.fields() {
            let validator = match field.validator {
                Some(v) => v,
                None => registry.instance_by_property(target, &field.name),
            };
            prompt.push(field.name, field.label, validator, field.secret);
        }
        prompt
    }

    pub fn entries(&self) -> &[PromptEntry] {
        &self.entries
    }

    /// Collects every entry in order, assigning each accepted value to `target`.
    pub fn run<T: Form + ?Sized>(&mut self, console: &mut dyn Console, target: &mut T) -> Result<()> {
        for entry in &mut self.entries {
            let value = ask(console, entry)?;
            debug!("field `{}` accepted", entry.field);
            target
                .assign(&entry.field, value)
                .with_context(|| format!("assigning field `{}`", entry.field))?;
        }
        Ok(())
    }

    /// Collects every entry in order and returns `(field, value)` pairs.
    pub fn collect(&mut self, console: &mut dyn Console) -> Result<Vec<(String, Value)>> {
        let mut answers = Vec::with_capacity(self.entries.len());
        for entry in &mut self.entries {
            let value = ask(console, entry)?;
            answers.push((entry.field.clone(), value));
        }
        Ok(answers)
    }
}

/// Asks for one entry until its validator accepts the input.
fn ask(console: &mut dyn Console, entry: &mut PromptEntry) -> Result<Value> {
    let label = format!("{}: ", entry.label);
    loop {
        let raw = if entry.secret {
            console.read_secret(&label)?
        } else {
            console.read_line(&label)?
        };
        if entry.validator.validate(&raw) {
            if let Some(value) = entry.validator.value() {
                return Ok(value.clone());
            }
        }
        console.write_line(entry.validator.error_message())?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConsoleError;
    use crate::io_adapters::{ReadKind, ScriptedConsole};
    use crate::value::Number;

    #[derive(Default)]
    struct Signup {
        name: String,
        age: i32,
        email: String,
        pin: String,
        assigned: Vec<String>,
    }

    impl Form for Signup {
        fn fields(&self) -> Vec<Field> {
            vec![
                Field::new("name", "Name"),
                Field::new("age", "Age").with_validator(Validator::int_range(1, 120)),
                Field::new("email", "Email").with_validator(Validator::email()),
                Field::new("pin", "PIN").secret(),
            ]
        }

        fn field_type(&self, name: &str) -> Option<SemanticType> {
            match name {
                "name" | "email" | "pin" => Some(SemanticType::String),
                "age" => Some(SemanticType::Int),
                _ => None,
            }
        }

        fn assign(&mut self, name: &str, value: Value) -> Result<(), AssignError> {
            self.assigned.push(name.to_string());
            match (name, value) {
                ("age", Value::Number(Number::Int(n))) => self.age = n,
                ("name", Value::Text(s)) => self.name = s,
                ("email", Value::Text(s)) => self.email = s,
                ("pin", Value::Text(s)) => self.pin = s,
                (field, other) => {
                    return Err(AssignError::Mismatch {
                        field: field.to_string(),
                        expected: "text",
                        got: other.variant_name(),
                    });
                }
            }
            Ok(())
        }
    }

    #[test]
    fn test_bind_orders_entries_and_picks_validators() {
        let form = Signup::default();
        let prompt = Prompt::bind(&form, &Registry::default());
        let names: Vec<&str> = prompt.entries().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(names, vec!["name", "age", "email", "pin"]);
        assert_eq!(prompt.entries()[0].validator.assigns(), SemanticType::String);
        assert_eq!(
            prompt.entries()[1].validator.error_message(),
            "Value must be between [1] and [120]"
        );
        assert!(prompt.entries()[3].secret);
        assert!(!prompt.entries()[0].secret);
    }

    #[test]
    fn test_run_reprompts_until_valid_and_assigns_once() {
        let mut form = Signup::default();
        let mut console =
            ScriptedConsole::from_lines(&["Ada", "200", "abc", "36", "nope", "ada@example.org", "1234"]);

        let mut prompt = Prompt::bind(&form, &Registry::default());
        prompt.run(&mut console, &mut form).unwrap();

        assert_eq!(form.name, "Ada");
        assert_eq!(form.age, 36);
        assert_eq!(form.email, "ada@example.org");
        assert_eq!(form.pin, "1234");
        assert_eq!(form.assigned, vec!["name", "age", "email", "pin"]);

        let out = console.output();
        assert_eq!(out.matches("Value must be between [1] and [120]").count(), 2);
        assert_eq!(out.matches("value must be an email address").count(), 1);
        assert!(!out.contains("1234"));
        assert_eq!(console.reads().last(), Some(&ReadKind::Secret));
    }

    #[test]
    fn test_run_stops_when_input_closes() {
        let mut form = Signup::default();
        let mut console = ScriptedConsole::from_lines(&["Ada"]);
        let err = Prompt::bind(&form, &Registry::default())
            .run(&mut console, &mut form)
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConsoleError>(),
            Some(ConsoleError::Closed)
        ));
        assert_eq!(form.assigned, vec!["name"]);
    }

    #[test]
    fn test_collect_returns_answers_in_order() {
        let mut prompt = Prompt::new();
        prompt
            .push("host", "Host", Validator::ip(), false)
            .push("verbose", "Verbose", Validator::boolean(), false);
        let mut console = ScriptedConsole::from_lines(&["localhost", "10.0.0.1", "t"]);
        let answers = prompt.collect(&mut console).unwrap();
        assert_eq!(answers.len(), 2);
        assert_eq!(answers[0].0, "host");
        assert_eq!(answers[0].1.to_string(), "10.0.0.1");
        assert_eq!(answers[1].1, Value::Bool(true));
    }
}
