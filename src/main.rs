use anyhow::{Context, Result};
use argh::FromArgs;
use keymenu::{
    AssignError, EnumMode, Enumerated, ExecuteOrder, Field, Form, Menu, MenuCommand,
    MenuOrder, Number, Prompt, Registry, SemanticType, Terminal, Termination, Validator, Value,
};

#[derive(FromArgs)]
/// Demo of key-driven console menus with validated prompts.
struct Args {
    #[argh(switch, short = 's')]
    /// list menu items sorted by key instead of registration order.
    sorted: bool,

    #[argh(switch)]
    /// leave a menu when a key matches no item instead of asking again.
    strict: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Role {
    Guest = 0,
    Member = 1,
    Admin = 2,
}

impl Enumerated for Role {
    fn members() -> &'static [(&'static str, i64)] {
        &[("Guest", 0), ("Member", 1), ("Admin", 2)]
    }

    fn from_ordinal(ordinal: i64) -> Option<Self> {
        match ordinal {
            0 => Some(Role::Guest),
            1 => Some(Role::Member),
            2 => Some(Role::Admin),
            _ => None,
        }
    }
}

/// Filled in field by field from the "Account" item.
#[derive(Debug)]
struct Account {
    name: String,
    email: String,
    password: String,
    age: i32,
    role: Role,
    newsletter: bool,
}

impl Default for Account {
    fn default() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            password: String::new(),
            age: 0,
            role: Role::Guest,
            newsletter: false,
        }
    }
}

impl Form for Account {
    fn fields(&self) -> Vec<Field> {
        vec![
            Field::new("name", "Name"),
            Field::new("email", "Email").with_validator(Validator::email()),
            Field::new("password", "Password")
                .secret()
                .with_validator(Validator::strong_password()),
            Field::new("age", "Age").with_validator(Validator::int_range(13, 130)),
            Field::new("role", "Role (Guest, Member, Admin)")
                .with_validator(Validator::enumeration::<Role>(EnumMode::ByName)),
            Field::new("newsletter", "Newsletter"),
        ]
    }

    fn field_type(&self, name: &str) -> Option<SemanticType> {
        match name {
            "name" | "email" | "password" => Some(SemanticType::String),
            "age" => Some(SemanticType::Int),
            "role" => Some(SemanticType::Enum),
            "newsletter" => Some(SemanticType::Bool),
            _ => None,
        }
    }

    fn assign(&mut self, name: &str, value: Value) -> Result<(), AssignError> {
        let got = value.variant_name();
        let mismatch = |expected| AssignError::Mismatch {
            field: name.to_string(),
            expected,
            got,
        };
        match name {
            "name" => self.name = value.to_string(),
            "email" => self.email = value.to_string(),
            "password" => self.password = value.to_string(),
            "age" => match value.as_number() {
                Some(Number::Int(age)) => self.age = age,
                _ => return Err(mismatch("int")),
            },
            "role" => self.role = value.as_enum().ok_or_else(|| mismatch("role"))?,
            "newsletter" => self.newsletter = value.as_bool().ok_or_else(|| mismatch("bool"))?,
            other => return Err(AssignError::UnknownField(other.to_string())),
        }
        Ok(())
    }
}

fn build_menu(args: &Args) -> Result<Menu> {
    let order = if args.sorted {
        MenuOrder::ByKey
    } else {
        MenuOrder::None
    };

    let mut menu = Menu::titled("keymenu demo");
    menu.set_order(order).set_exit_on_bad_selection(args.strict);

    menu.add_prompted("Account", '1', Account::default(), |account, console| {
        console.write_line(&format!(
            "Welcome {} <{}>, age {}, {:?}, newsletter: {}",
            account.name, account.email, account.age, account.role, account.newsletter
        ))?;
        Ok(())
    })?;

    let mut tools = MenuCommand::new("Tools")
        .with_execute_order(ExecuteOrder::BeforeMenu)
        .with_menu_order(order)
        .with_exit_on_bad_selection(true)
        .on_execute(|console| {
            console.write_line("Entering tools; any other key goes back.")?;
            Ok(())
        });
    tools
        .add("Check an address", 'a', |console| {
            let mut prompt = Prompt::new();
            prompt.push("ip", "IP address", Validator::ip(), false);
            for (_, value) in prompt.collect(console)? {
                console.write_line(&format!("{} looks fine", value))?;
            }
            Ok(())
        })?
        .add("Make a directory", 'd', |console| {
            let mut prompt = Prompt::new();
            prompt.push("dir", "Directory", Validator::directory(true, false), false);
            for (_, value) in prompt.collect(console)? {
                console.write_line(&format!("{} is ready", value))?;
            }
            Ok(())
        })?;
    menu.add_submenu('2', tools)?;

    menu.add("Default validators", '3', |console| {
        let registry = Registry::default();
        for ty in [
            SemanticType::String,
            SemanticType::Int,
            SemanticType::Decimal,
            SemanticType::Bool,
            SemanticType::DateTime,
            SemanticType::IpAddr,
        ] {
            let validator = registry.instance_by_type(&ty);
            console.write_line(&format!("{:?}: {}", ty, validator.error_message()))?;
        }
        Ok(())
    })?;

    menu.add_back("Quit", 'q')?;
    Ok(menu)
}

fn main() -> Result<()> {
    env_logger::init();
    let args: Args = argh::from_env();

    let mut menu = build_menu(&args)?;
    let mut terminal = Terminal::new().context("opening terminal")?;

    match menu.run(&mut terminal)? {
        Termination::Left => log::debug!("left main menu"),
        Termination::InputClosed => log::debug!("input closed"),
    }
    Ok(())
}
