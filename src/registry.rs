//! Type-to-validator inference.
//!
//! A [`Registry`] maps a [`SemanticType`] to a factory producing that type's
//! default [`Validator`]. Types without an entry fall back to
//! [`Validator::any_string`], so lookups never fail.

use crate::prompt::Form;
use crate::validator::Validator;
use crate::value::SemanticType;
use log::debug;
use std::collections::HashMap;

/// Builds a fresh default validator.
pub type ValidatorFactory = fn() -> Validator;

/// Explicit mapping from semantic type to default validator.
#[derive(Debug, Clone)]
pub struct Registry {
    factories: HashMap<SemanticType, ValidatorFactory>,
    fallback: ValidatorFactory,
}

impl Registry {
    /// A registry with no entries; every lookup yields the fallback.
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
            fallback: Validator::any_string,
        }
    }

    /// Adds or replaces the default validator for `ty`.
    pub fn register(&mut self, ty: SemanticType, factory: ValidatorFactory) -> &mut Self {
        self.factories.insert(ty, factory);
        self
    }

    pub fn is_registered(&self, ty: &SemanticType) -> bool {
        self.factories.contains_key(ty)
    }

    /// Default validator for `ty`, or the permissive fallback.
    pub fn instance_by_type(&self, ty: &SemanticType) -> Validator {
        match self.factories.get(ty) {
            Some(factory) => factory(),
            None => {
                debug!("no validator registered for {:?}, using fallback", ty);
                (self.fallback)()
            }
        }
    }

    /// Default validator for the declared type of `target`'s field `name`.
    /// Unknown fields get the fallback.
    pub fn instance_by_property<T: Form + ?Sized>(&self, target: &T, name: &str) -> Validator {
        match target.field_type(name) {
            Some(ty) => self.instance_by_type(&ty),
            None => {
                debug!("form has no field `{}`, using fallback", name);
                (self.fallback)()
            }
        }
    }
}

impl Default for Registry {
    /// Text, the five numeric kinds, bool and date-time.
    fn default() -> Self {
        let mut registry = Self::empty();
        registry
            .register(SemanticType::String, Validator::non_blank)
            .register(SemanticType::Int, Validator::int)
            .register(SemanticType::Long, Validator::long)
            .register(SemanticType::Float, Validator::float)
            .register(SemanticType::Double, Validator::double)
            .register(SemanticType::Decimal, Validator::decimal)
            .register(SemanticType::Bool, Validator::boolean)
            .register(SemanticType::DateTime, Validator::date_time);
        registry
    }
}
