//! Row factories for tests and fixtures

use serde_json::Value;
use std::sync::Arc;

use crate::error::{ConfigError, Result};
use super::base::{Model, ModelInstance};

/// Produces the value of one attribute per generated row
pub enum Generator {
    Value(Value),
    Fn(Box<dyn FnMut() -> Value + Send>),
}

impl Generator {
    fn evaluate(&mut self) -> Value {
        match self {
            Generator::Value(value) => value.clone(),
            Generator::Fn(generate) => generate(),
        }
    }
}

impl From<Value> for Generator {
    fn from(value: Value) -> Self {
        Generator::Value(value)
    }
}

/// Generates instances of a model from per-column generators
pub struct ModelFactory {
    model: Arc<Model>,
    attributes: Vec<(String, Generator)>,
}

impl ModelFactory {
    pub fn new(model: &Arc<Model>) -> Self {
        Self {
            model: Arc::clone(model),
            attributes: Vec::new(),
        }
    }

    /// Constant attribute
    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<Generator>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Attribute computed for every row
    pub fn attribute_with<F>(mut self, name: impl Into<String>, generate: F) -> Self
    where
        F: FnMut() -> Value + Send + 'static,
    {
        self.attributes.push((name.into(), Generator::Fn(Box::new(generate))));
        self
    }

    /// Factory attributes must name exactly the model's declared columns
    fn validate(&self) -> std::result::Result<(), ConfigError> {
        let mut declared = self.model.columns().declared_names();
        let mut attributes: Vec<String> = self.attributes.iter().map(|(name, _)| name.clone()).collect();
        declared.sort();
        attributes.sort();
        if attributes != declared {
            return Err(ConfigError::FactoryMismatch {
                model: self.model.name.clone(),
                attributes,
                columns: declared,
            });
        }
        Ok(())
    }

    /// Generate `n` instances
    pub fn create_rows(&mut self, n: usize) -> Result<Vec<ModelInstance>> {
        self.validate()?;
        let mut rows = Vec::with_capacity(n);
        for _ in 0..n {
            let values: Vec<(String, Value)> = self
                .attributes
                .iter_mut()
                .map(|(name, generator)| (name.clone(), generator.evaluate()))
                .collect();
            rows.push(self.model.instance(values)?);
        }
        Ok(rows)
    }
}
