//! Prompt template rendering.
//!
//! Templates use Tera syntax. Variables come from the serialized input, so
//! nested fields are addressed with dots (`{{ profile.location }}`) and
//! absent optional fields render as empty text.

use serde::Serialize;
use tera::{Context, Tera};

use crate::error::{Error, Result};

/// A named, pre-compiled prompt template.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    name: String,
    tera: Tera,
}

impl PromptTemplate {
    /// Compile a template. Syntax errors surface here, not at render time.
    pub fn new(name: impl Into<String>, source: &str) -> Result<Self> {
        let name = name.into();
        let mut tera = Tera::default();
        // Prompts are plain text; HTML escaping would mangle user input.
        tera.autoescape_on(vec![]);
        tera.add_raw_template(&name, source)
            .map_err(|e| Error::Template(format!("{}: {}", name, describe(&e))))?;
        Ok(Self { name, tera })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Render with the fields of `input` as variables.
    pub fn render<T: Serialize>(&self, input: &T) -> Result<String> {
        let context = Context::from_serialize(input)
            .map_err(|e| Error::Template(format!("{}: {}", self.name, describe(&e))))?;

        self.tera
            .render(&self.name, &context)
            .map_err(|e| Error::Template(format!("{}: {}", self.name, describe(&e))))
    }
}

/// Tera nests the useful message in the error source chain.
fn describe(err: &tera::Error) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
