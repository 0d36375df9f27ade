//! A module: the set of defined functions plus the names of external
//! declarations. Declarations are passed through untouched by call
//! handling — their bodies are not available to analyze.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::function::Function;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Module {
    pub name: String,
    pub functions: IndexMap<String, Function>,
    pub declarations: Vec<String>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), functions: IndexMap::new(), declarations: Vec::new() }
    }

    pub fn add_function(&mut self, f: Function) {
        self.functions.insert(f.name.clone(), f);
    }

    pub fn is_declared_only(&self, name: &str) -> bool {
        self.declarations.iter().any(|d| d == name) && !self.functions.contains_key(name)
    }

    pub fn get_function(&self, name: &str) -> Option<&Function> {
        self.functions.get(name)
    }
}
