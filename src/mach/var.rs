use super::Val;
use crate::error;
use crate::lang::Error;
use std::collections::HashMap;

type Result<T> = std::result::Result<T, Error>;

/// ## Variable memory
///
/// Scalars and arrays live in separate name-spaces keyed by the same
/// canonical name (upper-cased, `$`/`%` suffix preserved). Fetching an
/// undefined scalar yields the type default.

#[derive(Debug, Default)]
pub struct Var {
    vars: HashMap<String, Val>,
}

fn default_for(var_name: &str) -> Val {
    if var_name.ends_with('$') {
        Val::String(String::new())
    } else {
        Val::Number(0.0)
    }
}

fn check_kind(var_name: &str, value: &Val) -> Result<()> {
    if var_name.ends_with('$') != value.is_string() {
        Err(error!(TypeMismatch))
    } else {
        Ok(())
    }
}

impl Var {
    pub fn new() -> Var {
        Var::default()
    }

    pub fn clear(&mut self) {
        self.vars.clear();
    }

    pub fn fetch(&self, var_name: &str) -> Val {
        match self.vars.get(var_name) {
            Some(val) => val.clone(),
            None => default_for(var_name),
        }
    }

    pub fn store(&mut self, var_name: &str, value: Val) -> Result<()> {
        check_kind(var_name, &value)?;
        self.vars.insert(var_name.to_string(), value);
        Ok(())
    }
}

#[derive(Debug)]
struct Array {
    dims: Vec<usize>,
    cells: Vec<Val>,
}

impl Array {
    fn new(var_name: &str, dims: Vec<usize>) -> Array {
        let size = dims.iter().map(|d| d + 1).product();
        let cells = vec![default_for(var_name); size];
        Array { dims, cells }
    }

    /// Row-major offset; bounds are inclusive so each axis holds d+1
    /// elements.
    fn offset(&self, subscripts: &[usize]) -> Result<usize> {
        if subscripts.len() != self.dims.len() {
            return Err(error!(SubscriptOutOfRange));
        }
        let mut offset = 0;
        for (subscript, dim) in subscripts.iter().zip(&self.dims) {
            if subscript > dim {
                return Err(error!(SubscriptOutOfRange));
            }
            offset = offset * (dim + 1) + subscript;
        }
        Ok(offset)
    }
}

#[derive(Debug, Default)]
pub struct Arrays {
    arrays: HashMap<String, Array>,
}

impl Arrays {
    pub fn new() -> Arrays {
        Arrays::default()
    }

    pub fn clear(&mut self) {
        self.arrays.clear();
    }

    pub fn dimension(&mut self, var_name: &str, dims: Vec<usize>) -> Result<()> {
        if self.arrays.contains_key(var_name) {
            return Err(error!(RedimensionedArray));
        }
        self.arrays
            .insert(var_name.to_string(), Array::new(var_name, dims));
        Ok(())
    }

    /// Undeclared arrays spring into being with every axis sized 10, as
    /// the ROM interpreter did on first reference.
    fn entry(&mut self, var_name: &str, rank: usize) -> &mut Array {
        self.arrays
            .entry(var_name.to_string())
            .or_insert_with(|| Array::new(var_name, vec![10; rank]))
    }

    pub fn fetch(&mut self, var_name: &str, subscripts: &[usize]) -> Result<Val> {
        let array = self.entry(var_name, subscripts.len());
        let offset = array.offset(subscripts)?;
        Ok(array.cells[offset].clone())
    }

    pub fn store(&mut self, var_name: &str, subscripts: &[usize], value: Val) -> Result<()> {
        check_kind(var_name, &value)?;
        let array = self.entry(var_name, subscripts.len());
        let offset = array.offset(subscripts)?;
        array.cells[offset] = value;
        Ok(())
    }
}
