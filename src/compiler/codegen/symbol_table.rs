use std::collections::HashMap;
use crate::compiler::codegen::ValueType;

/// Size of one variable slot in bytes.
pub const SLOT_SIZE: usize = 4;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Storage {
    /// Named word in the data section.
    Global(String),
    /// Byte offset into the function's local area.
    Local(usize),
    /// Zero-based argument index; arguments sit above the frame pointer.
    Parameter(usize),
    Function {
        label: String,
        arity: usize,
        returns: ValueType,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub ty: ValueType,
    pub storage: Storage,
}

/// One lexical scope of the code generator. The root table holds globals; every function
/// body gets a table enclosed by the table of the code that defines it.
#[derive(Debug, Default)]
pub struct SymbolTable {
    symbols: HashMap<String, Symbol>,
    parent: Option<Box<SymbolTable>>,

    next_address: usize,
}

impl SymbolTable {
    pub fn new() -> SymbolTable {
        SymbolTable::default()
    }

    /// Opens a new scope with `self` as its parent. Addresses start again at zero.
    pub fn enclosed(self) -> SymbolTable {
        SymbolTable {
            symbols: HashMap::new(),
            parent: Some(Box::new(self)),
            next_address: 0,
        }
    }

    pub fn into_parent(self) -> Option<SymbolTable> {
        self.parent.map(|parent| *parent)
    }

    pub fn is_global(&self) -> bool {
        self.parent.is_none()
    }

    pub fn define(&mut self, name: &str, ty: ValueType, storage: Storage) -> &Symbol {
        let symbol = Symbol { name: name.to_owned(), ty, storage };
        self.symbols.insert(name.to_owned(), symbol);
        &self.symbols[name]
    }

    /// Defines a stack slot and returns its address, reusing the slot when `name` already
    /// lives in this scope.
    pub fn define_local(&mut self, name: &str, ty: ValueType) -> usize {
        let address = match self.symbols.get(name) {
            Some(Symbol { storage: Storage::Local(address), .. }) => *address,
            _ => {
                let address = self.next_address;
                self.next_address += SLOT_SIZE;
                address
            },
        };

        self.define(name, ty, Storage::Local(address));
        address
    }

    /// Looks `name` up, walking outward. Also returns how many scopes were left to find it.
    pub fn resolve(&self, name: &str) -> Option<(&Symbol, usize)> {
        match self.symbols.get(name) {
            Some(symbol) => Some((symbol, 0)),
            None => self.parent.as_ref()
                .and_then(|parent| parent.resolve(name))
                .map(|(symbol, depth)| (symbol, depth + 1)),
        }
    }

    /// Bytes of local storage allocated in this scope so far.
    pub fn local_size(&self) -> usize {
        self.next_address
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    pub fn test_bump_allocation() {
        let mut table = SymbolTable::new().enclosed();

        assert_eq!(0, table.define_local("a", ValueType::Int));
        assert_eq!(4, table.define_local("b", ValueType::Bool));
        assert_eq!(0, table.define_local("a", ValueType::Float));
        assert_eq!(8, table.local_size());
        assert_eq!(Some(ValueType::Float), table.resolve("a").map(|(symbol, _)| symbol.ty));
        assert_eq!(Some(&Storage::Local(4)), table.resolve("b").map(|(symbol, _)| &symbol.storage));
    }

    #[test]
    pub fn test_resolve_walks_outward() {
        let mut global = SymbolTable::new();
        global.define("x", ValueType::Int, Storage::Global(String::from("var_x")));
        assert!(global.is_global());

        let mut function = global.enclosed();
        function.define("p", ValueType::Int, Storage::Parameter(0));
        assert!(!function.is_global());
        assert_eq!(0, function.local_size());

        let inner = function.enclosed();
        assert_eq!(Some(2), inner.resolve("x").map(|(_, depth)| depth));
        assert_eq!(Some(1), inner.resolve("p").map(|(_, depth)| depth));
        assert!(inner.resolve("q").is_none());

        let function = inner.into_parent().expect("inner table has a parent");
        assert_eq!(Some(0), function.resolve("p").map(|(_, depth)| depth));

        let global = function.into_parent().expect("function table has a parent");
        assert!(global.resolve("p").is_none());
        assert!(global.into_parent().is_none());
    }
}
