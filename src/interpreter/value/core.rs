use crate::{error::RuntimeError,
            interpreter::heap::{Handle, Heap}};

/// Result type used by the object operations.
pub type ObjResult<T> = Result<T, RuntimeError>;

/// Describes one of the built-in types.
///
/// The per-type operation table of the object model is realized as
/// match arms on [`Obj`]; `TypeKind` supplies the type identity and
/// the name used in fault messages. Each kind is also materialized as
/// a pinned `type` object on the heap, self-describing like every
/// other value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    /// 64-bit signed integers with wrap-around arithmetic.
    Int,
    /// The two boolean singletons.
    Bool,
    /// Immutable byte strings.
    Str,
    /// Growable lists of object references.
    List,
    /// The internal fixed-size storage array of a list.
    ObjectArray,
    /// The type of type objects, itself included.
    Type,
}

impl TypeKind {
    /// Every kind, in slot order.
    pub const ALL: [Self; 6] = [Self::Int,
                                Self::Bool,
                                Self::Str,
                                Self::List,
                                Self::ObjectArray,
                                Self::Type];

    /// The name used in fault messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Bool => "bool",
            Self::Str => "str",
            Self::List => "list",
            Self::ObjectArray => "object_array",
            Self::Type => "type",
        }
    }
}

/// A heap-allocated runtime value.
///
/// The first four variants plus `Type` are the values a program can
/// observe. `Array` is the backing storage of `List` and never leaks
/// into an expression result. `Env` and `EnvCell` are the evaluator's
/// variable bindings; keeping them on the heap lets a single rooted
/// handle keep every binding alive across collections.
#[derive(Debug)]
pub enum Obj {
    /// A 64-bit signed integer. Immutable.
    Int(i64),
    /// One of the two singletons. Never allocated outside the pinned
    /// slots.
    Bool(bool),
    /// An immutable byte string.
    Str(Box<[u8]>),
    /// A growable list: its length plus a handle to an `Array` holding
    /// at least `length` initialized slots.
    List {
        /// Number of elements in use.
        length: usize,
        /// Handle of the backing `Array` object.
        items:  Handle,
    },
    /// Fixed-size storage for object references. Unused slots hold the
    /// `false` singleton, which the collector ignores.
    Array(Box<[Handle]>),
    /// A type object.
    Type(TypeKind),
    /// The environment head; `head` points at the most recent
    /// `EnvCell`.
    Env {
        /// The newest binding, or `None` for an empty environment.
        head: Option<Handle>,
    },
    /// One variable binding in the environment list.
    EnvCell {
        /// The variable name.
        name:  Box<str>,
        /// The bound value.
        value: Handle,
        /// The next, older binding.
        next:  Option<Handle>,
    },
}

impl Obj {
    /// The name of the value's type, as used in fault messages.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Int(_) => TypeKind::Int.name(),
            Self::Bool(_) => TypeKind::Bool.name(),
            Self::Str(_) => TypeKind::Str.name(),
            Self::List { .. } => TypeKind::List.name(),
            Self::Array(_) => TypeKind::ObjectArray.name(),
            Self::Type(_) => TypeKind::Type.name(),
            Self::Env { .. } => "environment",
            Self::EnvCell { .. } => "environment cell",
        }
    }

    /// Pushes every outgoing reference onto the collector's worklist.
    pub(in crate::interpreter) fn trace(&self, worklist: &mut Vec<Handle>) {
        match self {
            Self::List { items, .. } => worklist.push(*items),
            Self::Array(slots) => worklist.extend_from_slice(slots),
            Self::Env { head: Some(head) } => worklist.push(*head),
            Self::EnvCell { value, next, .. } => {
                worklist.push(*value);
                if let Some(next) = next {
                    worklist.push(*next);
                }
            },
            _ => {},
        }
    }
}

impl Heap {
    /// Whether the handle refers to an `int`.
    #[must_use]
    pub fn is_int(&self, handle: Handle) -> bool {
        matches!(self.get(handle), Obj::Int(_))
    }

    /// Whether the handle refers to a `str`.
    #[must_use]
    pub fn is_str(&self, handle: Handle) -> bool {
        matches!(self.get(handle), Obj::Str(_))
    }

    /// Whether the handle refers to a `list`.
    #[must_use]
    pub fn is_list(&self, handle: Handle) -> bool {
        matches!(self.get(handle), Obj::List { .. })
    }

    /// The payload of an `int`, or `None` for any other type.
    #[must_use]
    pub fn int_value(&self, handle: Handle) -> Option<i64> {
        match self.get(handle) {
            Obj::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// Converts a value to one of the boolean singletons.
    ///
    /// Numbers are true when nonzero, strings and lists when
    /// non-empty, booleans convert to themselves and type objects are
    /// always true.
    ///
    /// # Errors
    /// Returns `CannotConvertToBool` naming the type when it has no
    /// boolean conversion.
    pub fn as_bool(&self, handle: Handle) -> ObjResult<Handle> {
        match self.get(handle) {
            Obj::Int(value) => Ok(self.new_bool(*value != 0)),
            Obj::Bool(_) => Ok(handle),
            Obj::Str(bytes) => Ok(self.new_bool(!bytes.is_empty())),
            Obj::List { length, .. } => Ok(self.new_bool(*length > 0)),
            Obj::Type(_) => Ok(self.new_bool(true)),
            obj => Err(RuntimeError::CannotConvertToBool { type_name: obj.type_name() }),
        }
    }

    /// Validates a subscript index against a length.
    ///
    /// The index must be an `int`; negative indices count from the
    /// end.
    ///
    /// # Errors
    /// Returns `IndexMustBeInteger` or `IndexOutOfRange`.
    pub fn check_index(&self, index: Handle, len: usize) -> ObjResult<usize> {
        let Some(value) = self.int_value(index) else {
            return Err(RuntimeError::IndexMustBeInteger);
        };
        let len = len as i64;
        let value = if value < 0 { value + len } else { value };
        if value < 0 || value >= len {
            return Err(RuntimeError::IndexOutOfRange);
        }
        Ok(value as usize)
    }

    /// Reads an element through the receiver's type.
    ///
    /// Lists return the stored element; strings return a fresh
    /// one-byte string, which may trigger a collection, so the caller
    /// must keep the receiver reachable.
    ///
    /// # Errors
    /// Returns `NotSubscriptable` naming the type when it has no
    /// element access, or an index fault.
    pub fn get_element(&mut self, handle: Handle, index: Handle) -> ObjResult<Handle> {
        let byte = match self.get(handle) {
            Obj::Str(bytes) => {
                let i = self.check_index(index, bytes.len())?;
                bytes[i]
            },
            Obj::List { length, items } => {
                let i = self.check_index(index, *length)?;
                return Ok(self.array_slots(*items)[i]);
            },
            obj => return Err(RuntimeError::NotSubscriptable { type_name: obj.type_name() }),
        };
        self.new_str(&[byte])
    }

    /// Writes an element through the receiver's type. Only lists
    /// support item assignment.
    ///
    /// # Errors
    /// Returns `NoItemAssignment` naming the type, or an index fault.
    pub fn set_element(&mut self, handle: Handle, index: Handle, value: Handle) -> ObjResult<()> {
        let (length, items) = match self.get(handle) {
            Obj::List { length, items } => (*length, *items),
            obj => return Err(RuntimeError::NoItemAssignment { type_name: obj.type_name() }),
        };
        let i = self.check_index(index, length)?;
        self.array_slots_mut(items)[i] = value;
        Ok(())
    }

    /// Creates an empty list whose storage can hold `initial_capacity`
    /// elements before the first grow.
    ///
    /// The fresh storage array is rooted across the list allocation,
    /// as the collector contract requires for composite objects.
    ///
    /// # Errors
    /// Propagates allocation failure.
    pub fn new_list(&mut self, initial_capacity: usize) -> ObjResult<Handle> {
        let unset = self.new_bool(false);
        let items = self.alloc(Obj::Array(vec![unset; initial_capacity].into_boxed_slice()))?;
        self.root(items)?;
        let list = self.alloc(Obj::List { length: 0, items });
        self.unroot(items);
        list
    }

    /// Appends `item` to a list, growing the storage to `2n + 1` slots
    /// when full.
    ///
    /// Growing allocates, so the caller must keep both the list and
    /// `item` reachable across the call.
    ///
    /// # Errors
    /// Propagates allocation failure.
    pub fn list_append(&mut self, list: Handle, item: Handle) -> ObjResult<()> {
        let (length, items) = match self.get(list) {
            Obj::List { length, items } => (*length, *items),
            obj => panic!("append target must be a list, found {}", obj.type_name()),
        };
        let capacity = self.array_slots(items).len();
        let items = if length == capacity {
            let new_capacity = capacity * 2 + 1;
            let unset = self.new_bool(false);
            let grown = self.alloc(Obj::Array(vec![unset; new_capacity].into_boxed_slice()))?;
            let old = self.array_slots(items).to_vec();
            self.array_slots_mut(grown)[..length].copy_from_slice(&old[..length]);
            match self.get_mut(list) {
                Obj::List { items, .. } => *items = grown,
                _ => unreachable!(),
            }
            grown
        } else {
            items
        };
        self.array_slots_mut(items)[length] = item;
        match self.get_mut(list) {
            Obj::List { length, .. } => *length += 1,
            _ => unreachable!(),
        }
        Ok(())
    }

    /// The number of elements in a list.
    #[must_use]
    pub fn list_length(&self, list: Handle) -> usize {
        match self.get(list) {
            Obj::List { length, .. } => *length,
            obj => panic!("expected a list, found {}", obj.type_name()),
        }
    }

    /// Concatenates two strings into a new one.
    ///
    /// # Errors
    /// Propagates allocation failure.
    pub fn str_concat(&mut self, left: Handle, right: Handle) -> ObjResult<Handle> {
        let bytes = match (self.get(left), self.get(right)) {
            (Obj::Str(l), Obj::Str(r)) => {
                let mut bytes = Vec::with_capacity(l.len() + r.len());
                bytes.extend_from_slice(l);
                bytes.extend_from_slice(r);
                bytes
            },
            (l, r) => panic!("concat operands must be strings, found {} and {}",
                             l.type_name(),
                             r.type_name()),
        };
        self.new_str(&bytes)
    }

    /// The bytes of a string.
    #[must_use]
    pub fn str_bytes(&self, handle: Handle) -> &[u8] {
        match self.get(handle) {
            Obj::Str(bytes) => bytes,
            obj => panic!("expected a str, found {}", obj.type_name()),
        }
    }

    fn array_slots(&self, items: Handle) -> &[Handle] {
        match self.get(items) {
            Obj::Array(slots) => slots,
            obj => panic!("list storage must be an object array, found {}", obj.type_name()),
        }
    }

    fn array_slots_mut(&mut self, items: Handle) -> &mut [Handle] {
        match self.get_mut(items) {
            Obj::Array(slots) => slots,
            obj => panic!("list storage must be an object array, found {}", obj.type_name()),
        }
    }
}
