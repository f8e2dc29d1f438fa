use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::error::InvokeError;
use crate::value::{Value, ValueType};

pub(crate) type ReadFn = Arc<dyn Fn(&dyn Any, &[Value]) -> Result<Value, InvokeError> + Send + Sync>;
pub(crate) type WriteFn =
    Arc<dyn Fn(&mut dyn Any, &[Value]) -> Result<Value, InvokeError> + Send + Sync>;

/// How an entry reaches its receiver: shared borrow or exclusive borrow.
#[derive(Clone)]
pub(crate) enum Invoker {
    Read(ReadFn),
    Write(WriteFn),
}

/// Whether an entry stands for a plain field or a method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    Field,
    Method,
}

/// One candidate member of a type. Immutable once captured.
#[derive(Clone)]
pub struct AccessorEntry {
    name: Arc<str>,
    kind: MemberKind,
    params: Vec<ValueType>,
    returns: Option<ValueType>,
    invoker: Invoker,
}

impl AccessorEntry {
    pub(crate) fn new(
        name: &str,
        kind: MemberKind,
        params: Vec<ValueType>,
        returns: Option<ValueType>,
        invoker: Invoker,
    ) -> Self {
        AccessorEntry {
            name: Arc::from(name),
            kind,
            params,
            returns,
            invoker,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> MemberKind {
        self.kind
    }

    pub fn params(&self) -> &[ValueType] {
        &self.params
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Declared result type; `None` for members that produce nothing.
    pub fn returns(&self) -> Option<ValueType> {
        self.returns
    }

    /// Whether `args` fit the declared parameters, position by position.
    pub fn matches(&self, args: &[ValueType]) -> bool {
        self.params.len() == args.len()
            && self
                .params
                .iter()
                .zip(args)
                .all(|(param, arg)| param.accepts(*arg))
    }

    pub(crate) fn invoker(&self) -> &Invoker {
        &self.invoker
    }

    pub(crate) fn with_invoker(&self, invoker: Invoker) -> Self {
        AccessorEntry {
            invoker,
            ..self.clone()
        }
    }
}

impl fmt::Debug for AccessorEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessorEntry")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("params", &self.params)
            .field("returns", &self.returns)
            .finish()
    }
}

impl fmt::Display for AccessorEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.kind == MemberKind::Field {
            write!(f, "field ")?;
        }
        write!(f, "{}(", self.name)?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", param)?;
        }
        write!(f, ")")?;
        if let Some(returns) = self.returns {
            write!(f, " -> {}", returns)?;
        }
        Ok(())
    }
}
