use crate::soap::error::SoapError;
use crate::soap::value::Value;

/// Wire type of a parameter or result, as the remote service really expects
/// it (which is not always what its WSDL claims).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    String,
    Int,
    Bool,
    Array,
    Map,
}

impl Kind {
    /// Converts `value` to this kind where the conversion is lossless,
    /// otherwise fails. `Nil` passes through for every kind.
    pub fn coerce(self, value: Value) -> Result<Value, Value> {
        match (self, value) {
            (_, Value::Nil) => Ok(Value::Nil),
            (Kind::String, Value::String(s)) => Ok(Value::String(s)),
            (Kind::String, Value::Int(i)) => Ok(Value::String(i.to_string())),
            (Kind::Int, Value::Int(i)) => Ok(Value::Int(i)),
            (Kind::Int, Value::String(s)) => match s.trim().parse() {
                Ok(i) => Ok(Value::Int(i)),
                Err(_) => Err(Value::String(s)),
            },
            (Kind::Bool, Value::Bool(b)) => Ok(Value::Bool(b)),
            (Kind::Array, Value::Array(items)) => Ok(Value::Array(items)),
            (Kind::Map, Value::Map(entries)) => Ok(Value::Map(entries)),
            (_, other) => Err(other),
        }
    }

    pub fn accepts(self, value: &Value) -> bool {
        matches!(
            (self, value),
            (Kind::String, Value::String(_))
                | (Kind::Int, Value::Int(_))
                | (Kind::Bool, Value::Bool(_))
                | (Kind::Array, Value::Array(_))
                | (Kind::Map, Value::Map(_))
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Param {
    pub name: &'static str,
    pub kind: Kind,
}

/// Describes one remote procedure: its name, its positional parameters and
/// what its `return` element holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operation {
    pub name: &'static str,
    pub params: &'static [Param],
    pub returns: Kind,
}

impl Operation {
    /// Name of the body element that carries the result.
    pub fn response_name(&self) -> String {
        format!("{}Response", self.name)
    }

    /// Pairs arguments with parameter names, coercing each to its declared
    /// kind.
    pub fn bind(&self, args: Vec<Value>) -> Result<Vec<(&'static str, Value)>, SoapError> {
        if args.len() != self.params.len() {
            return Err(SoapError::Encoding(format!(
                "{} takes {} parameter(s), got {}",
                self.name,
                self.params.len(),
                args.len()
            )));
        }
        self.params
            .iter()
            .zip(args)
            .map(|(param, arg)| {
                param.kind.coerce(arg).map(|v| (param.name, v)).map_err(|v| {
                    SoapError::Encoding(format!(
                        "{}.{} expects {:?}, got {}",
                        self.name,
                        param.name,
                        param.kind,
                        v.kind()
                    ))
                })
            })
            .collect()
    }
}
