//! Native values carried in SOAP-encoded parameters and results.
//!
//! Encoding follows the provider's RPC/encoded style: every value element
//! carries an `xsi:type`. Maps use the Apache `xml-soap` Map type with
//! `<item><key/><value/></item>` children, arrays use `SOAP-ENC:Array` with
//! `<item/>` children.

use std::fmt;

use crate::soap::error::SoapError;
use crate::soap::xml::{Element, QName};
use crate::soap::{
    NS_SOAP_ENCODING, NS_XML_SOAP, NS_XSD, NS_XSI, PREFIX_SOAP_ENCODING, PREFIX_XML_SOAP,
    PREFIX_XSD,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Nil,
    Bool(bool),
    Int(i64),
    String(String),
    Array(Vec<Value>),
    /// Ordered key/value pairs.
    Map(Vec<(String, Value)>),
}

impl Value {
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "int",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Map(_) => "map",
        }
    }

    /// Looks up a key in a map. Returns `None` for non-maps.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Map(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Integer view; numeric strings are accepted since the provider is not
    /// consistent about which ids it types as `xsd:int`.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// String rendering of a scalar, `None` for nil and containers.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Value::String(s) => Some(s.clone()),
            Value::Int(i) => Some(i.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Writes this value into `element`: sets `xsi:type` (or `xsi:nil`) and
    /// the text or children.
    pub fn encode_into(&self, element: &mut Element) {
        match self {
            Value::Nil => element.set_attribute(QName::new(NS_XSI, "nil"), "true"),
            Value::Bool(b) => {
                set_type(element, PREFIX_XSD, "boolean");
                element.text = Some(if *b { "true" } else { "false" }.to_string());
            }
            Value::Int(i) => {
                set_type(element, PREFIX_XSD, "int");
                element.text = Some(i.to_string());
            }
            Value::String(s) => {
                set_type(element, PREFIX_XSD, "string");
                element.text = Some(s.clone());
            }
            Value::Map(entries) => {
                set_type(element, PREFIX_XML_SOAP, "Map");
                for (key, value) in entries {
                    let mut item = Element::new(QName::unqualified("item"));
                    let mut key_element = Element::new(QName::unqualified("key"));
                    Value::String(key.clone()).encode_into(&mut key_element);
                    item.push(key_element);
                    let mut value_element = Element::new(QName::unqualified("value"));
                    value.encode_into(&mut value_element);
                    item.push(value_element);
                    element.push(item);
                }
            }
            Value::Array(items) => {
                set_type(element, PREFIX_SOAP_ENCODING, "Array");
                for value in items {
                    let mut item = Element::new(QName::unqualified("item"));
                    value.encode_into(&mut item);
                    element.push(item);
                }
            }
        }
    }

    /// Reads a value from `element`.
    ///
    /// With an `xsi:type` the declared type is authoritative. Without one the
    /// shape decides: no children is a string, `<item><key/><value/></item>`
    /// children are a map, anything else a list.
    pub fn decode(element: &Element) -> Result<Value, SoapError> {
        if element.attribute(Some(NS_XSI), "nil") == Some("true") {
            return Ok(Value::Nil);
        }
        let Some(type_with_ns) = element.attribute(Some(NS_XSI), "type") else {
            return decode_by_shape(element);
        };
        let (kind, namespace) = element.resolve_prefixed(type_with_ns);
        let Some(namespace) = namespace else {
            return Err(SoapError::Parse(format!(
                "cannot find namespace for type \"{type_with_ns}\""
            )));
        };
        let text = element.text.as_deref().unwrap_or("");

        match (namespace, kind) {
            (NS_XSD, "boolean") => match text {
                "true" | "1" => Ok(Value::Bool(true)),
                "false" | "0" => Ok(Value::Bool(false)),
                other => Err(SoapError::Parse(format!(
                    "invalid value for boolean: \"{other}\""
                ))),
            },
            (NS_XSD, "int" | "integer" | "long" | "short") => text
                .trim()
                .parse()
                .map(Value::Int)
                .map_err(|_| SoapError::Parse(format!("invalid value for int: \"{text}\""))),
            (NS_XSD, "string") => Ok(Value::String(text.to_string())),
            (NS_XML_SOAP, "Map") => decode_map(element),
            (NS_SOAP_ENCODING, "Array") => decode_array(element),
            (NS_XSD | NS_XML_SOAP | NS_SOAP_ENCODING, other) => {
                Err(SoapError::Parse(format!("unknown type \"{other}\"")))
            }
            (other, kind) => Err(SoapError::Parse(format!(
                "unknown type namespace \"{other}\" (with type \"{kind}\")"
            ))),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::String(s) => write!(f, "{s:?}"),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Map(entries) => {
                write!(f, "{{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key:?}: {value}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Nil)
    }
}

fn set_type(element: &mut Element, prefix: &str, kind: &str) {
    element.set_attribute(QName::new(NS_XSI, "type"), format!("{prefix}:{kind}"));
}

fn decode_map(element: &Element) -> Result<Value, SoapError> {
    let mut entries = Vec::with_capacity(element.children.len());
    for item in &element.children {
        if !item.name.is(None, "item") {
            return Err(SoapError::Parse(format!(
                "invalid child tag \"{}\" in map",
                item.name
            )));
        }
        let key = item
            .child("key")
            .ok_or_else(|| SoapError::Parse("map item without key".into()))?;
        let key = match Value::decode(key)? {
            Value::String(s) => s,
            Value::Int(i) => i.to_string(),
            other => {
                return Err(SoapError::Parse(format!(
                    "map key must be a string, got {}",
                    other.kind()
                )));
            }
        };
        let value = item
            .child("value")
            .ok_or_else(|| SoapError::Parse(format!("map item \"{key}\" without value")))?;
        entries.push((key, Value::decode(value)?));
    }
    Ok(Value::Map(entries))
}

fn decode_array(element: &Element) -> Result<Value, SoapError> {
    let mut items = Vec::with_capacity(element.children.len());
    for item in &element.children {
        if !item.name.is(None, "item") {
            return Err(SoapError::Parse(format!(
                "invalid child tag \"{}\" in array",
                item.name
            )));
        }
        items.push(Value::decode(item)?);
    }
    Ok(Value::Array(items))
}

fn decode_by_shape(element: &Element) -> Result<Value, SoapError> {
    if element.children.is_empty() {
        return Ok(Value::String(element.text.clone().unwrap_or_default()));
    }
    let is_map = element.children.iter().all(|item| {
        item.name.is(None, "item") && item.child("key").is_some() && item.child("value").is_some()
    });
    if is_map {
        return decode_map(element);
    }
    element
        .children
        .iter()
        .map(Value::decode)
        .collect::<Result<Vec<_>, _>>()
        .map(Value::Array)
}
