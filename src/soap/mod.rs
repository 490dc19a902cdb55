//! Minimal SOAP 1.1 (RPC/encoded) client.
//!
//! Only what the DNS API needs: one envelope per call, credentials in a
//! header block, scalar/array/map parameters, and a parser that turns the
//! `return` elements of the response back into [`Value`]s.

pub mod client;
pub mod envelope;
pub mod error;
pub mod operation;
pub mod response;
pub mod transport;
pub mod value;
pub mod xml;

pub use client::{Credentials, SoapClient, SoapConfig};
pub use error::{Fault, SoapError};
pub use operation::{Kind, Operation, Param};
pub use transport::{ReqwestTransport, Transport};
pub use value::Value;

pub const NS_ENVELOPE: &str = "http://schemas.xmlsoap.org/soap/envelope/";
pub const NS_SOAP_ENCODING: &str = "http://schemas.xmlsoap.org/soap/encoding/";
pub const NS_XML_SOAP: &str = "http://xml.apache.org/xml-soap";
pub const NS_XSD: &str = "http://www.w3.org/2001/XMLSchema";
pub const NS_XSI: &str = "http://www.w3.org/2001/XMLSchema-instance";

pub const PREFIX_ENVELOPE: &str = "SOAP-ENV";
pub const PREFIX_API: &str = "ns1";
pub const PREFIX_XML_SOAP: &str = "ns2";
pub const PREFIX_SOAP_ENCODING: &str = "SOAP-ENC";
pub const PREFIX_XSD: &str = "xsd";
pub const PREFIX_XSI: &str = "xsi";
