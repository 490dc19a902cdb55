use crate::soap::NS_ENVELOPE;
use crate::soap::error::{Fault, SoapError};
use crate::soap::value::Value;
use crate::soap::xml::Element;

/// Decoded response document: every `return` found under a header or body
/// entry, keyed by the entry's local name.
#[derive(Debug, Default)]
pub struct Response {
    header: Vec<(String, Value)>,
    body: Vec<(String, Value)>,
}

impl Response {
    /// Parses a response document. Faults anywhere in the document become
    /// errors; entries outside the API namespace are rejected.
    pub fn parse(namespace: &str, xml: &str) -> Result<Self, SoapError> {
        let root = Element::parse(xml)?;
        if !root.name.is(Some(NS_ENVELOPE), "Envelope") {
            return Err(SoapError::Parse(format!(
                "expected SOAP envelope, found {}",
                root.name
            )));
        }
        if let Some(fault) = find_fault(&root) {
            return Err(fault.into());
        }

        let mut response = Response::default();
        for section in root.iter() {
            if section.name.is(Some(NS_ENVELOPE), "Header") {
                collect(&mut response.header, section, namespace, "header")?;
            } else if section.name.is(Some(NS_ENVELOPE), "Body") {
                collect(&mut response.body, section, namespace, "body")?;
            }
        }
        Ok(response)
    }

    pub fn header(&self, name: &str) -> Option<&Value> {
        lookup(&self.header, name)
    }

    pub fn result(&self, name: &str) -> Option<&Value> {
        lookup(&self.body, name)
    }

    pub fn into_result(self, name: &str) -> Option<Value> {
        self.body
            .into_iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
    }
}

fn lookup<'a>(entries: &'a [(String, Value)], name: &str) -> Option<&'a Value> {
    entries.iter().find(|(k, _)| k == name).map(|(_, v)| v)
}

fn collect(
    into: &mut Vec<(String, Value)>,
    section: &Element,
    namespace: &str,
    where_: &str,
) -> Result<(), SoapError> {
    for entry in &section.children {
        if entry.name.namespace.as_deref() != Some(namespace) {
            return Err(SoapError::Parse(format!(
                "cannot interpret {where_} item {}",
                entry.name
            )));
        }
        for ret in entry.iter().into_iter().filter(|e| e.name.is(None, "return")) {
            let value = Value::decode(ret)?;
            match into.iter_mut().find(|(k, _)| *k == entry.name.local) {
                Some((_, existing)) => *existing = value,
                None => into.push((entry.name.local.clone(), value)),
            }
        }
    }
    Ok(())
}

/// First `SOAP-ENV:Fault` in the document, if any.
pub fn find_fault(root: &Element) -> Option<Fault> {
    let fault = root
        .iter()
        .into_iter()
        .find(|e| e.name.is(Some(NS_ENVELOPE), "Fault"))?;

    let mut code = String::new();
    let mut origin = "server".to_string();
    if let Some(raw) = fault.child("faultcode").and_then(|c| c.text.as_deref()) {
        let raw = raw.trim();
        let (local, ns) = fault.resolve_prefixed(raw);
        if ns == Some(NS_ENVELOPE) {
            origin = local.to_lowercase();
        }
        code = local.to_string();
    }

    let message = match fault.child("faultstring").and_then(|c| c.text.as_deref()) {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => fault
            .children
            .iter()
            .filter_map(|c| c.text.as_deref())
            .collect::<Vec<_>>()
            .join(" "),
    };
    Some(Fault {
        code,
        origin,
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::soap::envelope::mock::{fault_xml, response_xml};
    use assert_matches::assert_matches;

    const API: &str = "https://dns.example.test/api";

    #[test]
    fn test_parse_header_and_body() {
        let xml = response_xml(API, "getNumberOfZones", Some(true), &Value::Int(3));
        let response = Response::parse(API, &xml).unwrap();
        assert_eq!(
            response.header("authenticateResponse"),
            Some(&Value::Bool(true))
        );
        assert_eq!(
            response.result("getNumberOfZonesResponse"),
            Some(&Value::Int(3))
        );
        assert_eq!(
            response.into_result("getNumberOfZonesResponse"),
            Some(Value::Int(3))
        );
    }

    #[test]
    fn test_envelope_codes_set_origin() {
        let err = Response::parse(API, &fault_xml("SOAP-ENV:Client", "bad request")).unwrap_err();
        assert_matches!(err, SoapError::Fault(f) if f.origin == "client" && f.code == "Client" && f.message == "bad request");
    }

    #[test]
    fn test_foreign_codes_are_server_faults() {
        let err = Response::parse(API, &fault_xml("zone_error", "zone not found")).unwrap_err();
        assert_matches!(err, SoapError::Fault(f) if f.origin == "server" && f.message == "zone not found");
    }

    #[test]
    fn test_invalid_credentials_fault() {
        let err = Response::parse(API, &fault_xml("INVALID_CREDENTIALS", "login failed")).unwrap_err();
        assert_matches!(err, SoapError::Authentication(msg) if msg == "login failed");
    }

    #[test]
    fn test_rejects_foreign_entries() {
        let xml = response_xml("urn:somebody-else", "getZone", None, &Value::Nil);
        assert_matches!(Response::parse(API, &xml), Err(SoapError::Parse(_)));
    }

    #[test]
    fn test_rejects_non_envelope() {
        assert_matches!(Response::parse(API, "<html/>"), Err(SoapError::Parse(_)));
        assert_matches!(Response::parse(API, "<<<"), Err(SoapError::Parse(_)));
    }
}
