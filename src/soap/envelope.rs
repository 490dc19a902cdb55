use crate::soap::client::Credentials;
use crate::soap::error::SoapError;
use crate::soap::value::Value;
use crate::soap::xml::{Element, QName};
use crate::soap::{
    NS_ENVELOPE, NS_SOAP_ENCODING, NS_XML_SOAP, NS_XSD, NS_XSI, PREFIX_API, PREFIX_ENVELOPE,
    PREFIX_SOAP_ENCODING, PREFIX_XML_SOAP, PREFIX_XSD, PREFIX_XSI,
};

/// Request document under construction.
pub struct Envelope {
    namespace: String,
    header: Element,
    body: Element,
}

impl Envelope {
    pub fn new(namespace: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            header: Element::new(QName::new(NS_ENVELOPE, "Header")),
            body: Element::new(QName::new(NS_ENVELOPE, "Body")),
        }
    }

    pub fn add_auth(&mut self, credentials: &Credentials) {
        let mut auth = Element::new(QName::unqualified("authenticate"));
        auth.push(Element::new(QName::unqualified("UserName")).with_text(&credentials.username));
        auth.push(Element::new(QName::unqualified("Password")).with_text(&credentials.password));
        self.header.push(auth);
    }

    pub fn add_call(&mut self, operation: &str, params: &[(&str, Value)]) {
        let mut call = Element::new(QName::new(self.namespace.as_str(), operation));
        for (name, value) in params {
            let mut param = Element::new(QName::unqualified(*name));
            value.encode_into(&mut param);
            call.push(param);
        }
        self.body.push(call);
    }

    pub fn to_xml(&self) -> Result<String, SoapError> {
        let mut root = Element::new(QName::new(NS_ENVELOPE, "Envelope"))
            .declare(PREFIX_ENVELOPE, NS_ENVELOPE)
            .declare(PREFIX_API, &self.namespace)
            .declare(PREFIX_XSD, NS_XSD)
            .declare(PREFIX_XSI, NS_XSI)
            .declare(PREFIX_SOAP_ENCODING, NS_SOAP_ENCODING)
            .declare(PREFIX_XML_SOAP, NS_XML_SOAP);
        root.set_attribute(QName::new(NS_ENVELOPE, "encodingStyle"), NS_SOAP_ENCODING);
        root.push(self.header.clone());
        root.push(self.body.clone());
        root.to_xml()
            .map_err(|e| SoapError::Encoding(e.to_string()))
    }
}

/// Builders for provider-shaped response documents.
#[cfg(test)]
pub(crate) mod mock {
    use super::*;

    fn entry(namespace: &str, name: &str, value: &Value) -> Element {
        let mut outer = Element::new(QName::new(namespace, name));
        let mut ret = Element::new(QName::unqualified("return"));
        value.encode_into(&mut ret);
        outer.push(ret);
        outer
    }

    /// A successful response: `authenticateResponse` in the header (when
    /// `authenticated` is `Some`) and `{operation}Response` in the body.
    pub(crate) fn response_xml(
        namespace: &str,
        operation: &str,
        authenticated: Option<bool>,
        value: &Value,
    ) -> String {
        let mut envelope = Envelope::new(namespace);
        if let Some(ok) = authenticated {
            envelope
                .header
                .push(entry(namespace, "authenticateResponse", &Value::Bool(ok)));
        }
        envelope
            .body
            .push(entry(namespace, &format!("{operation}Response"), value));
        envelope.to_xml().unwrap()
    }

    pub(crate) fn fault_xml(code: &str, message: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<SOAP-ENV:Envelope xmlns:SOAP-ENV="{NS_ENVELOPE}">
  <SOAP-ENV:Body>
    <SOAP-ENV:Fault>
      <faultcode>{code}</faultcode>
      <faultstring>{message}</faultstring>
    </SOAP-ENV:Fault>
  </SOAP-ENV:Body>
</SOAP-ENV:Envelope>"#
        )
    }
}
