//! SOAP dispatcher
//!
//! The signature-image methods carry base64 JPEG payloads and are only
//! reachable through the SOAP binding of the service. Requests are SOAP 1.1
//! envelopes; the answer's `{method}Result` element holds the fields.

use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::debug;

use super::client::CheckGateway;
use super::error::{ErrorKind, GatewayError, GatewayResult};
use crate::models::{
    ApiResponse, RequestFields, ResponseFormat, ResultFields, DELIM_CHAR_FIELD, DELIM_DATA_FIELD,
};
use crate::utils::Timer;

const SOAP_ENV_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";
const SOAP_CONTENT_TYPE: &str = "text/xml; charset=utf-8";

/// Serialize a call into a SOAP 1.1 envelope
pub fn build_envelope(namespace: &str, method: &str, fields: &RequestFields) -> String {
    let mut body = String::new();
    for (name, value) in fields.iter() {
        body.push_str(&format!("<{name}>{}</{name}>", escape(value)));
    }

    format!(
        concat!(
            r#"<?xml version="1.0" encoding="utf-8"?>"#,
            r#"<soap:Envelope xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" "#,
            r#"xmlns:xsd="http://www.w3.org/2001/XMLSchema" xmlns:soap="{env}">"#,
            r#"<soap:Body><{method} xmlns="{ns}">{body}</{method}></soap:Body>"#,
            r#"</soap:Envelope>"#
        ),
        env = SOAP_ENV_NS,
        method = method,
        ns = escape(namespace),
        body = body,
    )
}

/// Decoded content of a SOAP response body
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SoapBody {
    Result(ResultFields),
    Fault { code: String, message: String },
}

/// Extract the result fields or the fault from a SOAP response
pub fn parse_soap_response(xml: &str) -> Result<SoapBody, String> {
    // Field values keep their whitespace; indentation between elements is
    // dropped by the walker
    let mut reader = Reader::from_str(xml);

    let mut walker = ResponseWalker::default();
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => walker.open(e.local_name().as_ref()),
            Ok(Event::Empty(e)) => {
                walker.open(e.local_name().as_ref());
                walker.close();
            }
            Ok(Event::End(_)) => walker.close(),
            Ok(Event::Text(e)) => {
                let text = e
                    .unescape()
                    .map_err(|err| format!("invalid text in response: {err}"))?;
                walker.text(&text);
            }
            Ok(Event::CData(e)) => walker.text(&String::from_utf8_lossy(&e.into_inner())),
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => {
                return Err(format!(
                    "malformed XML at position {}: {err}",
                    reader.error_position()
                ))
            }
        }
    }

    walker.finish()
}

/// Tracks where the reader is relative to `soap:Body`.
///
/// Depth 1 below the body is the `{method}Response` wrapper or a fault,
/// depth 2 is the result element (only the first one counts), depth 3 are
/// the fields.
#[derive(Default)]
struct ResponseWalker {
    depth: usize,
    body_depth: Option<usize>,
    body_closed: bool,
    in_fault: bool,
    fault_child: Option<String>,
    fault_code: String,
    fault_message: String,
    result_seen: bool,
    in_result: bool,
    result_name: String,
    result_text: String,
    current: Option<(String, String)>,
    fields: ResultFields,
}

impl ResponseWalker {
    fn relative_depth(&self) -> Option<usize> {
        match self.body_depth {
            Some(body) if !self.body_closed && self.depth >= body => Some(self.depth - body),
            _ => None,
        }
    }

    fn open(&mut self, name: &[u8]) {
        self.depth += 1;
        let name = String::from_utf8_lossy(name).into_owned();

        if self.body_depth.is_none() {
            if name == "Body" {
                self.body_depth = Some(self.depth);
            }
            return;
        }

        match self.relative_depth() {
            Some(1) => {
                if name == "Fault" {
                    self.in_fault = true;
                }
            }
            Some(2) => {
                if self.in_fault {
                    self.fault_child = Some(name);
                } else if !self.result_seen {
                    self.result_seen = true;
                    self.in_result = true;
                    self.result_name = name;
                }
            }
            Some(3) if self.in_result => self.current = Some((name, String::new())),
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        let Some(rel) = self.relative_depth() else {
            return;
        };

        if self.in_fault && rel >= 2 {
            match self.fault_child.as_deref() {
                Some("faultcode") => self.fault_code.push_str(text),
                Some("faultstring") => self.fault_message.push_str(text),
                _ => {}
            }
        } else if self.in_result {
            match rel {
                2 => self.result_text.push_str(text),
                r if r >= 3 => {
                    if let Some((_, value)) = self.current.as_mut() {
                        value.push_str(text);
                    }
                }
                _ => {}
            }
        }
    }

    fn close(&mut self) {
        match self.relative_depth() {
            Some(0) => self.body_closed = true,
            Some(2) => {
                self.fault_child = None;
                if self.in_result {
                    self.in_result = false;
                    if self.fields.is_empty() && !self.result_text.trim().is_empty() {
                        let name = std::mem::take(&mut self.result_name);
                        let text = std::mem::take(&mut self.result_text);
                        self.fields.push(name, text);
                    }
                }
            }
            Some(3) if self.in_result => {
                if let Some((name, value)) = self.current.take() {
                    self.fields.push(name, value);
                }
            }
            _ => {}
        }
        self.depth = self.depth.saturating_sub(1);
    }

    fn finish(self) -> Result<SoapBody, String> {
        if self.body_depth.is_none() {
            return Err("response has no SOAP Body".to_string());
        }
        if self.in_fault {
            return Ok(SoapBody::Fault {
                code: self.fault_code,
                message: self.fault_message,
            });
        }
        if !self.result_seen {
            return Err("SOAP Body carries no result".to_string());
        }
        Ok(SoapBody::Result(self.fields))
    }
}

impl CheckGateway {
    /// Call a SOAP method. Result fields come back in document order.
    pub async fn request_soap(
        &self,
        method: &str,
        fields: RequestFields,
        format: ResponseFormat,
    ) -> GatewayResult<ApiResponse> {
        let mut fields = fields.with_auth(self.client_id(), self.api_password());
        fields.set(DELIM_DATA_FIELD, "");
        fields.set(DELIM_CHAR_FIELD, format.delimiter.to_string());

        let envelope = build_envelope(&self.soap_namespace, method, &fields);
        let result = self
            .send_envelope(method, &fields, &envelope)
            .await
            .map(|body_fields| {
                if format.delimited {
                    ApiResponse::Delimited(body_fields.join(format.delimiter).into_bytes())
                } else {
                    ApiResponse::Fields(body_fields)
                }
            });
        self.record(result)
    }

    async fn send_envelope(
        &self,
        method: &str,
        fields: &RequestFields,
        envelope: &str,
    ) -> GatewayResult<ResultFields> {
        let url = self.endpoint().to_string();
        let action = format!("\"{}/{}\"", self.soap_namespace, method);
        debug!(
            "SOAP {} action={} fields=[{}]",
            url,
            action,
            fields.names().collect::<Vec<_>>().join(",")
        );

        // Logged request bodies never carry the password or image payload
        let soap_error = |message: String, response: String, kind: ErrorKind| GatewayError::Soap {
            method: method.to_string(),
            message,
            request: build_envelope(&self.soap_namespace, method, &fields.redacted()),
            response,
            kind,
        };

        let timer = Timer::start(method);
        let response = self
            .http
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, SOAP_CONTENT_TYPE)
            .header("SOAPAction", action)
            .body(envelope.to_string())
            .send()
            .await
            .map_err(|e| soap_error(e.to_string(), String::new(), ErrorKind::Transport))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| soap_error(e.to_string(), String::new(), ErrorKind::Transport))?;
        timer.finish(status.as_u16());

        // Faults arrive with HTTP 500, so the body is decoded before the status is judged
        match parse_soap_response(&body) {
            Ok(SoapBody::Fault { code, message }) => Err(soap_error(
                format!("{code}: {message}"),
                body,
                ErrorKind::Transport,
            )),
            _ if !status.is_success() => Err(soap_error(
                format!("HTTP {}", status.as_u16()),
                body,
                ErrorKind::Transport,
            )),
            Ok(SoapBody::Result(result)) => Ok(result),
            Err(message) => Err(soap_error(message, body, ErrorKind::Parse)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    const RESULT_RESPONSE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
  <soap:Body>
    <UploadSignatureImageResponse xmlns="CheckProcessing">
      <UploadSignatureImageResult>
        <Result>0</Result>
        <ResultDescription>Image uploaded &amp; stored</ResultDescription>
        <Check_ID/>
      </UploadSignatureImageResult>
    </UploadSignatureImageResponse>
  </soap:Body>
</soap:Envelope>"#;

    const FAULT_RESPONSE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
  <soap:Body>
    <soap:Fault>
      <faultcode>soap:Server</faultcode>
      <faultstring>Invalid Check_ID</faultstring>
      <detail/>
    </soap:Fault>
  </soap:Body>
</soap:Envelope>"#;

    #[test]
    fn test_build_envelope_escapes_values() {
        let fields = RequestFields::new()
            .with("Client_ID", "123")
            .with("CheckMemo", "Tom & Jerry <rent>");
        let envelope = build_envelope("CheckProcessing", "OneTimeDraftWithSignatureImage", &fields);

        assert!(envelope.contains(r#"<OneTimeDraftWithSignatureImage xmlns="CheckProcessing">"#));
        assert!(envelope.contains("<Client_ID>123</Client_ID>"));
        assert!(envelope.contains("<CheckMemo>Tom &amp; Jerry &lt;rent&gt;</CheckMemo>"));
        assert!(envelope.ends_with("</soap:Body></soap:Envelope>"));
    }

    #[test]
    fn test_parse_result_fields_in_document_order() {
        let body = parse_soap_response(RESULT_RESPONSE).unwrap();
        let SoapBody::Result(fields) = body else {
            panic!("expected result, got {body:?}");
        };
        let pairs: Vec<_> = fields.iter().collect();
        assert_eq!(
            pairs,
            vec![
                ("Result", "0"),
                ("ResultDescription", "Image uploaded & stored"),
                ("Check_ID", ""),
            ]
        );
    }

    #[test]
    fn test_parse_fault() {
        assert_eq!(
            parse_soap_response(FAULT_RESPONSE).unwrap(),
            SoapBody::Fault {
                code: "soap:Server".to_string(),
                message: "Invalid Check_ID".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_leaf_result() {
        let xml = r#"<Envelope><Body><XResponse><XResult>0,OK</XResult></XResponse></Body></Envelope>"#;
        let SoapBody::Result(fields) = parse_soap_response(xml).unwrap() else {
            panic!("expected result");
        };
        assert_eq!(fields.get("XResult"), Some("0,OK"));
    }

    #[test]
    fn test_parse_keeps_value_whitespace() {
        let xml = concat!(
            "<Envelope>\n  <Body>\n    <XResponse>\n      <XResult>\n",
            "        <Result>0</Result>\n",
            "        <ResultDescription>  padded  </ResultDescription>\n",
            "        <Note> </Note>\n",
            "      </XResult>\n    </XResponse>\n  </Body>\n</Envelope>"
        );
        let SoapBody::Result(fields) = parse_soap_response(xml).unwrap() else {
            panic!("expected result");
        };
        let pairs: Vec<_> = fields.iter().collect();
        assert_eq!(
            pairs,
            vec![
                ("Result", "0"),
                ("ResultDescription", "  padded  "),
                ("Note", " "),
            ]
        );
    }

    #[test]
    fn test_parse_rejects_bad_documents() {
        assert!(parse_soap_response("<html><body>oops</body></html>").is_err());
        assert!(parse_soap_response("<Envelope><Body><A><B></A></Body></Envelope>").is_err());
        assert!(parse_soap_response("<Envelope><Body/></Envelope>").is_err());
    }

    #[tokio::test]
    async fn test_request_soap_posts_envelope() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/")
                    .header("content-type", "text/xml; charset=utf-8")
                    .header("SOAPAction", "\"CheckProcessing/UploadSignatureImage\"")
                    .body_includes("<Client_ID>123</Client_ID>")
                    .body_includes("<ApiPassword>pw</ApiPassword>")
                    .body_includes("<Check_ID>77</Check_ID>")
                    .body_includes("<x_delim_data></x_delim_data>");
                then.status(200).body(RESULT_RESPONSE);
            })
            .await;

        let gateway = CheckGateway::builder()
            .credentials("123", "pw")
            .base_url(server.url("/"))
            .build()
            .unwrap();
        let fields = RequestFields::new()
            .with("Check_ID", "77")
            .with("ImageData", "QUJD");

        let response = gateway
            .request_soap("UploadSignatureImage", fields.clone(), ResponseFormat::fields())
            .await
            .unwrap();
        assert!(response.is_approved());

        let joined = gateway
            .request_soap("UploadSignatureImage", fields, ResponseFormat::delimited().with_delimiter('|'))
            .await
            .unwrap();
        assert_eq!(joined.delimited(), Some(&b"0|Image uploaded & stored|"[..]));

        assert_eq!(mock.calls_async().await, 2);
    }

    #[tokio::test]
    async fn test_request_soap_fault_is_recorded() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(500).body(FAULT_RESPONSE);
            })
            .await;

        let gateway = CheckGateway::builder()
            .credentials("123", "secret-pw")
            .base_url(server.base_url())
            .build()
            .unwrap();
        let err = gateway
            .request_soap(
                "UploadSignatureImage",
                RequestFields::new()
                    .with("Check_ID", "1")
                    .with("ImageData", "QUJD"),
                ResponseFormat::fields(),
            )
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Transport);
        let last = gateway.last_error().unwrap();
        assert!(last.contains("soap:Server: Invalid Check_ID"));
        assert!(last.contains("Request: "));
        assert!(last.contains("<faultstring>"));
        assert!(!last.contains("secret-pw"));
        assert!(last.contains("[4 base64 chars]"));
    }

    #[tokio::test]
    async fn test_request_soap_malformed_response() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(200).body("not xml at all");
            })
            .await;

        let gateway = CheckGateway::builder()
            .credentials("123", "pw")
            .base_url(server.base_url())
            .build()
            .unwrap();
        let err = gateway
            .request_soap("UploadSignatureImage", RequestFields::new(), ResponseFormat::fields())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Parse);
    }
}
