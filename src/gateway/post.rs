//! Form-POST dispatcher
//!
//! Sends a URL-encoded field set to `{endpoint}/{method}` and turns the
//! delimited answer into named fields.

use reqwest::header::CONTENT_TYPE;
use tracing::debug;

use super::client::CheckGateway;
use super::error::{GatewayError, GatewayResult};
use crate::models::{
    ApiResponse, FieldParsing, RequestFields, ResponseFormat, ResultFields, DELIM_CHAR_FIELD,
    DELIM_DATA_FIELD,
};
use crate::utils::Timer;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Fully resolved POST call, before it goes on the wire
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreparedRequest {
    pub url: String,
    pub fields: RequestFields,
    /// Caller asked for the raw delimited string
    pub return_delimited: bool,
    pub delimiter: char,
}

impl CheckGateway {
    /// Resolve URL and final field set for a POST call
    pub fn prepare_request(
        &self,
        method: &str,
        fields: RequestFields,
        format: ResponseFormat,
    ) -> PreparedRequest {
        let mut fields = fields.with_auth(self.client_id(), self.api_password());
        fields.set(DELIM_DATA_FIELD, "TRUE");
        fields.set(DELIM_CHAR_FIELD, format.delimiter.to_string());

        PreparedRequest {
            url: format!("{}/{}", self.endpoint(), method),
            fields,
            return_delimited: format.delimited,
            delimiter: format.delimiter,
        }
    }

    /// Call a POST method and map the answer onto `result_keys`
    pub async fn request(
        &self,
        method: &str,
        fields: RequestFields,
        format: ResponseFormat,
        result_keys: &[&str],
    ) -> GatewayResult<ApiResponse> {
        let prepared = self.prepare_request(method, fields, format);
        let result = self.send_form(method, &prepared).await.and_then(|body| {
            if prepared.return_delimited {
                Ok(ApiResponse::Delimited(body))
            } else {
                parse_delimited(
                    method,
                    &String::from_utf8_lossy(&body),
                    prepared.delimiter,
                    result_keys,
                    self.field_parsing,
                )
                .map(ApiResponse::Fields)
            }
        });
        self.record(result)
    }

    async fn send_form(&self, method: &str, prepared: &PreparedRequest) -> GatewayResult<Vec<u8>> {
        debug!(
            "POST {} fields=[{}]",
            prepared.url,
            prepared.fields.names().collect::<Vec<_>>().join(",")
        );

        let form = prepared
            .fields
            .to_form_body()
            .map_err(|source| GatewayError::Encode {
                method: method.to_string(),
                source,
            })?;

        let transport = |source| GatewayError::Transport {
            method: method.to_string(),
            source,
        };

        let timer = Timer::start(method);
        let response = self
            .http
            .post(&prepared.url)
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(form)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        let body = response.bytes().await.map_err(transport)?;
        timer.finish(status.as_u16());

        if !status.is_success() {
            return Err(GatewayError::UnexpectedStatus {
                method: method.to_string(),
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        Ok(body.to_vec())
    }
}

/// Split a delimited answer and name its tokens by position.
///
/// A trailing line break is ignored. With no keys the tokens are named by
/// index.
pub fn parse_delimited(
    method: &str,
    body: &str,
    delimiter: char,
    keys: &[&str],
    parsing: FieldParsing,
) -> GatewayResult<ResultFields> {
    let tokens: Vec<&str> = body.trim_end_matches(['\r', '\n']).split(delimiter).collect();

    if keys.is_empty() {
        return Ok(tokens
            .iter()
            .enumerate()
            .map(|(i, token)| (i.to_string(), *token))
            .collect());
    }

    if parsing == FieldParsing::Strict && tokens.len() != keys.len() {
        return Err(GatewayError::FieldCountMismatch {
            method: method.to_string(),
            expected: keys.len(),
            actual: tokens.len(),
            raw: body.to_string(),
        });
    }

    Ok(keys
        .iter()
        .zip(tokens.iter())
        .map(|(key, token)| (*key, *token))
        .collect())
}
