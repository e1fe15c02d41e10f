//! HTTP adapter for the computation server.
//!
//! Lab inputs are flat JSON objects; they are sent as query parameters on a
//! GET request to `{api_url}/{lab.api_url}`. Null-valued keys are dropped
//! before encoding, matrix-style forms can exclude client-only keys and
//! JSON-encode their non-scalar values (see `CalculateOptions`). Non-2xx
//! responses are surfaced as `ClientError::Api` carrying the HTTP status and
//! the parsed body detail.

use crate::error::{ClientError, ClientResult};
use crate::lab::Lab;
use crate::state::labs::{CalculateOptions, LabInput, LabOutput};
use log::debug;
use reqwest::{StatusCode, Url};
use serde_json::Value;

const USER_AGENT: &str = concat!("nml-client/", env!("CARGO_PKG_VERSION"));

/// Thin wrapper over a shared `reqwest::Client`.
#[derive(Clone)]
pub struct HttpApi {
    http: reqwest::Client,
}

impl HttpApi {
    pub fn new() -> ClientResult<Self> {
        let http = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { http })
    }

    /// Issues the lab calculation request and parses the JSON body.
    pub async fn calculate_lab(
        &self,
        api_url: &str,
        lab: &Lab,
        input: &LabInput,
        options: &CalculateOptions,
    ) -> ClientResult<LabOutput> {
        let url = build_lab_url(api_url, lab.api_url, input, options)?;
        debug!("GET {}", url);

        let response = self.http.get(url).send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(response.json::<LabOutput>().await?)
        } else {
            Err(api_error(status, response.text().await.ok()))
        }
    }

    /// Remote validation of a free-text math expression.
    pub async fn validate_expression(&self, api_url: &str, expression: &str) -> ClientResult<bool> {
        let mut url = parse_base(api_url, "validate_expression")?;
        url.query_pairs_mut().append_pair("expression", expression);
        debug!("GET {}", url);

        let response = self.http.get(url).send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(response.json::<bool>().await?)
        } else {
            Err(api_error(status, response.text().await.ok()))
        }
    }
}

/// Builds the calculation URL from the input mapping.
///
/// Null-valued keys and keys named in `options.skip_keys` are dropped. Scalar
/// values encode plainly (strings unquoted); arrays and objects are
/// JSON-encoded when `options.json` is set, otherwise scalar array elements
/// become repeated parameters.
pub fn build_lab_url(
    api_url: &str,
    lab_slug: &str,
    input: &LabInput,
    options: &CalculateOptions,
) -> ClientResult<Url> {
    let mut url = parse_base(api_url, lab_slug)?;
    {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in input {
            if value.is_null() || options.skip_keys.contains(&key.as_str()) {
                continue;
            }
            match value {
                Value::Array(_) | Value::Object(_) if options.json => {
                    pairs.append_pair(key, &value.to_string());
                }
                Value::Array(items) => {
                    for item in items {
                        pairs.append_pair(key, &scalar_to_string(item));
                    }
                }
                other => {
                    pairs.append_pair(key, &scalar_to_string(other));
                }
            }
        }
    }
    Ok(url)
}

fn parse_base(api_url: &str, slug: &str) -> ClientResult<Url> {
    let joined = format!("{}/{}", api_url.trim_end_matches('/'), slug);
    Url::parse(&joined).map_err(|_| ClientError::InvalidApiUrl(joined))
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn api_error(status: StatusCode, body: Option<String>) -> ClientError {
    let detail = body
        .as_deref()
        .and_then(|text| serde_json::from_str::<Value>(text).ok())
        .map(|parsed| match parsed {
            // FastAPI wraps error bodies as {"detail": ...}; unwrap it.
            Value::Object(mut map) if map.contains_key("detail") => {
                map.remove("detail").unwrap_or(Value::Null)
            }
            other => other,
        })
        .unwrap_or_else(|| Value::String(body.unwrap_or_default()));

    ClientError::Api {
        status: status.as_u16(),
        status_text: status
            .canonical_reason()
            .unwrap_or("Unknown Error")
            .to_string(),
        detail,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn input_from(value: Value) -> LabInput {
        match value {
            Value::Object(map) => map,
            _ => unreachable!("test inputs are objects"),
        }
    }

    #[test]
    fn null_valued_keys_are_stripped() {
        let input = input_from(json!({"a": 1, "b": null, "c": "x"}));
        let url = build_lab_url(
            "http://localhost:8000/api",
            "newtons_method",
            &input,
            &CalculateOptions::default(),
        )
        .unwrap();
        assert_eq!(url.query(), Some("a=1&c=x"));
    }

    #[test]
    fn strings_encode_without_quotes() {
        let input = input_from(json!({"f_string": "x**2-4", "x0": 3}));
        let url = build_lab_url(
            "http://localhost:8000/api",
            "newtons_method",
            &input,
            &CalculateOptions::default(),
        )
        .unwrap();
        assert_eq!(url.query(), Some("f_string=x**2-4&x0=3"));
    }

    #[test]
    fn skip_keys_are_excluded() {
        let input = input_from(json!({"matrix_size": 3, "constants": [1, 2, 3]}));
        let options = CalculateOptions {
            json: true,
            skip_keys: vec!["matrix_size"],
        };
        let url = build_lab_url("http://localhost:8000/api", "gaussian_elimination_method", &input, &options)
            .unwrap();
        assert_eq!(url.query(), Some("constants=%5B1%2C2%2C3%5D"));
    }

    #[test]
    fn json_mode_encodes_matrices_as_json() {
        let input = input_from(json!({"coefficient_matrix": [[1, 2], [3, 4]]}));
        let options = CalculateOptions {
            json: true,
            skip_keys: vec![],
        };
        let url = build_lab_url("http://host/api", "gaussian_elimination_method", &input, &options).unwrap();
        let query = url.query().unwrap();
        let (key, encoded) = query.split_once('=').unwrap();
        assert_eq!(key, "coefficient_matrix");
        let decoded: Value =
            serde_json::from_str(&urlencoding_decode(encoded)).unwrap();
        assert_eq!(decoded, json!([[1, 2], [3, 4]]));
    }

    #[test]
    fn scalar_arrays_repeat_the_key_without_json_mode() {
        let input = input_from(json!({"x": [1, 2, 3]}));
        let url = build_lab_url(
            "http://host/api",
            "lagranges_interpolation_method",
            &input,
            &CalculateOptions::default(),
        )
        .unwrap();
        assert_eq!(url.query(), Some("x=1&x=2&x=3"));
    }

    #[test]
    fn full_newtons_method_request() {
        let input = input_from(json!({
            "f_string": "x**2-4",
            "df_string": "2*x",
            "x0": 3,
            "tol": 1e-6,
            "max_iter": 100
        }));
        let url = build_lab_url(
            "http://localhost:8000/api",
            "newtons_method",
            &input,
            &CalculateOptions::default(),
        )
        .unwrap();
        assert_eq!(url.path(), "/api/newtons_method");
        let query = url.query().unwrap();
        assert!(query.contains("f_string=x**2-4"));
        assert!(query.contains("df_string=2*x"));
        assert!(query.contains("x0=3"));
        assert!(query.contains("max_iter=100"));
    }

    #[test]
    fn invalid_base_url_is_an_error() {
        let input = LabInput::new();
        let result = build_lab_url("not a url", "newtons_method", &input, &CalculateOptions::default());
        assert!(matches!(result, Err(ClientError::InvalidApiUrl(_))));
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn calculate_lab_rejects_invalid_base_urls_before_sending() {
        let api = HttpApi::new().unwrap();
        let lab = crate::lab::lab_by_id("newtons-method").unwrap();
        let result = tokio_test::block_on(api.calculate_lab(
            "not a url",
            lab,
            &LabInput::new(),
            &CalculateOptions::default(),
        ));
        assert!(matches!(result, Err(ClientError::InvalidApiUrl(_))));
    }

    // Minimal percent-decoding for test assertions.
    fn urlencoding_decode(encoded: &str) -> String {
        let mut out = Vec::new();
        let bytes = encoded.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'%' if i + 2 < bytes.len() => {
                    let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).unwrap();
                    out.push(u8::from_str_radix(hex, 16).unwrap());
                    i += 3;
                }
                b'+' => {
                    out.push(b' ');
                    i += 1;
                }
                b => {
                    out.push(b);
                    i += 1;
                }
            }
        }
        String::from_utf8(out).unwrap()
    }
}
