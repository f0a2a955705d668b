//! # Request Handlers Module
//!
//! The classification endpoint: parse and validate the number token, compute
//! its properties, attach a fun fact, and shape the JSON response.
//!
//! ## Request Flow
//!
//! 1. **Parse**: token from `?number=` (GET) or `{"numberString": ...}` (POST)
//! 2. **Validate**: reject blank, non-integer, and negative tokens with 400
//! 3. **Classify**: property checks, all sub-linear so they run inline
//! 4. **Enrich**: the fun fact lookup, which never fails the request
//! 5. **Respond**: 200 with a [`ClassificationResponse`]

use crate::error::{ClassifierError, Result};
use crate::facts::FunFactClient;
use crate::numbers::{NumberClassification, PropertyTag};
use http_body_util::{BodyExt, Full, Limited};
use hyper::body::{Body, Bytes};
use hyper::{Method, Request, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Path served by [`ClassifyHandler`]
pub const CLASSIFY_PATH: &str = "/api/classify-number";

/// Successful classification body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResponse {
    /// The classified number
    pub number: u64,
    /// Whether the number is prime
    pub is_prime: bool,
    /// Whether the number is perfect
    pub is_perfect: bool,
    /// `armstrong` (if applicable) followed by one parity tag
    pub properties: Vec<PropertyTag>,
    /// Sum of decimal digits
    pub digit_sum: u64,
    /// Trivia string, or the fallback text
    pub fun_fact: String,
}

impl ClassificationResponse {
    /// Combine computed properties with a fun fact
    #[must_use]
    pub fn new(classification: NumberClassification, fun_fact: String) -> Self {
        Self {
            number: classification.number,
            is_prime: classification.is_prime,
            is_perfect: classification.is_perfect,
            properties: classification.properties,
            digit_sum: classification.digit_sum,
            fun_fact,
        }
    }
}

/// Error body returned for every non-2xx response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Always `true`
    pub error: bool,
    /// What went wrong
    pub message: String,
    /// The rejected number token, when one was supplied
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
}

impl ErrorBody {
    /// Error body with no offending token
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: true,
            message: message.into(),
            number: None,
        }
    }
}

impl From<&ClassifierError> for ErrorBody {
    fn from(err: &ClassifierError) -> Self {
        Self {
            error: true,
            message: err.client_message().to_string(),
            number: err.offending_input().map(String::from),
        }
    }
}

/// POST body accepted by the classification endpoint
#[derive(Debug, Deserialize)]
struct ClassifyRequestBody {
    #[serde(rename = "numberString")]
    number_string: Option<serde_json::Value>,
}

/// Handler for `GET` and `POST` on [`CLASSIFY_PATH`]
///
/// Holds no per-request state; one instance serves all connections.
#[derive(Debug)]
pub struct ClassifyHandler {
    fun_facts: Arc<FunFactClient>,
    max_payload_size: usize,
}

impl ClassifyHandler {
    /// Create a handler that enriches results through `fun_facts`
    pub fn new(fun_facts: Arc<FunFactClient>, max_payload_size: usize) -> Self {
        Self {
            fun_facts,
            max_payload_size,
        }
    }

    /// Handle a classification request
    ///
    /// ## Errors
    /// - `ClassifierError::InputError`: missing, blank, or non-integer token,
    ///   bad POST body, or unsupported method
    /// - `ClassifierError::DomainError`: negative number
    #[instrument(level = "debug", name = "classify_handler", skip(self, request), fields(method = %request.method()))]
    pub async fn handle<B>(&self, request: Request<B>) -> Result<Response<Full<Bytes>>>
    where
        B: Body,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let method = request.method().clone();
        let token = match method {
            Method::GET => query_number(request.uri().query()),
            Method::POST => self.body_number(request.into_body()).await?,
            other => {
                return Err(ClassifierError::input_error(
                    format!("Method {other} is not supported on {CLASSIFY_PATH}"),
                    None,
                ))
            }
        };

        let number = parse_number_token(token.as_deref())?;
        debug!("Classifying {}", number);

        let body = self.classify(number).await;
        json_response(StatusCode::OK, &body)
    }

    /// Classify an already validated number
    ///
    /// The category of the fact lookup follows the Armstrong check.
    pub async fn classify(&self, number: u64) -> ClassificationResponse {
        let classification = NumberClassification::classify(number);
        let fun_fact = self
            .fun_facts
            .fun_fact(number, classification.is_armstrong)
            .await;

        ClassificationResponse::new(classification, fun_fact)
    }

    /// Extract the `numberString` token from a JSON body
    async fn body_number<B>(&self, body: B) -> Result<Option<String>>
    where
        B: Body,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let bytes = Limited::new(body, self.max_payload_size)
            .collect()
            .await
            .map_err(|e| {
                ClassifierError::input_error(format!("Failed to read request body: {e}"), None)
            })?
            .to_bytes();

        if bytes.is_empty() {
            return Err(ClassifierError::input_error("Request body is empty", None));
        }

        let parsed: ClassifyRequestBody = serde_json::from_slice(&bytes)?;
        Ok(parsed.number_string.map(|value| match value {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        }))
    }
}

/// First `number` parameter of a query string, percent-decoded
fn query_number(query: Option<&str>) -> Option<String> {
    let query = query?;
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "number")
        .map(|(_, value)| value.into_owned())
}

/// Validate a raw number token
///
/// Accepts an optionally signed base-10 integer that fits in `i64`,
/// surrounded by optional whitespace, and rejects anything negative.
///
/// ## Errors
/// - `ClassifierError::InputError`: token missing, blank, or not an integer
/// - `ClassifierError::DomainError`: token is a negative integer
pub fn parse_number_token(token: Option<&str>) -> Result<u64> {
    let raw = token.ok_or_else(|| {
        ClassifierError::input_error("Missing required parameter 'number'", None)
    })?;

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ClassifierError::input_error(
            "Parameter 'number' must not be blank",
            Some(raw.to_string()),
        ));
    }

    let value: i64 = trimmed.parse().map_err(|_| {
        ClassifierError::input_error(
            format!("'{trimmed}' is not a valid integer"),
            Some(raw.to_string()),
        )
    })?;

    u64::try_from(value).map_err(|_| {
        ClassifierError::domain_error(
            "Negative numbers are not supported",
            Some(raw.to_string()),
        )
    })
}

/// Serialize `body` into a JSON response
///
/// ## Errors
/// - `ClassifierError::InternalError`: serialization failed
/// - `ClassifierError::ServerError`: the response could not be built
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Result<Response<Full<Bytes>>> {
    let json = serde_json::to_vec(body).map_err(|e| {
        ClassifierError::internal_error(
            format!("Failed to serialize response: {e}"),
            Some(Box::new(e)),
        )
    })?;

    Ok(Response::builder()
        .status(status)
        .header("content-type", "application/json")
        .header("cache-control", "no-cache")
        .body(Full::new(Bytes::from(json)))?)
}
