// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::Config;
use crate::error::AppError;

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    pub transactions: Vec<Value>,
    pub categories: Vec<Value>,
    pub prompt: String,
}

impl AnalysisRequest {
    pub fn from_json(body: Value) -> Result<Self, AppError> {
        let Value::Object(mut map) = body else {
            return Err(AppError::Validation("Request body must be a JSON object.".into()));
        };
        let transactions = match map.remove("transactions") {
            Some(Value::Array(v)) => v,
            _ => {
                return Err(AppError::Validation(
                    "'transactions' must be an array.".into(),
                ));
            }
        };
        let categories = match map.remove("categories") {
            Some(Value::Array(v)) => v,
            _ => return Err(AppError::Validation("'categories' must be an array.".into())),
        };
        let prompt = match map.remove("prompt") {
            Some(Value::String(s)) if !s.trim().is_empty() => s,
            _ => {
                return Err(AppError::Validation(
                    "'prompt' must be a non-empty string.".into(),
                ));
            }
        };
        Ok(Self {
            transactions,
            categories,
            prompt,
        })
    }

    pub fn compose_prompt(&self) -> String {
        format!(
            "{}\n\nYou are reviewing a user's personal finances. Base your answer only on the data below.\n\
             Transactions: {}\n\
             Categories: {}\n",
            self.prompt.trim(),
            Value::Array(self.transactions.clone()),
            Value::Array(self.categories.clone()),
        )
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

/// One `generateContent` call; every failure collapses into [`AppError::Analysis`].
pub async fn generate(
    client: &reqwest::Client,
    config: &Config,
    prompt: &str,
) -> Result<String, AppError> {
    let key = config
        .gemini_api_key
        .as_deref()
        .ok_or_else(|| AppError::Analysis("GEMINI_API_KEY is not configured".into()))?;
    let url = format!(
        "{}/v1beta/models/{}:generateContent",
        config.gemini_base_url.trim_end_matches('/'),
        config.gemini_model
    );
    let body = GenerateRequest {
        contents: [Content {
            parts: [Part { text: prompt }],
        }],
    };
    let resp = client
        .post(url)
        .query(&[("key", key)])
        .json(&body)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| AppError::Analysis(e.without_url().to_string()))?;
    let parsed: GenerateResponse = resp
        .json()
        .await
        .map_err(|e| AppError::Analysis(e.without_url().to_string()))?;

    let text: String = parsed
        .candidates
        .into_iter()
        .next()
        .map(|c| c.content.parts.into_iter().map(|p| p.text).collect())
        .unwrap_or_default();
    if text.is_empty() {
        return Err(AppError::Analysis("model returned no text".into()));
    }
    Ok(text)
}
