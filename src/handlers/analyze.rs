// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use axum::{Json, extract::State};
use serde_json::{Value, json};

use super::JsonBody;
use crate::error::AppResult;
use crate::proxy::ai::{self, AnalysisRequest};
use crate::state::AppState;

pub async fn analyze(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<Value>,
) -> AppResult<Json<Value>> {
    let req = AnalysisRequest::from_json(body)?;
    let analysis = ai::generate(&state.http, &state.config, &req.compose_prompt()).await?;
    Ok(Json(json!({ "analysis": analysis })))
}
