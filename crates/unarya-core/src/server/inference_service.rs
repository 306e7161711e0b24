//! gRPC adapter over the inference engine.
//!
//! Decodes each call, runs the engine on the worker pool and encodes the
//! result. No business logic lives here.

use std::sync::Arc;

use serde_json::Value;
use tonic::{Request, Response, Status};
use tracing::{error, info, warn};

use super::workers::WorkerPool;
use crate::inference::{InferenceEngine, InferenceRequest, InferenceResult, Payload};
use crate::proto;
use crate::proto::inference_service_server::InferenceService;

/// The `unarya.InferenceService` implementation.
#[derive(Clone)]
pub struct InferenceGrpcService {
    engine: Arc<InferenceEngine>,
    workers: WorkerPool,
}

impl InferenceGrpcService {
    /// Creates the service over a shared engine and worker pool.
    pub fn new(engine: Arc<InferenceEngine>, workers: WorkerPool) -> Self {
        Self { engine, workers }
    }

    fn get_request_id<T>(request: &Request<T>) -> String {
        request
            .metadata()
            .get(super::logging::REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map_or_else(|| "unknown".to_string(), ToString::to_string)
    }
}

/// Decodes a wire request. A payload that is not a JSON object is reported
/// as the failure result to return in its place.
fn decode_request(request: proto::InferRequest) -> Result<InferenceRequest, InferenceResult> {
    let payload = if request.payload_json.trim().is_empty() {
        Payload::new()
    } else {
        match serde_json::from_str::<Value>(&request.payload_json) {
            Ok(Value::Object(payload)) => payload,
            Ok(_) => return Err(InferenceResult::failure("Invalid payload: expected a JSON object")),
            Err(e) => return Err(InferenceResult::failure(format!("Invalid payload: {e}"))),
        }
    };
    Ok(InferenceRequest { operation: request.operation, payload })
}

fn encode_result(result: InferenceResult) -> proto::InferResult {
    proto::InferResult {
        success: result.success,
        output_json: result.output.map(|output| output.to_string()),
        message: result.message,
    }
}

#[tonic::async_trait]
impl InferenceService for InferenceGrpcService {
    async fn infer(
        &self,
        request: Request<proto::InferRequest>,
    ) -> Result<Response<proto::InferResponse>, Status> {
        let request_id = Self::get_request_id(&request);
        let request = request.into_inner();
        info!(request_id = %request_id, operation = %request.operation, "Infer request");

        let result = match decode_request(request) {
            Ok(request) => {
                let engine = Arc::clone(&self.engine);
                self.workers
                    .execute(move || engine.infer(&request))
                    .await
                    .unwrap_or_else(|e| InferenceResult::failure(e.to_string()))
            }
            Err(failure) => {
                warn!(request_id = %request_id, "Rejected malformed payload");
                failure
            }
        };

        let status = if result.success { "OK" } else { "ERROR" };
        Ok(Response::new(proto::InferResponse {
            status: status.to_string(),
            result: Some(encode_result(result)),
        }))
    }

    async fn batch_infer(
        &self,
        request: Request<proto::BatchInferRequest>,
    ) -> Result<Response<proto::BatchInferResponse>, Status> {
        let request_id = Self::get_request_id(&request);
        let decoded: Vec<_> = request.into_inner().requests.into_iter().map(decode_request).collect();
        info!(request_id = %request_id, count = decoded.len(), "BatchInfer request");

        let count = decoded.len();
        let engine = Arc::clone(&self.engine);
        let results = self
            .workers
            .execute(move || {
                let valid: Vec<InferenceRequest> =
                    decoded.iter().filter_map(|r| r.as_ref().ok().cloned()).collect();
                let mut computed = engine.batch_infer(&valid).into_iter();

                decoded
                    .into_iter()
                    .map(|r| match r {
                        Ok(_) => computed
                            .next()
                            .unwrap_or_else(|| InferenceResult::failure("Missing batch result")),
                        Err(failure) => failure,
                    })
                    .collect::<Vec<_>>()
            })
            .await
            .unwrap_or_else(|e| vec![InferenceResult::failure(e.to_string()); count]);

        Ok(Response::new(proto::BatchInferResponse {
            results: results.into_iter().map(encode_result).collect(),
        }))
    }

    async fn analyze_code(
        &self,
        request: Request<proto::AnalyzeCodeRequest>,
    ) -> Result<Response<proto::AnalyzeCodeResponse>, Status> {
        let request_id = Self::get_request_id(&request);
        let request = request.into_inner();
        info!(request_id = %request_id, language = %request.language, "AnalyzeCode request");

        let analyze = InferenceRequest::new("analyze")
            .with_field("language", request.language)
            .with_field("code_structure", request.code_structure);
        let engine = Arc::clone(&self.engine);
        let result = self.workers.execute(move || engine.infer(&analyze)).await.map_err(|e| {
            error!(request_id = %request_id, error = %e, "AnalyzeCode worker failed");
            Status::internal(e.to_string())
        })?;

        if !result.success {
            let message = result.message.unwrap_or_else(|| "Analysis failed".to_string());
            warn!(request_id = %request_id, error = %message, "AnalyzeCode failed");
            return Err(Status::internal(message));
        }

        let output = result.output.unwrap_or(Value::Null);
        match (output["insights"].as_str(), output["confidence"].as_str()) {
            (Some(insights), Some(confidence)) => Ok(Response::new(proto::AnalyzeCodeResponse {
                insights: insights.to_string(),
                confidence: confidence.to_string(),
            })),
            _ => Err(Status::internal("Analyzer returned a malformed result")),
        }
    }

    async fn get_metrics(
        &self,
        request: Request<proto::MetricsRequest>,
    ) -> Result<Response<proto::MetricsResponse>, Status> {
        let request_id = Self::get_request_id(&request);
        info!(request_id = %request_id, "GetMetrics request");

        let summary = self.engine.metrics().summary();
        let stats = self.engine.cache().stats();

        Ok(Response::new(proto::MetricsResponse {
            request_count: summary.request_count,
            avg_latency: summary.avg_latency,
            max_latency: summary.max_latency,
            min_latency: summary.min_latency,
            cache_entries: stats.entries as u64,
        }))
    }
}
