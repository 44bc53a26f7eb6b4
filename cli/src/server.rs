#[cfg(feature = "server")]
pub mod http {
    use axum::{
        extract::State,
        http::StatusCode,
        response::{IntoResponse, Json},
        routing::{get, post},
        Router,
    };
    use pricerule::{Definition, Engine, RuleError};
    use serde::{Deserialize, Serialize};
    use std::collections::HashMap;
    use std::net::SocketAddr;
    use std::sync::Arc;
    use tower_http::cors::CorsLayer;
    use tracing::{info, warn};

    type SharedEngine = Arc<Engine>;

    #[derive(Debug, Deserialize)]
    struct ValidateRequest {
        text: String,
        #[serde(default)]
        definition: Option<Definition>,
    }

    #[derive(Debug, Serialize)]
    struct ValidateResponse {
        canonical: String,
        definition: Definition,
    }

    #[derive(Debug, Deserialize)]
    struct EvaluateRequest {
        expression: String,
        #[serde(default)]
        variables: HashMap<String, f64>,
    }

    #[derive(Debug, Serialize)]
    struct EvaluateResponse {
        value: f64,
    }

    #[derive(Debug, Serialize)]
    #[serde(rename_all = "camelCase")]
    struct ErrorResponse {
        category: String,
        error: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        offending_text: Option<String>,
    }

    type ApiError = (StatusCode, Json<ErrorResponse>);

    fn reject(error: RuleError) -> ApiError {
        warn!(category = error.category().name(), "Rejected request: {}", error);
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorResponse {
                category: error.category().name().to_string(),
                offending_text: error.offending_text().map(str::to_string),
                error: error.to_string(),
            }),
        )
    }

    pub fn router(engine: Engine) -> Router {
        Router::new()
            .route("/health", get(health_check))
            .route("/validate", post(validate))
            .route("/evaluate", post(evaluate))
            .layer(CorsLayer::permissive())
            .with_state(Arc::new(engine))
    }

    pub async fn start_server(engine: Engine, host: &str, port: u16) -> anyhow::Result<()> {
        let app = router(engine);

        let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
        info!("pricerule server listening on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }

    async fn health_check() -> impl IntoResponse {
        Json(serde_json::json!({
            "status": "ok",
            "service": "pricerule",
            "version": env!("CARGO_PKG_VERSION")
        }))
    }

    async fn validate(
        State(engine): State<SharedEngine>,
        Json(payload): Json<ValidateRequest>,
    ) -> Result<impl IntoResponse, ApiError> {
        let base = match payload.definition {
            Some(definition) => {
                engine.validate_definition(&definition).map_err(reject)?;
                definition
            }
            None => Definition::with_reserved(),
        };

        let definition = engine
            .apply_expression(&base, &payload.text)
            .map_err(reject)?;
        let canonical = engine.serialize(&definition);
        info!(clauses = definition.clause_count(), "Validated rule");

        Ok(Json(ValidateResponse {
            canonical,
            definition,
        }))
    }

    async fn evaluate(
        State(engine): State<SharedEngine>,
        Json(payload): Json<EvaluateRequest>,
    ) -> Result<impl IntoResponse, ApiError> {
        let value = engine
            .evaluate(&payload.expression, &payload.variables)
            .map_err(reject)?;
        Ok(Json(EvaluateResponse { value }))
    }

}
