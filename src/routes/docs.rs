//! Machine-readable API description and the interactive documentation
//! page served over it.

use axum::response::{Html, Redirect};
use axum::Json;
use serde_json::{json, Value};

pub async fn root_handler() -> Redirect {
    Redirect::to("/docs")
}

pub async fn docs_handler() -> Html<&'static str> {
    Html(DOCS_PAGE)
}

pub async fn openapi_handler() -> Json<Value> {
    Json(openapi_document())
}

fn openapi_document() -> Value {
    json!({
        "openapi": "3.0.3",
        "info": {
            "title": "Vida Analytics Engine",
            "description": "Statistical correlation analysis and revenue forecasting for restaurant performance management",
            "version": "1.0.0"
        },
        "paths": {
            "/health": {
                "get": {
                    "summary": "Health check",
                    "responses": { "200": { "description": "Service status and current time" } }
                }
            },
            "/analytics/correlation": {
                "post": {
                    "summary": "Correlate operational metrics against revenue",
                    "requestBody": {
                        "content": { "application/json": { "schema": {
                            "type": "object",
                            "required": ["restaurant_id"],
                            "properties": {
                                "restaurant_id": { "type": "integer" },
                                "metrics": { "type": "array", "items": { "type": "string" } },
                                "correlation_type": { "type": "string", "enum": ["pearson", "spearman"], "default": "pearson" }
                            }
                        } } }
                    },
                    "responses": { "200": { "description": "Correlation result set (live or mock fallback)" } }
                }
            },
            "/analytics/forecast": {
                "post": {
                    "summary": "Linear-trend revenue forecast with confidence intervals",
                    "requestBody": {
                        "content": { "application/json": { "schema": {
                            "type": "object",
                            "required": ["restaurant_id", "historical_data"],
                            "properties": {
                                "restaurant_id": { "type": "integer" },
                                "historical_data": { "type": "array", "items": {
                                    "type": "object",
                                    "properties": {
                                        "date": { "type": "string", "format": "date" },
                                        "total_revenue": { "type": "number" }
                                    }
                                } },
                                "forecast_days": { "type": "integer", "default": 30 }
                            }
                        } } }
                    },
                    "responses": {
                        "200": { "description": "Forecast points, model accuracy and trend direction" },
                        "400": { "description": "Fewer than 7 historical points, or malformed records" }
                    }
                }
            }
        }
    })
}

const DOCS_PAGE: &str = r##"<!DOCTYPE html>
<html>
<head>
  <title>Vida Analytics Engine</title>
  <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css">
</head>
<body>
  <div id="swagger-ui"></div>
  <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
  <script>
    SwaggerUIBundle({ url: "/openapi.json", dom_id: "#swagger-ui" });
  </script>
</body>
</html>
"##;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_document_lists_endpoints() {
        let doc = openapi_document();
        let paths = doc["paths"].as_object().unwrap();
        assert!(paths.contains_key("/analytics/correlation"));
        assert!(paths.contains_key("/analytics/forecast"));
        assert!(paths.contains_key("/health"));
    }
}
