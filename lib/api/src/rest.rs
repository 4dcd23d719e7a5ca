use actix_cors::Cors;
use actix_web::{web, App, HttpResponse, HttpServer, Result as ActixResult};
use casebase_core::{CaseId, Record};
use casebase_similarity::CaseBase;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

#[derive(Deserialize)]
struct RetrieveRequest {
    query: Record,
    k: Option<usize>,
}

pub struct RestApi;

impl RestApi {
    pub async fn start(base: Arc<CaseBase>, port: u16) -> std::io::Result<()> {
        HttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header()
                .max_age(3600);

            App::new()
                .wrap(cors)
                .app_data(web::Data::new(base.clone()))
                .configure(Self::configure)
        })
        .bind(("0.0.0.0", port))?
        .run()
        .await
    }

    /// Register routes; the app must carry `web::Data<Arc<CaseBase>>`
    pub fn configure(cfg: &mut web::ServiceConfig) {
        cfg.route("/schema", web::get().to(get_schema))
            .route("/cases/{id}", web::get().to(get_case))
            .route("/options/{attribute}", web::get().to(get_options))
            .route("/retrieve", web::post().to(retrieve));
    }
}

async fn get_schema(base: web::Data<Arc<CaseBase>>) -> ActixResult<HttpResponse> {
    let schema = base.schema();
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "result": {
            "schema": schema,
            "columns": base.stats().column_names(schema),
            "dim": base.stats().dim(),
            "cases_count": base.corpus().len(),
            "filter_attribute": base.config().filter_attribute,
            "default_k": base.config().default_k,
        }
    })))
}

async fn get_case(
    base: web::Data<Arc<CaseBase>>,
    path: web::Path<usize>,
) -> ActixResult<HttpResponse> {
    let id = CaseId(path.into_inner());

    match base.case(id) {
        Some(record) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "result": { "id": id, "record": record }
        }))),
        None => Ok(HttpResponse::NotFound().json(serde_json::json!({
            "status": "error",
            "error": format!("Case not found: {}", id)
        }))),
    }
}

async fn get_options(
    base: web::Data<Arc<CaseBase>>,
    path: web::Path<String>,
    query: web::Query<HashMap<String, String>>,
) -> ActixResult<HttpResponse> {
    let attribute = path.into_inner();
    let constraints: Record = query
        .into_inner()
        .into_iter()
        .map(|(name, value)| (name, Value::String(value)))
        .collect();

    match base.options(&attribute, &constraints) {
        Ok(values) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "result": values
        }))),
        Err(e) => Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "status": "error",
            "error": e.to_string()
        }))),
    }
}

async fn retrieve(
    base: web::Data<Arc<CaseBase>>,
    req: web::Json<RetrieveRequest>,
) -> ActixResult<HttpResponse> {
    match base.retrieve(&req.query, req.k) {
        Ok(retrieval) => Ok(HttpResponse::Ok().json(retrieval.to_response(base.schema()))),
        Err(e) => {
            warn!("Rejected query: {}", e);
            Ok(HttpResponse::BadRequest().json(serde_json::json!({
                "status": "error",
                "error": e.to_string()
            })))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test;
    use casebase_schema::FeatureSchema;
    use casebase_similarity::RetrieverConfig;
    use serde_json::json;

    fn case_base() -> Arc<CaseBase> {
        let rows = vec![
            json!({"Manufacturer": "Ford", "Model": "Fiesta", "Fuel type": "Petrol",
                   "Engine size": 1.0, "Year of manufacture": 2017, "Mileage": 30000, "Price": 8000}),
            json!({"Manufacturer": "Ford", "Model": "Focus", "Fuel type": "Diesel",
                   "Engine size": 1.6, "Year of manufacture": 2018, "Mileage": 20000, "Price": 11000}),
        ];
        let base = CaseBase::from_records(
            FeatureSchema::car_sales(),
            rows.into_iter().filter_map(|r| r.as_object().cloned()),
            RetrieverConfig::default(),
        )
        .unwrap();
        Arc::new(base)
    }

    macro_rules! app {
        () => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new(case_base()))
                    .configure(RestApi::configure),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn test_retrieve_self_match() {
        let app = app!();
        let req = test::TestRequest::post()
            .uri("/retrieve")
            .set_json(json!({
                "query": {"Manufacturer": "Ford", "Model": "Fiesta", "Fuel type": "Petrol",
                          "Engine size": 1.0, "Year of manufacture": 2017, "Mileage": 30000},
                "k": 1
            }))
            .to_request();

        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["result"][0]["id"], json!(0));
        assert_eq!(body["result"][0]["distance"], json!(0.0));
        assert_eq!(body["estimate"], json!(8000.0));
    }

    #[actix_web::test]
    async fn test_retrieve_validation_error() {
        let app = app!();
        let req = test::TestRequest::post()
            .uri("/retrieve")
            .set_json(json!({"query": {"Manufacturer": "Ford"}}))
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_retrieve_empty_filter() {
        let app = app!();
        let req = test::TestRequest::post()
            .uri("/retrieve")
            .set_json(json!({
                "query": {"Manufacturer": "Audi", "Model": "A3", "Fuel type": "Petrol",
                          "Engine size": 1.4, "Year of manufacture": 2019, "Mileage": 1000}
            }))
            .to_request();

        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["result"], json!([]));
        assert_eq!(body["estimate"], Value::Null);
    }

    #[actix_web::test]
    async fn test_case_and_options() {
        let app = app!();

        let req = test::TestRequest::get().uri("/cases/1").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["result"]["record"]["Model"], json!("Focus"));

        let req = test::TestRequest::get().uri("/cases/9").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::NOT_FOUND);

        let req = test::TestRequest::get()
            .uri("/options/Model?Manufacturer=Ford")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["result"], json!(["Fiesta", "Focus"]));
    }

    #[actix_web::test]
    async fn test_schema() {
        let app = app!();
        let req = test::TestRequest::get().uri("/schema").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["result"]["dim"], json!(8));
        assert_eq!(body["result"]["filter_attribute"], json!("Manufacturer"));
    }
}
