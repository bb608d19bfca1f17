use crate::common::debug_mode_state;
use actix_web::http::StatusCode;
use actix_web::test::{call_service, init_service, read_body_json, TestRequest};
use actix_web::App;
use otel_config_agent::http_server::server::routes;
use serde_json::{json, Value};

fn base_payload() -> Value {
    json!({
        "namespace": null,
        "configmap_name": null,
        "receivers": {
            "hostmetrics": {"collection_interval": "1s"},
            "kubeletstats": {"collection_interval": "1s"}
        },
        "processors": {"batch": {}},
        "exporters": {"prometheus": {"endpoint": "0.0.0.0:8889"}},
        "service": {
            "pipelines": {
                "metrics/fluidosmonitoring": {
                    "receivers": ["hostmetrics", "kubeletstats"],
                    "processors": ["batch"],
                    "exporters": ["prometheus"]
                }
            }
        }
    })
}

fn partial_payload() -> Value {
    json!({
        "namespace": null,
        "configmap_name": null,
        "receivers": {"hostmetrics": {"collection_interval": "5s"}},
        "exporters": {"prometheus": {"endpoint": "0.0.0.0:8889"}}
    })
}

fn empty_payload() -> Value {
    json!({
        "namespace": null,
        "configmap_name": null,
        "receivers": {},
        "processors": {},
        "exporters": {},
        "service": {}
    })
}

#[actix_web::test]
async fn put_merges_into_the_stored_configuration() {
    let app = init_service(App::new().app_data(debug_mode_state()).configure(routes)).await;

    let request = TestRequest::put()
        .uri("/configurations")
        .set_json(base_payload())
        .to_request();
    let response = call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = read_body_json(response).await;
    assert_eq!(
        body["message"],
        "Pipeline created and ConfigMap successfully updated."
    );
    let configuration = &body["configuration"];
    // merged values replace the scalars, siblings survive
    assert_eq!(
        configuration["receivers"]["hostmetrics"],
        json!({"collection_interval": "1s", "scrapers": {"cpu": {}, "memory": {}}})
    );
    assert_eq!(
        configuration["receivers"]["kubeletstats"],
        json!({"collection_interval": "1s", "auth_type": "serviceAccount"})
    );
    assert_eq!(configuration["processors"]["batch"], json!({"timeout": "10s"}));
    assert_eq!(
        configuration["service"]["pipelines"]["metrics/fluidosmonitoring"]["processors"],
        json!(["batch"])
    );
    assert!(configuration["service"]["pipelines"]["metrics/otlp"].is_object());
}

#[actix_web::test]
async fn post_replaces_whole_components() {
    let app = init_service(App::new().app_data(debug_mode_state()).configure(routes)).await;

    let request = TestRequest::post()
        .uri("/configurations")
        .set_json(base_payload())
        .to_request();
    let response = call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = read_body_json(response).await;
    let configuration = &body["configuration"];
    assert_eq!(
        configuration["receivers"]["hostmetrics"],
        json!({"collection_interval": "1s"})
    );
    assert_eq!(configuration["processors"]["batch"], json!({}));
    assert!(configuration["receivers"]["otlp"].is_object());
    assert!(configuration["service"]["pipelines"]["metrics/otlp"].is_object());
}

#[actix_web::test]
async fn empty_sections_leave_the_configuration_untouched() {
    let app = init_service(App::new().app_data(debug_mode_state()).configure(routes)).await;

    let mut bodies = Vec::new();
    for request in [TestRequest::put(), TestRequest::post(), TestRequest::delete()] {
        let request = request
            .uri("/configurations")
            .set_json(empty_payload())
            .to_request();
        let response = call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = read_body_json(response).await;
        bodies.push(body["configuration"]["service"].clone());
    }
    assert_eq!(bodies[0], bodies[1]);
    assert_eq!(bodies[1], bodies[2]);
}

#[actix_web::test]
async fn delete_keeps_empty_settings_of_used_components() {
    let app = init_service(App::new().app_data(debug_mode_state()).configure(routes)).await;

    let request = TestRequest::delete()
        .uri("/configurations")
        .set_json(json!({
            "receivers": {"otlp": {"protocols": {"grpc": {"endpoint": "0.0.0.0:4317"}}}},
            "processors": {},
            "exporters": {},
            "service": {"pipelines": {"metrics/otlp": {"receivers": ["otlp"]}}}
        }))
        .to_request();
    let response = call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = read_body_json(response).await;
    let configuration = &body["configuration"];
    assert!(configuration["receivers"].get("otlp").is_none());
    assert_eq!(
        configuration["receivers"]["hostmetrics"]["scrapers"],
        json!({"cpu": {}, "memory": {}})
    );
    assert_eq!(
        configuration["service"]["pipelines"]["metrics/otlp"],
        json!({"processors": ["batch"], "exporters": ["prometheus"]})
    );
}

#[actix_web::test]
async fn partial_payloads_are_rejected() {
    let app = init_service(App::new().app_data(debug_mode_state()).configure(routes)).await;

    for request in [TestRequest::put(), TestRequest::post(), TestRequest::delete()] {
        let request = request
            .uri("/configurations")
            .set_json(partial_payload())
            .to_request();
        let response = call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}

#[actix_web::test]
async fn delete_trims_pipelines_and_prunes_components() {
    let app = init_service(App::new().app_data(debug_mode_state()).configure(routes)).await;

    let request = TestRequest::delete()
        .uri("/configurations")
        .set_json(json!({
            "namespace": null,
            "configmap_name": null,
            "receivers": {"kubeletstats": {"collection_interval": "10s", "auth_type": "serviceAccount"}},
            "processors": {"filter/privacy": {"metrics": {"exclude": {"match_type": "regexp", "metric_names": ["node_disk_info"]}}}},
            "exporters": {},
            "service": {
                "pipelines": {
                    "metrics/fluidosmonitoring": {
                        "receivers": ["kubeletstats"],
                        "processors": ["filter/privacy"]
                    },
                    "metrics/otlp": {
                        "receivers": ["otlp"],
                        "processors": ["batch"],
                        "exporters": ["prometheus"]
                    }
                }
            }
        }))
        .to_request();
    let response = call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = read_body_json(response).await;
    assert_eq!(
        body["message"],
        "Pipeline deleted and ConfigMap successfully updated."
    );
    let configuration = &body["configuration"];
    assert!(configuration["receivers"].get("kubeletstats").is_none());
    assert!(configuration["processors"].get("filter/privacy").is_none());
    // components used by the remaining pipeline are kept with their empty settings
    assert_eq!(
        configuration["receivers"]["hostmetrics"],
        json!({"collection_interval": "5s", "scrapers": {"cpu": {}, "memory": {}}})
    );
    assert_eq!(configuration["processors"]["batch"], json!({"timeout": "10s"}));
    assert_eq!(
        configuration["service"]["pipelines"],
        json!({
            "metrics/fluidosmonitoring": {
                "receivers": ["hostmetrics"],
                "processors": ["batch"],
                "exporters": ["prometheus"]
            }
        })
    );
}

#[actix_web::test]
async fn list_pipelines() {
    let app = init_service(App::new().app_data(debug_mode_state()).configure(routes)).await;

    let request = TestRequest::get().uri("/configurations").to_request();
    let response = call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = read_body_json(response).await;
    assert_eq!(
        body,
        json!({"pipelines": ["metrics/fluidosmonitoring", "metrics/otlp"]})
    );
}

#[actix_web::test]
async fn transfer_metrics_pipeline_is_templated() {
    let app = init_service(App::new().app_data(debug_mode_state()).configure(routes)).await;

    let request = TestRequest::post()
        .uri("/pipelines/transfermetrics")
        .set_json(json!({
            "prometheusExporter": "http://prometheus.d1:9090/api/v1/write",
            "domainID": "d1",
            "flavorID": "f1"
        }))
        .to_request();
    let response = call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = read_body_json(response).await;
    let configuration = &body["configuration"];
    assert_eq!(
        configuration["exporters"]["prometheusremotewrite/d1"],
        json!({"endpoint": "http://prometheus.d1:9090/api/v1/write"})
    );
    assert_eq!(
        configuration["service"]["pipelines"]["metrics/d1f1"]["processors"],
        json!(["filter/basicmetricsd1f1", "attributes/metrics", "k8sattributes", "resource", "batch"])
    );
}

#[actix_web::test]
async fn transfer_metrics_changes_require_the_pipeline() {
    let app = init_service(App::new().app_data(debug_mode_state()).configure(routes)).await;

    let request = TestRequest::delete()
        .uri("/pipelines/transfermetrics")
        .set_json(json!({"domainID": "d1", "flavorID": "f1"}))
        .to_request();
    let response = call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = read_body_json(response).await;
    assert_eq!(body, json!({"detail": "Pipeline 'metrics/d1f1' not found"}));
}

#[actix_web::test]
async fn reload_is_unavailable_in_debug_mode() {
    let app = init_service(App::new().app_data(debug_mode_state()).configure(routes)).await;

    let request = TestRequest::post()
        .uri("/reload")
        .set_json(json!({"namespace": "monitoring"}))
        .to_request();
    let response = call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}
