use actix_files::Files;
use actix_web::web;
use log::error;
use std::path::Path;

use crate::web::error::ApiError;
use crate::web::handlers;

const JSON_LIMIT: usize = 100 * 1024;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .route("/generate", web::post().to(handlers::generate))
        .route("/health", web::get().to(handlers::health_check));
}

// Serves the asset directory at the root. Register after `configure` so the
// API routes win.
pub fn static_files(dir: &Path) -> Files {
    Files::new("/", dir).index_file("index.html")
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(JSON_LIMIT)
        .content_type_required(false)
        .error_handler(|err, _req| {
            error!("Rejected /generate body: {}", err);
            ApiError::from(err).into()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::CompletionClient;
    use crate::config::UpstreamConfig;
    use crate::AppState;
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use std::path::PathBuf;

    fn public_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("public")
    }

    fn state() -> web::Data<AppState> {
        let client = CompletionClient::new(&UpstreamConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            api_key: "test-key".to_string(),
            model: "test/model".to_string(),
            referer: "http://localhost:3000".to_string(),
            app_title: "Prompt Relay".to_string(),
            timeout: None,
        })
        .unwrap();
        web::Data::new(AppState { client })
    }

    macro_rules! app {
        () => {
            test::init_service(
                App::new()
                    .app_data(state())
                    .configure(configure)
                    .service(static_files(&public_dir())),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn existing_asset_is_served_unchanged() {
        let app = app!();
        let req = test::TestRequest::get().uri("/script.js").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body = test::read_body(resp).await;
        let expected = std::fs::read(public_dir().join("script.js")).unwrap();
        assert_eq!(body.as_ref(), expected.as_slice());
    }

    #[actix_web::test]
    async fn root_serves_index_page() {
        let app = app!();
        let req = test::TestRequest::get().uri("/").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body = test::read_body(resp).await;
        let expected = std::fs::read(public_dir().join("index.html")).unwrap();
        assert_eq!(body.as_ref(), expected.as_slice());
    }

    #[actix_web::test]
    async fn missing_asset_is_404() {
        let app = app!();
        let req = test::TestRequest::get().uri("/nope.js").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn health_check_is_ok() {
        let app = app!();
        let req = test::TestRequest::get().uri("/health").to_request();
        let resp: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(resp["status"], "ok");
    }
}
