//! End-to-end runs through the real HTTP uploader and a scripted server.

use apkdeploy_engine::{Engine, plan};
use apkdeploy_export::MemorySink;
use apkdeploy_logging::{Logger, LoggingConfig};
use apkdeploy_reconcile::PathInput;
use apkdeploy_schema::{RunStatus, UploadMetadata, outputs};
use apkdeploy_testkit::{StubResponse, StubServer, valid_metadata, write_package};
use apkdeploy_upload::HttpUploader;

#[test]
fn single_package_success() {
    let dir = tempfile::tempdir().unwrap();
    let apk = write_package(dir.path(), "app.apk");
    let server = StubServer::start(vec![StubResponse::created(
        r#"{"public_url":"https://x/pub"}"#,
    )]);
    let log = Logger::capturing(LoggingConfig::default());
    let sink = MemorySink::new();
    let uploader = HttpUploader::new(server.base_url(), &log).unwrap();
    let paths = PathInput::Toggle {
        use_list: false,
        single_package: apk,
        package_list: vec![],
        single_mapping: String::new(),
        mapping_list: vec![],
    };

    let targets = plan(&paths, &valid_metadata(), &log).unwrap();
    let outcome = Engine::new(&uploader, &sink, &log)
        .run(&targets, &valid_metadata())
        .unwrap();

    assert_eq!(outcome.status, RunStatus::Success);
    assert_eq!(outcome.public_urls, vec!["https://x/pub"]);
    assert!(outcome.build_urls.is_empty());
    assert!(outcome.config_urls.is_empty());

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].path, "/api/2/apps/upload");
    assert!(requests[0].has_part("ipa"));
    assert!(!requests[0].has_part("dsym"));
    assert_eq!(sink.get(outputs::PUBLIC_URL_LIST).as_deref(), Some("https://x/pub"));
    assert_eq!(sink.get(outputs::BUILD_URL_LIST).as_deref(), Some(""));
}

#[test]
fn server_error_aborts_remaining_targets() {
    let dir = tempfile::tempdir().unwrap();
    let first = write_package(dir.path(), "first.apk");
    let second = write_package(dir.path(), "second.apk");
    let server = StubServer::start(vec![StubResponse::new(500, "boom")]);
    let log = Logger::capturing(LoggingConfig::default());
    let sink = MemorySink::new();
    let uploader = HttpUploader::new(server.base_url(), &log).unwrap();
    let paths = PathInput::List {
        package_list: vec![first, second],
        mapping_list: vec![],
    };

    let targets = plan(&paths, &valid_metadata(), &log).unwrap();
    let err = Engine::new(&uploader, &sink, &log)
        .run(&targets, &valid_metadata())
        .unwrap_err();

    assert!(err.is_server_error());
    assert_ne!(err.exit_code(), 0);
    assert_eq!(server.requests().len(), 1);
    assert_eq!(sink.get(outputs::STATUS).as_deref(), Some("failed"));
    assert!(sink.get(outputs::PUBLIC_URL).is_none());
}

#[test]
fn app_id_routes_to_per_app_endpoint() {
    let dir = tempfile::tempdir().unwrap();
    let apk = write_package(dir.path(), "app.apk");
    let server = StubServer::start(vec![StubResponse::created("{}")]);
    let log = Logger::capturing(LoggingConfig::default());
    let sink = MemorySink::new();
    let uploader = HttpUploader::new(server.base_url(), &log).unwrap();
    let metadata = UploadMetadata {
        app_id: Some("42".into()),
        ..valid_metadata()
    };
    let paths = PathInput::Delimited {
        packages: apk,
        mapping: String::new(),
        mapping_list: Vec::new(),
    };

    let targets = plan(&paths, &metadata, &log).unwrap();
    Engine::new(&uploader, &sink, &log)
        .run(&targets, &metadata)
        .unwrap();

    assert_eq!(
        server.requests()[0].path,
        "/api/2/apps/42/app_versions/upload"
    );
}
