use std::path::{Path, PathBuf};
use std::sync::Mutex;

use a4c_client::error::RegistryOperation;
use a4c_client::registry::{find_registered, refresh_plugin, PluginsApi, RefreshReport};
use a4c_client::session::Session;
use a4c_client::{Config, RegistrarError};
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{header, method, path, path_regex};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

const PLUGIN_NAME: &str = "a4c-brooklyn-provider";
const ARCHIVE_BYTES: &[u8] = b"PK\x03\x04brooklyn-archive";

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("{prefix}-{}", Uuid::new_v4()));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

struct CleanupDir(PathBuf);

impl Drop for CleanupDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.0);
    }
}

fn write_archive(dir: &Path) -> PathBuf {
    let file = dir.join("a4c-brooklyn-plugin.zip");
    std::fs::write(&file, ARCHIVE_BYTES)
        .unwrap_or_else(|e| panic!("write {} failed: {e}", file.display()));
    file
}

fn plugin_json(id: &str, logical_name: &str) -> serde_json::Value {
    json!({ "id": id, "descriptor": { "id": logical_name, "version": "0.10.0-SNAPSHOT" } })
}

fn list_body(plugins: Vec<serde_json::Value>) -> serde_json::Value {
    let total = plugins.len();
    json!({ "data": { "data": plugins, "totalResults": total }, "error": null })
}

/// 启动模拟服务器并挂载会话与登录接口，返回已登录的会话。
fn signed_in(server: &MockServer, archive: &Path) -> (Config, Session) {
    tokio_test::block_on(
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(
                ResponseTemplate::new(200).insert_header("set-cookie", "JSESSIONID=s1; Path=/"),
            )
            .mount(server),
    );
    tokio_test::block_on(
        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(ResponseTemplate::new(200))
            .mount(server),
    );

    let config = Config::new(archive.to_path_buf()).with_root_url(&server.uri());
    let session = Session::open(&config).expect("open session");
    session.sign_in(&config).expect("sign in");
    (config, session)
}

fn mount_list(server: &MockServer, plugins: Vec<serde_json::Value>) {
    tokio_test::block_on(
        Mock::given(method("GET"))
            .and(path("/rest/plugins"))
            .and(header("cookie", "JSESSIONID=s1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(list_body(plugins)))
            .mount(server),
    );
}

fn mount_create(server: &MockServer, status: u16, times: u64) {
    tokio_test::block_on(
        Mock::given(method("POST"))
            .and(path("/rest/plugins"))
            .respond_with(ResponseTemplate::new(status))
            .expect(times)
            .mount(server),
    );
}

fn deleted_paths(server: &MockServer) -> Vec<String> {
    tokio_test::block_on(server.received_requests())
        .expect("request recording enabled")
        .into_iter()
        .filter(|r| r.method.as_str() == "DELETE")
        .map(|r| r.url.path().to_string())
        .collect()
}

#[test]
fn refresh_without_existing_plugin_only_creates() {
    let dir = unique_temp_dir("a4c-refresh-empty");
    let _cleanup = CleanupDir(dir.clone());
    let archive = write_archive(&dir);

    let server = tokio_test::block_on(MockServer::start());
    let (config, session) = signed_in(&server, &archive);
    mount_list(
        &server,
        vec![plugin_json("other-1", "alien-cloudify-3-orchestrator")],
    );
    tokio_test::block_on(
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server),
    );
    mount_create(&server, 200, 1);

    let report = refresh_plugin(&session, &config.plugin_name, &config.plugin_file).expect("refresh");
    assert_eq!(
        report,
        RefreshReport {
            deleted: vec![],
            created: true
        }
    );
}

#[test]
fn refresh_deletes_every_match_in_listed_order() {
    let dir = unique_temp_dir("a4c-refresh-dupes");
    let _cleanup = CleanupDir(dir.clone());
    let archive = write_archive(&dir);

    let server = tokio_test::block_on(MockServer::start());
    let (config, session) = signed_in(&server, &archive);
    mount_list(
        &server,
        vec![
            plugin_json("p1", PLUGIN_NAME),
            plugin_json("keep-me", "a4c-brooklyn-provider-legacy"),
            plugin_json("p2", PLUGIN_NAME),
        ],
    );
    for id in ["p1", "p2"] {
        tokio_test::block_on(
            Mock::given(method("DELETE"))
                .and(path(format!("/rest/plugins/{id}")))
                .respond_with(ResponseTemplate::new(200))
                .expect(1)
                .mount(&server),
        );
    }
    tokio_test::block_on(
        Mock::given(method("DELETE"))
            .and(path("/rest/plugins/keep-me"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server),
    );
    mount_create(&server, 200, 1);

    let report = refresh_plugin(&session, &config.plugin_name, &config.plugin_file).expect("refresh");

    assert_eq!(report.deleted, vec!["p1".to_string(), "p2".to_string()]);
    assert!(report.created);
    assert_eq!(
        deleted_paths(&server),
        vec!["/rest/plugins/p1".to_string(), "/rest/plugins/p2".to_string()]
    );

    let requests = tokio_test::block_on(server.received_requests()).expect("recording");
    let last = requests.last().expect("at least one request");
    assert_eq!(last.method.as_str(), "POST");
    assert_eq!(last.url.path(), "/rest/plugins");
}

#[test]
fn upload_sends_archive_as_multipart_file_field() {
    let dir = unique_temp_dir("a4c-refresh-upload");
    let _cleanup = CleanupDir(dir.clone());
    let archive = write_archive(&dir);

    let server = tokio_test::block_on(MockServer::start());
    let (_config, session) = signed_in(&server, &archive);
    mount_create(&server, 200, 1);

    PluginsApi::new(&session).create(&archive).expect("upload");

    let requests = tokio_test::block_on(server.received_requests()).expect("recording");
    let upload = requests
        .iter()
        .find(|r| r.method.as_str() == "POST" && r.url.path() == "/rest/plugins")
        .expect("upload request recorded");
    let content_type = upload
        .headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(content_type.starts_with("multipart/form-data"), "{content_type}");
    let body = String::from_utf8_lossy(&upload.body);
    assert!(body.contains("name=\"file\""), "{body}");
    assert!(body.contains("brooklyn-archive"), "{body}");
}

#[test]
fn create_rechecks_archive_before_upload() {
    let dir = unique_temp_dir("a4c-refresh-missing");
    let _cleanup = CleanupDir(dir.clone());
    let archive = write_archive(&dir);

    let server = tokio_test::block_on(MockServer::start());
    let (_config, session) = signed_in(&server, &archive);
    mount_create(&server, 200, 0);

    let gone = dir.join("gone.zip");
    match PluginsApi::new(&session).create(&gone) {
        Err(RegistrarError::Precondition { path }) => assert_eq!(path, gone),
        other => panic!("expected precondition error, got {other:?}"),
    }
}

#[test]
fn failed_upload_is_reported() {
    let dir = unique_temp_dir("a4c-refresh-upload-fail");
    let _cleanup = CleanupDir(dir.clone());
    let archive = write_archive(&dir);

    let server = tokio_test::block_on(MockServer::start());
    let (config, session) = signed_in(&server, &archive);
    mount_list(&server, vec![]);
    mount_create(&server, 500, 1);

    match refresh_plugin(&session, &config.plugin_name, &config.plugin_file) {
        Err(RegistrarError::RegistryOperation { operation, status }) => {
            assert_eq!(status, 500);
            assert_eq!(operation, RegistryOperation::Create { path: archive });
        }
        other => panic!("expected registry error, got {other:?}"),
    }
}

#[test]
fn failed_delete_stops_before_upload() {
    let dir = unique_temp_dir("a4c-refresh-delete-fail");
    let _cleanup = CleanupDir(dir.clone());
    let archive = write_archive(&dir);

    let server = tokio_test::block_on(MockServer::start());
    let (config, session) = signed_in(&server, &archive);
    mount_list(&server, vec![plugin_json("p1", PLUGIN_NAME)]);
    tokio_test::block_on(
        Mock::given(method("DELETE"))
            .and(path("/rest/plugins/p1"))
            .respond_with(ResponseTemplate::new(409))
            .expect(1)
            .mount(&server),
    );
    mount_create(&server, 200, 0);

    match refresh_plugin(&session, &config.plugin_name, &config.plugin_file) {
        Err(RegistrarError::RegistryOperation { operation, status }) => {
            assert_eq!(status, 409);
            assert_eq!(
                operation,
                RegistryOperation::Delete {
                    id: "p1".to_string()
                }
            );
        }
        other => panic!("expected registry error, got {other:?}"),
    }
}

#[test]
fn list_failure_prevents_any_write() {
    let dir = unique_temp_dir("a4c-refresh-list-fail");
    let _cleanup = CleanupDir(dir.clone());
    let archive = write_archive(&dir);

    let server = tokio_test::block_on(MockServer::start());
    let (config, session) = signed_in(&server, &archive);
    tokio_test::block_on(
        Mock::given(method("GET"))
            .and(path("/rest/plugins"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server),
    );
    mount_create(&server, 200, 0);

    assert!(matches!(
        refresh_plugin(&session, &config.plugin_name, &config.plugin_file),
        Err(RegistrarError::RegistryOperation {
            operation: RegistryOperation::List,
            status: 403
        })
    ));
}

#[test]
fn find_registered_filters_by_logical_name() {
    let dir = unique_temp_dir("a4c-detect");
    let _cleanup = CleanupDir(dir.clone());
    let archive = write_archive(&dir);

    let server = tokio_test::block_on(MockServer::start());
    let (config, session) = signed_in(&server, &archive);
    mount_list(
        &server,
        vec![
            plugin_json("other", "alien-cloudify-3-orchestrator"),
            plugin_json("p7", PLUGIN_NAME),
        ],
    );

    let found = find_registered(&session, &config.plugin_name).expect("list");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, "p7");
}

/// 有状态的插件注册表：支持列表/上传/删除，用于验证重复刷新的幂等性。
struct FakeRegistry {
    plugins: Mutex<Vec<(String, String)>>,
    next_id: Mutex<u32>,
}

impl Respond for FakeRegistry {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let mut plugins = self.plugins.lock().expect("registry lock");
        match request.method.as_str() {
            "GET" => {
                let items = plugins
                    .iter()
                    .map(|(id, name)| plugin_json(id, name))
                    .collect();
                ResponseTemplate::new(200).set_body_json(list_body(items))
            }
            "POST" => {
                let mut next = self.next_id.lock().expect("id lock");
                *next += 1;
                plugins.push((format!("gen-{next}"), PLUGIN_NAME.to_string()));
                ResponseTemplate::new(200)
            }
            "DELETE" => {
                let id = request
                    .url
                    .path()
                    .trim_start_matches("/rest/plugins/")
                    .to_string();
                plugins.retain(|(existing, _)| existing != &id);
                ResponseTemplate::new(200)
            }
            _ => ResponseTemplate::new(405),
        }
    }
}

#[test]
fn repeated_refresh_leaves_exactly_one_entry() {
    let dir = unique_temp_dir("a4c-refresh-idempotent");
    let _cleanup = CleanupDir(dir.clone());
    let archive = write_archive(&dir);

    let server = tokio_test::block_on(MockServer::start());
    let (config, session) = signed_in(&server, &archive);
    tokio_test::block_on(
        Mock::given(path_regex(r"^/rest/plugins"))
            .respond_with(FakeRegistry {
                plugins: Mutex::new(vec![
                    ("seed".to_string(), "alien-cloudify-3-orchestrator".to_string()),
                    ("old".to_string(), PLUGIN_NAME.to_string()),
                ]),
                next_id: Mutex::new(0),
            })
            .mount(&server),
    );

    let first = refresh_plugin(&session, &config.plugin_name, &config.plugin_file).expect("first");
    let second = refresh_plugin(&session, &config.plugin_name, &config.plugin_file).expect("second");
    assert_eq!(first.deleted, vec!["old".to_string()]);
    assert_eq!(second.deleted, vec!["gen-1".to_string()]);

    let found = find_registered(&session, &config.plugin_name).expect("list");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, "gen-2");

    let all = PluginsApi::new(&session).list().expect("list all");
    assert!(all.iter().any(|p| p.id == "seed"));
}
