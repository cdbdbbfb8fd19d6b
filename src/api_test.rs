/// Tests for the Xray client against an in-process HTTP responder
#[cfg(test)]
mod tests {
    use crate::api::*;
    use crate::convert::{TestExecutionInfo, XrayReport};
    use std::collections::HashMap;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::sync::{Arc, Mutex};
    use std::thread::{self, JoinHandle};

    #[derive(Debug, Clone)]
    struct RecordedRequest {
        method: String,
        target: String,
        headers: HashMap<String, String>,
        body: String,
    }

    /// Serves one canned response per connection, in order
    struct MockServer {
        url: String,
        requests: Arc<Mutex<Vec<RecordedRequest>>>,
        handle: JoinHandle<()>,
    }

    impl MockServer {
        fn start(responses: Vec<(u16, &'static str)>) -> Self {
            let listener = TcpListener::bind("127.0.0.1:0").expect("bind mock server");
            let url = format!("http://{}", listener.local_addr().unwrap());
            let requests = Arc::new(Mutex::new(Vec::new()));
            let recorded = Arc::clone(&requests);

            let handle = thread::spawn(move || {
                for (status, body) in responses {
                    let (stream, _) = listener.accept().expect("accept");
                    let mut reader = BufReader::new(stream.try_clone().unwrap());

                    let mut request_line = String::new();
                    reader.read_line(&mut request_line).unwrap();
                    let mut parts = request_line.split_whitespace();
                    let method = parts.next().unwrap_or_default().to_string();
                    let target = parts.next().unwrap_or_default().to_string();

                    let mut headers = HashMap::new();
                    loop {
                        let mut line = String::new();
                        reader.read_line(&mut line).unwrap();
                        let line = line.trim_end();
                        if line.is_empty() {
                            break;
                        }
                        if let Some((name, value)) = line.split_once(':') {
                            headers.insert(name.trim().to_lowercase(), value.trim().to_string());
                        }
                    }

                    let length = headers.get("content-length").and_then(|l| l.parse::<usize>().ok()).unwrap_or(0);
                    let mut body_bytes = vec![0u8; length];
                    reader.read_exact(&mut body_bytes).unwrap();
                    recorded.lock().unwrap().push(RecordedRequest {
                        method,
                        target,
                        headers,
                        body: String::from_utf8_lossy(&body_bytes).to_string(),
                    });

                    let mut stream = stream;
                    write!(
                        stream,
                        "HTTP/1.1 {} Mock\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        status,
                        body.len(),
                        body
                    )
                    .unwrap();
                    stream.flush().unwrap();
                }
            });

            MockServer { url, requests, handle }
        }

        fn finish(self) -> Vec<RecordedRequest> {
            self.handle.join().expect("mock server thread");
            Arc::try_unwrap(self.requests).unwrap().into_inner().unwrap()
        }
    }

    fn report() -> XrayReport {
        XrayReport { execution_key: None, info: TestExecutionInfo::default(), tests: vec![] }
    }

    #[test]
    fn test_server_token_import() {
        let server = MockServer::start(vec![(200, r#"{"testExecIssue":{"id":"10001","key":"BRU-9","self":"http://jira/rest/api/2/issue/10001"}}"#)]);
        let client = XrayClient::new(Credentials::ServerToken { token: "pat-123".to_string() }, &format!("{}/", server.url));

        let response = client.import_execution(&report(), "BRU").unwrap();
        assert_eq!(response.key(), "BRU-9");

        let requests = server.finish();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, "POST");
        assert_eq!(requests[0].target, "/rest/raven/1.0/import/execution?projectKey=BRU");
        assert_eq!(requests[0].headers["authorization"], "Bearer pat-123");
        assert_eq!(requests[0].headers["content-type"], "application/json");
        let body: serde_json::Value = serde_json::from_str(&requests[0].body).unwrap();
        assert_eq!(body["info"]["summary"], "Bruno test execution");
    }

    #[test]
    fn test_cloud_import_authenticates_once() {
        let server = MockServer::start(vec![
            (200, r#""cloud-token""#),
            (200, r#"{"id":"10002","key":"BRU-10","self":"https://example.atlassian.net/rest/api/2/issue/10002"}"#),
            (200, "name,language\nJeff,en\n"),
        ]);
        let credentials = Credentials::Cloud { client_id: "id".to_string(), client_secret: "secret".to_string() };
        let client = XrayClient::new(credentials, "https://ignored.example.com").with_base_url(&server.url);

        let response = client.import_execution(&report(), "BRU").unwrap();
        assert_eq!(response.key(), "BRU-10");
        let dataset = client.download_dataset("BRU-65").unwrap();
        assert_eq!(dataset, "name,language\nJeff,en\n");

        let requests = server.finish();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[0].target, "/api/v2/authenticate");
        let credentials: serde_json::Value = serde_json::from_str(&requests[0].body).unwrap();
        assert_eq!(credentials, serde_json::json!({ "client_id": "id", "client_secret": "secret" }));
        assert_eq!(requests[1].target, "/api/v2/import/execution?projectKey=BRU");
        assert_eq!(requests[1].headers["authorization"], "Bearer cloud-token");
        assert_eq!(requests[2].method, "GET");
        assert_eq!(requests[2].target, "/api/v2/dataset/export?testIssueKey=BRU-65");
        assert_eq!(requests[2].headers["authorization"], "Bearer cloud-token");
    }

    #[test]
    fn test_server_dataset_path() {
        let server = MockServer::start(vec![(200, "a,b\n1,2\n")]);
        let credentials = Credentials::ServerBasic { username: "user".to_string(), password: "pass".to_string() };
        let client = XrayClient::new(credentials, &server.url);

        assert_eq!(client.download_dataset("BRU-1").unwrap(), "a,b\n1,2\n");
        let requests = server.finish();
        assert_eq!(requests[0].target, "/rest/raven/2.0/api/dataset/export?testIssueKey=BRU-1");
        assert_eq!(requests[0].headers["authorization"], "Basic dXNlcjpwYXNz");
    }

    #[test]
    fn test_unexpected_status_is_error() {
        let server = MockServer::start(vec![(400, r#"{"error":"Test with key DP-90 not found"}"#)]);
        let client = XrayClient::new(Credentials::ServerToken { token: "t".to_string() }, &server.url);

        let error = client.import_execution(&report(), "BRU").unwrap_err();
        server.finish();
        match error {
            ApiError::UnexpectedStatus { status, body } => {
                assert_eq!(status, 400);
                assert!(body.contains("DP-90 not found"));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_transport_error() {
        // Nothing listens on the port once the listener is dropped
        let port = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();
        let client = XrayClient::new(Credentials::ServerToken { token: "t".to_string() }, &format!("http://127.0.0.1:{}", port));
        assert!(matches!(client.download_dataset("BRU-1"), Err(ApiError::Transport { .. })));
    }

    #[test]
    fn test_basic_authorization() {
        assert_eq!(basic_authorization("user", "pass"), "Basic dXNlcjpwYXNz");
    }

    #[test]
    fn test_format_follows_credentials() {
        use crate::convert::XrayFormat;
        let cloud = Credentials::Cloud { client_id: "a".to_string(), client_secret: "b".to_string() };
        assert_eq!(cloud.format(), XrayFormat::Cloud);
        assert_eq!(Credentials::ServerToken { token: "t".to_string() }.format(), XrayFormat::Server);
    }

    #[test]
    fn test_debug_hides_secrets() {
        let cloud = Credentials::Cloud { client_id: "id".to_string(), client_secret: "very-secret".to_string() };
        let token = Credentials::ServerToken { token: "pat-secret".to_string() };
        assert!(!format!("{:?}", cloud).contains("very-secret"));
        assert!(!format!("{:?}", token).contains("pat-secret"));
    }

    #[test]
    fn test_import_response_shapes() {
        let server: ImportResponse = serde_json::from_str(r#"{"testExecIssue":{"id":"1","key":"A-1","self":"x"}}"#).unwrap();
        let cloud: ImportResponse = serde_json::from_str(r#"{"id":"2","key":"A-2","self":"y"}"#).unwrap();
        assert_eq!(server.key(), "A-1");
        assert_eq!(cloud.key(), "A-2");
    }
}
