use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Request, Response, Server};

use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub query: Option<String>,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(String::as_str)
    }
}

pub struct TestServer {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.path).collect()
    }
}

/// Serves fixed `(status, body)` responses by path; anything else is a 404.
pub async fn start_test_server(routes: Vec<(&str, u16, String)>) -> TestServer {
    let addr = SocketAddr::from(([127, 0, 0, 1], 0));
    let listener = TcpListener::bind(addr).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let routes: Arc<HashMap<String, (u16, String)>> = Arc::new(
        routes
            .into_iter()
            .map(|(path, status, body)| (path.to_string(), (status, body)))
            .collect(),
    );
    let requests = Arc::new(Mutex::new(Vec::new()));

    let make_svc = {
        let requests = requests.clone();
        make_service_fn(move |_conn| {
            let routes = routes.clone();
            let requests = requests.clone();
            async move {
                Ok::<_, Infallible>(service_fn(move |req: Request<Body>| {
                    let routes = routes.clone();
                    let requests = requests.clone();
                    async move {
                        let path = req.uri().path().to_string();
                        let query = req.uri().query().map(str::to_string);
                        let headers = req
                            .headers()
                            .iter()
                            .map(|(name, value)| {
                                (
                                    name.as_str().to_string(),
                                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                                )
                            })
                            .collect();
                        let bytes = hyper::body::to_bytes(req.into_body())
                            .await
                            .unwrap_or_default();
                        requests.lock().unwrap().push(RecordedRequest {
                            path: path.clone(),
                            query,
                            headers,
                            body: String::from_utf8_lossy(&bytes).into_owned(),
                        });

                        let (status, body) = routes
                            .get(&path)
                            .cloned()
                            .unwrap_or((404, "404".to_string()));
                        Ok::<_, Infallible>(
                            Response::builder()
                                .status(status)
                                .body(Body::from(body))
                                .unwrap(),
                        )
                    }
                }))
            }
        })
    };

    tokio::spawn(async move {
        Server::from_tcp(listener.into_std().unwrap())
            .unwrap()
            .serve(make_svc)
            .await
            .unwrap();
    });

    TestServer { addr, requests }
}

/// An OpenAI style chat completion envelope wrapping `content`.
pub fn chat_completion(content: &str) -> String {
    serde_json::json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [
            {
                "index": 0,
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }
        ]
    })
    .to_string()
}

pub fn html_page(min_chars: usize) -> String {
    let mut html = String::from(
        "<html><head><title>Cardiac Care Guide</title></head><body><h1>Cardiac care</h1>",
    );
    while html.len() < min_chars {
        html.push_str("<p>Cardiac care keeps your heart healthy with regular checkups.</p>");
    }
    html.push_str("</body></html>");
    html
}
