//! Loopback HTTP server that answers dashboard routes from a table.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use serde_json::{Value, json};

#[derive(Clone, Debug)]
pub struct StubRoute {
    pub status: u16,
    pub body: String,
    pub delay: Duration,
}

impl StubRoute {
    /// A `200` wrapping `data` in a success envelope.
    pub fn success(data: Value) -> Self {
        Self::raw(200, json!({ "status": "success", "data": data }).to_string())
    }

    pub fn raw(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            delay: Duration::ZERO,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

type Routes = Arc<Mutex<HashMap<String, StubRoute>>>;

/// Routes are keyed by `"METHOD /path"`. Unknown routes answer `404`.
pub struct StubServer {
    base_url: String,
    routes: Routes,
    hits: Arc<Mutex<Vec<String>>>,
}

impl StubServer {
    pub fn start(routes: HashMap<String, StubRoute>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub server");
        let addr = listener.local_addr().expect("stub server addr");
        let routes: Routes = Arc::new(Mutex::new(routes));
        let hits = Arc::new(Mutex::new(Vec::new()));
        let accept_routes = Arc::clone(&routes);
        let accept_hits = Arc::clone(&hits);
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else {
                    continue;
                };
                let routes = Arc::clone(&accept_routes);
                let hits = Arc::clone(&accept_hits);
                thread::spawn(move || handle(stream, &routes, &hits));
            }
        });
        Self {
            base_url: format!("http://{addr}"),
            routes,
            hits,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn set(&self, route: &str, response: StubRoute) {
        self.routes
            .lock()
            .unwrap()
            .insert(route.to_string(), response);
    }

    pub fn hits(&self) -> Vec<String> {
        self.hits.lock().unwrap().clone()
    }

    pub fn hit_count(&self, route: &str) -> usize {
        self.hits().iter().filter(|hit| *hit == route).count()
    }
}

fn handle(mut stream: TcpStream, routes: &Routes, hits: &Mutex<Vec<String>>) {
    let Some(route) = read_request_line(&mut stream) else {
        return;
    };
    hits.lock().unwrap().push(route.clone());
    let response = routes.lock().unwrap().get(&route).cloned().unwrap_or_else(|| {
        StubRoute::raw(
            404,
            json!({ "status": "error", "message": "Not found" }).to_string(),
        )
    });
    if !response.delay.is_zero() {
        thread::sleep(response.delay);
    }
    let head = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        response.status,
        reason(response.status),
        response.body.len()
    );
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(response.body.as_bytes());
    let _ = stream.flush();
}

/// Read the request head and return `"METHOD /path"`.
fn read_request_line(stream: &mut TcpStream) -> Option<String> {
    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    while !head.windows(4).any(|window| window == b"\r\n\r\n") {
        let read = stream.read(&mut buf).ok()?;
        if read == 0 {
            break;
        }
        head.extend_from_slice(&buf[..read]);
    }
    let text = String::from_utf8_lossy(&head);
    let mut parts = text.lines().next()?.split_whitespace();
    let method = parts.next()?;
    let path = parts.next()?;
    Some(format!("{method} {path}"))
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Status",
    }
}

/// A healthy backend serving two documents and three notifications.
pub fn dashboard_routes() -> HashMap<String, StubRoute> {
    let mut routes = HashMap::new();
    routes.insert(
        "GET /health".to_string(),
        StubRoute::raw(
            200,
            json!({ "status": "healthy", "message": "Backend is running", "version": "1.0.0" })
                .to_string(),
        ),
    );
    routes.insert(
        "GET /api/dashboard/overview".to_string(),
        StubRoute::success(json!({
            "totalDocuments": 2,
            "processedDocuments": 1,
            "complianceRate": 50.0,
            "averageScore": 81.5,
            "highRiskItems": 1,
            "processingTime": 2450,
            "backendHealth": "healthy"
        })),
    );
    routes.insert(
        "GET /api/dashboard/documents".to_string(),
        StubRoute::success(json!([
            {
                "id": "doc1",
                "fileName": "fund-agreement.pdf",
                "fileSize": "1.2 MB",
                "overallScore": 81.5,
                "riskLevel": "medium",
                "status": "completed",
                "totalClauses": 12,
                "complianceRate": 75.0,
                "uploadedAt": "2025-01-05T09:00:00",
                "processedAt": "2025-01-05T09:02:00"
            },
            {
                "id": "doc2",
                "fileName": "side-letter.pdf",
                "status": "processing",
                "uploadedAt": "2025-01-05T09:30:00"
            }
        ])),
    );
    routes.insert(
        "GET /api/dashboard/notifications".to_string(),
        StubRoute::success(json!([
            {
                "id": "n1",
                "type": "warning",
                "title": "High Risk Clause Detected",
                "message": "1 high-risk clause(s) detected in fund-agreement.pdf",
                "timestamp": "2025-01-05T09:02:00",
                "read": false,
                "priority": "high",
                "documentId": "doc1"
            },
            {
                "id": "n2",
                "type": "info",
                "title": "Processing Started",
                "message": "side-letter.pdf is being analyzed",
                "timestamp": "2025-01-05T09:30:00",
                "read": false,
                "priority": "low"
            },
            {
                "id": "n3",
                "type": "success",
                "title": "Analysis Complete",
                "message": "fund-agreement.pdf analyzed",
                "timestamp": "2025-01-05T09:02:00",
                "read": true,
                "priority": "medium"
            }
        ])),
    );
    routes.insert(
        "GET /api/dashboard/timeline".to_string(),
        StubRoute::success(json!([
            {
                "id": "upload_doc1",
                "type": "upload",
                "title": "Document Uploaded",
                "description": "fund-agreement.pdf uploaded",
                "timestamp": "2025-01-05T09:00:00",
                "status": "completed",
                "documentId": "doc1"
            }
        ])),
    );
    routes.insert(
        "GET /api/dashboard/analytics".to_string(),
        StubRoute::success(json!({
            "complianceTrend": [{ "date": "2025-01-05", "score": 81.5 }],
            "riskDistribution": { "high": 0, "medium": 1, "low": 0, "compliant": 0 },
            "processingStats": { "averageTime": 2450, "successRate": 100.0, "totalProcessed": 1 },
            "complianceAreas": { "Legal Compliance": 85, "Financial Terms": 78 }
        })),
    );
    routes.insert(
        "PUT /api/dashboard/notifications/n1/read".to_string(),
        StubRoute::success(Value::Null),
    );
    routes.insert(
        "GET /api/dashboard/analyze/doc1".to_string(),
        StubRoute::success(json!({ "documentId": "doc1", "overallScore": 88 })),
    );
    routes.insert(
        "POST /api/dashboard/refresh-analytics".to_string(),
        StubRoute::success(json!({
            "complianceTrend": [{ "date": "2025-01-06", "score": 90 }],
            "processingStats": { "averageTime": 2000, "successRate": 100.0, "totalProcessed": 2 }
        })),
    );
    routes
}
