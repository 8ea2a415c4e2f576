use crate::{
    error::{Result, StabilityError},
    stability::payload::ApiCall,
};
use async_trait::async_trait;
use reqwest::{
    header::{ACCEPT, AUTHORIZATION},
    multipart::{Form, Part},
    Client,
};

#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

#[async_trait]
pub trait ImageTransport: Send + Sync {
    async fn send(&self, call: ApiCall) -> Result<ApiResponse>;
}

#[derive(Clone, Default)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    fn build_form(call: ApiCall) -> Result<Form> {
        let metadata = serde_json::to_string(&call.metadata)?;

        let mut form = Form::new();
        for (name, value) in call.fields {
            form = form.text(name, value);
        }

        form = form.part(
            "data",
            Part::text(metadata)
                .mime_str("application/json")
                .map_err(|e| StabilityError::Transport(e.to_string()))?,
        );

        if let Some(image) = call.image {
            form = form.part(
                "image",
                Part::bytes(image.bytes)
                    .file_name(image.file_name)
                    .mime_str(image.content_type)
                    .map_err(|e| StabilityError::Transport(e.to_string()))?,
            );
        }

        Ok(form)
    }
}

#[async_trait]
impl ImageTransport for HttpTransport {
    async fn send(&self, call: ApiCall) -> Result<ApiResponse> {
        let url = call.url.clone();
        let authorization = format!("Bearer {}", call.api_key);
        let accept = call.accept;
        let form = Self::build_form(call)?;

        log::debug!("POST {} (accept: {})", url, accept);

        let response = self
            .client
            .post(&url)
            .header(AUTHORIZATION, authorization)
            .header(ACCEPT, accept)
            .multipart(form)
            .send()
            .await
            .map_err(|e| StabilityError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| StabilityError::Transport(e.to_string()))?;

        Ok(ApiResponse {
            status,
            body: body.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stability::payload::{ImagePart, IMAGE_CONTENT_TYPE};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn boundary_of(raw: &str) -> Option<String> {
        raw.lines().find_map(|line| {
            let lower = line.to_ascii_lowercase();
            if lower.starts_with("content-type: multipart/form-data") {
                line.split("boundary=").nth(1).map(|b| b.trim().to_string())
            } else {
                None
            }
        })
    }

    /// Accepts one connection, records the raw request and answers 200.
    async fn capture_request(listener: TcpListener, reply: &'static [u8]) -> String {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut raw = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            raw.extend_from_slice(&buf[..n]);
            let text = String::from_utf8_lossy(&raw);
            if let Some(boundary) = boundary_of(&text) {
                if text.contains(&format!("--{}--", boundary)) {
                    break;
                }
            }
        }

        let head = format!(
            "HTTP/1.1 200 OK\r\ncontent-type: image/png\r\ncontent-length: {}\r\nconnection: close\r\n\r\n",
            reply.len()
        );
        socket.write_all(head.as_bytes()).await.unwrap();
        socket.write_all(reply).await.unwrap();
        socket.flush().await.unwrap();

        String::from_utf8_lossy(&raw).into_owned()
    }

    #[tokio::test]
    async fn test_multipart_request_on_the_wire() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(capture_request(listener, b"fake png"));

        let call = ApiCall {
            url: format!("http://{}/sd3", addr),
            api_key: "sk-wire".to_string(),
            accept: "image/*",
            fields: vec![
                ("prompt", "a lighthouse".to_string()),
                ("strength", "0.4".to_string()),
            ],
            metadata: serde_json::json!({ "prompt": "a lighthouse", "strength": 0.4 }),
            image: Some(ImagePart {
                file_name: "input.png".to_string(),
                bytes: b"source-bytes".to_vec(),
                content_type: IMAGE_CONTENT_TYPE,
            }),
        };

        let response = HttpTransport::new().send(call).await.unwrap();
        let raw = server.await.unwrap();
        let lower = raw.to_ascii_lowercase();

        assert_eq!(response.status, 200);
        assert_eq!(response.body, b"fake png");

        assert!(raw.starts_with("POST /sd3 HTTP/1.1\r\n"));
        assert!(lower.contains("\r\nauthorization: bearer sk-wire\r\n"));
        assert!(lower.contains("\r\naccept: image/*\r\n"));
        assert!(lower.contains("content-type: multipart/form-data; boundary="));

        assert!(lower.contains("name=\"prompt\"\r\n\r\na lighthouse\r\n"));
        assert!(lower.contains("name=\"strength\"\r\n\r\n0.4\r\n"));
        assert!(lower.contains("name=\"data\"\r\ncontent-type: application/json\r\n\r\n{"));
        assert!(raw.contains(r#"{"prompt":"a lighthouse","strength":0.4}"#));
        assert!(lower.contains(
            "name=\"image\"; filename=\"input.png\"\r\ncontent-type: application/octet-stream\r\n\r\nsource-bytes"
        ));
    }

    #[test]
    fn test_only_200_is_ok() {
        let ok = ApiResponse { status: 200, body: vec![] };
        let accepted = ApiResponse { status: 202, body: vec![] };
        let denied = ApiResponse { status: 403, body: vec![] };
        assert!(ok.is_ok());
        assert!(!accepted.is_ok());
        assert!(!denied.is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let call = ApiCall {
            url: "http://127.0.0.1:1/sd3".to_string(),
            api_key: String::new(),
            accept: "image/*",
            fields: vec![("prompt", "p".to_string())],
            metadata: serde_json::json!({ "prompt": "p" }),
            image: None,
        };

        let err = HttpTransport::new().send(call).await.unwrap_err();
        assert!(matches!(err, StabilityError::Transport(_)));
    }
}
