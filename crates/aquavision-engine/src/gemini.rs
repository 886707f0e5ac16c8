use std::thread;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use aquavision_contracts::image::ImageData;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::blocking::{Client as HttpClient, Response as HttpResponse};
use serde_json::{json, Map, Value};

use crate::config::ClientConfig;
use crate::transport::{
    is_retryable_transport_error, truncate_text, GenerateRequest, GenerateResponse,
    ModelTransport, OutputMode, RequestPart, TransportTimeout,
};

/// `generateContent` over the Gemini REST API.
pub struct GeminiTransport {
    api_base: String,
    api_key: Option<String>,
    timeout: Duration,
    max_retries: usize,
    retry_backoff_s: f64,
    http: HttpClient,
}

impl GeminiTransport {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            api_base: config.api_base.clone(),
            api_key: config.api_key.clone(),
            timeout: config.request_timeout(),
            max_retries: config.transport_retries,
            retry_backoff_s: config.retry_backoff_s,
            http: HttpClient::new(),
        }
    }

    fn endpoint_for_model(&self, model: &str) -> String {
        let trimmed = model.trim();
        let model_path = if trimmed.starts_with("models/") {
            trimmed.to_string()
        } else {
            format!("models/{trimmed}")
        };
        format!("{}/{}:generateContent", self.api_base, model_path)
    }

    fn post_with_transport_retries(
        &self,
        endpoint: &str,
        api_key: &str,
        payload: &Value,
    ) -> Result<HttpResponse> {
        let mut attempt = 0;
        loop {
            let response = self
                .http
                .post(endpoint)
                .query(&[("key", api_key)])
                .timeout(self.timeout)
                .json(payload)
                .send();

            match response {
                Ok(ok) => return Ok(ok),
                Err(raw) => {
                    let timed_out = raw.is_timeout();
                    let err = anyhow::Error::new(raw)
                        .context(format!("Gemini request failed ({endpoint})"));
                    if !is_retryable_transport_error(&err) || attempt >= self.max_retries {
                        if timed_out {
                            return Err(err.context(TransportTimeout {
                                seconds: self.timeout.as_secs_f64().ceil() as u64,
                            }));
                        }
                        return Err(err);
                    }
                    let delay_s = self.retry_backoff_s * (attempt as f64 + 1.0);
                    thread::sleep(Duration::from_secs_f64(delay_s));
                    attempt += 1;
                }
            }
        }
    }
}

impl ModelTransport for GeminiTransport {
    fn name(&self) -> &str {
        "gemini"
    }

    fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse> {
        let Some(api_key) = self.api_key.as_deref() else {
            bail!("GEMINI_API_KEY or GOOGLE_API_KEY not set");
        };
        let endpoint = self.endpoint_for_model(&request.model);
        let payload = build_payload(request);
        let response = self.post_with_transport_retries(&endpoint, api_key, &payload)?;
        let response_payload = response_json_or_error("Gemini", response)?;
        Ok(GenerateResponse {
            text: extract_text(&response_payload),
            images: extract_images(&response_payload)?,
            finish_reason: finish_reason(&response_payload),
        })
    }
}

pub(crate) fn build_payload(request: &GenerateRequest) -> Value {
    let parts = request
        .parts
        .iter()
        .map(|part| match part {
            RequestPart::InlineImage(image) => json!({
                "inlineData": {
                    "mimeType": image.mime_type,
                    "data": BASE64.encode(&image.bytes),
                }
            }),
            RequestPart::Text(text) => json!({ "text": text }),
        })
        .collect::<Vec<_>>();

    let mut generation_config = Map::new();
    match &request.output {
        OutputMode::Json { schema } => {
            generation_config.insert(
                "responseMimeType".to_string(),
                Value::String("application/json".to_string()),
            );
            generation_config.insert("responseSchema".to_string(), schema.clone());
        }
        OutputMode::Image => {
            generation_config.insert(
                "responseModalities".to_string(),
                Value::Array(vec![Value::String("IMAGE".to_string())]),
            );
        }
    }

    json!({
        "contents": [{
            "role": "user",
            "parts": parts,
        }],
        "generationConfig": generation_config,
    })
}

fn response_json_or_error(provider: &str, response: HttpResponse) -> Result<Value> {
    let status = response.status();
    let code = status.as_u16();
    let body = response
        .text()
        .with_context(|| format!("{provider} response body read failed"))?;
    if !status.is_success() {
        bail!(
            "{provider} request failed ({code}): {}",
            truncate_text(&body, 512)
        );
    }
    let parsed: Value = serde_json::from_str(&body)
        .with_context(|| format!("{provider} returned invalid JSON payload"))?;
    Ok(parsed)
}

fn first_candidate_parts(response_payload: &Value) -> Vec<Value> {
    response_payload
        .get("candidates")
        .and_then(Value::as_array)
        .and_then(|candidates| candidates.first())
        .and_then(|candidate| candidate.get("content"))
        .and_then(|content| content.get("parts"))
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

/// Text of the first candidate, skipping thought parts.
pub(crate) fn extract_text(response_payload: &Value) -> Option<String> {
    let text = first_candidate_parts(response_payload)
        .iter()
        .filter(|part| !part.get("thought").and_then(Value::as_bool).unwrap_or(false))
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect::<String>();
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_string())
}

pub(crate) fn extract_images(response_payload: &Value) -> Result<Vec<ImageData>> {
    let mut out = Vec::new();
    for part in first_candidate_parts(response_payload) {
        let inline = part
            .get("inlineData")
            .or_else(|| part.get("inline_data"))
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();
        let data = inline
            .get("data")
            .and_then(Value::as_str)
            .unwrap_or_default();
        if data.is_empty() {
            continue;
        }
        let bytes = BASE64
            .decode(data.as_bytes())
            .context("Gemini image base64 decode failed")?;
        let mime_type = inline
            .get("mimeType")
            .or_else(|| inline.get("mime_type"))
            .and_then(Value::as_str)
            .unwrap_or("image/png");
        out.push(ImageData::new(bytes, mime_type));
    }
    Ok(out)
}

fn finish_reason(response_payload: &Value) -> Option<String> {
    response_payload
        .get("candidates")
        .and_then(Value::as_array)
        .and_then(|candidates| candidates.first())
        .and_then(|candidate| candidate.get("finishReason"))
        .or_else(|| {
            response_payload
                .get("promptFeedback")
                .and_then(|feedback| feedback.get("blockReason"))
        })
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    use aquavision_contracts::image::ImageData;
    use aquavision_contracts::outcome::IdentifyError;
    use aquavision_contracts::report::identification_schema;
    use base64::Engine as _;
    use reqwest::blocking::Client as HttpClient;
    use serde_json::json;

    use super::{build_payload, extract_images, extract_text, finish_reason, GeminiTransport, BASE64};
    use crate::config::ClientConfig;
    use crate::transport::{
        classify_transport_error, GenerateRequest, ModelTransport, OutputMode, RequestPart,
        TransportTimeout,
    };

    fn local_transport(api_base: String, timeout: Duration, max_retries: usize) -> GeminiTransport {
        GeminiTransport {
            api_base,
            api_key: Some("test-key".to_string()),
            timeout,
            max_retries,
            retry_backoff_s: 0.05,
            http: HttpClient::new(),
        }
    }

    fn text_request() -> GenerateRequest {
        GenerateRequest {
            model: "gemini-2.5-flash".to_string(),
            parts: vec![RequestPart::Text("Визнач вид.".to_string())],
            output: OutputMode::Json {
                schema: identification_schema(),
            },
        }
    }

    /// Reads one request (head plus `Content-Length` body) and returns the head.
    fn read_request(stream: &mut TcpStream) -> std::io::Result<String> {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let read = stream.read(&mut chunk)?;
            if read == 0 {
                return Ok(String::from_utf8_lossy(&buf).to_string());
            }
            buf.extend_from_slice(&chunk[..read]);
            let Some(end) = buf.windows(4).position(|window| window == b"\r\n\r\n") else {
                continue;
            };
            let head = String::from_utf8_lossy(&buf[..end]).to_string();
            let length = head
                .lines()
                .filter_map(|line| line.split_once(':'))
                .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
                .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            while buf.len() < end + 4 + length {
                let read = stream.read(&mut chunk)?;
                if read == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..read]);
            }
            return Ok(head);
        }
    }

    /// Answers a single request with `status` and a JSON body. Joins to the request head.
    fn serve_once(status: &'static str, body: String) -> (String, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let api_base = format!("http://{}/v1beta", listener.local_addr().unwrap());
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let head = read_request(&mut stream).unwrap();
            let reply = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(reply.as_bytes()).unwrap();
            head
        });
        (api_base, handle)
    }

    #[test]
    fn endpoint_accepts_bare_and_prefixed_models() {
        let transport = GeminiTransport::new(&ClientConfig::default());
        assert_eq!(
            transport.endpoint_for_model("gemini-2.5-flash"),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent"
        );
        assert_eq!(
            transport.endpoint_for_model(" models/gemini-2.5-pro "),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-pro:generateContent"
        );
    }

    #[test]
    fn json_payload_places_image_before_prompt_and_sets_schema() {
        let request = GenerateRequest {
            model: "gemini-2.5-flash".to_string(),
            parts: vec![
                RequestPart::InlineImage(ImageData::new(vec![1, 2, 3], "image/jpeg")),
                RequestPart::Text("Визнач вид.".to_string()),
            ],
            output: OutputMode::Json {
                schema: identification_schema(),
            },
        };
        let payload = build_payload(&request);
        let parts = &payload["contents"][0]["parts"];
        assert_eq!(payload["contents"][0]["role"], "user");
        assert_eq!(parts[0]["inlineData"]["mimeType"], "image/jpeg");
        assert_eq!(parts[0]["inlineData"]["data"], BASE64.encode([1u8, 2, 3]));
        assert_eq!(parts[1]["text"], "Визнач вид.");
        assert_eq!(
            payload["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(
            payload["generationConfig"]["responseSchema"],
            identification_schema()
        );
    }

    #[test]
    fn image_payload_requests_image_modality() {
        let request = GenerateRequest {
            model: "gemini-2.5-flash-image".to_string(),
            parts: vec![RequestPart::Text("illustration".to_string())],
            output: OutputMode::Image,
        };
        let payload = build_payload(&request);
        assert_eq!(
            payload["generationConfig"]["responseModalities"],
            json!(["IMAGE"])
        );
        assert!(payload["generationConfig"].get("responseSchema").is_none());
    }

    #[test]
    fn text_is_joined_from_first_candidate_without_thoughts() {
        let payload = json!({
            "candidates": [
                {"content": {"parts": [
                    {"text": "internal", "thought": true},
                    {"text": "{\"status\":"},
                    {"text": "\"not_recognized\"}"}
                ]}, "finishReason": "STOP"},
                {"content": {"parts": [{"text": "ignored"}]}}
            ]
        });
        assert_eq!(
            extract_text(&payload).as_deref(),
            Some("{\"status\":\"not_recognized\"}")
        );
        assert_eq!(finish_reason(&payload).as_deref(), Some("STOP"));
    }

    #[test]
    fn blank_or_missing_text_is_none() {
        assert_eq!(extract_text(&json!({})), None);
        let payload = json!({"candidates": [{"content": {"parts": [{"text": "  \n"}]}}]});
        assert_eq!(extract_text(&payload), None);
    }

    #[test]
    fn blocked_prompt_reports_block_reason() {
        let payload = json!({"promptFeedback": {"blockReason": "SAFETY"}});
        assert_eq!(finish_reason(&payload).as_deref(), Some("SAFETY"));
    }

    #[test]
    fn images_decode_from_either_casing() -> anyhow::Result<()> {
        let payload = json!({
            "candidates": [{"content": {"parts": [
                {"inlineData": {"mimeType": "image/png", "data": BASE64.encode([9u8, 8])}},
                {"inline_data": {"mime_type": "image/jpeg", "data": BASE64.encode([7u8])}},
                {"text": "caption"}
            ]}}]
        });
        let images = extract_images(&payload)?;
        assert_eq!(images.len(), 2);
        assert_eq!(images[0], ImageData::new(vec![9, 8], "image/png"));
        assert_eq!(images[1].mime_type, "image/jpeg");
        Ok(())
    }

    #[test]
    fn bad_base64_is_an_error() {
        let payload = json!({
            "candidates": [{"content": {"parts": [
                {"inlineData": {"mimeType": "image/png", "data": "@@not-base64@@"}}
            ]}}]
        });
        assert!(extract_images(&payload).is_err());
    }

    #[test]
    fn missing_key_fails_before_any_request() {
        let transport = GeminiTransport::new(&ClientConfig::default());
        let request = GenerateRequest {
            model: "gemini-2.5-flash".to_string(),
            parts: vec![RequestPart::Text("x".to_string())],
            output: OutputMode::Image,
        };
        let err = transport.generate(&request).unwrap_err();
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }

    #[test]
    fn successful_reply_is_parsed_from_the_wire() -> anyhow::Result<()> {
        let body = json!({
            "candidates": [{
                "content": {"parts": [{"text": "{\"status\":\"not_recognized\"}"}]},
                "finishReason": "STOP"
            }]
        })
        .to_string();
        let (api_base, server) = serve_once("200 OK", body);
        let transport = local_transport(api_base, Duration::from_secs(5), 0);

        let response = transport.generate(&text_request())?;
        assert_eq!(response.text.as_deref(), Some("{\"status\":\"not_recognized\"}"));
        assert_eq!(response.finish_reason.as_deref(), Some("STOP"));

        let head = server.join().unwrap();
        assert!(head.starts_with(
            "POST /v1beta/models/gemini-2.5-flash:generateContent?key=test-key HTTP/1.1"
        ));
        Ok(())
    }

    #[test]
    fn error_status_carries_code_and_body() {
        let (api_base, server) =
            serve_once("429 Too Many Requests", "{\"error\":\"quota\"}".to_string());
        let transport = local_transport(api_base, Duration::from_secs(5), 2);

        let err = transport.generate(&text_request()).unwrap_err();
        server.join().unwrap();
        assert_eq!(
            classify_transport_error(&err, 90),
            IdentifyError::NetworkOrPlatform(
                "Gemini request failed (429): {\"error\":\"quota\"}".to_string()
            )
        );
    }

    #[test]
    fn silent_server_times_out_after_every_retry() -> anyhow::Result<()> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let api_base = format!("http://{}/v1beta", listener.local_addr()?);
        let accepted = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&accepted);
        thread::spawn(move || {
            let mut held = Vec::new();
            for stream in listener.incoming().flatten() {
                counter.fetch_add(1, Ordering::SeqCst);
                held.push(stream);
            }
        });
        let transport = local_transport(api_base, Duration::from_millis(300), 1);

        let err = transport.generate(&text_request()).unwrap_err();
        assert!(err.downcast_ref::<TransportTimeout>().is_some());
        assert_eq!(
            classify_transport_error(&err, 90),
            IdentifyError::Timeout { seconds: 1 }
        );
        assert_eq!(accepted.load(Ordering::SeqCst), 2);
        Ok(())
    }
}
