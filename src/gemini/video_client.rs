use crate::{
    credentials::Credential,
    error::{IdeationError, Result},
    gemini::transport::{error_from_body, ApiTransport},
    logger,
    models::{gemini::Operation, VideoEvent, VideoReference, VideoRequest},
    service::VideoJob,
};
use serde_json::json;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

const STATUS_MESSAGES: [&str; 5] = [
    "Storyboarding the motion...",
    "Rendering frames...",
    "Animating the scene...",
    "Polishing the final cut...",
    "Still working, video generation can take a few minutes...",
];

#[derive(Clone)]
pub struct VideoClient {
    transport: ApiTransport,
    model: String,
    poll_interval: Duration,
}

impl VideoClient {
    pub fn new(transport: ApiTransport, model: impl Into<String>, poll_interval: Duration) -> Self {
        Self {
            transport,
            model: model.into(),
            poll_interval,
        }
    }

    /// Submits the job and returns once the backend has accepted it. Polling
    /// happens on a spawned task that stops as soon as the job is dropped.
    pub async fn start(&self, credential: &Credential, request: VideoRequest) -> Result<VideoJob> {
        let payload = json!({
            "instances": [{
                "prompt": request.prompt,
                "image": {
                    "bytesBase64Encoded": request.image.base64,
                    "mimeType": request.image.mime_type
                }
            }],
            "parameters": {
                "aspectRatio": request.aspect_ratio.as_str(),
                "numberOfVideos": 1
            }
        });

        log::info!(
            "Starting video generation with model: {} ({})",
            self.model,
            request.aspect_ratio
        );

        let operation: Operation = self
            .transport
            .post_json(
                credential,
                &format!("models/{}:predictLongRunning", self.model),
                &payload,
            )
            .await?;

        let job_id = uuid::Uuid::new_v4().to_string();
        log::info!("Video job {} accepted as {}", job_id, operation.name);

        let (tx, rx) = mpsc::channel(16);
        let transport = self.transport.clone();
        let credential = credential.clone();
        let poll_interval = self.poll_interval;
        let task_id = job_id.clone();

        tokio::spawn(async move {
            let _timer = logger::timer(&format!("video job {}", task_id));
            let started = Instant::now();
            let mut operation = operation;
            let mut polls = 0usize;

            if tx
                .send(Ok(VideoEvent::Progress(
                    "Video generation started. This may take a few minutes...".into(),
                )))
                .await
                .is_err()
            {
                return;
            }

            while !operation.done {
                tokio::time::sleep(poll_interval).await;
                if tx.is_closed() {
                    log::info!("Video job {} dropped, stopping poller", task_id);
                    return;
                }

                let message = status_message(polls, started.elapsed());
                polls += 1;
                if tx.send(Ok(VideoEvent::Progress(message))).await.is_err() {
                    return;
                }

                operation = match transport
                    .get_json::<Operation>(&credential, &operation.name)
                    .await
                {
                    Ok(op) => op,
                    Err(e) => {
                        log::error!("Polling video job {} failed: {}", task_id, e);
                        let _ = tx.send(Err(e)).await;
                        return;
                    }
                };
            }

            let _ = tx
                .send(Ok(VideoEvent::Progress("Finalizing video...".into())))
                .await;
            let _ = tx.send(video_from_operation(operation).map(VideoEvent::Completed)).await;
        });

        Ok(VideoJob::new(job_id, ReceiverStream::new(rx)))
    }

    pub async fn fetch(&self, credential: &Credential, reference: &VideoReference) -> Result<Vec<u8>> {
        log::info!("Downloading generated video");
        self.transport.get_bytes(credential, &reference.uri).await
    }
}

fn status_message(poll: usize, elapsed: Duration) -> String {
    format!(
        "{} ({}s elapsed)",
        STATUS_MESSAGES[poll % STATUS_MESSAGES.len()],
        elapsed.as_secs()
    )
}

pub fn video_from_operation(operation: Operation) -> Result<VideoReference> {
    if let Some(error) = operation.error {
        return Err(error_from_body(500, error));
    }

    let response = operation
        .response
        .and_then(|r| r.generate_video_response)
        .ok_or_else(|| {
            IdeationError::ResponseError("Video generation completed without a result.".into())
        })?;

    let video = response
        .generated_samples
        .into_iter()
        .filter_map(|sample| sample.video)
        .find_map(|video| {
            let uri = video.uri.filter(|u| !u.is_empty())?;
            Some(VideoReference {
                uri,
                mime_type: video.mime_type.unwrap_or_else(|| "video/mp4".to_string()),
            })
        });

    match video {
        Some(reference) => Ok(reference),
        None if !response.rai_media_filtered_reasons.is_empty() => {
            Err(IdeationError::ResponseError(format!(
                "The video was blocked: {}",
                response.rai_media_filtered_reasons.join("; ")
            )))
        }
        None => Err(IdeationError::ResponseError(
            "Video generation completed but no video was returned.".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AspectRatio, ImageArtifact};
    use std::sync::{Arc, Mutex};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    const PENDING: &str = r#"{"name":"operations/abc","done":false}"#;

    /// Serves the scripted `(status, body)` replies in order, repeating the
    /// last one, and records every request head it receives.
    async fn serve(replies: Vec<(u16, &'static str)>) -> (String, Arc<Mutex<Vec<String>>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = requests.clone();

        tokio::spawn(async move {
            let mut replies = replies.into_iter();
            let mut last = (500, "{}");
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                let head = read_request(&mut socket).await;
                seen.lock().unwrap().push(head);

                if let Some(reply) = replies.next() {
                    last = reply;
                }
                let (status, body) = last;
                let response = format!(
                    "HTTP/1.1 {} OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        (base_url, requests)
    }

    async fn read_request(socket: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.unwrap_or(0);
            if n == 0 {
                return String::from_utf8_lossy(&buf).to_string();
            }
            buf.extend_from_slice(&chunk[..n]);
            if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
                let body_len = head
                    .lines()
                    .find_map(|l| l.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + body_len {
                    return head;
                }
            }
        }
    }

    fn client(base_url: &str) -> VideoClient {
        let transport = ApiTransport::new(reqwest::Client::new(), base_url);
        VideoClient::new(transport, "veo-test", Duration::from_millis(20))
    }

    fn request() -> VideoRequest {
        VideoRequest {
            prompt: "balloon drifts upward".into(),
            image: ImageArtifact::from_bytes(b"\x89PNG", "image/png"),
            aspect_ratio: AspectRatio::Portrait,
        }
    }

    fn key() -> Credential {
        Credential::parse("test-key").unwrap()
    }

    #[tokio::test]
    async fn test_poller_reports_progress_until_done() {
        let (base_url, requests) = serve(vec![
            (200, PENDING),
            (200, PENDING),
            (200, PENDING),
            (
                200,
                r#"{"name":"operations/abc","done":true,"response":{"generateVideoResponse":{"generatedSamples":[{"video":{"uri":"https://files.example/v.mp4"}}]}}}"#,
            ),
        ])
        .await;

        let job = client(&base_url).start(&key(), request()).await.unwrap();
        let mut messages = Vec::new();
        let reference = job.wait(|m| messages.push(m.to_string())).await.unwrap();

        assert_eq!(reference.uri, "https://files.example/v.mp4");
        assert_eq!(messages.len(), 5);
        assert_eq!(messages[0], "Video generation started. This may take a few minutes...");
        assert!(messages[1].starts_with("Storyboarding the motion..."));
        assert!(messages[2].starts_with("Rendering frames..."));
        assert!(messages[3].starts_with("Animating the scene..."));
        assert_eq!(messages[4], "Finalizing video...");

        let requests = requests.lock().unwrap();
        assert_eq!(requests.len(), 4);
        assert!(requests[0].starts_with("post /models/veo-test:predictlongrunning"));
        assert!(requests[1].starts_with("get /operations/abc"));
        assert!(requests.iter().all(|r| r.contains("x-goog-api-key: test-key")));
    }

    #[tokio::test]
    async fn test_poll_failure_ends_job_with_credential_error() {
        let (base_url, _) = serve(vec![
            (200, PENDING),
            (200, PENDING),
            (
                400,
                r#"{"error":{"code":400,"message":"API key expired. Please renew the API key.","status":"INVALID_ARGUMENT"}}"#,
            ),
        ])
        .await;

        let job = client(&base_url).start(&key(), request()).await.unwrap();
        let mut messages = Vec::new();
        let err = job.wait(|m| messages.push(m.to_string())).await.unwrap_err();

        assert!(err.is_credential_error());
        assert_eq!(err.to_string(), "API key expired. Please renew the API key.");
        assert_eq!(messages.len(), 3);
        assert!(!messages.iter().any(|m| m == "Finalizing video..."));
    }

    #[tokio::test]
    async fn test_dropping_job_stops_polling() {
        let (base_url, requests) = serve(vec![(200, PENDING)]).await;

        let mut job = client(&base_url).start(&key(), request()).await.unwrap();
        for _ in 0..3 {
            assert!(matches!(
                job.next_event().await,
                Some(Ok(VideoEvent::Progress(_)))
            ));
        }
        drop(job);

        // one poll may still be in flight when the job goes away
        tokio::time::sleep(Duration::from_millis(150)).await;
        let settled = requests.lock().unwrap().len();
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(requests.lock().unwrap().len(), settled);
    }

    fn parse(raw: &str) -> Operation {
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn test_completed_operation() {
        let op = parse(
            r#"{"name":"models/veo/operations/1","done":true,"response":{
                "generateVideoResponse":{"generatedSamples":[{"video":{"uri":"https://files.example/v1:download?alt=media"}}]}
            }}"#,
        );
        let reference = video_from_operation(op).unwrap();
        assert_eq!(reference.uri, "https://files.example/v1:download?alt=media");
        assert_eq!(reference.mime_type, "video/mp4");
    }

    #[test]
    fn test_operation_error_is_classified() {
        let op = parse(
            r#"{"name":"op","done":true,"error":{"code":400,"message":"API key expired. Please renew the API key."}}"#,
        );
        assert!(video_from_operation(op).unwrap_err().is_credential_error());

        let op = parse(r#"{"name":"op","done":true,"error":{"code":13,"message":"Internal failure"}}"#);
        let err = video_from_operation(op).unwrap_err();
        assert!(!err.is_credential_error());
        assert_eq!(err.to_string(), "Internal failure");
    }

    #[test]
    fn test_filtered_video() {
        let op = parse(
            r#"{"name":"op","done":true,"response":{"generateVideoResponse":{"raiMediaFilteredReasons":["celebrity likeness"]}}}"#,
        );
        assert!(video_from_operation(op)
            .unwrap_err()
            .to_string()
            .contains("celebrity likeness"));
    }

    #[test]
    fn test_status_messages_rotate() {
        let first = status_message(0, Duration::from_secs(10));
        assert_eq!(first, "Storyboarding the motion... (10s elapsed)");
        assert!(status_message(STATUS_MESSAGES.len(), Duration::from_secs(60))
            .starts_with("Storyboarding"));
    }
}
