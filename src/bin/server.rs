//! HTTP server for the joiner
//! Simple HTTP server using tokio and basic HTTP handling

use excel_joiner::error::{JoinerError, Result as JoinerResult};
use excel_joiner::join_selector::join_tables;
use excel_joiner::server_config::ServerConfig;
use excel_joiner::table_io::{read_table, temp_output_path, write_table};
use serde::Deserialize;
use serde_json::json;
use std::path::PathBuf;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{error, info};

/// Body of POST /api/join: paths of the two input files.
#[derive(Debug, Deserialize)]
struct JoinRequest {
    file1: PathBuf,
    file2: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = ServerConfig::from_env();
    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!("Join server listening on {}", config.bind_addr);
    info!("Allowed origin: {}", config.allowed_origin);

    loop {
        let (stream, addr) = listener.accept().await?;
        tracing::debug!("New connection from {}", addr);
        let config = config.clone();
        tokio::spawn(handle_connection(stream, config));
    }
}

async fn handle_connection(mut stream: TcpStream, config: ServerConfig) {
    use tokio::time::{timeout, Duration};

    // Read request with timeout to prevent hanging
    let mut buffer = Vec::new();
    let mut temp_buf = [0; 8192];

    let read_result = timeout(Duration::from_secs(5), async {
        loop {
            match stream.read(&mut temp_buf).await {
                Ok(0) => break, // EOF
                Ok(n) => {
                    buffer.extend_from_slice(&temp_buf[..n]);
                    if let Ok(s) = std::str::from_utf8(&buffer) {
                        if let Some(headers_end) = s.find("\r\n\r\n") {
                            match extract_content_length(s) {
                                Some(content_length) => {
                                    if buffer.len() >= headers_end + 4 + content_length {
                                        break; // We have the complete request
                                    }
                                }
                                None => break, // No body expected
                            }
                        }
                    }
                    // Bound the request size
                    if buffer.len() > 1_000_000 {
                        break;
                    }
                }
                Err(e) => {
                    error!("Failed to read from stream: {}", e);
                    return Err(e);
                }
            }
        }
        Ok(())
    })
    .await;

    match read_result {
        Ok(Ok(())) => {}
        Ok(Err(_)) => return,
        Err(_) => {
            error!("Timed out reading request");
            return;
        }
    }

    let request = String::from_utf8_lossy(&buffer).to_string();
    let response = handle_request(&request, &config).await;

    if let Err(e) = stream.write_all(response.as_bytes()).await {
        error!("Failed to write response: {}", e);
    }
    let _ = stream.shutdown().await;
}

fn extract_content_length(request: &str) -> Option<usize> {
    for line in request.lines() {
        if line.is_empty() {
            break;
        }
        if let Some((key, value)) = line.split_once(':') {
            if key.trim().eq_ignore_ascii_case("content-length") {
                return value.trim().parse().ok();
            }
        }
    }
    None
}

async fn handle_request(request: &str, config: &ServerConfig) -> String {
    let lines: Vec<&str> = request.lines().collect();
    if lines.is_empty() {
        return create_response(400, "Bad Request", "{}", config);
    }

    let request_line = lines[0];
    let parts: Vec<&str> = request_line.split_whitespace().collect();
    if parts.len() < 2 {
        return create_response(400, "Bad Request", "{}", config);
    }

    let method = parts[0];
    let path = parts[1].trim_end_matches('/');
    let path = if path.is_empty() { "/" } else { path };

    match (method, path) {
        ("GET", "/api/health") => create_response(
            200,
            "OK",
            r#"{"status":"ok","service":"excel-joiner-api"}"#,
            config,
        ),
        ("POST", "/api/join") => {
            let body = request
                .split_once("\r\n\r\n")
                .map(|(_, body)| body)
                .unwrap_or("");
            handle_join(body, config).await
        }
        ("OPTIONS", _) => {
            // CORS preflight
            create_response(200, "OK", "", config)
        }
        _ => create_response(
            404,
            "Not Found",
            &format!(r#"{{"error":"Endpoint not found: {} {}"}}"#, method, path),
            config,
        ),
    }
}

async fn handle_join(body: &str, config: &ServerConfig) -> String {
    let request: JoinRequest = match serde_json::from_str(body) {
        Ok(request) => request,
        Err(e) => {
            return create_response(
                400,
                "Bad Request",
                &format!(r#"{{"error":"Invalid request body: {}"}}"#, e),
                config,
            )
        }
    };

    match run_join(&request) {
        Ok(response_json) => create_response(200, "OK", &response_json, config),
        Err(JoinerError::NoJoinableColumns) => create_response(
            400,
            "Bad Request",
            r#"{"error":"No joinable columns found."}"#,
            config,
        ),
        Err(e) => {
            error!("Error during join: {}", e);
            create_response(
                500,
                "Internal Server Error",
                r#"{"error":"Failed to process files."}"#,
                config,
            )
        }
    }
}

fn run_join(request: &JoinRequest) -> JoinerResult<String> {
    let df1 = read_table(&request.file1)?;
    let df2 = read_table(&request.file2)?;

    let mut outcome = join_tables(&df1, &df2)?;

    let output_path = temp_output_path("joined_output.csv")?;
    write_table(&mut outcome.joined, &output_path)?;

    let response = json!({
        "output_path": output_path,
        "rows": outcome.joined.height(),
        "columns": outcome.joined.width(),
        "join": outcome.best,
        "suggestions": outcome.suggestions,
    });

    Ok(serde_json::to_string(&response)?)
}

fn create_response(status: u16, status_text: &str, body: &str, config: &ServerConfig) -> String {
    format!(
        "HTTP/1.1 {} {}\r\n\
         Content-Type: application/json\r\n\
         Access-Control-Allow-Origin: {}\r\n\
         Access-Control-Allow-Methods: GET, POST, OPTIONS\r\n\
         Access-Control-Allow-Headers: Content-Type\r\n\
         Content-Length: {}\r\n\
         \r\n\
         {}",
        status,
        status_text,
        config.allowed_origin,
        body.len(),
        body
    )
}
