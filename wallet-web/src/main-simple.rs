//! Static file server for the SimpleStorage dapp
//!
//! Serves the built WASM app (`trunk build` output) and falls back to
//! `index.html` for client-side routes.
//!
//! - `WALLET_SERVER_ADDR`: listen address (default `127.0.0.1:8080`)
//! - `WALLET_DIST_DIR`: directory to serve (default `dist`)

use std::env;
use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::path::{Component, Path, PathBuf};

const DEFAULT_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_DIST_DIR: &str = "dist";

fn main() {
    let addr = env::var("WALLET_SERVER_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());
    let dist = PathBuf::from(env::var("WALLET_DIST_DIR").unwrap_or_else(|_| DEFAULT_DIST_DIR.to_string()));

    let listener = match TcpListener::bind(&addr) {
        Ok(listener) => listener,
        Err(e) => {
            eprintln!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    println!("SimpleStorage dapp running at http://{}", addr);
    println!("Serving from {}", dist.display());
    println!("Press Ctrl+C to stop\n");

    for stream in listener.incoming() {
        match stream {
            Ok(stream) => handle_client(stream, &dist),
            Err(e) => eprintln!("Connection error: {}", e),
        }
    }
}

fn content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|s| s.to_str()) {
        Some("html") => "text/html; charset=utf-8",
        Some("css") => "text/css",
        Some("js") => "application/javascript",
        Some("wasm") => "application/wasm",
        Some("json") => "application/json",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("ico") => "image/x-icon",
        _ => "application/octet-stream",
    }
}

/// Map a request path to a file under `dist`, or `None` for client-side routes.
fn resolve(dist: &Path, request_path: &str) -> Option<PathBuf> {
    let relative = Path::new(request_path.trim_start_matches('/'));
    // Only plain segments: no `..`, no absolute paths.
    if !relative.components().all(|c| matches!(c, Component::Normal(_))) {
        return None;
    }

    let file = dist.join(relative);
    file.is_file().then_some(file)
}

fn handle_client(mut stream: TcpStream, dist: &Path) {
    let buf_reader = BufReader::new(&mut stream);
    let request_line = match buf_reader.lines().next() {
        Some(Ok(line)) => line,
        _ => {
            eprintln!("Failed to read request line");
            return;
        }
    };

    let full_path = request_line.split_whitespace().nth(1).unwrap_or("/");
    let path = full_path.split_once('?').map_or(full_path, |(p, _)| p);

    let file_path = resolve(dist, path).unwrap_or_else(|| dist.join("index.html"));

    let (status, body, mime) = match fs::read(&file_path) {
        Ok(contents) => ("200 OK", contents, content_type(&file_path)),
        Err(e) => {
            eprintln!("Cannot serve {}: {}", file_path.display(), e);
            (
                "404 NOT FOUND",
                b"<!DOCTYPE html><html><body><h1>Error: File not found</h1></body></html>".to_vec(),
                "text/html; charset=utf-8",
            )
        }
    };

    let headers = format!(
        "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\n\r\n",
        status,
        mime,
        body.len()
    );

    if let Err(e) = stream.write_all(headers.as_bytes()) {
        eprintln!("Failed to write headers: {}", e);
        return;
    }
    if let Err(e) = stream.write_all(&body) {
        eprintln!("Failed to write body: {}", e);
    }

    let _ = stream.flush();
}
