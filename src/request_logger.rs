use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::Status;
use rocket::{Data, Request, Response};
use std::time::Instant;

/// Fairing logging one line per HTTP request with its latency.
///
/// Liveness and health probes are logged at debug level; failed requests
/// at warn.
pub struct RequestLogger;

fn is_probe(path: &str) -> bool {
    path.ends_with("/health") || path.ends_with("/health/live")
}

#[rocket::async_trait]
impl Fairing for RequestLogger {
    fn info(&self) -> Info {
        Info {
            name: "Request Logger",
            kind: Kind::Request | Kind::Response,
        }
    }

    async fn on_request(&self, request: &mut Request<'_>, _: &mut Data<'_>) {
        request.local_cache(Instant::now);
    }

    async fn on_response<'r>(&self, request: &'r Request<'_>, response: &mut Response<'r>) {
        let elapsed_ms = request.local_cache(Instant::now).elapsed().as_secs_f64() * 1000.0;
        let method = request.method();
        // Path only: the query may carry an API key.
        let path = request.uri().path();
        let status = response.status();

        if status.code >= Status::InternalServerError.code {
            log::warn!("{} {} -> {} ({:.2}ms)", method, path, status.code, elapsed_ms);
        } else if is_probe(path.as_str()) {
            log::debug!("{} {} -> {} ({:.2}ms)", method, path, status.code, elapsed_ms);
        } else {
            log::info!("{} {} -> {} ({:.2}ms)", method, path, status.code, elapsed_ms);
        }
    }
}
