use std::collections::HashMap;
use std::io::{self, Cursor, Read};
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use url::Url;

use crate::error::BoxError;
use crate::http::{HttpResponse, Transport};

pub mod fixtures;

/// What the fake server does for one URL.
#[derive(Debug, Clone)]
pub enum Route {
    Respond(u16, Vec<u8>),
    Fail(&'static str),
    /// 200 whose body sends `bytes` bytes, waits `delay`, then breaks.
    BreakAfter { bytes: usize, delay: Duration },
}

/// A response body that stops with a connection reset partway through.
struct BrokenBody {
    remaining: usize,
    delay: Duration,
}

impl Read for BrokenBody {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.remaining == 0 {
            thread::sleep(self.delay);
            return Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset"));
        }
        let n = self.remaining.min(buf.len());
        buf[..n].fill(b'x');
        self.remaining -= n;
        Ok(n)
    }
}

/// In-memory transport that serves fixed routes and records every request.
/// Unknown URLs answer 404.
#[derive(Default)]
pub struct FakeTransport {
    routes: HashMap<String, Route>,
    requests: Mutex<Vec<String>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        FakeTransport::default()
    }

    pub fn route(mut self, url: &str, route: Route) -> Self {
        self.routes.insert(url.to_string(), route);
        self
    }

    pub fn html(self, url: &str, html: &str) -> Self {
        self.route(url, Route::Respond(200, html.as_bytes().to_vec()))
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl Transport for FakeTransport {
    fn get(&self, url: &Url) -> Result<HttpResponse, BoxError> {
        self.requests.lock().unwrap().push(url.to_string());
        match self.routes.get(url.as_str()) {
            Some(Route::Respond(status, body)) => Ok(HttpResponse {
                status: *status,
                body: Box::new(Cursor::new(body.clone())),
            }),
            Some(Route::Fail(message)) => Err((*message).into()),
            Some(Route::BreakAfter { bytes, delay }) => Ok(HttpResponse {
                status: 200,
                body: Box::new(BrokenBody {
                    remaining: *bytes,
                    delay: *delay,
                }),
            }),
            None => Ok(HttpResponse {
                status: 404,
                body: Box::new(Cursor::new(Vec::new())),
            }),
        }
    }
}
