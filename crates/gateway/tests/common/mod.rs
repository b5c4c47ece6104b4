#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use axum::{
    body::Body,
    http::{header, Request, Response},
    Router,
};
use lotline_gateway::{create_router, AppState, GatewayConfig, MasterHosts};
use serde_json::Value;

pub const MASTER_HOST: &str = "admin.lotline.io";
pub const TENANT_HOST: &str = "mainstreet.lotline.io";
pub const STORE_ID: &str = "5b0f8a52-3c1e-4c55-9d0e-6a7f3f2b9c11";

/// Gateway router pointed at a fake backend
pub fn gateway(backend_url: &str) -> Router {
    let config = GatewayConfig::new(backend_url.parse().unwrap())
        .with_master_hosts(MasterHosts::new([MASTER_HOST]));
    create_router(AppState::new(config).unwrap())
}

pub struct RequestSpec<'a> {
    pub method: &'a str,
    pub uri: &'a str,
    pub host: &'a str,
    pub cookie: Option<&'a str>,
    pub headers: Vec<(&'a str, &'a str)>,
    pub body: Body,
}

impl<'a> RequestSpec<'a> {
    pub fn new(method: &'a str, uri: &'a str, host: &'a str) -> Self {
        Self {
            method,
            uri,
            host,
            cookie: None,
            headers: Vec::new(),
            body: Body::empty(),
        }
    }

    pub fn cookie(mut self, cookie: &'a str) -> Self {
        self.cookie = Some(cookie);
        self
    }

    pub fn header(mut self, name: &'a str, value: &'a str) -> Self {
        self.headers.push((name, value));
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.headers.push(("content-type", "application/json"));
        self.body = Body::from(body.to_string());
        self
    }

    pub fn body(mut self, body: impl Into<Body>) -> Self {
        self.body = body.into();
        self
    }

    pub fn build(self) -> Request<Body> {
        let mut builder = Request::builder()
            .method(self.method)
            .uri(self.uri)
            .header(header::HOST, self.host);
        if let Some(cookie) = self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        for (name, value) in self.headers {
            builder = builder.header(name, value);
        }
        builder.body(self.body).unwrap()
    }
}

pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// All Set-Cookie header values on a response
pub fn set_cookies(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}

pub fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .expect("redirect without Location")
        .to_str()
        .unwrap()
}
