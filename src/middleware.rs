use std::{
    future::{ready, Ready},
    rc::Rc,
};

use actix_web::{
    cookie::{Cookie, SameSite},
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, FromRequest, HttpMessage, HttpRequest,
};
use futures::future::LocalBoxFuture;
use uuid::Uuid;

use crate::{config::Config, errors::AppError};

/// Identifies the browser session a request belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Issues an opaque session cookie on first contact and exposes its value to
/// handlers as a [`SessionId`].
#[derive(Debug, Clone)]
pub struct SessionMiddleware {
    cookie_name: Rc<str>,
    secure: bool,
}

impl SessionMiddleware {
    pub fn new(cookie_name: impl Into<String>, secure: bool) -> Self {
        Self {
            cookie_name: Rc::from(cookie_name.into()),
            secure,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.session_cookie_name.clone(), config.session_cookie_secure)
    }
}

impl<S, B> Transform<S, ServiceRequest> for SessionMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = SessionMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SessionMiddlewareService {
            service: Rc::new(service),
            cookie_name: Rc::clone(&self.cookie_name),
            secure: self.secure,
        }))
    }
}

pub struct SessionMiddlewareService<S> {
    service: Rc<S>,
    cookie_name: Rc<str>,
    secure: bool,
}

fn is_valid_session_id(value: &str) -> bool {
    Uuid::parse_str(value).is_ok()
}

impl<S, B> Service<ServiceRequest> for SessionMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let cookie_name = Rc::clone(&self.cookie_name);
        let secure = self.secure;

        let existing = req
            .cookie(&cookie_name)
            .map(|c| c.value().to_string())
            .filter(|v| is_valid_session_id(v));

        let (session_id, is_new) = match existing {
            Some(id) => (id, false),
            None => (Uuid::new_v4().to_string(), true),
        };

        req.extensions_mut().insert(SessionId(session_id.clone()));

        Box::pin(async move {
            let mut res = service.call(req).await?;

            if is_new {
                let cookie = Cookie::build(cookie_name.to_string(), session_id)
                    .path("/")
                    .http_only(true)
                    .same_site(SameSite::Lax)
                    .secure(secure)
                    .finish();

                if let Err(e) = res.response_mut().add_cookie(&cookie) {
                    log::error!("Failed to set session cookie: {}", e);
                }
            }

            Ok(res)
        })
    }
}

impl FromRequest for SessionId {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        let session_id = req
            .extensions()
            .get::<SessionId>()
            .cloned()
            .ok_or_else(|| AppError::InternalError("Session middleware is not installed".to_string()));

        ready(session_id)
    }
}
