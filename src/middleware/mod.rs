/*
 * Responsibility
 * - Public interface of the middleware layer (re-exports)
 * - auth::access (bearer -> SecurityContext), cors, http, security_headers
 */
pub mod auth;
pub mod cors;
pub mod http;
pub mod security_headers;
