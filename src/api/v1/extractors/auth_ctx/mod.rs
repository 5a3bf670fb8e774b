/*!
 * Authentication context extractor
 *
 * Responsibility:
 * - Hand the per-request SecurityContext / AuthCtx to handlers
 * - axum wiring lives in core, plain types in types
 *
 * Public API:
 * - AuthCtx
 * - AuthCtxExtractor
 * - SecurityContext
 */

mod core;
mod types;

pub use self::core::AuthCtxExtractor;
pub use types::{AuthCtx, SecurityContext};
