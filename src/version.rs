// Version information for the CLIP embedding node

/// Service name reported by the health endpoint
pub const SERVICE_NAME: &str = "clip-embed-node";

/// Semantic version number
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Endpoints served by this version
pub const ENDPOINTS: &[&str] = &["/embed_image/", "/embed_text/", "/health"];
