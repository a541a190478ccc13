// Domain-driven module structure for hostsmith.

// Core infrastructure
pub mod conf;
pub mod fs;
pub mod host;

// Domain modules
pub mod parser;
pub mod validator;
pub mod transform;
pub mod merge;
pub mod search;
pub mod runtime;
