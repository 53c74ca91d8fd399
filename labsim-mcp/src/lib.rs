//! MCP server exposing the labsim comparison engine.

pub mod tools;
