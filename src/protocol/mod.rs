//! Text command protocol.
//!
//! ```text
//! ┌──────────┐   ┌──────────┐   ┌─────────────┐   ┌─────────────┐
//! │  codec   │──▶│  parser  │──▶│ auth (authn │──▶│ AppService  │
//! │ (lines)  │   │ (tokens) │   │  + authz)   │   │ (dispatch)  │
//! └──────────┘   └──────────┘   └─────────────┘   └─────────────┘
//! ```

pub mod auth;
pub mod codec;
pub mod parser;
