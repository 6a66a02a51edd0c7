//! User feedback relay.
//!
//! Accepts ratings and a comment from the feedback form, renders them as a
//! GitHub issue and forwards it when relay credentials are configured.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | POST | `/api/feedback` | No | Submit feedback |

pub mod clients;
pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use clients::{GithubIssueClient, IssueTracker};
pub use routes::routes;
pub use services::FeedbackService;
