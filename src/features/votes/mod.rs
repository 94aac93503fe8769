//! Incident upvotes.
//!
//! Each user holds at most one vote per incident. The vote rows are the
//! ledger behind the `upvotes` counter on the incident, and both change in a
//! single transaction.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | POST | `/api/incidents/{id}/vote` | Toggle the caller's vote |
//! | GET | `/api/incidents/{id}/vote-status` | Whether the caller has voted |

pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

pub use repositories::PgVoteRepository;
pub use services::VoteService;
