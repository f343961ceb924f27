//! HTTP front end for the neurodx diagnosis pipeline.
//!
//! | Route | Description |
//! |-------|-------------|
//! | `POST /api/diagnose` | Validate biomarkers and return `{"diagnosis": ...}` |
//! | `GET /health` | Liveness probe |

pub mod routes;
pub mod telemetry;

pub use routes::{router, status_for, ApiError, AppState, DiagnoseResponse, ErrorBody};
