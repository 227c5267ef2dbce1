//! Remote article collection access.
//!
//! # Responsibility
//! - Define the CRUD contract against the remote `articles` resource.
//! - Keep HTTP details inside the repository boundary.
//!
//! # Invariants
//! - Create/update payloads carry exactly the editable field set.
//! - Non-success HTTP statuses surface as `RepoError::Status`, never as `Ok`.

pub mod article_repo;
