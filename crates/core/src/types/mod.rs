//! Core types for BileMo.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod group;
pub mod id;
pub mod identity;
pub mod page;

pub use email::{Email, EmailError};
pub use group::VisibilityGroup;
pub use id::*;
pub use identity::{CustomerName, Identity};
pub use page::{PageNumber, PageSize, PageSizeError};
