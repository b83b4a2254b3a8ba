#![deny(clippy::all, clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::must_use_candidate
)]

//! Staff members can post under a shared alias account. Staff viewers see who really wrote
//! an aliased post through the `aliased_staff_username` field of the serialized post.

pub mod config;
mod error;
pub mod forum;
pub mod guardian;
pub mod links;
pub mod migrations;
pub mod models;
pub mod plugin;
pub mod posting;
pub mod serializer;
pub mod settings;
mod substituting_string;
pub mod topic_view;

pub use error::{Error, Result};
pub use plugin::{StaffAlias, ENGINE_NAME, MOUNT_PATH};
pub use substituting_string::SubstitutingString;
