//! Database access for feynman-tutor
//!
//! One repository module per table. Every function takes the pool and
//! returns [`feynman_common::Result`]; schema creation lives in
//! `feynman_common::db::init_database`.

pub mod concepts;
pub mod courses;
pub mod lectures;
pub mod review_sessions;
pub mod settings;
