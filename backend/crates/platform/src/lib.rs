//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (SHA-256, MD5, HMAC, partner parameter signatures)
//! - Password hashing (Argon2id with configurable work factor)
//! - Client origin resolution
//! - Bounded background job queue

pub mod client;
pub mod crypto;
pub mod password;
pub mod queue;
