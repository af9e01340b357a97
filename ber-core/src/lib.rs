//! Core types and utilities for the BER codec
//!
//! This crate provides the error type, the value sum type carried by primitive
//! elements, the object identifier type, and the bit-layout constants shared
//! by the integer and REAL codecs.

pub mod constants;
pub mod error;
pub mod oid;
pub mod value;

pub use error::{BerError, BerResult};
pub use oid::ObjectIdentifier;
pub use value::{Value, ValueKind};
