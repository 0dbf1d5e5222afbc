//! Interactive console session tests.

#[cfg(unix)]
mod session_test;
