//! Integration tests

mod e2e_test;
mod feed_test;
