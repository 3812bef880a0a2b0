//! Unit tests for pricing and chain scanning

mod black_scholes_tests;
mod chain_scanner_tests;
