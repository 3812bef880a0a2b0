mod engine_tests;
mod series_tests;
