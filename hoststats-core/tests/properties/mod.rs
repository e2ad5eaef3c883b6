mod conversion_tests;
mod payload_tests;
