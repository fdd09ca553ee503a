//! Test suites for the launch service.

mod support;
