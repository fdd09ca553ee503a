//! Test suites for the client tools.

mod support;
