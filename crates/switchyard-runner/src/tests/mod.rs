//! Test suites for the session driver.

mod support;
mod unit;
