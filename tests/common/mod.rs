// Shared test utilities; not every test binary uses every helper
#![allow(dead_code)]

pub mod harness;
