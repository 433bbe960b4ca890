pub mod namespace_tests;

mod support;
