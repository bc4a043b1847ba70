//! Parser tests.

mod parser;
