// Aggregates the integration tests as modules.

mod atomicity;
mod catalog;
mod editing;
mod grammar_properties;
