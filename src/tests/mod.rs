mod query_tests;
mod schema;
