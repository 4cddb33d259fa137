pub mod converters;
pub mod counts;
pub mod routes;
pub mod scope;
