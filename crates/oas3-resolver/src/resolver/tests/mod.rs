mod driver;
mod merge;
mod support;
mod unions;
