pub(crate) mod file;
pub(crate) mod load;
pub(crate) mod save;
pub(crate) mod schema;
