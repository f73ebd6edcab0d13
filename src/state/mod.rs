pub(crate) mod inject;
pub(crate) mod store;
