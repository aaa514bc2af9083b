pub(crate) mod lookup;
pub(crate) mod rule;
pub(crate) mod view;
