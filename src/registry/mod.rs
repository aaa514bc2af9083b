pub(crate) mod rule_set;
