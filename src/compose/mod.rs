pub(crate) mod layers;
