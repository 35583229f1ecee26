pub(crate) mod board_engine;
pub(crate) mod opts;
