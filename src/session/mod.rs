pub(crate) mod export;
pub(crate) mod frame_loop;
