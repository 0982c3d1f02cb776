pub mod frame_format;
pub mod lpd;
pub mod s_type;
pub mod u_cmd;
