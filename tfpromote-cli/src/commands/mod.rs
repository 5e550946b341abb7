pub mod envs;
pub mod promote;
