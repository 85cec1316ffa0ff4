mod packet;
mod paths;
mod sim_time;
mod validate;
