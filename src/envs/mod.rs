pub mod frozen_lake;
pub mod gym_adapter;
pub mod simple_golf;
