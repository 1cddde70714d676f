// Command modules for tokenforge CLI

pub mod airdrop;
pub mod balance;
pub mod config;
pub mod contact;
pub mod create;
pub mod metadata;
pub mod network;
pub mod send;
pub mod utils;
