pub mod auth;
pub mod config;
pub mod contacts;
pub mod post;
pub mod rank;
pub mod run;
pub mod snooze;
