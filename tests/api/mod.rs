//! REST API endpoint tests

mod character_tests;
mod export_tests;
mod message_tests;
mod room_tests;
mod user_tests;
