pub mod photo_handler;
