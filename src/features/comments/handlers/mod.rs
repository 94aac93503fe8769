pub mod comment_handler;
